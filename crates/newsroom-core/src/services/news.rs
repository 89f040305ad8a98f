//! Post workflows: listing, detail, search, creation, update and deletion.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::DailyPostLimit;
use crate::domain::{
    Author, AuthorId, Category, CategoryId, NewPost, Post, PostId, PostSubmission,
};
use crate::error::{DomainError, RepoError};
use crate::filter::PostFilter;
use crate::pagination::{Page, PageRequest};
use crate::ports::{AuthorRepository, BaseRepository, CategoryRepository, PostRepository};

/// Fixed page size of the post listing.
pub const LISTING_PAGE_SIZE: u64 = 3;

/// Result of a creation attempt.
///
/// Hitting the daily cap is not an error: nothing is written and the caller
/// responds exactly as on success.
#[derive(Debug, Clone)]
pub enum CreateOutcome {
    Published(Post),
    DailyLimitReached { author_id: AuthorId, posts_today: u64 },
}

impl CreateOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, CreateOutcome::Published(_))
    }
}

/// Post workflows.
pub struct NewsService {
    posts: Arc<dyn PostRepository>,
    categories: Arc<dyn CategoryRepository>,
    authors: Arc<dyn AuthorRepository>,
    limit: DailyPostLimit,
    // Serializes count-then-insert per author within this process. Entries
    // are dropped once no creation for that author is waiting.
    author_locks: DashMap<AuthorId, Arc<Mutex<()>>>,
}

impl NewsService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        categories: Arc<dyn CategoryRepository>,
        authors: Arc<dyn AuthorRepository>,
        limit: DailyPostLimit,
    ) -> Self {
        Self {
            posts,
            categories,
            authors,
            limit,
            author_locks: DashMap::new(),
        }
    }

    /// One page of posts, newest first.
    pub async fn list(&self, page: u64) -> Result<Page<Post>, DomainError> {
        let request = PageRequest::new(page, LISTING_PAGE_SIZE);
        let total = self.posts.count().await?;
        request.validate(total)?;

        let items = self
            .posts
            .list_newest(request.offset(), request.size)
            .await?;
        Ok(Page::new(items, request, total))
    }

    pub async fn detail(&self, id: PostId) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", id))
    }

    pub async fn search(&self, filter: &PostFilter) -> Result<Vec<Post>, DomainError> {
        tracing::debug!(?filter, "Searching posts");
        Ok(self.posts.search(filter).await?)
    }

    /// Author profile of a session user, used to pre-fill the creation form.
    pub async fn author_for_user(&self, user_id: Uuid) -> Result<Author, DomainError> {
        self.authors.find_by_user_id(user_id).await?.ok_or_else(|| {
            DomainError::ReferenceResolution(format!("user {user_id} has no author profile"))
        })
    }

    /// Create a post unless its author already reached the daily cap.
    ///
    /// Unknown category ids are dropped; an unknown author is a hard error.
    pub async fn create(
        &self,
        submission: PostSubmission,
        now: DateTime<Utc>,
    ) -> Result<CreateOutcome, DomainError> {
        let categories = self
            .categories
            .find_by_ids(&submission.category_ids)
            .await?;

        let author = self
            .authors
            .find_by_id(submission.author_id)
            .await?
            .ok_or_else(|| {
                DomainError::ReferenceResolution(format!(
                    "author {} does not exist",
                    submission.author_id
                ))
            })?;

        let candidate = NewPost {
            post_type: submission.post_type,
            title: submission.title,
            text: submission.text,
            author_id: author.id,
            created_at: now,
        };

        let lock = self.author_lock(author.id);
        let outcome = {
            let _guard = lock.lock().await;
            self.publish_within_limit(candidate, categories).await
        };
        drop(lock);
        self.release_author_lock(author.id);

        outcome
    }

    /// Count-then-insert; the caller holds the author's lock.
    async fn publish_within_limit(
        &self,
        candidate: NewPost,
        categories: Vec<Category>,
    ) -> Result<CreateOutcome, DomainError> {
        let author_id = candidate.author_id;
        let posts_today = self
            .limit
            .posts_today(self.posts.as_ref(), &candidate)
            .await?;
        if !self.limit.allows(posts_today) {
            tracing::info!(
                author_id,
                posts_today,
                max_per_day = self.limit.max_per_day(),
                "Daily post limit reached, submission discarded"
            );
            return Ok(CreateOutcome::DailyLimitReached {
                author_id,
                posts_today,
            });
        }

        let category_ids: Vec<CategoryId> = categories.iter().map(|c| c.id).collect();
        let mut post = self.posts.insert(candidate, &category_ids).await?;
        post.categories = categories;

        tracing::info!(
            post_id = post.id,
            author_id = post.author_id,
            categories = post.categories.len(),
            "Post published"
        );
        Ok(CreateOutcome::Published(post))
    }

    /// Replace every editable field of an existing post.
    ///
    /// The author and every category must exist.
    pub async fn update(
        &self,
        id: PostId,
        submission: PostSubmission,
    ) -> Result<Post, DomainError> {
        let existing = self.detail(id).await?;

        if self.authors.find_by_id(submission.author_id).await?.is_none() {
            return Err(DomainError::Validation(format!(
                "author {} does not exist",
                submission.author_id
            )));
        }

        let requested: BTreeSet<CategoryId> = submission.category_ids.iter().copied().collect();
        let requested: Vec<CategoryId> = requested.into_iter().collect();
        let categories = self.categories.find_by_ids(&requested).await?;
        if categories.len() != requested.len() {
            let missing: Vec<String> = requested
                .iter()
                .filter(|id| !categories.iter().any(|c| c.id == **id))
                .map(ToString::to_string)
                .collect();
            return Err(DomainError::Validation(format!(
                "unknown categories: {}",
                missing.join(", ")
            )));
        }

        let post = Post {
            id,
            post_type: submission.post_type,
            title: submission.title,
            text: submission.text,
            created_at: existing.created_at,
            author_id: submission.author_id,
            categories,
        };

        let updated = self.posts.replace(post).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::not_found("Post", id),
            other => other.into(),
        })?;
        tracing::info!(post_id = id, "Post updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: PostId) -> Result<(), DomainError> {
        self.posts.delete(id).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::not_found("Post", id),
            other => other.into(),
        })?;
        tracing::info!(post_id = id, "Post deleted");
        Ok(())
    }

    /// Authors with a creation currently in flight.
    pub fn author_locks_held(&self) -> usize {
        self.author_locks.len()
    }

    fn author_lock(&self, author_id: AuthorId) -> Arc<Mutex<()>> {
        self.author_locks
            .entry(author_id)
            .or_default()
            .value()
            .clone()
    }

    // The map holds the only other reference once no creation is waiting.
    fn release_author_lock(&self, author_id: AuthorId) {
        self.author_locks
            .remove_if(&author_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}
