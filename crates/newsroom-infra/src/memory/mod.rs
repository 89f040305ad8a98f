//! In-memory store - used when no database is configured, and in tests.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use newsroom_core::domain::{
    Author, AuthorId, Category, CategoryId, NewPost, NewSubscription, Post, PostId, PostType,
    Subscription, SubscriptionId,
};
use newsroom_core::error::RepoError;
use newsroom_core::filter::PostFilter;
use newsroom_core::ports::{
    AuthorRepository, BaseRepository, CategoryRepository, PostRepository, SubscriptionRepository,
};

#[derive(Debug, Clone)]
struct PostRow {
    id: PostId,
    post_type: PostType,
    title: String,
    text: String,
    created_at: DateTime<Utc>,
    author_id: AuthorId,
}

#[derive(Default)]
struct State {
    posts: BTreeMap<PostId, PostRow>,
    links: BTreeSet<(PostId, CategoryId)>,
    categories: BTreeMap<CategoryId, Category>,
    authors: BTreeMap<AuthorId, Author>,
    subscriptions: BTreeMap<SubscriptionId, Subscription>,
    last_post_id: PostId,
    last_category_id: CategoryId,
    last_author_id: AuthorId,
    last_subscription_id: SubscriptionId,
}

impl State {
    fn assemble(&self, row: &PostRow) -> Post {
        let categories = self
            .links
            .range((row.id, CategoryId::MIN)..=(row.id, CategoryId::MAX))
            .filter_map(|(_, category_id)| self.categories.get(category_id).cloned())
            .collect();

        Post {
            id: row.id,
            post_type: row.post_type,
            title: row.title.clone(),
            text: row.text.clone(),
            created_at: row.created_at,
            author_id: row.author_id,
            categories,
        }
    }

    /// All posts, newest first.
    fn newest_first(&self) -> Vec<Post> {
        let mut rows: Vec<&PostRow> = self.posts.values().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        rows.into_iter().map(|row| self.assemble(row)).collect()
    }

    fn check_categories(&self, category_ids: &[CategoryId]) -> Result<(), RepoError> {
        match category_ids
            .iter()
            .find(|id| !self.categories.contains_key(*id))
        {
            Some(missing) => Err(RepoError::Constraint(format!(
                "category {missing} does not exist"
            ))),
            None => Ok(()),
        }
    }
}

/// In-memory implementation of every repository port, sharing one state.
///
/// Note: Data is lost on process restart.
#[derive(Default)]
pub struct InMemoryNewsStore {
    state: RwLock<State>,
}

impl InMemoryNewsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a category. Categories are managed outside the publishing workflows.
    pub async fn add_category(&self, name: impl Into<String>) -> Category {
        let mut state = self.state.write().await;
        state.last_category_id += 1;
        let category = Category {
            id: state.last_category_id,
            name: name.into(),
        };
        state.categories.insert(category.id, category.clone());
        category
    }

    /// Add an author profile for a user.
    pub async fn add_author(&self, user_id: Uuid) -> Author {
        let mut state = self.state.write().await;
        state.last_author_id += 1;
        let author = Author {
            id: state.last_author_id,
            user_id,
            rating: 0,
        };
        state.authors.insert(author.id, author.clone());
        author
    }
}

#[async_trait]
impl BaseRepository<Post, PostId> for InMemoryNewsStore {
    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, RepoError> {
        let state = self.state.read().await;
        Ok(state.posts.get(&id).map(|row| state.assemble(row)))
    }

    async fn delete(&self, id: PostId) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        if state.posts.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        state.links.retain(|(post_id, _)| *post_id != id);
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryNewsStore {
    async fn count(&self) -> Result<u64, RepoError> {
        Ok(self.state.read().await.posts.len() as u64)
    }

    async fn list_newest(&self, offset: u64, limit: u64) -> Result<Vec<Post>, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .newest_first()
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn search(&self, filter: &PostFilter) -> Result<Vec<Post>, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .newest_first()
            .into_iter()
            .filter(|post| filter.matches(post))
            .collect())
    }

    async fn count_by_author_on(
        &self,
        author_id: AuthorId,
        day: NaiveDate,
    ) -> Result<u64, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .posts
            .values()
            .filter(|row| row.author_id == author_id && row.created_at.date_naive() == day)
            .count() as u64)
    }

    async fn insert(
        &self,
        post: NewPost,
        category_ids: &[CategoryId],
    ) -> Result<Post, RepoError> {
        let mut state = self.state.write().await;
        if !state.authors.contains_key(&post.author_id) {
            return Err(RepoError::Constraint(format!(
                "author {} does not exist",
                post.author_id
            )));
        }
        state.check_categories(category_ids)?;

        state.last_post_id += 1;
        let row = PostRow {
            id: state.last_post_id,
            post_type: post.post_type,
            title: post.title,
            text: post.text,
            created_at: post.created_at,
            author_id: post.author_id,
        };
        state
            .links
            .extend(category_ids.iter().map(|category_id| (row.id, *category_id)));
        let stored = state.assemble(&row);
        state.posts.insert(row.id, row);
        Ok(stored)
    }

    async fn replace(&self, post: Post) -> Result<Post, RepoError> {
        let mut state = self.state.write().await;
        if !state.posts.contains_key(&post.id) {
            return Err(RepoError::NotFound);
        }
        let category_ids = post.category_ids();
        state.check_categories(&category_ids)?;
        if !state.authors.contains_key(&post.author_id) {
            return Err(RepoError::Constraint(format!(
                "author {} does not exist",
                post.author_id
            )));
        }

        let row = state.posts.get_mut(&post.id).ok_or(RepoError::NotFound)?;
        row.post_type = post.post_type;
        row.title = post.title;
        row.text = post.text;
        row.author_id = post.author_id;

        state.links.retain(|(post_id, _)| *post_id != post.id);
        state
            .links
            .extend(category_ids.iter().map(|category_id| (post.id, *category_id)));

        let row = state.posts.get(&post.id).ok_or(RepoError::NotFound)?;
        Ok(state.assemble(row))
    }
}

#[async_trait]
impl BaseRepository<Category, CategoryId> for InMemoryNewsStore {
    async fn find_by_id(&self, id: CategoryId) -> Result<Option<Category>, RepoError> {
        Ok(self.state.read().await.categories.get(&id).cloned())
    }

    async fn delete(&self, id: CategoryId) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        if state.categories.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        state.links.retain(|(_, category_id)| *category_id != id);
        state
            .subscriptions
            .retain(|_, subscription| subscription.category_id != id);
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryNewsStore {
    async fn find_by_ids(&self, ids: &[CategoryId]) -> Result<Vec<Category>, RepoError> {
        let wanted: BTreeSet<CategoryId> = ids.iter().copied().collect();
        let state = self.state.read().await;
        Ok(wanted
            .iter()
            .filter_map(|id| state.categories.get(id).cloned())
            .collect())
    }
}

#[async_trait]
impl BaseRepository<Author, AuthorId> for InMemoryNewsStore {
    async fn find_by_id(&self, id: AuthorId) -> Result<Option<Author>, RepoError> {
        Ok(self.state.read().await.authors.get(&id).cloned())
    }

    async fn delete(&self, id: AuthorId) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        if state.authors.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        let orphaned: Vec<PostId> = state
            .posts
            .values()
            .filter(|row| row.author_id == id)
            .map(|row| row.id)
            .collect();
        for post_id in orphaned {
            state.posts.remove(&post_id);
            state.links.retain(|(linked, _)| *linked != post_id);
        }
        Ok(())
    }
}

#[async_trait]
impl AuthorRepository for InMemoryNewsStore {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Author>, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .authors
            .values()
            .find(|author| author.user_id == user_id)
            .cloned())
    }
}

#[async_trait]
impl SubscriptionRepository for InMemoryNewsStore {
    async fn insert(&self, new: NewSubscription) -> Result<Subscription, RepoError> {
        let mut state = self.state.write().await;
        if !state.categories.contains_key(&new.category_id) {
            return Err(RepoError::Constraint(format!(
                "category {} does not exist",
                new.category_id
            )));
        }

        state.last_subscription_id += 1;
        let subscription = Subscription {
            id: state.last_subscription_id,
            user_id: new.user_id,
            category_id: new.category_id,
            created_at: new.created_at,
        };
        state
            .subscriptions
            .insert(subscription.id, subscription.clone());
        Ok(subscription)
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Subscription>, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .subscriptions
            .values()
            .filter(|subscription| subscription.user_id == user_id)
            .cloned()
            .collect())
    }
}
