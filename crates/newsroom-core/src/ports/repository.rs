use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{
    Author, AuthorId, Category, CategoryId, NewPost, NewSubscription, Post, PostId, Subscription,
};
use crate::error::RepoError;
use crate::filter::PostFilter;

/// Lookup and removal shared by every repository.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// Post repository. Posts are always returned with their categories loaded.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, PostId> {
    /// Total number of posts.
    async fn count(&self) -> Result<u64, RepoError>;

    /// Posts ordered newest first (ties broken by id, descending).
    async fn list_newest(&self, offset: u64, limit: u64) -> Result<Vec<Post>, RepoError>;

    /// Posts matching `filter`, newest first.
    async fn search(&self, filter: &PostFilter) -> Result<Vec<Post>, RepoError>;

    /// Number of posts by `author_id` created on the UTC calendar day `day`.
    async fn count_by_author_on(&self, author_id: AuthorId, day: NaiveDate)
    -> Result<u64, RepoError>;

    /// Insert a post linked to `category_ids` as one atomic write.
    /// Nothing is stored if any link cannot be made.
    async fn insert(&self, post: NewPost, category_ids: &[CategoryId])
    -> Result<Post, RepoError>;

    /// Replace every editable field of a post, including its category links.
    /// The creation timestamp is kept.
    async fn replace(&self, post: Post) -> Result<Post, RepoError>;
}

/// Category repository.
#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, CategoryId> {
    /// Categories whose id is in `ids`; unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[CategoryId]) -> Result<Vec<Category>, RepoError>;
}

/// Author repository.
#[async_trait]
pub trait AuthorRepository: BaseRepository<Author, AuthorId> {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Author>, RepoError>;
}

/// Subscription repository.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    async fn insert(&self, subscription: NewSubscription) -> Result<Subscription, RepoError>;

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Subscription>, RepoError>;
}
