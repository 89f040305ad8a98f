//! Domain entities - the core business objects.

mod author;
mod category;
mod permission;
mod post;
mod subscription;

pub use author::{Author, AuthorId};
pub use category::{Category, CategoryId};
pub use permission::Permission;
pub use post::{NewPost, Post, PostId, PostSubmission, PostType};
pub use subscription::{NewSubscription, Subscription, SubscriptionId};
