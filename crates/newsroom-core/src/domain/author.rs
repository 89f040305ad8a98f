use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type AuthorId = i64;

/// Author entity - the publishing identity behind a post.
///
/// Each user identity has at most one author profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: AuthorId,
    pub user_id: Uuid,
    pub rating: i32,
}
