use serde::{Deserialize, Serialize};

pub type CategoryId = i64;

/// Category entity - a grouping a post can belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}
