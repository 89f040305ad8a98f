//! Data Transfer Objects - request/response types for the API.

use serde::{Deserialize, Serialize};

/// An identifier as submitted by a form: a number, or a string holding one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldRef {
    Number(i64),
    Text(String),
}

impl FieldRef {
    /// Parse the submitted value into an identifier.
    pub fn parse(&self) -> Result<i64, String> {
        match self {
            FieldRef::Number(id) => Ok(*id),
            FieldRef::Text(raw) => raw
                .trim()
                .parse()
                .map_err(|_| format!("'{raw}' is not a valid identifier")),
        }
    }
}

impl From<i64> for FieldRef {
    fn from(id: i64) -> Self {
        FieldRef::Number(id)
    }
}

/// Post create/update submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostForm {
    pub post_type: String,
    pub title: String,
    pub text: String,
    pub author: FieldRef,
    #[serde(default)]
    pub categories: Vec<FieldRef>,
}

/// Subscription submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscribeForm {
    pub category: i64,
}

/// `?page=N` on the listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorResponse {
    pub id: i64,
    pub user_id: String,
    pub rating: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: i64,
    pub post_type: String,
    pub title: String,
    pub text: String,
    pub created_at: String,
    pub author_id: i64,
    pub categories: Vec<CategoryResponse>,
}

/// One page of the listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostPageResponse {
    pub posts: Vec<PostResponse>,
    pub page: u64,
    pub num_pages: u64,
    pub total: u64,
    pub has_next: bool,
    pub has_previous: bool,
    pub time_now: String,
}

/// Search results together with the filter that produced them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse<F> {
    pub posts: Vec<PostResponse>,
    pub filter: F,
}

/// Initial data of the post creation form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostFormInitial {
    pub author: AuthorResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionResponse {
    pub id: i64,
    pub category_id: i64,
    pub created_at: String,
}

/// Initial data of the subscription form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscribeFormInitial {
    pub user: String,
    pub username: String,
    pub subscriptions: Vec<SubscriptionResponse>,
}
