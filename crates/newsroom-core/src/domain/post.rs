use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{AuthorId, Category, CategoryId};
use crate::error::DomainError;

pub type PostId = i64;

/// Kind of a published item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    Article,
    News,
}

impl PostType {
    pub fn as_str(self) -> &'static str {
        match self {
            PostType::Article => "article",
            PostType::News => "news",
        }
    }
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "article" => Ok(PostType::Article),
            "news" => Ok(PostType::News),
            other => Err(DomainError::Validation(format!(
                "unknown post type '{other}', expected 'article' or 'news'"
            ))),
        }
    }
}

/// Post entity - a single published news item or article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub post_type: PostType,
    pub title: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub author_id: AuthorId,
    pub categories: Vec<Category>,
}

impl Post {
    /// Calendar day (UTC) the post was created on.
    pub fn created_on(&self) -> NaiveDate {
        self.created_at.date_naive()
    }

    pub fn category_ids(&self) -> Vec<CategoryId> {
        self.categories.iter().map(|c| c.id).collect()
    }
}

/// Data required to insert a new [`Post`]. Categories are passed alongside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub post_type: PostType,
    pub title: String,
    pub text: String,
    pub author_id: AuthorId,
    pub created_at: DateTime<Utc>,
}

impl NewPost {
    pub fn created_on(&self) -> NaiveDate {
        self.created_at.date_naive()
    }
}

/// A submitted post form with references already parsed into identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostSubmission {
    pub post_type: PostType,
    pub title: String,
    pub text: String,
    pub author_id: AuthorId,
    pub category_ids: Vec<CategoryId>,
}
