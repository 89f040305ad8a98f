//! Search filter over posts.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, de};

use crate::domain::{AuthorId, CategoryId, Post, PostType};

/// Field-based filter applied by the search workflow.
///
/// Every field is optional; set fields are combined with AND. Read from
/// query strings, where a blank field means the same as an absent one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostFilter {
    /// Case-insensitive substring of the title.
    #[serde(
        default,
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub author: Option<AuthorId>,
    #[serde(
        default,
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<CategoryId>,
    #[serde(
        default,
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub post_type: Option<PostType>,
    /// Posts created on or after this UTC day.
    #[serde(
        default,
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_after: Option<NaiveDate>,
}

fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match Option::<String>::deserialize(deserializer)?.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(de::Error::custom),
    }
}

impl PostFilter {
    /// Lowercased title needle, ignoring blank input.
    pub fn title_needle(&self) -> Option<String> {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
    }

    pub fn matches(&self, post: &Post) -> bool {
        if let Some(needle) = self.title_needle() {
            if !post.title.to_lowercase().contains(&needle) {
                return false;
            }
        }
        if self.author.is_some_and(|a| a != post.author_id) {
            return false;
        }
        if let Some(category) = self.category {
            if !post.categories.iter().any(|c| c.id == category) {
                return false;
            }
        }
        if self.post_type.is_some_and(|t| t != post.post_type) {
            return false;
        }
        if self.created_after.is_some_and(|day| post.created_on() < day) {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Category;
    use chrono::{TimeZone, Utc};

    fn post() -> Post {
        Post {
            id: 1,
            post_type: PostType::News,
            title: "Rust Release Notes".to_string(),
            text: "body".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap(),
            author_id: 7,
            categories: vec![Category {
                id: 2,
                name: "tech".to_string(),
            }],
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(PostFilter::default().matches(&post()));
    }

    #[test]
    fn test_blank_fields_are_ignored() {
        let filter: PostFilter = serde_json::from_str(
            r#"{"title":"rust","author":"","category":" ","post_type":"","created_after":""}"#,
        )
        .unwrap();

        assert_eq!(
            filter,
            PostFilter {
                title: Some("rust".to_string()),
                ..Default::default()
            }
        );
        assert!(filter.matches(&post()));
    }

    #[test]
    fn test_set_fields_are_parsed_from_text() {
        let filter: PostFilter = serde_json::from_str(
            r#"{"author":"7","category":"2","post_type":"news","created_after":"2024-03-10"}"#,
        )
        .unwrap();

        assert_eq!(filter.author, Some(7));
        assert_eq!(filter.category, Some(2));
        assert_eq!(filter.post_type, Some(PostType::News));
        assert_eq!(filter.created_after, NaiveDate::from_ymd_opt(2024, 3, 10));
    }

    #[test]
    fn test_malformed_field_is_rejected() {
        let result: Result<PostFilter, _> = serde_json::from_str(r#"{"author":"abc"}"#);
        assert!(result.is_err());

        let result: Result<PostFilter, _> = serde_json::from_str(r#"{"post_type":"opinion"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_title_is_case_insensitive() {
        let filter = PostFilter {
            title: Some("release".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&post()));
    }

    #[test]
    fn test_fields_combine_with_and() {
        let filter = PostFilter {
            author: Some(7),
            category: Some(3),
            ..Default::default()
        };
        assert!(!filter.matches(&post()));
    }

    #[test]
    fn test_created_after_is_inclusive_of_the_day() {
        let same_day = PostFilter {
            created_after: NaiveDate::from_ymd_opt(2024, 3, 10),
            ..Default::default()
        };
        let next_day = PostFilter {
            created_after: NaiveDate::from_ymd_opt(2024, 3, 11),
            ..Default::default()
        };
        assert!(same_day.matches(&post()));
        assert!(!next_day.matches(&post()));
    }
}
