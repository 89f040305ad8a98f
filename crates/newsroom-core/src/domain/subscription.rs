use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::CategoryId;

pub type SubscriptionId = i64;

/// Subscription entity - links a user to a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub user_id: Uuid,
    pub category_id: CategoryId,
    pub created_at: DateTime<Utc>,
}

/// Data required to insert a new [`Subscription`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubscription {
    pub user_id: Uuid,
    pub category_id: CategoryId,
    pub created_at: DateTime<Utc>,
}

impl NewSubscription {
    pub fn new(user_id: Uuid, category_id: CategoryId) -> Self {
        Self {
            user_id,
            category_id,
            created_at: Utc::now(),
        }
    }
}
