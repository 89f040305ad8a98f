use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{CategoryId, NewSubscription, Subscription};
use crate::error::DomainError;
use crate::ports::{BaseRepository, CategoryRepository, SubscriptionRepository};

/// Subscription workflow.
pub struct SubscriptionService {
    subscriptions: Arc<dyn SubscriptionRepository>,
    categories: Arc<dyn CategoryRepository>,
}

impl SubscriptionService {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        categories: Arc<dyn CategoryRepository>,
    ) -> Self {
        Self {
            subscriptions,
            categories,
        }
    }

    /// Subscribe `user_id` to an existing category.
    pub async fn subscribe(
        &self,
        user_id: Uuid,
        category_id: CategoryId,
    ) -> Result<Subscription, DomainError> {
        if self.categories.find_by_id(category_id).await?.is_none() {
            return Err(DomainError::Validation(format!(
                "category {category_id} does not exist"
            )));
        }

        let subscription = self
            .subscriptions
            .insert(NewSubscription::new(user_id, category_id))
            .await?;

        tracing::info!(
            subscription_id = subscription.id,
            category_id,
            "Subscription created"
        );
        Ok(subscription)
    }

    pub async fn subscriptions_of(&self, user_id: Uuid) -> Result<Vec<Subscription>, DomainError> {
        Ok(self.subscriptions.find_by_user(user_id).await?)
    }
}
