//! Application state - shared across all handlers.

use std::sync::Arc;

use newsroom_core::ports::TokenService;
use newsroom_core::services::{DailyPostLimit, NewsService, SubscriptionService};
use newsroom_infra::{InMemoryNewsStore, JwtTokenService};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub news: Arc<NewsService>,
    pub subscriptions: Arc<SubscriptionService>,
    pub tokens: Arc<dyn TokenService>,
}

impl AppState {
    /// Build the application state with the configured store.
    pub async fn new(config: &AppConfig) -> Self {
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));
        let limit = DailyPostLimit::new(config.daily_post_limit);

        #[cfg(feature = "postgres")]
        if let Some(db_config) = &config.database {
            match newsroom_infra::database::connect(db_config).await {
                Ok(conn) => {
                    tracing::info!("Application state initialized (postgres)");
                    return Self::postgres(conn, tokens, limit);
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                }
            }
        }

        if config.database.is_none() {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        }
        tracing::info!("Application state initialized (in-memory)");

        Self::in_memory(Arc::new(InMemoryNewsStore::new()), tokens, limit)
    }

    /// State backed by one in-memory store.
    pub fn in_memory(
        store: Arc<InMemoryNewsStore>,
        tokens: Arc<dyn TokenService>,
        limit: DailyPostLimit,
    ) -> Self {
        Self {
            news: Arc::new(NewsService::new(
                store.clone(),
                store.clone(),
                store.clone(),
                limit,
            )),
            subscriptions: Arc::new(SubscriptionService::new(store.clone(), store)),
            tokens,
        }
    }

    #[cfg(feature = "postgres")]
    fn postgres(
        conn: newsroom_infra::database::DbConn,
        tokens: Arc<dyn TokenService>,
        limit: DailyPostLimit,
    ) -> Self {
        use newsroom_infra::{
            PostgresAuthorRepository, PostgresCategoryRepository, PostgresPostRepository,
            PostgresSubscriptionRepository,
        };

        let categories = Arc::new(PostgresCategoryRepository::new(conn.clone()));
        Self {
            news: Arc::new(NewsService::new(
                Arc::new(PostgresPostRepository::new(conn.clone())),
                categories.clone(),
                Arc::new(PostgresAuthorRepository::new(conn.clone())),
                limit,
            )),
            subscriptions: Arc::new(SubscriptionService::new(
                Arc::new(PostgresSubscriptionRepository::new(conn)),
                categories,
            )),
            tokens,
        }
    }
}
