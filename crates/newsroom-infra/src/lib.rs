//! # Newsroom Infrastructure
//!
//! Concrete implementations of the ports defined in `newsroom-core`.
//!
//! ## Feature Flags
//!
//! - `postgres` (default) - PostgreSQL repositories via SeaORM
//! - `minimal` - in-memory store only

pub mod auth;
pub mod database;
pub mod memory;

pub use auth::{JwtConfig, JwtTokenService};
pub use database::DatabaseConfig;
pub use memory::InMemoryNewsStore;

#[cfg(feature = "postgres")]
pub use database::{
    PostgresAuthorRepository, PostgresCategoryRepository, PostgresPostRepository,
    PostgresSubscriptionRepository,
};
