//! Read access to the host platform's user directory.

pub mod memory_backend;
pub mod postgres_backend;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::DatabaseConfig;
use crate::postgres::PostgresPool;

pub use memory_backend::MemoryUserDirectory;
pub use postgres_backend::PostgresUserDirectory;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),
}

/// Addressing fields of a host user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub email: String,
}

/// A named user preference, e.g. `message_provider_mod_forum_posts_loggedin`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserPreference {
    pub name: String,
    pub value: String,
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user(&self, user_id: i64) -> Result<Option<UserRecord>, DirectoryError>;

    /// Message provider preferences of a user, `None` for unknown users.
    async fn notification_preferences(&self, user_id: i64) -> Result<Option<Vec<UserPreference>>, DirectoryError>;
}

/// Create a user directory matching the device store backend.
pub fn create_user_directory(
    settings: &DatabaseConfig,
    postgres_pool: Option<&PostgresPool>,
) -> Arc<dyn UserDirectory> {
    match (settings.backend.as_str(), postgres_pool) {
        ("postgres", Some(pool)) => {
            tracing::info!(backend = "postgres", "Creating PostgreSQL user directory");
            Arc::new(PostgresUserDirectory::new(pool.pool().clone()))
        }
        _ => {
            tracing::info!(backend = "memory", "Creating memory user directory");
            Arc::new(MemoryUserDirectory::new())
        }
    }
}
