//! Host user directory backed by the `users` and `user_preferences` tables.

use async_trait::async_trait;
use sqlx::PgPool;

use super::{DirectoryError, UserDirectory, UserPreference, UserRecord};

pub struct PostgresUserDirectory {
    pool: PgPool,
}

impl PostgresUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn find_user(&self, user_id: i64) -> Result<Option<UserRecord>, DirectoryError> {
        let user = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, email FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn notification_preferences(&self, user_id: i64) -> Result<Option<Vec<UserPreference>>, DirectoryError> {
        let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        if exists.is_none() {
            return Ok(None);
        }

        let prefs = sqlx::query_as::<_, UserPreference>(
            r#"
            SELECT name, value
            FROM user_preferences
            WHERE user_id = $1 AND name LIKE 'message\_provider\_%'
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(prefs))
    }
}
