//! PostgreSQL-based device store.
//!
//! Reads the host platform's `user_devices` table and owns the
//! `provider_device_links` table (see `migrations/`).

use async_trait::async_trait;
use sqlx::PgPool;

use super::store::{DeviceStore, DeviceStoreError};
use super::types::{Device, ProviderDeviceLink};

pub struct PostgresDeviceStore {
    pool: PgPool,
}

impl PostgresDeviceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeviceStore for PostgresDeviceStore {
    async fn list_user_devices(&self, app_id: &str, user_id: i64) -> Result<Vec<Device>, DeviceStoreError> {
        let devices = sqlx::query_as::<_, Device>(
            r#"
            SELECT id, user_id, app_id, platform, name, model, version, push_id
            FROM user_devices
            WHERE app_id = $1 AND user_id = $2
            ORDER BY id ASC
            "#,
        )
        .bind(app_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(devices)
    }

    async fn find_owned_device(&self, device_id: i64, user_id: i64) -> Result<Option<Device>, DeviceStoreError> {
        let device = sqlx::query_as::<_, Device>(
            r#"
            SELECT id, user_id, app_id, platform, name, model, version, push_id
            FROM user_devices
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(device_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(device)
    }

    async fn find_link(&self, link_id: i64) -> Result<Option<ProviderDeviceLink>, DeviceStoreError> {
        let link = sqlx::query_as::<_, ProviderDeviceLink>(
            r#"
            SELECT id, user_device_id, enabled, created_at, updated_at
            FROM provider_device_links
            WHERE id = $1
            "#,
        )
        .bind(link_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(link)
    }

    async fn ensure_link(&self, user_device_id: i64) -> Result<(ProviderDeviceLink, bool), DeviceStoreError> {
        // The UNIQUE constraint on user_device_id settles concurrent inserts
        let inserted = sqlx::query_as::<_, ProviderDeviceLink>(
            r#"
            INSERT INTO provider_device_links (user_device_id, enabled, created_at, updated_at)
            VALUES ($1, TRUE, NOW(), NOW())
            ON CONFLICT (user_device_id) DO NOTHING
            RETURNING id, user_device_id, enabled, created_at, updated_at
            "#,
        )
        .bind(user_device_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(link) = inserted {
            tracing::debug!(
                link_id = link.id,
                user_device_id = user_device_id,
                "Provider link created"
            );
            return Ok((link, true));
        }

        let existing = sqlx::query_as::<_, ProviderDeviceLink>(
            r#"
            SELECT id, user_device_id, enabled, created_at, updated_at
            FROM provider_device_links
            WHERE user_device_id = $1
            "#,
        )
        .bind(user_device_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((existing, false))
    }

    async fn set_link_enabled(&self, link_id: i64, enabled: bool) -> Result<bool, DeviceStoreError> {
        let result = sqlx::query(
            r#"
            UPDATE provider_device_links
            SET enabled = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(link_id)
        .bind(enabled)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    fn backend_type(&self) -> &'static str {
        "postgres"
    }
}
