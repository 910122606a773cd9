//! Backend trait for device and provider link storage.
//!
//! Devices belong to the host platform and are read-only here. Provider
//! links are owned by this service.

use async_trait::async_trait;
use thiserror::Error;

use super::types::{Device, ProviderDeviceLink};

/// Errors that can occur during device store operations.
#[derive(Debug, Error)]
pub enum DeviceStoreError {
    /// PostgreSQL operation failed
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// Backend is temporarily unavailable
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

/// Storage abstraction behind the device registry.
///
/// Implementations must be thread-safe (`Send + Sync`) as they are shared
/// across request handlers.
#[async_trait]
pub trait DeviceStore: Send + Sync {
    /// Host devices registered by `user_id` for the mobile app `app_id`,
    /// ordered by device id.
    async fn list_user_devices(&self, app_id: &str, user_id: i64) -> Result<Vec<Device>, DeviceStoreError>;

    /// Device `device_id`, only if it is owned by `user_id`.
    ///
    /// Ownership is part of the lookup itself so a caller can never observe
    /// a device it does not own.
    async fn find_owned_device(&self, device_id: i64, user_id: i64) -> Result<Option<Device>, DeviceStoreError>;

    async fn find_link(&self, link_id: i64) -> Result<Option<ProviderDeviceLink>, DeviceStoreError>;

    /// Link of device `user_device_id`, creating an enabled one if none exists.
    ///
    /// Returns the link and whether it was created by this call. Concurrent
    /// callers for the same device observe a single link.
    async fn ensure_link(&self, user_device_id: i64) -> Result<(ProviderDeviceLink, bool), DeviceStoreError>;

    /// Persist the `enabled` flag. Returns false if the link vanished.
    async fn set_link_enabled(&self, link_id: i64, enabled: bool) -> Result<bool, DeviceStoreError>;

    /// Backend type identifier
    fn backend_type(&self) -> &'static str;
}
