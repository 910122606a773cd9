use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A mobile client installation registered by the host platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Device {
    pub id: i64,
    pub user_id: i64,
    /// Mobile app identifier the device registered with
    pub app_id: String,
    /// OS family, e.g. "ios" or "android"
    pub platform: String,
    pub name: String,
    pub model: String,
    pub version: String,
    /// Push token reported by the host, never exposed by this service
    pub push_id: String,
}

/// Local record tracking whether a device participates in provider delivery.
///
/// At most one link exists per device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProviderDeviceLink {
    pub id: i64,
    pub user_device_id: i64,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A device as returned by the registry.
///
/// `id` is the id of the provider link and is what `enable_device` expects.
/// The host device id is kept separately in `user_device_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDevice {
    pub id: i64,
    pub user_device_id: i64,
    pub app_id: String,
    pub platform: String,
    pub name: String,
    pub model: String,
    pub version: String,
    pub push_id: String,
    pub enabled: bool,
    /// Display label, e.g. "Pixel Pixel 8 android 14"
    pub label: String,
}

impl UserDevice {
    pub fn new(device: Device, link: &ProviderDeviceLink) -> Self {
        let label = format!(
            "{} {} {} {}",
            device.name, device.model, device.platform, device.version
        );
        Self {
            id: link.id,
            user_device_id: device.id,
            app_id: device.app_id,
            platform: device.platform,
            name: device.name,
            model: device.model,
            version: device.version,
            push_id: String::new(),
            enabled: link.enabled,
            label,
        }
    }
}
