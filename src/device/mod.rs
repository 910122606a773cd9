//! Device registry and provider link storage.
//!
//! # Store Architecture
//!
//! The registry talks to storage through the `DeviceStore` trait:
//!
//! - `MemoryDeviceStore`: In-memory storage using DashMap (default)
//! - `PostgresDeviceStore`: Host `user_devices` table plus `provider_device_links`
//!
//! Use `create_device_store()` to pick the backend from configuration.

mod factory;
pub mod memory_backend;
pub mod postgres_backend;
mod registry;
mod store;
mod types;

pub use factory::create_device_store;
pub use memory_backend::MemoryDeviceStore;
pub use postgres_backend::PostgresDeviceStore;
pub use registry::DeviceRegistry;
pub use store::{DeviceStore, DeviceStoreError};
pub use types::{Device, ProviderDeviceLink, UserDevice};
