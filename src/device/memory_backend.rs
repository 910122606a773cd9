//! In-memory device store.
//!
//! Used for development and tests. Host devices are seeded with
//! [`MemoryDeviceStore::register_device`], standing in for the host platform's
//! device registration.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::store::{DeviceStore, DeviceStoreError};
use super::types::{Device, ProviderDeviceLink};

pub struct MemoryDeviceStore {
    /// Host devices by device id
    devices: DashMap<i64, Device>,
    /// Provider links by link id
    links: DashMap<i64, ProviderDeviceLink>,
    /// Device id to link id, guards the one-link-per-device invariant
    link_index: DashMap<i64, i64>,
    next_link_id: AtomicI64,
}

impl Default for MemoryDeviceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDeviceStore {
    pub fn new() -> Self {
        Self {
            devices: DashMap::new(),
            links: DashMap::new(),
            link_index: DashMap::new(),
            next_link_id: AtomicI64::new(1),
        }
    }

    /// Add or replace a host device.
    pub fn register_device(&self, device: Device) {
        self.devices.insert(device.id, device);
    }

    /// Remove a host device. Its link stays behind, orphaned.
    pub fn unregister_device(&self, device_id: i64) -> Option<Device> {
        self.devices.remove(&device_id).map(|(_, d)| d)
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn link_for_device(&self, device_id: i64) -> Option<ProviderDeviceLink> {
        let link_id = *self.link_index.get(&device_id)?;
        self.links.get(&link_id).map(|l| l.clone())
    }
}

#[async_trait]
impl DeviceStore for MemoryDeviceStore {
    async fn list_user_devices(&self, app_id: &str, user_id: i64) -> Result<Vec<Device>, DeviceStoreError> {
        let mut devices: Vec<Device> = self
            .devices
            .iter()
            .filter(|entry| entry.user_id == user_id && entry.app_id == app_id)
            .map(|entry| entry.value().clone())
            .collect();
        devices.sort_by_key(|d| d.id);
        Ok(devices)
    }

    async fn find_owned_device(&self, device_id: i64, user_id: i64) -> Result<Option<Device>, DeviceStoreError> {
        Ok(self
            .devices
            .get(&device_id)
            .filter(|d| d.user_id == user_id)
            .map(|d| d.clone()))
    }

    async fn find_link(&self, link_id: i64) -> Result<Option<ProviderDeviceLink>, DeviceStoreError> {
        Ok(self.links.get(&link_id).map(|l| l.clone()))
    }

    async fn ensure_link(&self, user_device_id: i64) -> Result<(ProviderDeviceLink, bool), DeviceStoreError> {
        // The index entry stays locked until the link is stored
        match self.link_index.entry(user_device_id) {
            Entry::Occupied(entry) => {
                let link_id = *entry.get();
                self.links
                    .get(&link_id)
                    .map(|l| (l.clone(), false))
                    .ok_or_else(|| {
                        DeviceStoreError::Unavailable(format!("dangling link index for device {}", user_device_id))
                    })
            }
            Entry::Vacant(entry) => {
                let now = Utc::now();
                let link = ProviderDeviceLink {
                    id: self.next_link_id.fetch_add(1, Ordering::Relaxed),
                    user_device_id,
                    enabled: true,
                    created_at: now,
                    updated_at: now,
                };
                self.links.insert(link.id, link.clone());
                entry.insert(link.id);
                Ok((link, true))
            }
        }
    }

    async fn set_link_enabled(&self, link_id: i64, enabled: bool) -> Result<bool, DeviceStoreError> {
        match self.links.get_mut(&link_id) {
            Some(mut link) => {
                link.enabled = enabled;
                link.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn backend_type(&self) -> &'static str {
        "memory"
    }
}
