//! Device registry: reconciles host devices with provider links and guards
//! per-device enable state.

use std::sync::Arc;

use crate::auth::SessionContext;
use crate::config::{ProviderConfig, PushConfig};
use crate::metrics::DeviceMetrics;

use super::store::{DeviceStore, DeviceStoreError};
use super::types::UserDevice;

pub struct DeviceRegistry {
    store: Arc<dyn DeviceStore>,
    push: PushConfig,
}

impl DeviceRegistry {
    pub fn new(store: Arc<dyn DeviceStore>, push: PushConfig) -> Self {
        Self { store, push }
    }

    pub fn store(&self) -> &Arc<dyn DeviceStore> {
        &self.store
    }

    /// Whether provider credentials are present.
    pub fn is_system_configured(provider: &ProviderConfig) -> bool {
        provider.is_configured()
    }

    /// Push-capable devices of a user, provisioning missing provider links.
    ///
    /// `user_id` defaults to the session user. Every returned entry carries
    /// the provider link id in `id`.
    #[tracing::instrument(
        name = "registry.get_user_devices",
        skip(self, session),
        fields(session_user_id = session.user_id)
    )]
    pub async fn get_user_devices(
        &self,
        session: &SessionContext,
        app_id: &str,
        user_id: Option<i64>,
    ) -> Result<Vec<UserDevice>, DeviceStoreError> {
        let user_id = user_id.unwrap_or(session.user_id);
        let devices = self.store.list_user_devices(app_id, user_id).await?;

        let mut result = Vec::with_capacity(devices.len());
        let mut provisioned = 0usize;

        for device in devices {
            if !self.push.supports_platform(&device.platform) {
                tracing::trace!(
                    device_id = device.id,
                    platform = %device.platform,
                    "Skipping device without push support"
                );
                continue;
            }

            let (link, created) = self.store.ensure_link(device.id).await?;
            if created {
                provisioned += 1;
                DeviceMetrics::record_link_created();
            }
            result.push(UserDevice::new(device, &link));
        }

        tracing::debug!(
            user_id = user_id,
            devices = result.len(),
            provisioned = provisioned,
            "Resolved user devices"
        );

        Ok(result)
    }

    /// Enable or disable a provider link owned by the session user.
    ///
    /// Every failure, including a foreign or unknown link, yields `false`.
    #[tracing::instrument(
        name = "registry.enable_device",
        skip(self, session),
        fields(session_user_id = session.user_id)
    )]
    pub async fn enable_device(&self, session: &SessionContext, link_id: i64, enable: bool) -> bool {
        match self.try_enable_device(session, link_id, enable).await {
            Ok(updated) => {
                if updated {
                    DeviceMetrics::record_toggle(enable);
                }
                updated
            }
            Err(e) => {
                tracing::error!(link_id = link_id, error = %e, "Failed to update device link");
                false
            }
        }
    }

    async fn try_enable_device(
        &self,
        session: &SessionContext,
        link_id: i64,
        enable: bool,
    ) -> Result<bool, DeviceStoreError> {
        let Some(link) = self.store.find_link(link_id).await? else {
            tracing::debug!(link_id = link_id, "Unknown device link");
            return Ok(false);
        };

        if self
            .store
            .find_owned_device(link.user_device_id, session.user_id)
            .await?
            .is_none()
        {
            tracing::warn!(
                link_id = link_id,
                user_device_id = link.user_device_id,
                user_id = session.user_id,
                "Device link not owned by caller"
            );
            return Ok(false);
        }

        self.store.set_link_enabled(link.id, enable).await
    }
}
