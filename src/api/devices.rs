//! Device listing and enable/disable endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::SessionContext;
use crate::device::{DeviceRegistry, UserDevice};
use crate::error::{AppError, Result, NO_PERMISSION_MESSAGE};
use crate::metrics::ApiMetrics;
use crate::server::AppState;

/// Shown when a user has no push-capable devices yet.
pub const NO_DEVICES_MESSAGE: &str =
    "No registered devices. Devices will automatically appear after you install the mobile app and add this site.";

#[derive(Debug, Serialize)]
pub struct ConfiguredResponse {
    pub configured: bool,
}

#[derive(Debug, Deserialize)]
pub struct DevicesQuery {
    /// Defaults to the configured mobile app name
    pub app_id: Option<String>,
    pub user_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct DevicesResponse {
    pub devices: Vec<UserDevice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
pub struct EnableDeviceRequest {
    pub enable: bool,
}

#[derive(Debug, Serialize)]
pub struct EnableDeviceResponse {
    pub success: bool,
}

/// GET /api/v1/push/configured
pub async fn configured(State(state): State<AppState>, _session: SessionContext) -> Json<ConfiguredResponse> {
    ApiMetrics::record_request("configured");
    Json(ConfiguredResponse {
        configured: DeviceRegistry::is_system_configured(&state.settings.provider),
    })
}

/// GET /api/v1/push/devices?app_id=&user_id=
///
/// Without `app_id` the configured mobile app name is used.
pub async fn list_devices(
    State(state): State<AppState>,
    session: SessionContext,
    Query(query): Query<DevicesQuery>,
) -> Result<Json<DevicesResponse>> {
    ApiMetrics::record_request("devices");

    if !DeviceRegistry::is_system_configured(&state.settings.provider) {
        return Err(AppError::NotConfigured);
    }
    let app_id = query
        .app_id
        .as_deref()
        .map(str::trim)
        .filter(|app_id| !app_id.is_empty())
        .unwrap_or_else(|| state.settings.provider.mobile_app_name.trim());
    if app_id.is_empty() {
        return Err(AppError::Validation(
            "app_id is required when no mobile app name is configured".to_string(),
        ));
    }

    let target = query.user_id.unwrap_or(session.user_id);
    if !session.can_view_devices_of(target) {
        return Err(AppError::Forbidden(format!(
            "Not allowed to view devices of user {}",
            target
        )));
    }

    let devices = state
        .registry
        .get_user_devices(&session, app_id, query.user_id)
        .await?;
    let message = devices.is_empty().then_some(NO_DEVICES_MESSAGE);

    Ok(Json(DevicesResponse { devices, message }))
}

/// POST /api/v1/push/devices/{id}/enable
///
/// Unknown and foreign links answer 404 with `success: false`.
pub async fn enable_device(
    State(state): State<AppState>,
    session: SessionContext,
    Path(link_id): Path<i64>,
    Json(request): Json<EnableDeviceRequest>,
) -> Result<(StatusCode, Json<EnableDeviceResponse>)> {
    ApiMetrics::record_request("enable_device");

    if !session.can_manage_devices() {
        return Err(AppError::Forbidden(NO_PERMISSION_MESSAGE.to_string()));
    }
    if !DeviceRegistry::is_system_configured(&state.settings.provider) {
        return Err(AppError::NotConfigured);
    }

    let success = state
        .registry
        .enable_device(&session, link_id, request.enable)
        .await;
    let status = if success {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };

    Ok((status, Json(EnableDeviceResponse { success })))
}
