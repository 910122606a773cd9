use axum::{extract::State, Json};
use serde::Deserialize;

use crate::auth::SessionContext;
use crate::error::Result;
use crate::metrics::ApiMetrics;
use crate::notification::{are_notification_preferences_configured, PreferencesReport};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct PreferencesRequest {
    pub user_ids: Vec<i64>,
}

/// POST /api/v1/push/preferences/configured
pub async fn preferences_configured(
    State(state): State<AppState>,
    _session: SessionContext,
    Json(request): Json<PreferencesRequest>,
) -> Result<Json<PreferencesReport>> {
    ApiMetrics::record_request("preferences_configured");

    let report = are_notification_preferences_configured(
        state.directory.as_ref(),
        &state.settings.messaging,
        &request.user_ids,
    )
    .await?;

    Ok(Json(report))
}
