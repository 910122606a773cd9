//! Service-to-service message submission.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::metrics::ApiMetrics;
use crate::notification::{DispatchContext, DispatchOutcome, NotificationEvent};
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    /// False only when delivery to the provider failed
    pub handled: bool,
    #[serde(flatten)]
    pub outcome: DispatchOutcome,
}

/// POST /api/v1/push/messages
///
/// Skips answer 200. A failed provider call answers 502.
pub async fn send_message(
    State(state): State<AppState>,
    Json(event): Json<NotificationEvent>,
) -> (StatusCode, Json<SendMessageResponse>) {
    ApiMetrics::record_request("messages");

    let ctx = DispatchContext::from_settings(&state.settings);
    let outcome = state.dispatcher.send_message(&ctx, event).await;

    let status = if outcome.is_handled() {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };

    (
        status,
        Json(SendMessageResponse {
            handled: outcome.is_handled(),
            outcome,
        }),
    )
}
