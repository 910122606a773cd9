use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::server::{api_key_auth, AppState};

use super::devices::{configured, enable_device, list_devices};
use super::health::{health, stats};
use super::messages::send_message;
use super::metrics::prometheus_metrics;
use super::preferences::preferences_configured;

pub fn api_routes(state: AppState) -> Router<AppState> {
    // Message submission is for trusted services only
    let service_routes = Router::new()
        .route("/messages", post(send_message))
        .route_layer(middleware::from_fn_with_state(state, api_key_auth));

    Router::new()
        // Health & Stats
        .route("/health", get(health))
        .route("/stats", get(stats))
        .route("/metrics", get(prometheus_metrics))
        .nest(
            "/api/v1/push",
            Router::new()
                .route("/configured", get(configured))
                .route("/devices", get(list_devices))
                .route("/devices/{id}/enable", post(enable_device))
                .route("/preferences/configured", post(preferences_configured))
                .merge(service_routes),
        )
}
