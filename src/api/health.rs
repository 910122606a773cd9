//! Health check and statistics endpoints.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::device::DeviceRegistry;
use crate::notification::DispatcherStatsSnapshot;
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub provider: ProviderHealthResponse,
    pub device_store: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postgres: Option<PostgresHealthResponse>,
}

#[derive(Debug, Serialize)]
pub struct ProviderHealthResponse {
    pub configured: bool,
    pub endpoint: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub app_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub mobile_app_name: String,
}

#[derive(Debug, Serialize)]
pub struct PostgresHealthResponse {
    pub pool_size: u32,
    pub idle_connections: u32,
    pub closed: bool,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub dispatch: DispatcherStatsSnapshot,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let configured = DeviceRegistry::is_system_configured(&state.settings.provider);

    let postgres = state.postgres_pool.as_ref().map(|pool| {
        let inner_pool = pool.pool();
        PostgresHealthResponse {
            pool_size: inner_pool.size(),
            idle_connections: inner_pool.num_idle() as u32,
            closed: inner_pool.is_closed(),
        }
    });
    let postgres_down = postgres.as_ref().is_some_and(|p| p.closed);

    // An unconfigured provider still serves the management API
    let status = if !configured || postgres_down {
        "degraded"
    } else {
        "healthy"
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        provider: ProviderHealthResponse {
            configured,
            endpoint: state.settings.provider.api_url.clone(),
            app_name: state.settings.provider.app_name.clone(),
            mobile_app_name: state.settings.provider.mobile_app_name.clone(),
        },
        device_store: state.registry.store().backend_type().to_string(),
        postgres,
    })
}

pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        dispatch: state.dispatcher.stats(),
    })
}
