use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::signal;

use onesignal_bridge::config::Settings;
use onesignal_bridge::device::create_device_store;
use onesignal_bridge::directory::create_user_directory;
use onesignal_bridge::postgres::PostgresPool;
use onesignal_bridge::provider::OneSignalClient;
use onesignal_bridge::server::{create_app, AppState};
use onesignal_bridge::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let settings = Settings::new()?;

    let _telemetry = init_telemetry(&settings.otel)?;
    tracing::info!(run_mode = %std::env::var("RUN_MODE").unwrap_or_default(), "Configuration loaded");

    for warning in settings.startup_warnings() {
        tracing::warn!("{}", warning);
    }

    let postgres_pool = if settings.database.backend == "postgres" {
        let pool = PostgresPool::new(&settings.database)
            .await
            .context("Failed to connect to PostgreSQL")?;
        Some(pool)
    } else {
        None
    };

    let device_store = create_device_store(&settings.database, postgres_pool.as_ref());
    let directory = create_user_directory(&settings.database, postgres_pool.as_ref());
    let transport = Arc::new(
        OneSignalClient::new(&settings.provider).context("Failed to build provider HTTP client")?,
    );

    let mut state = AppState::new(settings.clone(), device_store, directory, transport);
    if let Some(pool) = postgres_pool.clone() {
        state = state.with_postgres_pool(pool);
    }
    tracing::info!("Application state initialized");

    let app = create_app(state);

    let addr = settings.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal_handler())
        .await?;

    if let Some(pool) = postgres_pool {
        pool.close().await;
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal_handler() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}
