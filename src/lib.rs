// Infrastructure layer (shared components)
pub mod infrastructure;

pub use infrastructure::postgres;

pub mod auth;
pub mod config;
pub mod error;
pub mod metrics;

// Domain layer (business logic)
pub mod device;
pub mod directory;
pub mod notification;
pub mod provider;

// Application layer
pub mod api;
pub mod server;

// Supporting modules
pub mod telemetry;
