//! API layer - HTTP endpoint handlers organized by domain.

mod devices;
mod health;
mod messages;
mod metrics;
mod preferences;
mod routes;

pub use devices::{
    configured, enable_device, list_devices, ConfiguredResponse, DevicesResponse, EnableDeviceResponse,
    NO_DEVICES_MESSAGE,
};
pub use health::{health, stats};
pub use messages::{send_message, SendMessageResponse};
pub use metrics::prometheus_metrics;
pub use preferences::preferences_configured;
pub use routes::api_routes;
