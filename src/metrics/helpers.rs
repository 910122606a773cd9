use prometheus::{Encoder, TextEncoder};

use super::{
    API_REQUESTS_TOTAL, DEVICE_LINKS_CREATED_TOTAL, DEVICE_TOGGLES_TOTAL, DISPATCH_LATENCY,
    DISPATCH_OUTCOMES_TOTAL, PROVIDER_RETRIES_TOTAL,
};

/// Encode all registered metrics in the Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording dispatch metrics
pub struct DispatchMetrics;

impl DispatchMetrics {
    pub fn record_outcome(label: &str) {
        DISPATCH_OUTCOMES_TOTAL.with_label_values(&[label]).inc();
    }

    pub fn record_retry() {
        PROVIDER_RETRIES_TOTAL.inc();
    }

    pub fn observe_latency(seconds: f64) {
        DISPATCH_LATENCY.observe(seconds);
    }
}

/// Helper struct for recording device registry metrics
pub struct DeviceMetrics;

impl DeviceMetrics {
    pub fn record_link_created() {
        DEVICE_LINKS_CREATED_TOTAL.inc();
    }

    pub fn record_toggle(enabled: bool) {
        let state = if enabled { "enabled" } else { "disabled" };
        DEVICE_TOGGLES_TOTAL.with_label_values(&[state]).inc();
    }
}

/// Helper struct for recording HTTP API metrics
pub struct ApiMetrics;

impl ApiMetrics {
    pub fn record_request(endpoint: &str) {
        API_REQUESTS_TOTAL.with_label_values(&[endpoint]).inc();
    }
}
