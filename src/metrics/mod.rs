//! Prometheus metrics for the push bridge.
//!
//! - Dispatch metrics (outcomes, provider retries, latency)
//! - Device metrics (links provisioned, enable toggles)
//! - HTTP API request counts

mod helpers;

pub use helpers::{encode_metrics, ApiMetrics, DeviceMetrics, DispatchMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Histogram, IntCounter,
    IntCounterVec,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "onesignal_bridge";

lazy_static! {
    // ============================================================================
    // Dispatch Metrics
    // ============================================================================

    /// Dispatch outcomes by label (delivered, skipped_*, delivery_failed)
    pub static ref DISPATCH_OUTCOMES_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_dispatch_outcomes_total", METRIC_PREFIX),
        "Total outbound messages by dispatch outcome",
        &["outcome"]
    ).unwrap();

    /// Provider calls retried after a transient failure
    pub static ref PROVIDER_RETRIES_TOTAL: IntCounter = register_int_counter!(
        format!("{}_provider_retries_total", METRIC_PREFIX),
        "Total provider calls retried after a transient failure"
    ).unwrap();

    /// End-to-end dispatch latency, retries included
    pub static ref DISPATCH_LATENCY: Histogram = register_histogram!(
        format!("{}_dispatch_latency_seconds", METRIC_PREFIX),
        "Message dispatch latency in seconds",
        vec![0.001, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
    ).unwrap();

    // ============================================================================
    // Device Metrics
    // ============================================================================

    /// Provider links created during reconciliation
    pub static ref DEVICE_LINKS_CREATED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_device_links_created_total", METRIC_PREFIX),
        "Total provider device links created"
    ).unwrap();

    /// Device enable/disable toggles
    pub static ref DEVICE_TOGGLES_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_device_toggles_total", METRIC_PREFIX),
        "Total device enable state changes",
        &["state"]
    ).unwrap();

    // ============================================================================
    // API Metrics
    // ============================================================================

    /// HTTP API requests by endpoint
    pub static ref API_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_api_requests_total", METRIC_PREFIX),
        "Total HTTP API requests",
        &["endpoint"]
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_metrics() {
        DeviceMetrics::record_link_created();

        let output = encode_metrics().unwrap();
        assert!(output.contains("onesignal_bridge_device_links_created_total"));
    }

    #[test]
    fn test_dispatch_metrics() {
        let before = DISPATCH_OUTCOMES_TOTAL.with_label_values(&["delivered"]).get();
        DispatchMetrics::record_outcome("delivered");
        DispatchMetrics::record_retry();
        DispatchMetrics::observe_latency(0.2);
        assert!(DISPATCH_OUTCOMES_TOTAL.with_label_values(&["delivered"]).get() > before);
    }

    #[test]
    fn test_device_toggle_labels() {
        DeviceMetrics::record_toggle(true);
        DeviceMetrics::record_toggle(false);
        assert!(DEVICE_TOGGLES_TOTAL.with_label_values(&["enabled"]).get() >= 1);
        assert!(DEVICE_TOGGLES_TOTAL.with_label_values(&["disabled"]).get() >= 1);
    }
}
