//! Prometheus metrics for request tracking.

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::debug;

// === Metric Name Constants ===

/// Total HTTP requests counter metric name.
pub const METRIC_HTTP_REQUESTS: &str = "http_requests_total";
/// HTTP request duration histogram metric name.
pub const METRIC_HTTP_REQUEST_DURATION: &str = "http_request_duration_seconds";
/// Health checks performed counter metric name.
pub const METRIC_HEALTH_CHECKS: &str = "service_health_checks_total";

/// Install the global Prometheus recorder and return the handle used
/// to render the text exposition format.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_counter!(METRIC_HTTP_REQUESTS, "Total HTTP requests");
    describe_histogram!(
        METRIC_HTTP_REQUEST_DURATION,
        "HTTP request duration in seconds"
    );
    describe_counter!(METRIC_HEALTH_CHECKS, "Total health checks performed");

    debug!("Metrics initialized");
}

/// Count a completed HTTP request.
pub fn inc_http_request(method: &str, endpoint: &str, status: u16) {
    counter!(
        METRIC_HTTP_REQUESTS,
        "method" => method.to_string(),
        "endpoint" => endpoint.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record the wall-clock duration of an HTTP request.
pub fn record_http_request_duration(start: Instant, method: &str, endpoint: &str) {
    let seconds = start.elapsed().as_secs_f64();
    histogram!(
        METRIC_HTTP_REQUEST_DURATION,
        "method" => method.to_string(),
        "endpoint" => endpoint.to_string()
    )
    .record(seconds);
}

/// Increment the health checks counter.
pub fn inc_health_checks() {
    counter!(METRIC_HEALTH_CHECKS).increment(1);
}
