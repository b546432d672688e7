//! Metrics definitions for the credential issuer.
//!
//! All metrics follow Prometheus naming conventions:
//! - `issuer_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded to prevent cardinality explosion:
//! - `method`: HTTP methods
//! - `endpoint`: 5 known paths plus "/other"
//! - `status`: 3 values (success, error, timeout)
//! - `error_type`: bounded by `IssuerError` variants

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize the global Prometheus recorder and return its handle
/// for serving metrics via HTTP.
///
/// Must be called before any metrics are recorded.
///
/// # Errors
///
/// Returns error if Prometheus recorder fails to install (e.g., already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    builder()?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

/// Build a Prometheus handle without installing it globally.
///
/// Used when several servers share one process (tests); the handle renders
/// only what is recorded through its own recorder.
pub fn detached_metrics_handle() -> Result<PrometheusHandle, String> {
    Ok(builder()?.build_recorder().handle())
}

fn builder() -> Result<PrometheusBuilder, String> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Prefix("issuer_http_request".to_string()),
            &[
                0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.200, 0.500, 1.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        // Signing is a single HMAC; anything above a few ms is suspicious
        .set_buckets_for_metric(
            Matcher::Prefix("issuer_connection_issuance".to_string()),
            &[0.0005, 0.001, 0.002, 0.005, 0.010, 0.025, 0.050, 0.100],
        )
        .map_err(|e| format!("Failed to set issuance buckets: {e}"))
}

// ============================================================================
// HTTP Request Metrics
// ============================================================================

/// Record HTTP request duration and outcome
///
/// Metric: `issuer_http_request_duration_seconds`, `issuer_http_requests_total`
/// Labels: `method`, `endpoint`, `status` / `status_code`
pub fn record_http_request(method: &str, endpoint: &str, status_code: u16, duration: Duration) {
    let normalized_endpoint = normalize_endpoint(endpoint);
    let status = categorize_status_code(status_code);

    histogram!("issuer_http_request_duration_seconds",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint,
        "status" => status
    )
    .record(duration.as_secs_f64());

    counter!("issuer_http_requests_total",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

/// Categorize HTTP status code into success/error/timeout
fn categorize_status_code(status_code: u16) -> &'static str {
    match status_code {
        200..=299 => "success",
        408 | 504 => "timeout",
        _ => "error",
    }
}

/// Normalize endpoint path to bound label cardinality
fn normalize_endpoint(path: &str) -> &'static str {
    match path {
        "/" => "/",
        "/health" => "/health",
        "/ready" => "/ready",
        "/metrics" => "/metrics",
        "/api/connection-details" => "/api/connection-details",
        _ => "/other",
    }
}

// ============================================================================
// Issuance Metrics
// ============================================================================

/// Record connection issuance duration and outcome
///
/// Metric: `issuer_connection_issuance_duration_seconds`,
/// `issuer_connection_issuance_total`
/// Labels: `status`
pub fn record_connection_issuance(status: &str, duration: Duration) {
    histogram!("issuer_connection_issuance_duration_seconds", "status" => status.to_string())
        .record(duration.as_secs_f64());

    counter!("issuer_connection_issuance_total", "status" => status.to_string()).increment(1);
}

// ============================================================================
// Error Metrics
// ============================================================================

/// Record error by type
///
/// Metric: `issuer_errors_total`
/// Labels: `operation`, `error_type`, `status_code`
pub fn record_error(operation: &str, error_type: &str, status_code: u16) {
    counter!("issuer_errors_total",
        "operation" => operation.to_string(),
        "error_type" => error_type.to_string(),
        "status_code" => status_code.to_string()
    )
    .increment(1);
}
