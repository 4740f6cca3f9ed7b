//! Review metrics collection.
//!
//! Counters and histograms for remote calls made during reviews:
//! - Uploads and status polls
//! - Inference calls by prompt kind and outcome, with latency
//! - Retries and swallowed cleanup failures
//!
//! Recording goes through the `metrics` facade. The `advisor` binary installs
//! a Prometheus recorder with [`init_metrics`]; a host embedding the library
//! installs its own.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

// =============================================================================
// Metric Names
// =============================================================================

/// Metric name constants for consistency.
pub mod names {
    /// Total uploads submitted to the remote service.
    pub const UPLOADS_TOTAL: &str = "advisor_uploads_total";

    /// Total status polls issued while waiting for assets.
    pub const POLLS_TOTAL: &str = "advisor_polls_total";

    /// Total inference calls by prompt kind and outcome.
    pub const INFERENCE_TOTAL: &str = "advisor_inference_total";

    /// Inference latency in seconds by prompt kind.
    pub const INFERENCE_LATENCY_SECONDS: &str = "advisor_inference_latency_seconds";

    /// Total retry attempts by operation.
    pub const RETRIES_TOTAL: &str = "advisor_retries_total";

    /// Total cleanup operations that failed and were dropped.
    pub const CLEANUP_FAILURES_TOTAL: &str = "advisor_cleanup_failures_total";
}

// =============================================================================
// Recorder
// =============================================================================

/// Install the Prometheus recorder as the global recorder.
/// The handle renders the current values in text exposition format.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

// =============================================================================
// Recording Functions
// =============================================================================

pub fn record_upload() {
    counter!(names::UPLOADS_TOTAL).increment(1);
}

pub fn record_poll() {
    counter!(names::POLLS_TOTAL).increment(1);
}

/// Record a finished inference call.
pub fn record_inference(prompt_kind: &'static str, success: bool, latency_ms: f64) {
    counter!(
        names::INFERENCE_TOTAL,
        "prompt" => prompt_kind,
        "status" => if success { "ok" } else { "error" }
    )
    .increment(1);

    histogram!(
        names::INFERENCE_LATENCY_SECONDS,
        "prompt" => prompt_kind
    )
    .record(latency_ms / 1000.0);
}

/// Record a retry attempt.
pub fn record_retry(operation: &str) {
    counter!(
        names::RETRIES_TOTAL,
        "operation" => operation.to_string()
    )
    .increment(1);
}

pub fn record_cleanup_failure(operation: &str) {
    counter!(
        names::CLEANUP_FAILURES_TOTAL,
        "operation" => operation.to_string()
    )
    .increment(1);
}

// =============================================================================
// Tests
// =============================================================================
