//! Structured logging utilities.
//!
//! Provides tracing subscriber setup for the binary and a per-operation
//! logger that stamps every line with an operation id.

use tracing::{error, info, warn, Span};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

/// Initialize tracing: JSON when `LOG_FORMAT=json`, colored text otherwise.
pub fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,advisor_review=info,advisor_gemini=info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

/// Logger for one orchestrated operation (a review or a comparison).
#[derive(Debug, Clone)]
pub struct OperationLogger {
    operation_id: String,
    operation: String,
}

impl OperationLogger {
    /// Create a logger with a fresh operation id.
    pub fn new(operation: &str) -> Self {
        Self {
            operation_id: Uuid::new_v4().to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            operation_id = %self.operation_id,
            operation = %self.operation,
            "Operation started: {}", message
        );
    }

    pub fn log_progress(&self, message: &str) {
        info!(
            operation_id = %self.operation_id,
            operation = %self.operation,
            "Operation progress: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            operation_id = %self.operation_id,
            operation = %self.operation,
            "Operation warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            operation_id = %self.operation_id,
            operation = %self.operation,
            "Operation failed: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            operation_id = %self.operation_id,
            operation = %self.operation,
            "Operation completed: {}", message
        );
    }

    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Span covering the whole operation.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "operation",
            operation_id = %self.operation_id,
            operation = %self.operation
        )
    }
}
