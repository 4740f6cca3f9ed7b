//! Analytics error types.

use std::path::PathBuf;

use thiserror::Error;

pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("Invalid analytics document: {0}")]
    Format(String),

    #[error("Failed to read analytics file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AnalyticsError {
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    pub fn is_format(&self) -> bool {
        matches!(self, AnalyticsError::Format(_))
    }
}
