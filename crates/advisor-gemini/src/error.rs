//! Remote client error types.

use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("Inference failed: {message}")]
    Inference { message: String, retryable: bool },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn inference(msg: impl Into<String>, retryable: bool) -> Self {
        Self::Inference {
            message: msg.into(),
            retryable,
        }
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Check if error is retryable.
    ///
    /// Only inference failures flagged by the service (quota, overload)
    /// qualify. Timeouts and content-policy rejections are terminal.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::Inference { retryable: true, .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_))
    }
}
