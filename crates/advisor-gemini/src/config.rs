//! Gemini client configuration.

use std::time::Duration;

use crate::error::{ClientError, ClientResult};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-flash-latest";
const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// Configuration for the Gemini client.
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key sent with every request
    pub api_key: String,
    /// Base URL of the Gemini API (without version prefix)
    pub base_url: String,
    /// Model used for inference
    pub model: String,
    /// Per-request timeout; a request exceeding it fails instead of hanging
    pub request_timeout: Duration,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl GeminiConfig {
    /// Create a config with default endpoint, model and timeout.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Create config from environment variables.
    pub fn from_env() -> ClientResult<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ClientError::Config("GEMINI_API_KEY not set".to_string()))?;

        Ok(Self {
            api_key,
            base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            model: std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            request_timeout: Duration::from_secs(
                std::env::var("GEMINI_REQUEST_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
