//! Remote asset models.
//!
//! A remote asset is a file uploaded to the inference service. Its lifecycle
//! is driven by the service; we only observe it.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Lifecycle state of an uploaded asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetState {
    /// Accepted, not yet picked up by the service
    #[default]
    Pending,
    /// Being processed by the service
    Processing,
    /// Ready to be referenced by inference calls
    Active,
    /// Processing failed on the service side
    Failed,
    /// Deleted explicitly or expired
    Deleted,
}

impl AssetState {
    /// Get string representation of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetState::Pending => "PENDING",
            AssetState::Processing => "PROCESSING",
            AssetState::Active => "ACTIVE",
            AssetState::Failed => "FAILED",
            AssetState::Deleted => "DELETED",
        }
    }

    /// Parse the state reported by the service.
    ///
    /// Unknown and unspecified states are treated as pending so the poller
    /// keeps waiting on them.
    pub fn from_remote(state: &str) -> Self {
        match state {
            "PROCESSING" => AssetState::Processing,
            "ACTIVE" => AssetState::Active,
            "FAILED" => AssetState::Failed,
            "DELETED" => AssetState::Deleted,
            _ => AssetState::Pending,
        }
    }

    /// Check if this is a terminal state (no more transitions expected).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AssetState::Active | AssetState::Failed | AssetState::Deleted
        )
    }
}

impl std::fmt::Display for AssetState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An asset uploaded to the remote inference service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RemoteAsset {
    /// Service-assigned identifier (e.g. `files/abc123`)
    pub id: String,

    /// Human-readable name given at upload time
    pub display_name: String,

    /// Last observed lifecycle state
    pub state: AssetState,

    /// URI used to reference the asset from inference requests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    /// MIME type recorded by the service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl RemoteAsset {
    /// Create a new asset in the given state.
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, state: AssetState) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            state,
            uri: None,
            mime_type: None,
        }
    }

    /// Attach the URI and MIME type used by inference requests.
    pub fn with_uri(mut self, uri: impl Into<String>, mime_type: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn is_active(&self) -> bool {
        self.state == AssetState::Active
    }
}
