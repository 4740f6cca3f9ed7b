//! Gemini REST request/response types.

use serde::{Deserialize, Serialize};

use advisor_models::{AssetState, RemoteAsset};

/// Metadata sent when starting a resumable upload.
#[derive(Debug, Serialize)]
pub struct UploadStartRequest {
    pub file: UploadFileMetadata,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadFileMetadata {
    pub display_name: String,
}

/// Response of the finalizing upload request.
#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    pub file: FileResource,
}

/// A file as described by the Files API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResource {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

impl FileResource {
    /// Convert to the service-independent asset model.
    pub fn into_asset(self, fallback_display_name: &str) -> RemoteAsset {
        let state = AssetState::from_remote(self.state.as_deref().unwrap_or_default());
        RemoteAsset {
            display_name: self
                .display_name
                .unwrap_or_else(|| fallback_display_name.to_string()),
            id: self.name,
            state,
            uri: self.uri,
            mime_type: self.mime_type,
        }
    }
}

/// generateContent request.
#[derive(Debug, Serialize)]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

/// A request part: either inline text or a reference to an uploaded file.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_data: Option<FileData>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            file_data: None,
        }
    }

    pub fn file(file_uri: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            text: None,
            file_data: Some(FileData {
                mime_type: mime_type.into(),
                file_uri: file_uri.into(),
            }),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileData {
    pub mime_type: String,
    pub file_uri: String,
}

/// generateContent response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<ResponseContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate, if any.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// Reason the request or its only candidate was blocked by content policy.
    pub fn block_reason(&self) -> Option<String> {
        if let Some(reason) = self
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.clone())
        {
            return Some(reason);
        }
        self.candidates
            .first()
            .and_then(|c| c.finish_reason.as_deref())
            .filter(|r| matches!(*r, "SAFETY" | "BLOCKLIST" | "PROHIBITED_CONTENT"))
            .map(str::to_string)
    }
}
