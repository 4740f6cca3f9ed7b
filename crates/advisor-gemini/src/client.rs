//! Gemini HTTP client.

use std::path::Path;

use async_trait::async_trait;
use reqwest::header::CONTENT_LENGTH;
use reqwest::{Body, Client, Response, StatusCode};
use tracing::{debug, info, warn};

use advisor_models::{AnalysisResult, RemoteAsset};

use crate::config::GeminiConfig;
use crate::error::{ClientError, ClientResult};
use crate::remote::RemoteJobClient;
use crate::types::{
    Content, GenerateRequest, GenerateResponse, Part, UploadFileMetadata, UploadResponse,
    UploadStartRequest,
};

const API_KEY_HEADER: &str = "x-goog-api-key";
const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";

/// Client for the Gemini Files and generateContent APIs.
pub struct GeminiClient {
    http: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a new Gemini client.
    pub fn new(config: GeminiConfig) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> ClientResult<Self> {
        Self::new(GeminiConfig::from_env()?)
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn file_url(&self, asset_id: &str) -> String {
        format!("{}/v1beta/{}", self.config.base_url, asset_id)
    }

    /// Start a resumable upload and return the session URL.
    async fn start_upload(
        &self,
        display_name: &str,
        content_length: u64,
        mime_type: &str,
    ) -> ClientResult<String> {
        let url = format!("{}/upload/v1beta/files", self.config.base_url);
        let request = UploadStartRequest {
            file: UploadFileMetadata {
                display_name: display_name.to_string(),
            },
        };

        let response = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", content_length.to_string())
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .json(&request)
            .send()
            .await
            .map_err(|e| ClientError::transport(format!("Upload start failed: {}", e)))?;

        let response = ensure_success(response, "Upload start").await?;

        response
            .headers()
            .get(UPLOAD_URL_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| ClientError::invalid_response("Upload start returned no upload URL"))
    }
}

#[async_trait]
impl RemoteJobClient for GeminiClient {
    async fn submit(&self, local_path: &Path, display_name: &str) -> ClientResult<RemoteAsset> {
        let file = tokio::fs::File::open(local_path).await?;
        let size = file.metadata().await?.len();
        let mime_type = mime_type_for(local_path);

        info!(
            "Uploading {} ({} bytes, {}) as {}",
            local_path.display(),
            size,
            mime_type,
            display_name
        );

        let upload_url = self.start_upload(display_name, size, mime_type).await?;

        // Streamed from disk; the file is never held in memory.
        let response = self
            .http
            .post(&upload_url)
            .header(CONTENT_LENGTH, size)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(Body::from(file))
            .send()
            .await
            .map_err(|e| ClientError::transport(format!("Upload failed: {}", e)))?;

        let response = ensure_success(response, "Upload").await?;
        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| ClientError::invalid_response(format!("Failed to parse upload response: {}", e)))?;

        let asset = uploaded.file.into_asset(display_name);
        debug!("Uploaded {} as {} ({})", display_name, asset.id, asset.state);
        Ok(asset)
    }

    async fn get_status(&self, asset_id: &str) -> ClientResult<RemoteAsset> {
        let response = self
            .http
            .get(self.file_url(asset_id))
            .header(API_KEY_HEADER, &self.config.api_key)
            .send()
            .await
            .map_err(|e| ClientError::transport(format!("Status request failed: {}", e)))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(asset_id.to_string()));
        }

        let response = ensure_success(response, "Status request").await?;
        let file: crate::types::FileResource = response
            .json()
            .await
            .map_err(|e| ClientError::invalid_response(format!("Failed to parse file status: {}", e)))?;

        Ok(file.into_asset(asset_id))
    }

    async fn invoke(&self, prompt: &str, assets: &[RemoteAsset]) -> ClientResult<AnalysisResult> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, self.config.model
        );

        let mut parts = vec![Part::text(prompt)];
        for asset in assets {
            let uri = asset.uri.as_deref().ok_or_else(|| {
                ClientError::InvalidRequest(format!("Asset {} has no URI", asset.id))
            })?;
            let mime_type = asset
                .mime_type
                .as_deref()
                .unwrap_or("application/octet-stream");
            parts.push(Part::file(uri, mime_type));
        }

        let request = GenerateRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts,
            }],
        };

        debug!(
            "Calling {} with {} attached assets",
            self.config.model,
            assets.len()
        );

        let response = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClientError::inference(
                        format!(
                            "Request timed out after {}s",
                            self.config.request_timeout.as_secs()
                        ),
                        false,
                    )
                } else {
                    ClientError::inference(format!("Gemini API request failed: {}", e), true)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let retryable = status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error();
            warn!("Gemini API returned {} (retryable: {})", status, retryable);
            return Err(ClientError::inference(
                format!("Gemini API returned {}: {}", status, body),
                retryable,
            ));
        }

        let generated: GenerateResponse = response.json().await.map_err(|e| {
            ClientError::inference(format!("Failed to parse Gemini response: {}", e), false)
        })?;

        if let Some(reason) = generated.block_reason() {
            return Err(ClientError::inference(
                format!("Response blocked by content policy: {}", reason),
                false,
            ));
        }

        let text = generated
            .text()
            .ok_or_else(|| ClientError::inference("No content in Gemini response", false))?;

        Ok(AnalysisResult::new(
            text,
            prompt,
            assets.iter().map(|a| a.id.clone()).collect(),
            self.config.model.as_str(),
        ))
    }

    async fn delete(&self, asset_id: &str) -> ClientResult<()> {
        let response = self
            .http
            .delete(self.file_url(asset_id))
            .header(API_KEY_HEADER, &self.config.api_key)
            .send()
            .await
            .map_err(|e| ClientError::transport(format!("Delete request failed: {}", e)))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(asset_id.to_string()));
        }

        ensure_success(response, "Delete request").await?;
        debug!("Deleted remote asset {}", asset_id);
        Ok(())
    }
}

/// Map a non-success response to a transport error carrying the body.
async fn ensure_success(response: Response, operation: &str) -> ClientResult<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::transport(format!(
        "{} returned {}: {}",
        operation, status, body
    )))
}

/// Guess the upload MIME type from the file extension.
pub fn mime_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        Some("mkv") => "video/x-matroska",
        Some("webm") => "video/webm",
        _ => "application/octet-stream",
    }
}
