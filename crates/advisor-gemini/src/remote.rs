//! Remote job client contract.

use std::path::Path;

use async_trait::async_trait;

use advisor_models::{AnalysisResult, RemoteAsset};

use crate::error::ClientResult;

/// Operations the orchestrator needs from a remote inference service.
#[async_trait]
pub trait RemoteJobClient: Send + Sync {
    /// Upload a local file. The returned asset is usually still processing.
    async fn submit(&self, local_path: &Path, display_name: &str) -> ClientResult<RemoteAsset>;

    /// Fetch the current state of an asset.
    ///
    /// Fails with `ClientError::NotFound` once the asset is deleted or expired.
    async fn get_status(&self, asset_id: &str) -> ClientResult<RemoteAsset>;

    /// Run one inference call with the prompt and the given (active) assets.
    async fn invoke(&self, prompt: &str, assets: &[RemoteAsset]) -> ClientResult<AnalysisResult>;

    /// Delete an asset.
    ///
    /// Callers treat this as cleanup and must not let its error mask the
    /// outcome of the operation that used the asset.
    async fn delete(&self, asset_id: &str) -> ClientResult<()>;
}
