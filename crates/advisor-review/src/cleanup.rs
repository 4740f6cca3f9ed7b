//! Best-effort cleanup of remote assets.
//!
//! Cleanup runs after the primary outcome is decided. Its failures are
//! logged and counted, never returned, so they cannot mask that outcome.

use std::future::Future;

use tracing::{debug, warn};

use advisor_gemini::RemoteJobClient;
use advisor_models::RemoteAsset;

use crate::metrics::record_cleanup_failure;

/// Run a side-channel operation whose failure must not propagate.
///
/// Returns whether the operation succeeded.
pub async fn best_effort<Fut, E>(operation: &str, future: Fut) -> bool
where
    Fut: Future<Output = Result<(), E>>,
    E: std::fmt::Display,
{
    match future.await {
        Ok(()) => true,
        Err(e) => {
            warn!("Best-effort {} failed (ignored): {}", operation, e);
            record_cleanup_failure(operation);
            false
        }
    }
}

/// Delete every asset, ignoring individual failures.
///
/// Returns the number of assets actually deleted.
pub async fn release_all(client: &dyn RemoteJobClient, assets: &[RemoteAsset]) -> usize {
    let mut released = 0;
    for asset in assets {
        if best_effort("delete", client.delete(&asset.id)).await {
            debug!("Released remote asset {} ({})", asset.id, asset.display_name);
            released += 1;
        }
    }
    released
}
