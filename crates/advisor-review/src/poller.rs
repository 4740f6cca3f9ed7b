//! Job poller.
//!
//! Waits for a remote asset to reach a terminal state. The wait is bounded
//! by an attempt count and a deadline, and can be cancelled.

use tokio::time::Instant;
use tracing::{debug, warn};

use advisor_gemini::RemoteJobClient;
use advisor_models::{AssetState, RemoteAsset};

use crate::config::PollConfig;
use crate::error::{ReviewError, ReviewResult, TimeoutReason};
use crate::metrics::record_poll;
use crate::progress::{CancelSignal, ProgressEvent, ProgressReporter};

/// Drives assets from pending/processing to a terminal state.
#[derive(Debug, Clone)]
pub struct JobPoller {
    config: PollConfig,
}

impl JobPoller {
    pub fn new(config: PollConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Wait until `asset` is active.
    ///
    /// Fails with `ProcessingFailed` if the service reports a failed or
    /// deleted asset, and with `Timeout` once the attempt budget or deadline
    /// is exhausted or `cancel` fires.
    pub async fn wait_until_active(
        &self,
        client: &dyn RemoteJobClient,
        mut asset: RemoteAsset,
        reporter: &dyn ProgressReporter,
        cancel: &CancelSignal,
    ) -> ReviewResult<RemoteAsset> {
        let started = Instant::now();
        let deadline = started + self.config.deadline;
        let mut attempts = 0u32;

        loop {
            match asset.state {
                AssetState::Active => {
                    debug!("{} active after {} polls", asset.id, attempts);
                    reporter.report(ProgressEvent::Ready {
                        asset_id: asset.id.clone(),
                        display_name: asset.display_name.clone(),
                    });
                    return Ok(asset);
                }
                AssetState::Failed | AssetState::Deleted => {
                    warn!("{} ended in state {}", asset.id, asset.state);
                    return Err(ReviewError::ProcessingFailed {
                        asset: asset.display_name,
                        last_state: asset.state,
                    });
                }
                AssetState::Pending | AssetState::Processing => {}
            }

            let elapsed = started.elapsed();
            let exhausted = if attempts >= self.config.max_attempts {
                Some(TimeoutReason::MaxAttempts)
            } else if elapsed >= self.config.deadline {
                Some(TimeoutReason::Deadline)
            } else {
                None
            };
            if let Some(reason) = exhausted {
                return Err(self.timeout(&asset, attempts, started, reason));
            }

            reporter.report(ProgressEvent::waiting(
                &asset.id,
                &asset.display_name,
                asset.state,
                attempts + 1,
                elapsed,
            ));

            // Never sleep past the deadline.
            let remaining = self.config.deadline.saturating_sub(elapsed);
            let pause = self.config.interval.min(remaining);

            tokio::select! {
                _ = tokio::time::sleep(pause) => {}
                _ = cancel.cancelled() => {
                    return Err(self.timeout(&asset, attempts, started, TimeoutReason::Cancelled));
                }
            }

            // The status call is bounded by the same deadline and signal.
            let status = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(self.timeout(&asset, attempts, started, TimeoutReason::Cancelled));
                }
                status = tokio::time::timeout_at(deadline, client.get_status(&asset.id)) => status,
            };
            let status = match status {
                Ok(status) => status,
                Err(_) => {
                    return Err(self.timeout(&asset, attempts, started, TimeoutReason::Deadline));
                }
            };

            let display_name = asset.display_name.clone();
            asset = status?;
            // Status responses may omit the display name.
            if asset.display_name == asset.id {
                asset.display_name = display_name;
            }
            attempts += 1;
            record_poll();
        }
    }

    fn timeout(
        &self,
        asset: &RemoteAsset,
        attempts: u32,
        started: Instant,
        reason: TimeoutReason,
    ) -> ReviewError {
        warn!(
            "Gave up waiting for {} after {} polls: {}",
            asset.id, attempts, reason
        );
        ReviewError::Timeout {
            asset: asset.display_name.clone(),
            attempts,
            elapsed: started.elapsed(),
            reason,
        }
    }
}
