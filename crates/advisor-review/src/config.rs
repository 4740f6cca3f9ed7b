//! Review configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// What to do with a remote asset once the single-video review is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CleanupPolicy {
    /// Leave the asset on the service; the caller may `release` it later
    #[default]
    Keep,
    /// Delete the asset as soon as the review finishes
    DeleteAfterUse,
}

impl CleanupPolicy {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "keep" => Some(CleanupPolicy::Keep),
            "delete" | "delete_after_use" => Some(CleanupPolicy::DeleteAfterUse),
            _ => None,
        }
    }
}

/// Bounds for waiting on a remote asset.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Sleep between status checks
    pub interval: Duration,
    /// Maximum number of status checks before giving up
    pub max_attempts: u32,
    /// Maximum total wait
    pub deadline: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3),
            max_attempts: 200,
            deadline: Duration::from_secs(600),
        }
    }
}

impl PollConfig {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }
}

/// Review configuration.
#[derive(Debug, Clone)]
pub struct ReviewConfig {
    /// Directory holding the analytics fixtures and the mock video
    pub analytics_dir: PathBuf,
    /// Polling bounds
    pub poll: PollConfig,
    /// Retries for inference calls flagged retryable
    pub inference_retries: u32,
    /// Cleanup of the single-review asset
    pub review_cleanup: CleanupPolicy,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            analytics_dir: PathBuf::from("analytics"),
            poll: PollConfig::default(),
            inference_retries: 2,
            review_cleanup: CleanupPolicy::Keep,
        }
    }
}

impl ReviewConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            analytics_dir: std::env::var("ADVISOR_ANALYTICS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.analytics_dir),
            poll: PollConfig {
                interval: Duration::from_secs(
                    std::env::var("ADVISOR_POLL_INTERVAL_SECS")
                        .ok()
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(3),
                ),
                max_attempts: std::env::var("ADVISOR_POLL_MAX_ATTEMPTS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(200),
                deadline: Duration::from_secs(
                    std::env::var("ADVISOR_POLL_DEADLINE_SECS")
                        .ok()
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(600),
                ),
            },
            inference_retries: std::env::var("ADVISOR_INFERENCE_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
            review_cleanup: std::env::var("ADVISOR_REVIEW_CLEANUP")
                .ok()
                .and_then(|s| CleanupPolicy::parse(&s))
                .unwrap_or_default(),
        }
    }

    /// Current-version analytics fixture.
    pub fn current_analytics_path(&self) -> PathBuf {
        self.analytics_dir.join("analytics1.json")
    }

    /// Previous-version analytics fixture.
    pub fn previous_analytics_path(&self) -> PathBuf {
        self.analytics_dir.join("analytics2.json")
    }

    /// Mock (previous) video used by the comparison.
    pub fn mock_video_path(&self) -> PathBuf {
        self.analytics_dir.join("mock.mp4")
    }

    pub fn with_analytics_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.analytics_dir = dir.as_ref().to_path_buf();
        self
    }
}
