//! Ad-Visor review orchestration.
//!
//! Drives remote video analysis jobs to completion:
//! - [`JobPoller`] waits for uploaded assets to become active
//! - [`AnalysisOrchestrator`] runs single-video reviews and the three-stage
//!   comparison (ingest, summarize, compare)
//! - [`ReviewSession`] holds the user's video, KPI series and summaries

pub mod cleanup;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod orchestrator;
pub mod poller;
pub mod progress;
pub mod prompts;
pub mod retry;
pub mod session;

pub use config::{CleanupPolicy, PollConfig, ReviewConfig};
pub use error::{PipelineStage, ReviewError, ReviewResult, TimeoutReason};
pub use orchestrator::{AnalysisOrchestrator, ComparisonReport, ReviewOutcome};
pub use poller::JobPoller;
pub use progress::{
    CancelHandle, CancelSignal, ChannelReporter, LogReporter, ProgressEvent, ProgressReporter,
};
pub use retry::RetryConfig;
pub use session::ReviewSession;
