//! Review error types.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use advisor_analytics::AnalyticsError;
use advisor_gemini::ClientError;
use advisor_models::AssetState;

pub type ReviewResult<T> = Result<T, ReviewError>;

/// Stage of the comparison pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    /// Upload both videos and wait for them to become active
    Ingest,
    /// Summarize each video
    Summarize,
    /// Diff the summaries and KPIs
    Compare,
}

impl PipelineStage {
    pub fn number(&self) -> u8 {
        match self {
            PipelineStage::Ingest => 1,
            PipelineStage::Summarize => 2,
            PipelineStage::Compare => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Ingest => "ingest",
            PipelineStage::Summarize => "summarize",
            PipelineStage::Compare => "compare",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "stage {} ({})", self.number(), self.as_str())
    }
}

/// Why a wait was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutReason {
    Deadline,
    MaxAttempts,
    Cancelled,
}

impl std::fmt::Display for TimeoutReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TimeoutReason::Deadline => "deadline elapsed",
            TimeoutReason::MaxAttempts => "maximum poll attempts reached",
            TimeoutReason::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("Remote service error: {0}")]
    Client(#[from] ClientError),

    #[error("Processing of {asset} failed (last state: {last_state})")]
    ProcessingFailed { asset: String, last_state: AssetState },

    #[error("Timed out waiting for {asset} after {attempts} polls in {elapsed:?}: {reason}")]
    Timeout {
        asset: String,
        attempts: u32,
        elapsed: Duration,
        reason: TimeoutReason,
    },

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Missing asset: {}", .0.display())]
    MissingAsset(PathBuf),

    #[error("Analytics error: {0}")]
    Analytics(#[from] AnalyticsError),

    #[error("Failed to serialize KPI data: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Comparison failed at {stage}: {source}")]
    Stage {
        stage: PipelineStage,
        #[source]
        source: Box<ReviewError>,
    },
}

impl ReviewError {
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    /// Attach pipeline stage context.
    pub fn at_stage(self, stage: PipelineStage) -> Self {
        Self::Stage {
            stage,
            source: Box::new(self),
        }
    }

    /// Stage the error was raised in, if it came from the comparison pipeline.
    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            ReviewError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// The error without stage context.
    pub fn root(&self) -> &ReviewError {
        match self {
            ReviewError::Stage { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.root(), ReviewError::Timeout { .. })
    }

    pub fn is_precondition(&self) -> bool {
        matches!(self.root(), ReviewError::Precondition(_))
    }

    /// Check if the underlying remote failure was flagged as retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self.root(), ReviewError::Client(e) if e.is_retryable())
    }
}
