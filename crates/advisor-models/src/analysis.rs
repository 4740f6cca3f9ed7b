//! AI analysis result models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Free-form text produced by one inference call.
///
/// Immutable once created: fields are only reachable through accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisResult {
    text: String,
    prompt: String,
    asset_ids: Vec<String>,
    model: String,
    created_at: DateTime<Utc>,
}

impl AnalysisResult {
    /// Create a new result for the given prompt and assets.
    pub fn new(
        text: impl Into<String>,
        prompt: impl Into<String>,
        asset_ids: Vec<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            prompt: prompt.into(),
            asset_ids,
            model: model.into(),
            created_at: Utc::now(),
        }
    }

    /// Generated text, exactly as returned by the service.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Prompt that produced this result.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Remote assets attached to the inference call (empty for text-only calls).
    pub fn asset_ids(&self) -> &[String] {
        &self.asset_ids
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

/// Summaries of the current and mock videos.
///
/// The comparison stage only accepts this type, so it cannot run before
/// both summaries exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SummaryPair {
    current: AnalysisResult,
    mock: AnalysisResult,
}

impl SummaryPair {
    pub fn new(current: AnalysisResult, mock: AnalysisResult) -> Self {
        Self { current, mock }
    }

    pub fn current(&self) -> &AnalysisResult {
        &self.current
    }

    pub fn mock(&self) -> &AnalysisResult {
        &self.mock
    }

    pub fn into_parts(self) -> (AnalysisResult, AnalysisResult) {
        (self.current, self.mock)
    }
}
