//! Review session state.
//!
//! A [`ReviewSession`] holds what one user has loaded so far: the video under
//! review, the current and previous KPI series, and the summaries from the
//! last successful comparison. It is an owned value passed by `&mut`; there
//! is no shared or global state.

use std::path::{Path, PathBuf};

use tracing::info;

use advisor_analytics::merge;
use advisor_models::{CombinedTable, KpiSeries, SummaryPair};

use crate::config::ReviewConfig;
use crate::error::{ReviewError, ReviewResult};
use crate::orchestrator::{AnalysisOrchestrator, ComparisonReport, ReviewOutcome};
use crate::progress::CancelSignal;

#[derive(Debug, Clone, Default)]
pub struct ReviewSession {
    video_path: Option<PathBuf>,
    current_kpi: Option<KpiSeries>,
    previous_kpi: Option<KpiSeries>,
    summaries: Option<SummaryPair>,
}

impl ReviewSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the video under review. Summaries of a previous video are
    /// dropped.
    pub fn set_video(&mut self, path: impl AsRef<Path>) {
        self.video_path = Some(path.as_ref().to_path_buf());
        self.summaries = None;
    }

    pub fn video_path(&self) -> Option<&Path> {
        self.video_path.as_deref()
    }

    pub fn current_kpi(&self) -> Option<&KpiSeries> {
        self.current_kpi.as_ref()
    }

    pub fn previous_kpi(&self) -> Option<&KpiSeries> {
        self.previous_kpi.as_ref()
    }

    /// Summaries from the most recent successful comparison.
    pub fn summaries(&self) -> Option<&SummaryPair> {
        self.summaries.as_ref()
    }

    /// Load the current KPI series, replacing any earlier one.
    ///
    /// A previously imported series for the old version is kept. On error
    /// the session is left unchanged.
    pub async fn import_current(&mut self, path: impl AsRef<Path>) -> ReviewResult<&KpiSeries> {
        let series = advisor_analytics::load(path.as_ref()).await?;
        info!(
            "Imported {} current KPI records from {}",
            series.len(),
            path.as_ref().display()
        );
        Ok(self.current_kpi.insert(series))
    }

    /// Load the previous-version KPI series. Requires current analytics.
    pub async fn import_previous(&mut self, path: impl AsRef<Path>) -> ReviewResult<&KpiSeries> {
        if self.current_kpi.is_none() {
            return Err(ReviewError::precondition(
                "import current analytics before previous analytics",
            ));
        }
        let series = advisor_analytics::load(path.as_ref()).await?;
        info!(
            "Imported {} previous KPI records from {}",
            series.len(),
            path.as_ref().display()
        );
        Ok(self.previous_kpi.insert(series))
    }

    pub async fn import_current_fixture(&mut self, config: &ReviewConfig) -> ReviewResult<&KpiSeries> {
        self.import_current(config.current_analytics_path()).await
    }

    pub async fn import_previous_fixture(&mut self, config: &ReviewConfig) -> ReviewResult<&KpiSeries> {
        self.import_previous(config.previous_analytics_path()).await
    }

    /// Current and previous KPIs as one table, or `None` before the current
    /// series is imported.
    pub fn combined_table(&self) -> Option<CombinedTable> {
        self.current_kpi
            .as_ref()
            .map(|current| merge(current, self.previous_kpi.as_ref()))
    }

    /// Review the selected video.
    pub async fn review(
        &self,
        orchestrator: &AnalysisOrchestrator,
        cancel: &CancelSignal,
    ) -> ReviewResult<ReviewOutcome> {
        let video = self.require_video()?;
        orchestrator.review_single(video, cancel).await
    }

    /// Compare the selected video against `mock_video` using both KPI
    /// series. Summaries are stored only when every stage succeeds.
    pub async fn compare(
        &mut self,
        orchestrator: &AnalysisOrchestrator,
        mock_video: &Path,
        cancel: &CancelSignal,
    ) -> ReviewResult<ComparisonReport> {
        let video = self.require_video()?;
        let report = orchestrator
            .compare_two(
                video,
                mock_video,
                self.current_kpi.as_ref(),
                self.previous_kpi.as_ref(),
                cancel,
            )
            .await?;

        self.summaries = Some(SummaryPair::new(
            report.current_summary.clone(),
            report.mock_summary.clone(),
        ));
        Ok(report)
    }

    /// Forget everything.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn require_video(&self) -> ReviewResult<&Path> {
        self.video_path
            .as_deref()
            .ok_or_else(|| ReviewError::precondition("no video selected"))
    }
}
