//! Analysis orchestrator.
//!
//! Sequences remote jobs for the two review workflows:
//! - single-video review: upload, wait, one structured review call
//! - two-video comparison: upload both, wait, summarize each, diff the
//!   summaries together with both KPI series, then clean up

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::Instrument;

use advisor_gemini::{ClientError, RemoteJobClient};
use advisor_models::{AnalysisResult, KpiSeries, RemoteAsset, SummaryPair};

use crate::cleanup::{best_effort, release_all};
use crate::config::{CleanupPolicy, ReviewConfig};
use crate::error::{PipelineStage, ReviewError, ReviewResult, TimeoutReason};
use crate::logging::OperationLogger;
use crate::metrics::{record_inference, record_upload};
use crate::poller::JobPoller;
use crate::progress::{CancelSignal, LogReporter, ProgressEvent, ProgressReporter};
use crate::prompts::{comparison_prompt, summary_prompt, SummaryTarget, REVIEW_PROMPT};
use crate::retry::{retry_if, RetryConfig};

/// Result of a single-video review.
#[derive(Debug, Clone)]
pub struct ReviewOutcome {
    /// Review text, unmodified
    pub result: AnalysisResult,
    /// The remote asset, when the cleanup policy kept it
    pub asset: Option<RemoteAsset>,
}

/// Result of a two-video comparison.
#[derive(Debug, Clone)]
pub struct ComparisonReport {
    pub current_summary: AnalysisResult,
    pub mock_summary: AnalysisResult,
    /// Final comparison and recommendations
    pub comparison: AnalysisResult,
}

/// Drives remote jobs to completion and chains their results.
pub struct AnalysisOrchestrator {
    client: Arc<dyn RemoteJobClient>,
    poller: JobPoller,
    reporter: Arc<dyn ProgressReporter>,
    retry: RetryConfig,
    review_cleanup: CleanupPolicy,
}

impl AnalysisOrchestrator {
    pub fn new(client: Arc<dyn RemoteJobClient>, config: &ReviewConfig) -> Self {
        Self {
            client,
            poller: JobPoller::new(config.poll.clone()),
            reporter: Arc::new(LogReporter),
            retry: RetryConfig::new("inference").with_max_retries(config.inference_retries),
            review_cleanup: config.review_cleanup,
        }
    }

    /// Send progress events somewhere other than the log.
    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_review_cleanup(mut self, policy: CleanupPolicy) -> Self {
        self.review_cleanup = policy;
        self
    }

    /// Review one video with the fixed four-section prompt.
    ///
    /// Processing failures and timeouts propagate unchanged. On success the
    /// asset is kept or deleted according to the review cleanup policy; on
    /// failure it is always released, since the caller never receives it.
    pub async fn review_single(
        &self,
        video_path: &Path,
        cancel: &CancelSignal,
    ) -> ReviewResult<ReviewOutcome> {
        let logger = OperationLogger::new("review_single");
        logger.log_start(&video_path.display().to_string());

        if !video_path.exists() {
            return Err(ReviewError::MissingAsset(video_path.to_path_buf()));
        }

        let span = logger.create_span();
        async {
            let asset = self
                .submit(video_path, "video_under_review", cancel)
                .await?;

            let reviewed = async {
                let active = self
                    .poller
                    .wait_until_active(self.client.as_ref(), asset.clone(), self.reporter.as_ref(), cancel)
                    .await?;
                let result = self
                    .infer("review", REVIEW_PROMPT, std::slice::from_ref(&active), cancel)
                    .await?;
                Ok::<_, ReviewError>((result, active))
            }
            .await;

            match (reviewed, self.review_cleanup) {
                (Ok((result, active)), CleanupPolicy::Keep) => {
                    logger.log_completion(&format!("kept remote asset {}", active.id));
                    Ok(ReviewOutcome {
                        result,
                        asset: Some(active),
                    })
                }
                (Ok((result, _)), CleanupPolicy::DeleteAfterUse) => {
                    release_all(self.client.as_ref(), std::slice::from_ref(&asset)).await;
                    logger.log_completion("remote asset released");
                    Ok(ReviewOutcome {
                        result,
                        asset: None,
                    })
                }
                (Err(e), _) => {
                    logger.log_error(&e.to_string());
                    release_all(self.client.as_ref(), std::slice::from_ref(&asset)).await;
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Compare the current video against the mock video.
    ///
    /// Preconditions are checked before any remote call. Every asset that
    /// was uploaded is deleted afterwards, whatever the outcome; cleanup
    /// failures are swallowed. Pipeline errors carry the failing stage.
    ///
    /// `cancel` interrupts uploads, waits and inference calls alike; the
    /// result is a `Timeout` with reason `Cancelled`.
    pub async fn compare_two(
        &self,
        current_video: &Path,
        mock_video: &Path,
        current_kpi: Option<&KpiSeries>,
        mock_kpi: Option<&KpiSeries>,
        cancel: &CancelSignal,
    ) -> ReviewResult<ComparisonReport> {
        let (current_kpi, mock_kpi) = match (current_kpi, mock_kpi) {
            (Some(current), Some(mock)) => (current, mock),
            (None, _) => {
                return Err(ReviewError::precondition(
                    "current analytics must be imported before comparing",
                ))
            }
            (_, None) => {
                return Err(ReviewError::precondition(
                    "previous analytics must be imported before comparing",
                ))
            }
        };
        if !current_video.exists() {
            return Err(ReviewError::MissingAsset(current_video.to_path_buf()));
        }
        if !mock_video.exists() {
            return Err(ReviewError::MissingAsset(mock_video.to_path_buf()));
        }

        let logger = OperationLogger::new("compare_two");
        logger.log_start(&format!(
            "{} vs {}",
            current_video.display(),
            mock_video.display()
        ));

        let mut submitted = Vec::with_capacity(2);
        let outcome = self
            .run_comparison(
                current_video,
                mock_video,
                current_kpi,
                mock_kpi,
                cancel,
                &logger,
                &mut submitted,
            )
            .instrument(logger.create_span())
            .await;

        let released = release_all(self.client.as_ref(), &submitted).await;
        if released < submitted.len() {
            logger.log_warning(&format!(
                "released {} of {} remote assets",
                released,
                submitted.len()
            ));
        }

        match &outcome {
            Ok(_) => logger.log_completion("comparison ready"),
            Err(e) => logger.log_error(&e.to_string()),
        }
        outcome
    }

    /// Delete an asset kept by a previous review. Never fails.
    pub async fn release(&self, asset: &RemoteAsset) -> bool {
        best_effort("delete", self.client.delete(&asset.id)).await
    }

    async fn run_comparison(
        &self,
        current_video: &Path,
        mock_video: &Path,
        current_kpi: &KpiSeries,
        mock_kpi: &KpiSeries,
        cancel: &CancelSignal,
        logger: &OperationLogger,
        submitted: &mut Vec<RemoteAsset>,
    ) -> ReviewResult<ComparisonReport> {
        self.reporter
            .report(ProgressEvent::stage_started(PipelineStage::Ingest));
        let (current, mock) = self
            .ingest(current_video, mock_video, cancel, submitted)
            .await
            .map_err(|e| e.at_stage(PipelineStage::Ingest))?;
        logger.log_progress("both videos active");

        self.reporter
            .report(ProgressEvent::stage_started(PipelineStage::Summarize));
        let current_prompt = summary_prompt(SummaryTarget::Current);
        let mock_prompt = summary_prompt(SummaryTarget::Mock);
        let (current_summary, mock_summary) = tokio::try_join!(
            self.infer("summary", &current_prompt, std::slice::from_ref(&current), cancel),
            self.infer("summary", &mock_prompt, std::slice::from_ref(&mock), cancel),
        )
        .map_err(|e| e.at_stage(PipelineStage::Summarize))?;
        logger.log_progress("both summaries ready");
        let summaries = SummaryPair::new(current_summary, mock_summary);

        self.reporter
            .report(ProgressEvent::stage_started(PipelineStage::Compare));
        let comparison = self
            .compare_summaries(&summaries, current_kpi, mock_kpi, cancel)
            .await
            .map_err(|e| e.at_stage(PipelineStage::Compare))?;

        let (current_summary, mock_summary) = summaries.into_parts();
        Ok(ComparisonReport {
            current_summary,
            mock_summary,
            comparison,
        })
    }

    /// Upload both videos and wait until both are active.
    async fn ingest(
        &self,
        current_video: &Path,
        mock_video: &Path,
        cancel: &CancelSignal,
        submitted: &mut Vec<RemoteAsset>,
    ) -> ReviewResult<(RemoteAsset, RemoteAsset)> {
        let current = self.submit(current_video, "video_current", cancel).await?;
        submitted.push(current.clone());
        let mock = self.submit(mock_video, "video_mock", cancel).await?;
        submitted.push(mock.clone());

        let client = self.client.as_ref();
        let reporter = self.reporter.as_ref();
        tokio::try_join!(
            self.poller.wait_until_active(client, current, reporter, cancel),
            self.poller.wait_until_active(client, mock, reporter, cancel),
        )
    }

    async fn compare_summaries(
        &self,
        summaries: &SummaryPair,
        current_kpi: &KpiSeries,
        mock_kpi: &KpiSeries,
        cancel: &CancelSignal,
    ) -> ReviewResult<AnalysisResult> {
        let prompt = comparison_prompt(summaries, current_kpi, mock_kpi)?;
        self.infer("comparison", &prompt, &[], cancel).await
    }

    async fn submit(
        &self,
        path: &Path,
        display_name: &str,
        cancel: &CancelSignal,
    ) -> ReviewResult<RemoteAsset> {
        let started = Instant::now();
        let asset = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(cancelled(display_name, started)),
            asset = self.client.submit(path, display_name) => asset?,
        };
        record_upload();
        self.reporter.report(ProgressEvent::Uploaded {
            asset_id: asset.id.clone(),
            display_name: asset.display_name.clone(),
        });
        Ok(asset)
    }

    /// One inference call, retried while the service flags the failure as
    /// transient. Cancellation also cuts short a pending backoff.
    async fn infer(
        &self,
        kind: &'static str,
        prompt: &str,
        assets: &[RemoteAsset],
        cancel: &CancelSignal,
    ) -> ReviewResult<AnalysisResult> {
        let started = Instant::now();
        let retry = self.retry.named(format!("inference:{}", kind));
        let call = retry_if(&retry, ClientError::is_retryable, || {
            self.client.invoke(prompt, assets)
        });
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                record_inference(kind, false, started.elapsed().as_secs_f64() * 1000.0);
                return Err(cancelled(&retry.operation_name, started));
            }
            result = call => result,
        };
        record_inference(
            kind,
            result.is_ok(),
            started.elapsed().as_secs_f64() * 1000.0,
        );
        Ok(result?)
    }
}

/// A remote operation abandoned because `cancel` fired.
fn cancelled(operation: &str, started: Instant) -> ReviewError {
    ReviewError::Timeout {
        asset: operation.to_string(),
        attempts: 0,
        elapsed: started.elapsed(),
        reason: TimeoutReason::Cancelled,
    }
}
