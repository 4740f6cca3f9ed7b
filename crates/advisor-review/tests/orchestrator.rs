//! End-to-end orchestrator behaviour against an in-memory remote service.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use advisor_gemini::ClientError;
use advisor_models::{AssetState, KpiSeries};
use advisor_review::{
    AnalysisOrchestrator, CancelHandle, CancelSignal, ChannelReporter, CleanupPolicy,
    PipelineStage, ProgressEvent, RetryConfig, ReviewError, TimeoutReason,
};

use common::{echo, fast_config, workspace, FakeClient};

fn kpis() -> (KpiSeries, KpiSeries) {
    (
        advisor_analytics::parse(common::CURRENT_KPIS).unwrap(),
        advisor_analytics::parse(common::PREVIOUS_KPIS).unwrap(),
    )
}

fn fast_retry() -> RetryConfig {
    RetryConfig::new("inference")
        .with_base_delay(Duration::from_millis(1))
        .with_max_retries(2)
}

#[tokio::test]
async fn compare_with_one_kpi_series_makes_no_remote_calls() {
    let (dir, video) = workspace();
    let config = fast_config(dir.path());
    let client = Arc::new(FakeClient::active(echo));
    let orchestrator = AnalysisOrchestrator::new(client.clone(), &config);
    let (current, _) = kpis();

    let err = orchestrator
        .compare_two(
            &video,
            &config.mock_video_path(),
            Some(&current),
            None,
            &CancelSignal::never(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ReviewError::Precondition(_)));
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn compare_with_missing_mock_video_makes_no_remote_calls() {
    let (dir, video) = workspace();
    let config = fast_config(dir.path());
    let client = Arc::new(FakeClient::active(echo));
    let orchestrator = AnalysisOrchestrator::new(client.clone(), &config);
    let (current, previous) = kpis();
    let missing = dir.path().join("nope.mp4");

    let err = orchestrator
        .compare_two(
            &video,
            &missing,
            Some(&current),
            Some(&previous),
            &CancelSignal::never(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ReviewError::MissingAsset(path) if path == missing));
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn compare_runs_three_stages_and_cleans_up() {
    let (dir, video) = workspace();
    let config = fast_config(dir.path());
    let client = Arc::new(FakeClient::active(echo));
    let (reporter, mut events) = ChannelReporter::channel();
    let orchestrator =
        AnalysisOrchestrator::new(client.clone(), &config).with_reporter(Arc::new(reporter));
    let (current, previous) = kpis();

    let report = orchestrator
        .compare_two(
            &video,
            &config.mock_video_path(),
            Some(&current),
            Some(&previous),
            &CancelSignal::never(),
        )
        .await
        .unwrap();

    assert_eq!(report.current_summary.text(), "summary of video_current");
    assert_eq!(report.mock_summary.text(), "summary of video_mock");
    assert_eq!(report.comparison.text(), "comparison text");
    assert!(report.comparison.asset_ids().is_empty());

    assert_eq!(client.submitted(), vec!["video_current", "video_mock"]);
    let mut deleted = client.deleted();
    deleted.sort();
    assert_eq!(deleted, vec!["files/1", "files/2"]);

    // Stage 3 sees both summaries and both KPI series.
    let invocations = client.invocations();
    assert_eq!(invocations.len(), 3);
    let (prompt, assets) = &invocations[2];
    assert!(assets.is_empty());
    assert!(prompt.contains("summary of video_current"));
    assert!(prompt.contains("summary of video_mock"));
    assert!(prompt.contains("\"ROAS\": 3.1"));
    assert!(prompt.contains("\"ROAS\": 1.8"));

    let mut stages = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let ProgressEvent::StageStarted { stage, .. } = event {
            stages.push(stage);
        }
    }
    assert_eq!(stages, vec![1, 2, 3]);
}

#[tokio::test]
async fn compare_failure_in_stage_three_still_deletes_both_assets() {
    let (dir, video) = workspace();
    let config = fast_config(dir.path());
    let client = Arc::new(FakeClient::active(|prompt, assets| {
        if assets.is_empty() {
            Err(ClientError::inference("content blocked: SAFETY", false))
        } else {
            echo(prompt, assets)
        }
    }));
    let orchestrator = AnalysisOrchestrator::new(client.clone(), &config);
    let (current, previous) = kpis();

    let err = orchestrator
        .compare_two(
            &video,
            &config.mock_video_path(),
            Some(&current),
            Some(&previous),
            &CancelSignal::never(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(PipelineStage::Compare));
    assert!(err.to_string().contains("stage 3 (compare)"));
    assert!(matches!(
        err.root(),
        ReviewError::Client(ClientError::Inference { retryable: false, .. })
    ));

    let mut deleted = client.deleted();
    deleted.sort();
    assert_eq!(deleted, vec!["files/1", "files/2"]);
}

#[tokio::test]
async fn compare_processing_failure_is_an_ingest_error() {
    let (dir, video) = workspace();
    let config = fast_config(dir.path());
    let client = Arc::new(FakeClient::processing_then(AssetState::Failed));
    let orchestrator = AnalysisOrchestrator::new(client.clone(), &config);
    let (current, previous) = kpis();

    let err = orchestrator
        .compare_two(
            &video,
            &config.mock_video_path(),
            Some(&current),
            Some(&previous),
            &CancelSignal::never(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(PipelineStage::Ingest));
    assert!(matches!(
        err.root(),
        ReviewError::ProcessingFailed {
            last_state: AssetState::Failed,
            ..
        }
    ));
    assert!(client.invocations().is_empty());
    assert_eq!(client.deleted().len(), 2);
}

#[tokio::test]
async fn compare_cleanup_failures_do_not_mask_the_result() {
    let (dir, video) = workspace();
    let config = fast_config(dir.path());
    let client = Arc::new(FakeClient::active(echo).with_failing_deletes());
    let orchestrator = AnalysisOrchestrator::new(client.clone(), &config);
    let (current, previous) = kpis();

    let report = orchestrator
        .compare_two(
            &video,
            &config.mock_video_path(),
            Some(&current),
            Some(&previous),
            &CancelSignal::never(),
        )
        .await
        .unwrap();

    assert_eq!(report.comparison.text(), "comparison text");
    assert_eq!(client.deleted().len(), 2);
}

#[tokio::test]
async fn compare_cancelled_during_ingest() {
    let (dir, video) = workspace();
    let mut config = fast_config(dir.path());
    config.poll = config.poll.with_deadline(Duration::from_secs(60));
    let client = Arc::new(FakeClient::processing_then(AssetState::Processing));
    let orchestrator = AnalysisOrchestrator::new(client.clone(), &config);
    let (current, previous) = kpis();
    let (handle, signal) = CancelHandle::pair();
    handle.cancel();

    let err = orchestrator
        .compare_two(
            &video,
            &config.mock_video_path(),
            Some(&current),
            Some(&previous),
            &signal,
        )
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(PipelineStage::Ingest));
    assert!(matches!(
        err.root(),
        ReviewError::Timeout {
            reason: TimeoutReason::Cancelled,
            ..
        }
    ));
    assert_eq!(client.deleted().len(), 2);
}

#[tokio::test]
async fn review_returns_text_verbatim() {
    let (dir, video) = workspace();
    let config = fast_config(dir.path());
    let canned = "  ## Cultural Analysis\n\nWorks well in most markets.  \n\n";
    let client = Arc::new(FakeClient::active(move |_, _| Ok(canned.to_string())));
    let orchestrator = AnalysisOrchestrator::new(client.clone(), &config);

    let outcome = orchestrator
        .review_single(&video, &CancelSignal::never())
        .await
        .unwrap();

    assert_eq!(outcome.result.text(), canned);
    assert_eq!(outcome.result.asset_ids(), ["files/1".to_string()]);
    assert!(outcome.result.prompt().contains("Strategic Recommendations"));
    assert_eq!(client.submitted(), vec!["video_under_review"]);

    // Kept by default; released on request.
    let asset = outcome.asset.unwrap();
    assert!(client.deleted().is_empty());
    assert!(orchestrator.release(&asset).await);
    assert_eq!(client.deleted(), vec!["files/1"]);
}

#[tokio::test]
async fn review_deletes_asset_when_configured() {
    let (dir, video) = workspace();
    let config = fast_config(dir.path());
    let client = Arc::new(FakeClient::active(echo));
    let orchestrator = AnalysisOrchestrator::new(client.clone(), &config)
        .with_review_cleanup(CleanupPolicy::DeleteAfterUse);

    let outcome = orchestrator
        .review_single(&video, &CancelSignal::never())
        .await
        .unwrap();

    assert!(outcome.asset.is_none());
    assert_eq!(client.deleted(), vec!["files/1"]);
}

#[tokio::test]
async fn review_timeout_propagates_unchanged() {
    let (dir, video) = workspace();
    let config = fast_config(dir.path());
    let client = Arc::new(FakeClient::processing_then(AssetState::Processing));
    let orchestrator = AnalysisOrchestrator::new(client.clone(), &config);

    let err = orchestrator
        .review_single(&video, &CancelSignal::never())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ReviewError::Timeout {
            reason: TimeoutReason::Deadline,
            ..
        }
    ));
    assert!(client.invocations().is_empty());
    assert_eq!(client.deleted(), vec!["files/1"]);
}

#[tokio::test]
async fn review_missing_video_makes_no_remote_calls() {
    let (dir, _) = workspace();
    let config = fast_config(dir.path());
    let client = Arc::new(FakeClient::active(echo));
    let orchestrator = AnalysisOrchestrator::new(client.clone(), &config);

    let err = orchestrator
        .review_single(&dir.path().join("missing.mp4"), &CancelSignal::never())
        .await
        .unwrap_err();

    assert!(matches!(err, ReviewError::MissingAsset(_)));
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn retryable_inference_errors_are_retried() {
    let (dir, video) = workspace();
    let config = fast_config(dir.path());
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();
    let client = Arc::new(FakeClient::active(move |_, _| {
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            Err(ClientError::inference("HTTP 429: quota exhausted", true))
        } else {
            Ok("review".to_string())
        }
    }));
    let orchestrator = AnalysisOrchestrator::new(client.clone(), &config).with_retry(fast_retry());

    let outcome = orchestrator
        .review_single(&video, &CancelSignal::never())
        .await
        .unwrap();

    assert_eq!(outcome.result.text(), "review");
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn terminal_inference_errors_are_not_retried() {
    let (dir, video) = workspace();
    let config = fast_config(dir.path());
    let client = Arc::new(FakeClient::active(|_, _| {
        Err(ClientError::inference("request timed out", false))
    }));
    let orchestrator = AnalysisOrchestrator::new(client.clone(), &config).with_retry(fast_retry());

    let err = orchestrator
        .review_single(&video, &CancelSignal::never())
        .await
        .unwrap_err();

    assert!(!err.is_retryable());
    assert_eq!(client.invocations().len(), 1);
}

#[tokio::test]
async fn review_cancelled_during_slow_inference() {
    let (dir, video) = workspace();
    let config = fast_config(dir.path());
    let client = Arc::new(FakeClient::active(echo).with_invoke_delay(Duration::from_millis(1500)));
    let orchestrator = AnalysisOrchestrator::new(client.clone(), &config);
    let (handle, signal) = CancelHandle::pair();

    let started = Instant::now();
    let review = orchestrator.review_single(&video, &signal);
    let cancel = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.cancel();
    };
    let (result, ()) = tokio::join!(review, cancel);

    assert!(matches!(
        result.unwrap_err(),
        ReviewError::Timeout {
            reason: TimeoutReason::Cancelled,
            ..
        }
    ));
    assert!(started.elapsed() < Duration::from_millis(1000));
    assert_eq!(client.deleted(), vec!["files/1"]);
}

#[tokio::test]
async fn compare_cancelled_during_summaries_still_cleans_up() {
    let (dir, video) = workspace();
    let config = fast_config(dir.path());
    let client = Arc::new(FakeClient::active(echo).with_invoke_delay(Duration::from_millis(1500)));
    let orchestrator = AnalysisOrchestrator::new(client.clone(), &config);
    let (current, previous) = kpis();
    let (handle, signal) = CancelHandle::pair();

    let started = Instant::now();
    let mock = config.mock_video_path();
    let compare = orchestrator.compare_two(&video, &mock, Some(&current), Some(&previous), &signal);
    let cancel = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.cancel();
    };
    let (result, ()) = tokio::join!(compare, cancel);

    let err = result.unwrap_err();
    assert_eq!(err.stage(), Some(PipelineStage::Summarize));
    assert!(matches!(
        err.root(),
        ReviewError::Timeout {
            reason: TimeoutReason::Cancelled,
            ..
        }
    ));
    assert!(started.elapsed() < Duration::from_millis(1000));
    assert_eq!(client.deleted().len(), 2);
}
