//! Shared fixtures for orchestrator and session tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use advisor_gemini::{ClientError, ClientResult, RemoteJobClient};
use advisor_models::{AnalysisResult, AssetState, RemoteAsset};
use advisor_review::{PollConfig, ReviewConfig};

/// Remote call observed by [`FakeClient`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Submit(String),
    Status(String),
    Invoke { prompt: String, assets: Vec<String> },
    Delete(String),
}

type Responder = Box<dyn Fn(&str, &[RemoteAsset]) -> ClientResult<String> + Send + Sync>;

/// In-memory remote service that records every call.
pub struct FakeClient {
    upload_state: AssetState,
    status_state: AssetState,
    responder: Responder,
    fail_deletes: bool,
    invoke_delay: Duration,
    next_id: AtomicUsize,
    calls: Mutex<Vec<Call>>,
}

impl FakeClient {
    /// Uploads are immediately active; inference answers through `responder`.
    pub fn active<F>(responder: F) -> Self
    where
        F: Fn(&str, &[RemoteAsset]) -> ClientResult<String> + Send + Sync + 'static,
    {
        Self {
            upload_state: AssetState::Active,
            status_state: AssetState::Active,
            responder: Box::new(responder),
            fail_deletes: false,
            invoke_delay: Duration::ZERO,
            next_id: AtomicUsize::new(1),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Uploads start processing and status calls keep returning `state`.
    pub fn processing_then(state: AssetState) -> Self {
        Self {
            upload_state: AssetState::Processing,
            status_state: state,
            ..Self::active(echo)
        }
    }

    pub fn with_failing_deletes(mut self) -> Self {
        self.fail_deletes = true;
        self
    }

    /// Every inference call takes `delay` before answering.
    pub fn with_invoke_delay(mut self, delay: Duration) -> Self {
        self.invoke_delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn submitted(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Submit(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Delete(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn invocations(&self) -> Vec<(String, Vec<String>)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Invoke { prompt, assets } => Some((prompt, assets)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl RemoteJobClient for FakeClient {
    async fn submit(&self, _path: &Path, display_name: &str) -> ClientResult<RemoteAsset> {
        self.record(Call::Submit(display_name.to_string()));
        let id = format!("files/{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let uri = format!("https://fake.invalid/v1beta/{}", id);
        Ok(RemoteAsset::new(id, display_name, self.upload_state).with_uri(uri, "video/mp4"))
    }

    async fn get_status(&self, asset_id: &str) -> ClientResult<RemoteAsset> {
        self.record(Call::Status(asset_id.to_string()));
        Ok(RemoteAsset::new(asset_id, asset_id, self.status_state))
    }

    async fn invoke(&self, prompt: &str, assets: &[RemoteAsset]) -> ClientResult<AnalysisResult> {
        let ids: Vec<String> = assets.iter().map(|a| a.id.clone()).collect();
        self.record(Call::Invoke {
            prompt: prompt.to_string(),
            assets: ids.clone(),
        });
        if !self.invoke_delay.is_zero() {
            tokio::time::sleep(self.invoke_delay).await;
        }
        let text = (self.responder)(prompt, assets)?;
        Ok(AnalysisResult::new(text, prompt, ids, "fake-model"))
    }

    async fn delete(&self, asset_id: &str) -> ClientResult<()> {
        self.record(Call::Delete(asset_id.to_string()));
        if self.fail_deletes {
            return Err(ClientError::transport("delete refused"));
        }
        Ok(())
    }
}

/// Answers with the display names of the attached assets, or a fixed text
/// for text-only prompts.
pub fn echo(_prompt: &str, assets: &[RemoteAsset]) -> ClientResult<String> {
    if assets.is_empty() {
        return Ok("comparison text".to_string());
    }
    let names: Vec<&str> = assets.iter().map(|a| a.display_name.as_str()).collect();
    Ok(format!("summary of {}", names.join(", ")))
}

/// Config with fast polling and no retry delay worth waiting for.
pub fn fast_config(dir: &Path) -> ReviewConfig {
    ReviewConfig {
        poll: PollConfig::default()
            .with_interval(Duration::from_millis(5))
            .with_deadline(Duration::from_millis(200)),
        ..ReviewConfig::default().with_analytics_dir(dir)
    }
}

pub const CURRENT_KPIS: &str = r#"{"data": [
    {"date": "2024-05-01", "ROAS": 3.1, "CPA": 12.0, "CTR": 1.4},
    {"date": "2024-05-02", "ROAS": 2.9, "CPA": 13.5, "CTR": 1.2}
]}"#;

pub const PREVIOUS_KPIS: &str = r#"{"data": [
    {"date": "2024-04-01", "ROAS": 1.8, "CPA": 20.0},
    {"date": "2024-04-02", "ROAS": 1.6, "CPA": 22.5}
]}"#;

/// Temp analytics directory with both KPI files, the mock video and a
/// current video. Returns the directory and the current video path.
pub fn workspace() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("analytics1.json"), CURRENT_KPIS).unwrap();
    std::fs::write(dir.path().join("analytics2.json"), PREVIOUS_KPIS).unwrap();
    std::fs::write(dir.path().join("mock.mp4"), b"mock video bytes").unwrap();
    let video = dir.path().join("current.mp4");
    std::fs::write(&video, b"current video bytes").unwrap();
    (dir, video)
}
