//! Progress notifications and cancellation.
//!
//! Long waits report through a [`ProgressReporter`] while they are still
//! running, so a front end can show feedback mid-wait. A [`CancelHandle`]
//! aborts a wait from the outside.

use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tracing::info;

use advisor_models::AssetState;

use crate::error::PipelineStage;

/// Event emitted while an operation is in flight.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// An upload was accepted by the service
    Uploaded { asset_id: String, display_name: String },
    /// Still waiting for an asset to leave a non-terminal state
    Waiting {
        asset_id: String,
        display_name: String,
        state: AssetState,
        attempt: u32,
        elapsed_ms: u64,
    },
    /// An asset became active
    Ready { asset_id: String, display_name: String },
    /// A comparison stage started
    StageStarted { stage: u8, name: &'static str },
}

impl ProgressEvent {
    pub(crate) fn waiting(
        asset_id: &str,
        display_name: &str,
        state: AssetState,
        attempt: u32,
        elapsed: Duration,
    ) -> Self {
        Self::Waiting {
            asset_id: asset_id.to_string(),
            display_name: display_name.to_string(),
            state,
            attempt,
            elapsed_ms: elapsed.as_millis() as u64,
        }
    }

    pub(crate) fn stage_started(stage: PipelineStage) -> Self {
        Self::StageStarted {
            stage: stage.number(),
            name: stage.as_str(),
        }
    }

    /// Human-readable one-line message.
    pub fn message(&self) -> String {
        match self {
            ProgressEvent::Uploaded { display_name, .. } => format!("Uploaded {}", display_name),
            ProgressEvent::Waiting {
                display_name,
                state,
                attempt,
                ..
            } => format!(
                "Waiting for {} to become ready ({}, check {})",
                display_name, state, attempt
            ),
            ProgressEvent::Ready { display_name, .. } => format!("{} is ready", display_name),
            ProgressEvent::StageStarted { stage, name } => format!("Stage {}: {}", stage, name),
        }
    }
}

/// Receiver of progress events.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// Reporter that writes events to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl ProgressReporter for LogReporter {
    fn report(&self, event: ProgressEvent) {
        info!("{}", event.message());
    }
}

/// Reporter that forwards events to a channel.
#[derive(Debug, Clone)]
pub struct ChannelReporter {
    sender: mpsc::UnboundedSender<ProgressEvent>,
}

impl ChannelReporter {
    /// Create a reporter and the receiving end of its channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl ProgressReporter for ChannelReporter {
    fn report(&self, event: ProgressEvent) {
        // Receiver gone means nobody is watching; not an error.
        let _ = self.sender.send(event);
    }
}

/// Sending side of a cancellation signal.
#[derive(Debug)]
pub struct CancelHandle {
    sender: watch::Sender<bool>,
}

/// Receiving side of a cancellation signal, handed to long-running calls.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    receiver: watch::Receiver<bool>,
}

impl CancelHandle {
    pub fn pair() -> (Self, CancelSignal) {
        let (sender, receiver) = watch::channel(false);
        (Self { sender }, CancelSignal { receiver })
    }

    /// Signal cancellation to every clone of the paired signal.
    pub fn cancel(&self) {
        let _ = self.sender.send(true);
    }
}

impl CancelSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        let (sender, receiver) = watch::channel(false);
        drop(sender);
        Self { receiver }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolve once cancellation is signalled. Pending forever if the handle
    /// is dropped without cancelling.
    pub async fn cancelled(&self) {
        let mut receiver = self.receiver.clone();
        loop {
            if *receiver.borrow_and_update() {
                return;
            }
            if receiver.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}
