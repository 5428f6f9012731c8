//! # Background Jobs
//!
//! Runs the workbook pipeline on a blocking worker and reports progress
//! through a channel.
//!
//! ```text
//! caller ──spawn──▶ Job ─┬─ CancelToken   (caller → worker, checked per row)
//!                        ├─ events        (worker → caller, ProgressEvent)
//!                        └─ wait()        (final summary or error)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use xlbarcode::config::Settings;
//! use xlbarcode::job;
//! use xlbarcode::render::BarcodeRenderer;
//! use xlbarcode::workbook::Session;
//!
//! # async fn example() -> Result<(), xlbarcode::XlBarcodeError> {
//! let settings = Settings::default();
//! let renderer = Arc::new(BarcodeRenderer::new(settings.render_options()));
//! let mut job = job::spawn(Session::new("in.xlsx", "out.xlsx", settings), renderer);
//!
//! while let Some(event) = job.next_event().await {
//!     println!("{:?}", event);
//! }
//! let summary = job.wait().await?;
//! println!("{} images", summary.inserted.len());
//! # Ok(())
//! # }
//! ```

use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::XlBarcodeError;
use crate::render::Renderer;
use crate::workbook::{PipelineStage, PipelineSummary, Session, pipeline};

/// Cooperative cancellation flag shared between a job and its owner.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the worker to stop after the row it is on.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Something that happened while a job ran.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    Stage { stage: PipelineStage },
    Row { done: u32, total: u32 },
    Inserted { cell: String, width: u32, height: u32 },
    Skipped { cell: String, reason: String },
    Finished { summary: PipelineSummary },
    Failed { error: String },
}

/// Sending half of a progress channel. A default sender drops every event.
#[derive(Debug, Clone, Default)]
pub struct ProgressSender(Option<UnboundedSender<ProgressEvent>>);

impl ProgressSender {
    pub fn new(tx: UnboundedSender<ProgressEvent>) -> Self {
        Self(Some(tx))
    }

    /// Send an event. A closed receiver is not an error.
    pub fn send(&self, event: ProgressEvent) {
        if let Some(tx) = &self.0 {
            let _ = tx.send(event);
        }
    }

    pub fn stage(&self, stage: PipelineStage) {
        self.send(ProgressEvent::Stage { stage });
    }
}

/// A running pipeline.
pub struct Job {
    pub id: Uuid,
    cancel: CancelToken,
    events: UnboundedReceiver<ProgressEvent>,
    handle: JoinHandle<Result<PipelineSummary, XlBarcodeError>>,
}

/// Start the pipeline for `session` on a blocking worker.
///
/// Must be called from within a tokio runtime.
pub fn spawn(session: Session, renderer: Arc<dyn Renderer>) -> Job {
    let id = Uuid::new_v4();
    let cancel = CancelToken::new();
    let (tx, events) = unbounded_channel();
    let progress = ProgressSender::new(tx);
    let worker_cancel = cancel.clone();

    tracing::info!(job = %id, input = %session.input.display(), "starting job");

    let handle = tokio::task::spawn_blocking(move || {
        let result = pipeline::run(&session, renderer.as_ref(), &worker_cancel, &progress);
        match &result {
            Ok(summary) => progress.send(ProgressEvent::Finished {
                summary: summary.clone(),
            }),
            Err(e) => {
                tracing::error!(job = %id, error = %e, "job failed");
                progress.stage(PipelineStage::Failed);
                progress.send(ProgressEvent::Failed {
                    error: e.to_string(),
                });
            }
        }
        result
    });

    Job {
        id,
        cancel,
        events,
        handle,
    }
}

impl Job {
    /// A handle that cancels this job.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Next progress event; `None` once the worker is done and every event
    /// was received.
    pub async fn next_event(&mut self) -> Option<ProgressEvent> {
        self.events.recv().await
    }

    /// Wait for the worker and return its result.
    pub async fn wait(self) -> Result<PipelineSummary, XlBarcodeError> {
        self.handle
            .await
            .map_err(|e| XlBarcodeError::Task(e.to_string()))?
    }

    /// Split into the cancel token, the event receiver and the worker handle.
    pub fn into_parts(
        self,
    ) -> (
        CancelToken,
        UnboundedReceiver<ProgressEvent>,
        JoinHandle<Result<PipelineSummary, XlBarcodeError>>,
    ) {
        (self.cancel, self.events, self.handle)
    }
}
