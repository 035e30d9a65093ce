//! Submission controllers
//!
//! A controller owns the lifecycle of one long-running backend operation:
//! submit, poll, then fetch the final resource. Its state moves
//! `Idle -> Submitting -> Polling -> {Resolved, Failed, TimedOut}` and is
//! published on a `watch` channel for the view layer. Starting a new
//! submission cancels whatever the controller was doing before; the superseded
//! call resolves with `ClientError::Cancelled` and no longer touches the state.

mod content;
mod document;
mod ingestion;
mod tutorial;

pub use content::{ContentBackend, ContentSubmission};
pub use document::{DocumentBackend, DocumentSubmission};
pub use ingestion::{IngestionOutcome, UrlIngestion};
pub use tutorial::{TutorialBackend, TutorialGeneration};

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use kmanager_core::models::{TaskKind, TaskStatus, TaskStatusResponse};
use kmanager_core::{ClientError, ClientResult, ErrorMetadata};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::poller::{PollPolicy, PollProgress, TaskPoller};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStatus {
    Idle,
    Submitting,
    Polling,
    Resolved,
    Failed,
    TimedOut,
    /// Superseded by a newer submission or cancelled by the caller
    Cancelled,
}

impl SubmissionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SubmissionStatus::Resolved
                | SubmissionStatus::Failed
                | SubmissionStatus::TimedOut
                | SubmissionStatus::Cancelled
        )
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, SubmissionStatus::Submitting | SubmissionStatus::Polling)
    }
}

/// What the view layer renders for a controller
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionState {
    pub status: SubmissionStatus,
    pub task_id: Option<String>,
    /// Human-readable progress line
    pub progress: Option<String>,
    /// Inline error message once failed or timed out
    pub error: Option<String>,
    /// Interim summary reported while content is processing
    pub summary: Option<String>,
}

impl Default for SubmissionState {
    fn default() -> Self {
        Self {
            status: SubmissionStatus::Idle,
            task_id: None,
            progress: None,
            error: None,
            summary: None,
        }
    }
}

/// Identifies one submission of a controller
pub(crate) struct Run {
    generation: u64,
    token: CancellationToken,
}

impl Run {
    /// Resolve with `Cancelled` as soon as this run is superseded.
    pub(crate) async fn guard<T, F>(&self, fut: F) -> ClientResult<T>
    where
        F: Future<Output = ClientResult<T>>,
    {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(ClientError::Cancelled),
            result = fut => result,
        }
    }
}

/// State channel plus single-flight bookkeeping shared by all controllers
pub(crate) struct Lifecycle {
    kind: TaskKind,
    state: watch::Sender<SubmissionState>,
    generation: AtomicU64,
    active: Mutex<Option<CancellationToken>>,
}

impl Lifecycle {
    pub(crate) fn new(kind: TaskKind) -> Arc<Self> {
        let (state, _) = watch::channel(SubmissionState::default());
        Arc::new(Self {
            kind,
            state,
            generation: AtomicU64::new(0),
            active: Mutex::new(None),
        })
    }

    fn active(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<SubmissionState> {
        self.state.subscribe()
    }

    pub(crate) fn snapshot(&self) -> SubmissionState {
        self.state.borrow().clone()
    }

    /// Cancel any in-flight run and start a new one in `Submitting`.
    pub(crate) fn begin(&self) -> Run {
        let token = CancellationToken::new();
        let mut active = self.active();
        if let Some(previous) = active.replace(token.clone()) {
            debug!(kind = %self.kind, "Cancelling superseded submission");
            previous.cancel();
        }
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.state.send_replace(SubmissionState {
            status: SubmissionStatus::Submitting,
            ..SubmissionState::default()
        });
        drop(active);

        Run { generation, token }
    }

    /// Apply `f` only while `generation` is still the current run.
    fn update_generation<F>(&self, generation: u64, f: F)
    where
        F: FnOnce(&mut SubmissionState),
    {
        self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::Acquire) != generation {
                return false;
            }
            f(state);
            true
        });
    }

    pub(crate) fn update<F>(&self, run: &Run, f: F)
    where
        F: FnOnce(&mut SubmissionState),
    {
        self.update_generation(run.generation, f);
    }

    /// Move the run to its terminal state and release its token.
    pub(crate) fn finish<T>(&self, run: &Run, result: &ClientResult<T>) {
        let status = match result {
            Ok(_) => SubmissionStatus::Resolved,
            Err(e) if e.is_cancelled() => SubmissionStatus::Cancelled,
            Err(e) if e.is_timeout() => SubmissionStatus::TimedOut,
            Err(_) => SubmissionStatus::Failed,
        };
        let error = result.as_ref().err().map(|e| e.client_message());

        self.update(run, |state| {
            state.status = status;
            state.error = error;
            if status == SubmissionStatus::Resolved {
                state.progress = Some("Completed".to_string());
            }
        });

        let mut active = self.active();
        if self.generation.load(Ordering::Acquire) == run.generation {
            active.take();
        }
    }

    /// Cancel the in-flight run, if any.
    pub(crate) fn cancel(&self) {
        if let Some(token) = self.active().take() {
            token.cancel();
        }
        let generation = self.generation.load(Ordering::Acquire);
        self.update_generation(generation, |state| {
            if state.status.is_busy() {
                state.status = SubmissionStatus::Cancelled;
                state.error = Some(ClientError::Cancelled.client_message());
            }
        });
    }

    /// Enter `Polling` and wait for the backend task to finish.
    ///
    /// Progress lines and interim summaries flow into the state while the poll
    /// runs. The poll stops if the run is superseded.
    pub(crate) async fn poll<F, Fut>(
        self: &Arc<Self>,
        run: &Run,
        policy: PollPolicy,
        task_id: &str,
        fetch: F,
    ) -> ClientResult<TaskStatusResponse>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ClientResult<TaskStatusResponse>> + Send + 'static,
    {
        let kind = self.kind;
        self.update(run, |state| {
            state.status = SubmissionStatus::Polling;
            state.task_id = Some(task_id.to_string());
            state.progress = Some(format!("{}...", kind.progress_label()));
        });

        let lifecycle = Arc::clone(self);
        let generation = run.generation;
        let handle = TaskPoller::new(kind, policy)
            .with_cancellation(run.token.child_token())
            .on_progress(move |progress: &PollProgress| {
                lifecycle.update_generation(generation, |state| {
                    state.progress = Some(progress.message());
                    if let Some(summary) = &progress.summary {
                        state.summary = Some(summary.clone());
                    }
                });
            })
            .start(task_id, fetch);

        handle.wait().await
    }

    /// Fail fast when the submit answer itself reports a failed task.
    ///
    /// The backend hands out a fresh task id alongside such answers; that
    /// task is never tracked, so polling it would only yield a 404.
    pub(crate) fn reject_failed(&self, accepted: &TaskStatusResponse) -> ClientResult<()> {
        if accepted.status != TaskStatus::Failed {
            return Ok(());
        }
        let message = accepted
            .failure_message()
            .unwrap_or(self.kind.failure_fallback())
            .to_string();
        warn!(task_id = %accepted.task_id, kind = %self.kind, error = %message, "Submission rejected");
        Err(ClientError::TaskFailed {
            task_id: accepted.task_id.clone(),
            message,
        })
    }
}
