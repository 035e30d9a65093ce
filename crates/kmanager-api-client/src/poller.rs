//! Cancellable polling of backend task status.
//!
//! `TaskPoller::start` spawns a tokio task that requests the task status at a
//! fixed interval until the backend reports a terminal status, the attempt
//! ceiling is reached, a request fails, or the poll is cancelled. The returned
//! `PollHandle` cancels the poll when dropped, so an abandoned poll never keeps
//! a timer alive.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use kmanager_core::models::{TaskKind, TaskStatus, TaskStatusResponse};
use kmanager_core::{ClientConfig, ClientError, ClientResult};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Fixed cadence and attempt ceiling for one poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl PollPolicy {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Policy configured for the given kind of task
    pub fn for_task(config: &ClientConfig, kind: TaskKind) -> Self {
        Self::new(config.poll_interval, config.max_attempts(kind))
    }
}

/// Reported to the observer after every status response
#[derive(Debug, Clone, PartialEq)]
pub struct PollProgress {
    pub task_id: String,
    pub kind: TaskKind,
    pub attempt: u32,
    pub max_attempts: u32,
    pub status: TaskStatus,
    pub summary: Option<String>,
}

impl PollProgress {
    /// Human-readable progress line, e.g. `Generating tutorial: processing (attempt 3/60)`
    pub fn message(&self) -> String {
        format!(
            "{}: {} (attempt {}/{})",
            self.kind.progress_label(),
            self.status,
            self.attempt,
            self.max_attempts
        )
    }
}

type ProgressObserver = Arc<dyn Fn(&PollProgress) + Send + Sync>;

pub struct TaskPoller {
    kind: TaskKind,
    policy: PollPolicy,
    token: CancellationToken,
    observer: Option<ProgressObserver>,
}

impl TaskPoller {
    pub fn new(kind: TaskKind, policy: PollPolicy) -> Self {
        Self {
            kind,
            policy,
            token: CancellationToken::new(),
            observer: None,
        }
    }

    /// Stop the poll when `token` is cancelled (in addition to `PollHandle::cancel`).
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    pub fn on_progress<P>(mut self, observer: P) -> Self
    where
        P: Fn(&PollProgress) + Send + Sync + 'static,
    {
        self.observer = Some(Arc::new(observer));
        self
    }

    /// Spawn the poll loop. `fetch` issues one status request per call.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<F, Fut>(self, task_id: impl Into<String>, fetch: F) -> PollHandle
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ClientResult<TaskStatusResponse>> + Send + 'static,
    {
        let task_id = task_id.into();
        let token = self.token.clone();
        let join = tokio::spawn(poll_loop(
            self.kind,
            self.policy,
            task_id,
            fetch,
            self.observer,
            self.token,
        ));

        PollHandle {
            token,
            join: Some(join),
        }
    }
}

async fn poll_loop<F, Fut>(
    kind: TaskKind,
    policy: PollPolicy,
    task_id: String,
    mut fetch: F,
    observer: Option<ProgressObserver>,
    token: CancellationToken,
) -> ClientResult<TaskStatusResponse>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ClientResult<TaskStatusResponse>> + Send + 'static,
{
    for attempt in 1..=policy.max_attempts {
        let response = tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!(task_id = %task_id, attempt = attempt, "Poll cancelled");
                return Err(ClientError::Cancelled);
            }
            result = fetch() => result?,
        };

        debug!(
            task_id = %task_id,
            attempt = attempt,
            status = %response.status,
            "Task status received"
        );

        if let Some(observer) = &observer {
            (**observer)(&PollProgress {
                task_id: task_id.clone(),
                kind,
                attempt,
                max_attempts: policy.max_attempts,
                status: response.status,
                summary: response.summary.clone(),
            });
        }

        match response.status {
            TaskStatus::Completed => {
                info!(task_id = %task_id, attempts = attempt, "{} completed", kind);
                return Ok(response);
            }
            TaskStatus::Failed => {
                let message = response
                    .failure_message()
                    .unwrap_or(kind.failure_fallback())
                    .to_string();
                warn!(task_id = %task_id, error = %message, "{} failed", kind);
                return Err(ClientError::TaskFailed { task_id, message });
            }
            TaskStatus::Processing => {}
        }

        if attempt < policy.max_attempts {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!(task_id = %task_id, attempt = attempt, "Poll cancelled");
                    return Err(ClientError::Cancelled);
                }
                _ = tokio::time::sleep(policy.interval) => {}
            }
        }
    }

    warn!(
        task_id = %task_id,
        attempts = policy.max_attempts,
        "{} timed out",
        kind
    );
    Err(ClientError::Timeout {
        task_id,
        kind,
        attempts: policy.max_attempts,
    })
}

/// Handle to a running poll. Dropping it cancels the poll.
#[derive(Debug)]
pub struct PollHandle {
    token: CancellationToken,
    join: Option<JoinHandle<ClientResult<TaskStatusResponse>>>,
}

impl PollHandle {
    /// Stop polling at the next await point. `wait` then yields `ClientError::Cancelled`.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.join.as_ref().map_or(true, |join| join.is_finished())
    }

    /// Wait for the poll's outcome: the completed status snapshot, or the error
    /// that stopped it.
    pub async fn wait(mut self) -> ClientResult<TaskStatusResponse> {
        let Some(join) = self.join.take() else {
            return Err(ClientError::Cancelled);
        };
        match join.await {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => Err(ClientError::Cancelled),
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
