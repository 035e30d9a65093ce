//! Test helpers for poller, controller and paging unit tests
//!
//! In-memory fakes for the backend traits plus fixtures, so controllers can be
//! driven without an HTTP server.

pub mod fixtures;
pub mod mock_backends;
pub mod mock_pages;

pub use fixtures::*;
pub use mock_backends::*;
pub use mock_pages::*;

use std::future::{ready, Ready};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use kmanager_core::models::{TaskStatus, TaskStatusResponse};
use kmanager_core::{ClientError, ClientResult};

use crate::poller::PollPolicy;

/// Bare status snapshot for `task_id`
pub fn status(task_id: &str, status: TaskStatus) -> TaskStatusResponse {
    TaskStatusResponse {
        task_id: task_id.to_string(),
        status,
        content_id: None,
        document_id: None,
        tutorial_id: None,
        message: None,
        error: None,
        summary: None,
        tutorial: None,
    }
}

/// Millisecond cadence so tests never wait on real seconds
pub fn fast_policy(max_attempts: u32) -> PollPolicy {
    PollPolicy::new(Duration::from_millis(2), max_attempts)
}

/// Status fetcher replaying a fixed script. Once the script runs out the last
/// entry repeats.
#[derive(Clone)]
pub struct ScriptedStatuses {
    script: Arc<Vec<TaskStatusResponse>>,
    calls: Arc<AtomicUsize>,
    failure: Arc<Mutex<Option<(usize, u16, String)>>>,
}

impl ScriptedStatuses {
    pub fn new(script: Vec<TaskStatusResponse>) -> Self {
        assert!(!script.is_empty(), "script needs at least one status");
        Self {
            script: Arc::new(script),
            calls: Arc::new(AtomicUsize::new(0)),
            failure: Arc::new(Mutex::new(None)),
        }
    }

    /// Every call after the first `successes` fails with an HTTP error.
    pub fn fail_after(&self, successes: usize, status: u16, message: &str) {
        *self.failure.lock().unwrap() = Some((successes, status, message.to_string()));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next(&self) -> ClientResult<TaskStatusResponse> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some((successes, status, message)) = self.failure.lock().unwrap().clone() {
            if call >= successes {
                return Err(ClientError::Http { status, message });
            }
        }
        let index = call.min(self.script.len() - 1);
        Ok(self.script[index].clone())
    }

    pub fn fetcher(
        &self,
    ) -> impl FnMut() -> Ready<ClientResult<TaskStatusResponse>> + Send + 'static {
        let script = self.clone();
        move || ready(script.next())
    }
}
