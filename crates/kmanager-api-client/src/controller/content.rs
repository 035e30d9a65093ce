use std::sync::Arc;

use async_trait::async_trait;
use kmanager_core::models::{
    ContentType, ProcessedContent, TaskKind, TaskStatusResponse, UrlSubmissionRequest,
};
use kmanager_core::ClientResult;
use tokio::sync::watch;
use tracing::info;

use super::{Lifecycle, Run, SubmissionState};
use crate::poller::PollPolicy;
use crate::ApiClient;

#[async_trait]
pub trait ContentBackend: Send + Sync {
    async fn submit(&self, request: &UrlSubmissionRequest) -> ClientResult<TaskStatusResponse>;

    async fn task_status(&self, task_id: &str) -> ClientResult<TaskStatusResponse>;

    async fn get_content(&self, content_id: &str) -> ClientResult<ProcessedContent>;
}

/// Submit a URL, poll the ingestion task and fetch the processed content.
pub struct ContentSubmission {
    backend: Arc<dyn ContentBackend>,
    policy: PollPolicy,
    lifecycle: Arc<Lifecycle>,
}

impl ContentSubmission {
    pub fn new(backend: Arc<dyn ContentBackend>, policy: PollPolicy) -> Self {
        Self {
            backend,
            policy,
            lifecycle: Lifecycle::new(TaskKind::Content),
        }
    }

    pub fn from_client(client: &ApiClient) -> Self {
        Self::new(
            Arc::new(client.content()),
            PollPolicy::for_task(client.config(), TaskKind::Content),
        )
    }

    pub fn subscribe(&self) -> watch::Receiver<SubmissionState> {
        self.lifecycle.subscribe()
    }

    pub fn state(&self) -> SubmissionState {
        self.lifecycle.snapshot()
    }

    pub fn cancel(&self) {
        self.lifecycle.cancel();
    }

    /// Cancels any submission still in flight on this controller.
    pub async fn submit(
        &self,
        url: &str,
        content_type: ContentType,
    ) -> ClientResult<ProcessedContent> {
        let run = self.lifecycle.begin();
        let result = self.run(&run, url, content_type).await;
        self.lifecycle.finish(&run, &result);
        result
    }

    async fn run(
        &self,
        run: &Run,
        url: &str,
        content_type: ContentType,
    ) -> ClientResult<ProcessedContent> {
        let request = UrlSubmissionRequest::new(url, content_type)?;
        let accepted = run.guard(self.backend.submit(&request)).await?;
        self.lifecycle.reject_failed(&accepted)?;
        let task_id = accepted.task_id;
        info!(task_id = %task_id, content_type = %content_type, "Content submitted");

        let backend = Arc::clone(&self.backend);
        let poll_id = task_id.clone();
        let done = self
            .lifecycle
            .poll(run, self.policy, &task_id, move || {
                let backend = Arc::clone(&backend);
                let task_id = poll_id.clone();
                async move { backend.task_status(&task_id).await }
            })
            .await?;

        let content_id = done
            .content_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or(task_id);
        let mut content = run.guard(self.backend.get_content(&content_id)).await?;
        if content.metadata.id.is_none() {
            content.metadata.id = Some(content_id);
        }
        Ok(content)
    }
}
