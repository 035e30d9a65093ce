use std::sync::Arc;

use async_trait::async_trait;
use kmanager_core::models::{
    ContentType, TaskKind, TaskStatusResponse, TutorialContent, TutorialGenerationRequest,
    TutorialPayload,
};
use kmanager_core::{ClientError, ClientResult};
use tokio::sync::watch;
use tracing::{debug, info};

use super::{Lifecycle, Run, SubmissionState};
use crate::poller::PollPolicy;
use crate::ApiClient;

#[async_trait]
pub trait TutorialBackend: Send + Sync {
    async fn generate(&self, request: &TutorialGenerationRequest)
        -> ClientResult<TaskStatusResponse>;

    async fn status(&self, task_id: &str) -> ClientResult<TaskStatusResponse>;

    async fn get_content(&self, tutorial_id: &str) -> ClientResult<TutorialPayload>;
}

/// Generate a tutorial for ingested content and wait for the result.
pub struct TutorialGeneration {
    backend: Arc<dyn TutorialBackend>,
    policy: PollPolicy,
    lifecycle: Arc<Lifecycle>,
}

impl TutorialGeneration {
    pub fn new(backend: Arc<dyn TutorialBackend>, policy: PollPolicy) -> Self {
        Self {
            backend,
            policy,
            lifecycle: Lifecycle::new(TaskKind::Tutorial),
        }
    }

    pub fn from_client(client: &ApiClient) -> Self {
        Self::new(
            Arc::new(client.tutorials()),
            PollPolicy::for_task(client.config(), TaskKind::Tutorial),
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

    pub async fn generate(
        &self,
        content_id: &str,
        content_type: ContentType,
    ) -> ClientResult<TutorialContent> {
        let run = self.lifecycle.begin();
        let result = self.run(&run, content_id, content_type).await;
        self.lifecycle.finish(&run, &result);
        result
    }

    async fn run(
        &self,
        run: &Run,
        content_id: &str,
        content_type: ContentType,
    ) -> ClientResult<TutorialContent> {
        let request = TutorialGenerationRequest::new(content_id, content_type)?;
        let accepted = run.guard(self.backend.generate(&request)).await?;
        self.lifecycle.reject_failed(&accepted)?;
        let task_id = accepted.task_id;
        info!(task_id = %task_id, content_id = %request.content_id, "Tutorial generation started");

        let backend = Arc::clone(&self.backend);
        let poll_id = task_id.clone();
        let done = self
            .lifecycle
            .poll(run, self.policy, &task_id, move || {
                let backend = Arc::clone(&backend);
                let task_id = poll_id.clone();
                async move { backend.status(&task_id).await }
            })
            .await?;

        if let Some(tutorial) = done.tutorial {
            return Ok(tutorial.to_content());
        }

        let Some(tutorial_id) = done.tutorial_id.filter(|id| !id.trim().is_empty()) else {
            return Err(ClientError::parse(
                format!("tutorial/status/{}", task_id),
                "completed status carries neither a tutorial nor a tutorial id",
            ));
        };

        debug!(tutorial_id = %tutorial_id, "Fetching generated tutorial");
        let payload = run.guard(self.backend.get_content(&tutorial_id)).await?;
        Ok(payload.to_content())
    }
}
