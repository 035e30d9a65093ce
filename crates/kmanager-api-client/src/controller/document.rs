use std::sync::Arc;

use async_trait::async_trait;
use kmanager_core::models::{
    DocumentUpload, DocumentUploadResponse, ProcessedDocument, TaskKind, TaskStatus,
    TaskStatusResponse,
};
use kmanager_core::{ClientError, ClientResult};
use tokio::sync::watch;
use tracing::{info, warn};

use super::{Lifecycle, Run, SubmissionState};
use crate::poller::PollPolicy;
use crate::ApiClient;

#[async_trait]
pub trait DocumentBackend: Send + Sync {
    async fn upload(&self, upload: &DocumentUpload) -> ClientResult<DocumentUploadResponse>;

    async fn task_status(&self, task_id: &str) -> ClientResult<TaskStatusResponse>;

    async fn get_document(&self, document_id: &str) -> ClientResult<ProcessedDocument>;
}

/// Upload a document, wait for processing when the backend queues it, then
/// fetch the processed document.
pub struct DocumentSubmission {
    backend: Arc<dyn DocumentBackend>,
    policy: PollPolicy,
    lifecycle: Arc<Lifecycle>,
}

impl DocumentSubmission {
    pub fn new(backend: Arc<dyn DocumentBackend>, policy: PollPolicy) -> Self {
        Self {
            backend,
            policy,
            lifecycle: Lifecycle::new(TaskKind::Document),
        }
    }

    pub fn from_client(client: &ApiClient) -> Self {
        Self::new(
            Arc::new(client.documents()),
            PollPolicy::for_task(client.config(), TaskKind::Document),
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

    pub async fn submit(&self, upload: DocumentUpload) -> ClientResult<ProcessedDocument> {
        let run = self.lifecycle.begin();
        let result = self.run(&run, &upload).await;
        self.lifecycle.finish(&run, &result);
        result
    }

    async fn run(&self, run: &Run, upload: &DocumentUpload) -> ClientResult<ProcessedDocument> {
        upload.validate()?;
        let response = run.guard(self.backend.upload(upload)).await?;

        if response.status == Some(TaskStatus::Failed) {
            let message = response
                .failure_message()
                .unwrap_or(TaskKind::Document.failure_fallback())
                .to_string();
            warn!(file_name = %upload.file_name, error = %message, "Document upload rejected");
            return Err(ClientError::TaskFailed {
                task_id: response.task_id.unwrap_or_default(),
                message,
            });
        }

        let document_id = match (response.document_id, response.task_id) {
            (Some(document_id), _) => {
                info!(document_id = %document_id, "Document processed synchronously");
                document_id
            }
            (None, Some(task_id)) => {
                info!(task_id = %task_id, file_name = %upload.file_name, "Document queued");
                self.wait_for_document(run, task_id).await?
            }
            (None, None) => {
                return Err(ClientError::parse(
                    "document/upload",
                    "response carries neither a task id nor a document id",
                ))
            }
        };

        run.guard(self.backend.get_document(&document_id)).await
    }

    async fn wait_for_document(&self, run: &Run, task_id: String) -> ClientResult<String> {
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

        Ok([done.document_id, done.content_id]
            .into_iter()
            .flatten()
            .find(|id| !id.trim().is_empty())
            .unwrap_or(task_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::SubmissionStatus;
    use crate::test_helpers::{fast_policy, sample_upload, status, FakeDocumentBackend};

    #[tokio::test]
    async fn test_synchronous_document_id_skips_polling() {
        let backend = FakeDocumentBackend::new(DocumentUploadResponse {
            task_id: None,
            document_id: Some("doc-1".to_string()),
            status: Some(TaskStatus::Completed),
            message: None,
            error: None,
        });
        let controller = DocumentSubmission::new(Arc::new(backend.clone()), fast_policy(30));

        let document = controller.submit(sample_upload()).await.unwrap();

        assert_eq!(document.document_id, "doc-1");
        assert_eq!(backend.status_calls(), 0);
        assert_eq!(backend.fetched(), vec!["doc-1".to_string()]);
        assert_eq!(controller.state().status, SubmissionStatus::Resolved);
        assert_eq!(controller.state().task_id, None);
    }

    #[tokio::test]
    async fn test_queued_upload_is_polled() {
        let mut done = status("task-9", TaskStatus::Completed);
        done.document_id = Some("doc-9".to_string());
        let backend = FakeDocumentBackend::queued("task-9").with_statuses(vec![
            status("task-9", TaskStatus::Processing),
            status("task-9", TaskStatus::Processing),
            done,
        ]);
        let controller = DocumentSubmission::new(Arc::new(backend.clone()), fast_policy(30));

        controller.submit(sample_upload()).await.unwrap();

        assert_eq!(backend.status_calls(), 3);
        assert_eq!(backend.fetched(), vec!["doc-9".to_string()]);
        assert_eq!(controller.state().task_id.as_deref(), Some("task-9"));
    }

    #[tokio::test]
    async fn test_synchronous_failure_surfaces_backend_error() {
        let backend = FakeDocumentBackend::new(DocumentUploadResponse {
            task_id: None,
            document_id: None,
            status: Some(TaskStatus::Failed),
            message: Some("Upload failed".to_string()),
            error: Some("PDF is encrypted".to_string()),
        });
        let controller = DocumentSubmission::new(Arc::new(backend.clone()), fast_policy(30));

        let err = controller.submit(sample_upload()).await.unwrap_err();

        assert_eq!(err.to_string(), "PDF is encrypted");
        assert_eq!(controller.state().status, SubmissionStatus::Failed);
        assert!(backend.fetched().is_empty());
    }

    #[tokio::test]
    async fn test_missing_ids_is_a_parse_error() {
        let backend = FakeDocumentBackend::new(DocumentUploadResponse {
            task_id: None,
            document_id: None,
            status: None,
            message: None,
            error: None,
        });
        let controller = DocumentSubmission::new(Arc::new(backend), fast_policy(30));

        let err = controller.submit(sample_upload()).await.unwrap_err();
        assert!(matches!(err, ClientError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_invalid_upload_is_rejected_before_sending() {
        let backend = FakeDocumentBackend::queued("task-x");
        let controller = DocumentSubmission::new(Arc::new(backend.clone()), fast_policy(30));

        let mut upload = sample_upload();
        upload.title = "   ".to_string();
        let err = controller.submit(upload).await.unwrap_err();

        assert!(matches!(err, ClientError::Validation(_)));
        assert_eq!(backend.upload_calls(), 0);
    }

    #[tokio::test]
    async fn test_poll_timeout() {
        let backend = FakeDocumentBackend::queued("task-t")
            .with_statuses(vec![status("task-t", TaskStatus::Processing)]);
        let controller = DocumentSubmission::new(Arc::new(backend.clone()), fast_policy(3));

        let err = controller.submit(sample_upload()).await.unwrap_err();

        assert!(err.is_timeout());
        assert_eq!(backend.status_calls(), 3);
        assert_eq!(controller.state().status, SubmissionStatus::TimedOut);
    }
}
