//! In-memory backends for controller tests
//!
//! Each fake counts its calls and replays a status script. The last scripted
//! status repeats; an empty script answers `completed`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use kmanager_core::models::{
    ContentType, DocumentUpload, DocumentUploadResponse, ProcessedContent, ProcessedDocument,
    TaskStatus, TaskStatusResponse, TutorialGenerationRequest, TutorialPayload,
    UrlSubmissionRequest,
};
use kmanager_core::{ClientError, ClientResult};
use tokio::sync::watch;

use super::fixtures::{sample_content, sample_document};
use super::status;
use crate::controller::{
    ContentBackend, DocumentBackend, SubmissionState, SubmissionStatus, TutorialBackend,
};

/// Status script shared by the fakes
struct StatusScript {
    task_id: String,
    statuses: Mutex<Vec<TaskStatusResponse>>,
    cursor: AtomicUsize,
    calls: AtomicUsize,
}

impl StatusScript {
    fn new(task_id: &str) -> Self {
        Self {
            task_id: task_id.to_string(),
            statuses: Mutex::new(Vec::new()),
            cursor: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    fn set(&self, statuses: Vec<TaskStatusResponse>) {
        *self.statuses.lock().unwrap() = statuses;
        self.cursor.store(0, Ordering::SeqCst);
    }

    fn next(&self) -> TaskStatusResponse {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let index = self.cursor.fetch_add(1, Ordering::SeqCst);
        let statuses = self.statuses.lock().unwrap();
        match statuses.len() {
            0 => status(&self.task_id, TaskStatus::Completed),
            len => statuses[index.min(len - 1)].clone(),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Records the controller status seen at each backend call
#[derive(Default)]
struct StateRecorder {
    receiver: Mutex<Option<watch::Receiver<SubmissionState>>>,
}

impl StateRecorder {
    fn attach(&self, receiver: watch::Receiver<SubmissionState>) {
        *self.receiver.lock().unwrap() = Some(receiver);
    }

    fn read(&self) -> Option<SubmissionStatus> {
        self.receiver
            .lock()
            .unwrap()
            .as_ref()
            .map(|rx| rx.borrow().status)
    }
}

struct ContentInner {
    script: StatusScript,
    submit_calls: AtomicUsize,
    fetched: Mutex<Vec<String>>,
    recorder: StateRecorder,
    submitted_while: Mutex<Vec<SubmissionStatus>>,
    observed: Mutex<Vec<SubmissionStatus>>,
}

#[derive(Clone)]
pub struct FakeContentBackend {
    inner: Arc<ContentInner>,
}

impl FakeContentBackend {
    /// `submit` answers with `task_id`
    pub fn new(task_id: &str) -> Self {
        Self {
            inner: Arc::new(ContentInner {
                script: StatusScript::new(task_id),
                submit_calls: AtomicUsize::new(0),
                fetched: Mutex::new(Vec::new()),
                recorder: StateRecorder::default(),
                submitted_while: Mutex::new(Vec::new()),
                observed: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn with_statuses(self, statuses: Vec<TaskStatusResponse>) -> Self {
        self.set_statuses(statuses);
        self
    }

    pub fn set_statuses(&self, statuses: Vec<TaskStatusResponse>) {
        self.inner.script.set(statuses);
    }

    /// Record the controller's status on every backend call.
    pub fn observe(&self, receiver: watch::Receiver<SubmissionState>) {
        self.inner.recorder.attach(receiver);
    }

    /// Controller status seen during each `task_status` call
    pub fn observed(&self) -> Vec<SubmissionStatus> {
        self.inner.observed.lock().unwrap().clone()
    }

    /// Controller status seen during each `submit` call
    pub fn submitted_while(&self) -> Vec<SubmissionStatus> {
        self.inner.submitted_while.lock().unwrap().clone()
    }

    pub fn fetched(&self) -> Vec<String> {
        self.inner.fetched.lock().unwrap().clone()
    }

    pub fn submit_calls(&self) -> usize {
        self.inner.submit_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.inner.script.calls()
    }
}

#[async_trait]
impl ContentBackend for FakeContentBackend {
    async fn submit(&self, _request: &UrlSubmissionRequest) -> ClientResult<TaskStatusResponse> {
        self.inner.submit_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(current) = self.inner.recorder.read() {
            self.inner.submitted_while.lock().unwrap().push(current);
        }
        Ok(status(&self.inner.script.task_id, TaskStatus::Processing))
    }

    async fn task_status(&self, _task_id: &str) -> ClientResult<TaskStatusResponse> {
        if let Some(current) = self.inner.recorder.read() {
            self.inner.observed.lock().unwrap().push(current);
        }
        Ok(self.inner.script.next())
    }

    async fn get_content(&self, content_id: &str) -> ClientResult<ProcessedContent> {
        self.inner
            .fetched
            .lock()
            .unwrap()
            .push(content_id.to_string());
        Ok(sample_content(None))
    }
}

struct DocumentInner {
    response: DocumentUploadResponse,
    script: StatusScript,
    upload_calls: AtomicUsize,
    fetched: Mutex<Vec<String>>,
}

#[derive(Clone)]
pub struct FakeDocumentBackend {
    inner: Arc<DocumentInner>,
}

impl FakeDocumentBackend {
    /// `upload` answers with `response`
    pub fn new(response: DocumentUploadResponse) -> Self {
        let task_id = response.task_id.clone().unwrap_or_default();
        Self {
            inner: Arc::new(DocumentInner {
                response,
                script: StatusScript::new(&task_id),
                upload_calls: AtomicUsize::new(0),
                fetched: Mutex::new(Vec::new()),
            }),
        }
    }

    /// `upload` hands out `task_id` to poll
    pub fn queued(task_id: &str) -> Self {
        Self::new(DocumentUploadResponse {
            task_id: Some(task_id.to_string()),
            document_id: None,
            status: Some(TaskStatus::Processing),
            message: None,
            error: None,
        })
    }

    pub fn with_statuses(self, statuses: Vec<TaskStatusResponse>) -> Self {
        self.inner.script.set(statuses);
        self
    }

    pub fn upload_calls(&self) -> usize {
        self.inner.upload_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.inner.script.calls()
    }

    pub fn fetched(&self) -> Vec<String> {
        self.inner.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentBackend for FakeDocumentBackend {
    async fn upload(&self, _upload: &DocumentUpload) -> ClientResult<DocumentUploadResponse> {
        self.inner.upload_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.inner.response.clone())
    }

    async fn task_status(&self, _task_id: &str) -> ClientResult<TaskStatusResponse> {
        Ok(self.inner.script.next())
    }

    async fn get_document(&self, document_id: &str) -> ClientResult<ProcessedDocument> {
        self.inner
            .fetched
            .lock()
            .unwrap()
            .push(document_id.to_string());
        Ok(sample_document(document_id))
    }
}

struct TutorialInner {
    script: StatusScript,
    payload: Mutex<Option<TutorialPayload>>,
    requests: Mutex<Vec<(String, ContentType)>>,
    fetched: Mutex<Vec<String>>,
}

#[derive(Clone)]
pub struct FakeTutorialBackend {
    inner: Arc<TutorialInner>,
}

impl FakeTutorialBackend {
    /// `generate` answers with `task_id`
    pub fn new(task_id: &str) -> Self {
        Self {
            inner: Arc::new(TutorialInner {
                script: StatusScript::new(task_id),
                payload: Mutex::new(None),
                requests: Mutex::new(Vec::new()),
                fetched: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn with_statuses(self, statuses: Vec<TaskStatusResponse>) -> Self {
        self.inner.script.set(statuses);
        self
    }

    /// Served by `get_content`; without one it answers 404.
    pub fn with_payload(self, payload: TutorialPayload) -> Self {
        *self.inner.payload.lock().unwrap() = Some(payload);
        self
    }

    pub fn requests(&self) -> Vec<(String, ContentType)> {
        self.inner.requests.lock().unwrap().clone()
    }

    pub fn fetched(&self) -> Vec<String> {
        self.inner.fetched.lock().unwrap().clone()
    }

    pub fn status_calls(&self) -> usize {
        self.inner.script.calls()
    }
}

#[async_trait]
impl TutorialBackend for FakeTutorialBackend {
    async fn generate(
        &self,
        request: &TutorialGenerationRequest,
    ) -> ClientResult<TaskStatusResponse> {
        self.inner
            .requests
            .lock()
            .unwrap()
            .push((request.content_id.clone(), request.content_type));
        Ok(status(&self.inner.script.task_id, TaskStatus::Processing))
    }

    async fn status(&self, _task_id: &str) -> ClientResult<TaskStatusResponse> {
        Ok(self.inner.script.next())
    }

    async fn get_content(&self, tutorial_id: &str) -> ClientResult<TutorialPayload> {
        self.inner
            .fetched
            .lock()
            .unwrap()
            .push(tutorial_id.to_string());
        self.inner
            .payload
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ClientError::Http {
                status: 404,
                message: "Tutorial not found".to_string(),
            })
    }
}
