use async_trait::async_trait;
use kmanager_core::models::{
    DocumentDownload, DocumentUpload, DocumentUploadResponse, ProcessedDocument,
    TaskStatusResponse,
};
use kmanager_core::{ClientError, ClientResult};
use reqwest::multipart::{Form, Part};
use tracing::debug;

use crate::controller::DocumentBackend;
use crate::{segment, ApiClient};

#[derive(Clone, Debug)]
pub struct DocumentService {
    client: ApiClient,
}

impl DocumentService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Multipart upload with `title`, `tags` and `file` fields.
    pub async fn upload(&self, upload: &DocumentUpload) -> ClientResult<DocumentUploadResponse> {
        upload.validate()?;

        let mut part = Part::bytes(upload.bytes.clone()).file_name(upload.file_name.clone());
        if let Some(file_type) = upload.file_type() {
            part = part
                .mime_str(file_type.mime_type())
                .map_err(|e| ClientError::Validation(e.to_string()))?;
        }

        let form = Form::new()
            .text("title", upload.title.trim().to_string())
            .text("tags", upload.tags_field())
            .part("file", part);

        debug!(
            file_name = %upload.file_name,
            size = upload.bytes.len(),
            "Uploading document"
        );
        self.client.post_multipart("document/upload", form).await
    }

    pub async fn task_status(&self, task_id: &str) -> ClientResult<TaskStatusResponse> {
        self.client
            .get(&format!("document/task/{}", segment(task_id)), &[])
            .await
    }

    pub async fn get_document(&self, document_id: &str) -> ClientResult<ProcessedDocument> {
        self.client
            .get(&format!("document/{}", segment(document_id)), &[])
            .await
    }

    pub async fn delete(&self, document_id: &str) -> ClientResult<()> {
        self.client
            .delete(&format!("document/{}", segment(document_id)))
            .await
    }

    pub async fn search(&self, query: &str, limit: usize) -> ClientResult<Vec<ProcessedDocument>> {
        self.client
            .get(
                "document/search",
                &[("query", query.to_string()), ("limit", limit.to_string())],
            )
            .await
    }

    /// Download the original file.
    pub async fn download(&self, document_id: &str) -> ClientResult<DocumentDownload> {
        self.client
            .get_bytes(&format!("document/{}/download", segment(document_id)))
            .await
    }
}

#[async_trait]
impl DocumentBackend for DocumentService {
    async fn upload(&self, upload: &DocumentUpload) -> ClientResult<DocumentUploadResponse> {
        DocumentService::upload(self, upload).await
    }

    async fn task_status(&self, task_id: &str) -> ClientResult<TaskStatusResponse> {
        DocumentService::task_status(self, task_id).await
    }

    async fn get_document(&self, document_id: &str) -> ClientResult<ProcessedDocument> {
        DocumentService::get_document(self, document_id).await
    }
}
