use async_trait::async_trait;
use kmanager_core::models::{
    ContentResponse, ContentType, ProcessedContent, SearchResponse, TaskStatusResponse,
    UrlSubmissionRequest,
};
use kmanager_core::ClientResult;
use tracing::debug;

use crate::controller::ContentBackend;
use crate::{segment, ApiClient};

#[derive(Clone, Debug)]
pub struct ContentService {
    client: ApiClient,
}

impl ContentService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Queue a URL for ingestion. The response carries the task id to poll.
    pub async fn submit(&self, request: &UrlSubmissionRequest) -> ClientResult<TaskStatusResponse> {
        debug!(url = %request.url, content_type = %request.content_type, "Submitting content");
        self.client.post_json("content/submit", request).await
    }

    pub async fn task_status(&self, task_id: &str) -> ClientResult<TaskStatusResponse> {
        self.client
            .get(&format!("content/task/{}", segment(task_id)), &[])
            .await
    }

    /// Fetch a processed item and split its chunks into reader sections.
    pub async fn get_content(&self, content_id: &str) -> ClientResult<ProcessedContent> {
        let response: ContentResponse = self
            .client
            .get(&format!("content/{}", segment(content_id)), &[])
            .await?;

        let mut content = ProcessedContent::from(response);
        if content.metadata.id.is_none() {
            content.metadata.id = Some(content_id.to_string());
        }
        Ok(content)
    }

    /// Semantic search restricted to one content type's collection.
    pub async fn search(
        &self,
        query: &str,
        content_type: ContentType,
        limit: usize,
    ) -> ClientResult<SearchResponse> {
        self.client
            .get(
                "search/single",
                &[
                    ("query", query.to_string()),
                    ("collection", content_type.collection().to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await
    }
}

#[async_trait]
impl ContentBackend for ContentService {
    async fn submit(&self, request: &UrlSubmissionRequest) -> ClientResult<TaskStatusResponse> {
        ContentService::submit(self, request).await
    }

    async fn task_status(&self, task_id: &str) -> ClientResult<TaskStatusResponse> {
        ContentService::task_status(self, task_id).await
    }

    async fn get_content(&self, content_id: &str) -> ClientResult<ProcessedContent> {
        ContentService::get_content(self, content_id).await
    }
}
