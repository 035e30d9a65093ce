use async_trait::async_trait;
use kmanager_core::models::{
    ContentType, ListResponse, Page, ProcessedTutorial, TaskStatusResponse, TutorialContent,
    TutorialDetail, TutorialGenerationRequest, TutorialListItem, TutorialPayload,
};
use kmanager_core::ClientResult;
use tracing::debug;

use crate::controller::TutorialBackend;
use crate::paging::PageSource;
use crate::{segment, ApiClient};

#[derive(Clone, Debug)]
pub struct TutorialService {
    client: ApiClient,
}

impl TutorialService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Start tutorial generation for an ingested article or video.
    pub async fn generate(
        &self,
        content_id: &str,
        content_type: ContentType,
    ) -> ClientResult<TaskStatusResponse> {
        let request = TutorialGenerationRequest::new(content_id, content_type)?;
        self.start_generation(&request).await
    }

    async fn start_generation(
        &self,
        request: &TutorialGenerationRequest,
    ) -> ClientResult<TaskStatusResponse> {
        debug!(content_id = %request.content_id, "Requesting tutorial generation");
        self.client.post_json("tutorial/generate", request).await
    }

    pub async fn status(&self, task_id: &str) -> ClientResult<TaskStatusResponse> {
        self.client
            .get(&format!("tutorial/status/{}", segment(task_id)), &[])
            .await
    }

    pub async fn get_content(&self, tutorial_id: &str) -> ClientResult<TutorialPayload> {
        self.client
            .get(&format!("tutorial/content/{}", segment(tutorial_id)), &[])
            .await
    }

    pub async fn list(&self, offset: u64, limit: u64) -> ClientResult<Page<TutorialListItem>> {
        let response: ListResponse<TutorialListItem> = self
            .client
            .get(
                "tutorials",
                &[("offset", offset.to_string()), ("limit", limit.to_string())],
            )
            .await?;
        Ok(response.into())
    }

    pub async fn detail(&self, tutorial_id: &str) -> ClientResult<TutorialDetail> {
        self.client
            .get(&format!("tutorials/{}", segment(tutorial_id)), &[])
            .await
    }

    pub async fn delete(&self, tutorial_id: &str) -> ClientResult<()> {
        self.client
            .delete(&format!("tutorials/{}", segment(tutorial_id)))
            .await
    }

    /// Convert the section-based schema into the reader view.
    pub fn to_tutorial_content(tutorial: &ProcessedTutorial) -> TutorialContent {
        TutorialContent::from(tutorial)
    }
}

#[async_trait]
impl TutorialBackend for TutorialService {
    async fn generate(
        &self,
        request: &TutorialGenerationRequest,
    ) -> ClientResult<TaskStatusResponse> {
        self.start_generation(request).await
    }

    async fn status(&self, task_id: &str) -> ClientResult<TaskStatusResponse> {
        TutorialService::status(self, task_id).await
    }

    async fn get_content(&self, tutorial_id: &str) -> ClientResult<TutorialPayload> {
        TutorialService::get_content(self, tutorial_id).await
    }
}

/// Tutorial listing for `PagedList`
#[derive(Clone, Debug)]
pub struct TutorialListSource {
    tutorials: TutorialService,
}

impl TutorialListSource {
    pub fn new(tutorials: TutorialService) -> Self {
        Self { tutorials }
    }
}

#[async_trait]
impl PageSource for TutorialListSource {
    type Item = TutorialListItem;

    async fn fetch_page(&self, offset: u64, limit: u64) -> ClientResult<Page<TutorialListItem>> {
        self.tutorials.list(offset, limit).await
    }

    async fn delete_item(&self, item: &TutorialListItem) -> ClientResult<()> {
        self.tutorials.delete(&item.id).await
    }
}
