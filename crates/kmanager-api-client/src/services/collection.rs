use async_trait::async_trait;
use kmanager_core::models::{
    ContentDetail, ContentExists, ContentGridItem, ContentListItem, DocumentGridItem,
    DocumentListItem, MultiCollectionResponse, Page,
};
use kmanager_core::ClientResult;

use super::document::DocumentService;
use crate::paging::PageSource;
use crate::{segment, ApiClient};

/// Browsing and housekeeping across backend collections
#[derive(Clone, Debug)]
pub struct CollectionService {
    client: ApiClient,
}

impl CollectionService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// One page of the content grid across `collections`; totals are summed.
    pub async fn contents_page(
        &self,
        collections: &[String],
        offset: u64,
        limit: u64,
    ) -> ClientResult<Page<ContentGridItem>> {
        let response: MultiCollectionResponse<ContentListItem> =
            self.list_collections(collections, offset, limit).await?;
        Ok(response.into_page(ContentGridItem::from_list_item))
    }

    /// One page of uploaded documents.
    pub async fn documents_page(
        &self,
        offset: u64,
        limit: u64,
    ) -> ClientResult<Page<DocumentGridItem>> {
        let collections = [self.client.config().document_collection.clone()];
        let response: MultiCollectionResponse<DocumentListItem> =
            self.list_collections(&collections, offset, limit).await?;
        Ok(response.into_page(DocumentGridItem::from_list_item))
    }

    async fn list_collections<T: serde::de::DeserializeOwned>(
        &self,
        collections: &[String],
        offset: u64,
        limit: u64,
    ) -> ClientResult<MultiCollectionResponse<T>> {
        self.client
            .get(
                "search/collections/contents",
                &[
                    ("collections", collections.join(",")),
                    ("offset", offset.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await
    }

    pub async fn content_detail(
        &self,
        collection: &str,
        content_id: &str,
    ) -> ClientResult<ContentDetail> {
        self.client
            .get(
                &format!("search/content/{}/{}", segment(collection), segment(content_id)),
                &[],
            )
            .await
    }

    pub async fn delete_content(&self, collection: &str, content_id: &str) -> ClientResult<()> {
        self.client
            .delete(&format!(
                "search/content/{}/{}",
                segment(collection),
                segment(content_id)
            ))
            .await
    }

    /// Look up an already-ingested item by its source URL. A 404 means "not ingested".
    pub async fn content_exists(
        &self,
        collection: &str,
        source_url: &str,
    ) -> ClientResult<Option<ContentExists>> {
        let result = self
            .client
            .get(
                &format!("search/content/{}/by-url", segment(collection)),
                &[("source_url", source_url.to_string())],
            )
            .await;

        match result {
            Ok(exists) => Ok(Some(exists)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Content grid listing for `PagedList`
#[derive(Clone, Debug)]
pub struct ContentGridSource {
    collections: CollectionService,
    names: Vec<String>,
}

impl ContentGridSource {
    pub fn new(collections: CollectionService, names: Vec<String>) -> Self {
        Self { collections, names }
    }
}

#[async_trait]
impl PageSource for ContentGridSource {
    type Item = ContentGridItem;

    async fn fetch_page(&self, offset: u64, limit: u64) -> ClientResult<Page<ContentGridItem>> {
        self.collections
            .contents_page(&self.names, offset, limit)
            .await
    }

    async fn delete_item(&self, item: &ContentGridItem) -> ClientResult<()> {
        self.collections
            .delete_content(&item.collection, &item.id)
            .await
    }
}

/// Document listing for `PagedList`
#[derive(Clone, Debug)]
pub struct DocumentListSource {
    collections: CollectionService,
    documents: DocumentService,
}

impl DocumentListSource {
    pub fn new(collections: CollectionService, documents: DocumentService) -> Self {
        Self {
            collections,
            documents,
        }
    }
}

#[async_trait]
impl PageSource for DocumentListSource {
    type Item = DocumentGridItem;

    async fn fetch_page(&self, offset: u64, limit: u64) -> ClientResult<Page<DocumentGridItem>> {
        self.collections.documents_page(offset, limit).await
    }

    async fn delete_item(&self, item: &DocumentGridItem) -> ClientResult<()> {
        self.documents.delete(&item.id).await
    }
}
