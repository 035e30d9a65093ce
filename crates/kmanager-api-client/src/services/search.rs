use kmanager_core::models::{
    sort_by_relevance, MultiCollectionSearchResponse, SearchParams, SearchResponse,
    DEFAULT_LIMIT_PER_COLLECTION, DEFAULT_SEARCH_LIMIT,
};
use kmanager_core::ClientResult;
use tracing::debug;

use crate::ApiClient;

#[derive(Clone, Debug)]
pub struct SearchService {
    client: ApiClient,
}

impl SearchService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn search_single(
        &self,
        query: &str,
        collection: &str,
        limit: usize,
    ) -> ClientResult<SearchResponse> {
        self.client
            .get(
                "search/single",
                &[
                    ("query", query.to_string()),
                    ("collection", collection.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await
    }

    pub async fn search_multi(
        &self,
        query: &str,
        collections: &[String],
        limit_per_collection: usize,
    ) -> ClientResult<MultiCollectionSearchResponse> {
        self.client
            .get(
                "search/multi",
                &[
                    ("query", query.to_string()),
                    ("collections", collections.join(",")),
                    ("limit_per_collection", limit_per_collection.to_string()),
                ],
            )
            .await
    }

    /// Search one collection, or every configured collection for `all`.
    /// Results come back most relevant first.
    pub async fn search(&self, params: &SearchParams) -> ClientResult<SearchResponse> {
        debug!(query = %params.query, collection = %params.collection, "Searching");

        if params.is_all() {
            let per_collection = params.limit.unwrap_or(DEFAULT_LIMIT_PER_COLLECTION);
            let response = self
                .search_multi(
                    &params.query,
                    &self.client.config().search_collections,
                    per_collection,
                )
                .await?;
            return Ok(response.flatten(params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT)));
        }

        let mut response = self
            .search_single(
                &params.query,
                &params.collection,
                params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT),
            )
            .await?;
        sort_by_relevance(&mut response.results);
        Ok(response)
    }
}
