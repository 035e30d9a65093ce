use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::error::{ClientError, ClientResult};

/// Pseudo collection that fans a query out to every searchable collection
pub const ALL_COLLECTIONS: &str = "all";

pub const DEFAULT_SEARCH_LIMIT: usize = 10;
pub const DEFAULT_LIMIT_PER_COLLECTION: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    /// Relevance score; larger is more relevant
    #[serde(default)]
    pub distance: Option<f64>,
}

impl SearchResult {
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }

    pub fn title(&self) -> &str {
        self.metadata_str("title").unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiCollectionSearchResponse {
    pub query: String,
    pub collections: BTreeMap<String, Vec<SearchResult>>,
}

impl MultiCollectionSearchResponse {
    /// Merge every collection's hits, most relevant first, keeping at most `limit`.
    pub fn flatten(self, limit: usize) -> SearchResponse {
        let mut results: Vec<SearchResult> = self.collections.into_values().flatten().collect();
        sort_by_relevance(&mut results);
        results.truncate(limit);
        SearchResponse {
            query: self.query,
            results,
        }
    }
}

/// Sort by descending distance; results without a score go last.
/// The sort is stable so equal scores keep backend order.
pub fn sort_by_relevance(results: &mut [SearchResult]) {
    results.sort_by(|a, b| match (a.distance, b.distance) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// A search request from the view layer
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    pub query: String,
    /// Collection name, or `all`
    pub collection: String,
    pub limit: Option<usize>,
}

impl SearchParams {
    pub fn new(query: &str, collection: &str, limit: Option<usize>) -> ClientResult<Self> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ClientError::Validation(
                "Search query must not be empty".to_string(),
            ));
        }
        if limit == Some(0) {
            return Err(ClientError::Validation(
                "Search limit must be greater than zero".to_string(),
            ));
        }
        let collection = collection.trim();
        Ok(Self {
            query: query.to_string(),
            collection: if collection.is_empty() {
                ALL_COLLECTIONS.to_string()
            } else {
                collection.to_string()
            },
            limit,
        })
    }

    pub fn is_all(&self) -> bool {
        self.collection == ALL_COLLECTIONS
    }
}
