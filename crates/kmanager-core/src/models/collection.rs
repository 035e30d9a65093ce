use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::content::ContentType;
use super::serde_ext::{non_empty, option_timestamp, timestamp};

/// One page of a single collection: `{ total, items }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub total: u64,
    pub items: Vec<T>,
}

/// Listing across several collections at once, keyed by collection name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiCollectionResponse<T> {
    pub collections: BTreeMap<String, ListResponse<T>>,
}

impl<T> MultiCollectionResponse<T> {
    /// Flatten all collections into one page, mapping each item with its
    /// collection name. Totals are summed.
    pub fn into_page<U, F>(self, mut map: F) -> Page<U>
    where
        F: FnMut(&str, T) -> U,
    {
        let mut page = Page {
            items: Vec::new(),
            total: 0,
        };
        for (collection, list) in self.collections {
            page.total += list.total;
            page.items
                .extend(list.items.into_iter().map(|item| map(&collection, item)));
        }
        page
    }
}

/// A page of UI-facing items plus the backend's total count
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> From<ListResponse<T>> for Page<T> {
    fn from(list: ListResponse<T>) -> Self {
        Page {
            items: list.items,
            total: list.total,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentListItem {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    #[serde(default)]
    pub source: String,
    pub metadata: ContentListMetadata,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentListMetadata {
    #[serde(default)]
    pub content_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: String,
    pub source_url: String,
    #[serde(default, deserialize_with = "non_empty")]
    pub duration: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub published_date: Option<String>,
    #[serde(default)]
    pub view_count: Option<u64>,
    #[serde(default, deserialize_with = "non_empty")]
    pub summary: Option<String>,
    #[serde(default, with = "option_timestamp")]
    pub processed_date: Option<DateTime<Utc>>,
}

/// Flattened row of the content grid
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentGridItem {
    pub id: String,
    /// Collection the item was listed from; needed to open or delete it
    pub collection: String,
    pub title: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub source_url: String,
    pub author: String,
    #[serde(with = "option_timestamp", skip_serializing_if = "Option::is_none")]
    pub processed_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl ContentGridItem {
    pub fn from_list_item(collection: &str, item: ContentListItem) -> Self {
        let meta = item.metadata;
        ContentGridItem {
            id: item.id,
            collection: collection.to_string(),
            title: item.title,
            content_type: item.content_type,
            source_url: meta.source_url,
            author: meta.author,
            processed_date: meta.processed_date,
            duration: meta.duration,
            summary: meta.summary,
        }
    }

    /// Identity across collections
    pub fn key(&self) -> String {
        format!("{}:{}", self.collection, self.id)
    }
}

/// Body of `GET search/content/{collection}/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentDetail {
    pub id: String,
    pub title: String,
    pub content_type: ContentType,
    #[serde(default)]
    pub author: String,
    pub source_url: String,
    #[serde(default, deserialize_with = "non_empty")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub published_date: Option<String>,
    #[serde(with = "timestamp")]
    pub processed_date: DateTime<Utc>,
    #[serde(default, deserialize_with = "non_empty")]
    pub tutorial_id: Option<String>,
    #[serde(default)]
    pub content_chunks: Vec<String>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Body of `GET search/content/{collection}/by-url`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentExists {
    pub exists: bool,
    #[serde(default)]
    pub content_id: Option<String>,
}
