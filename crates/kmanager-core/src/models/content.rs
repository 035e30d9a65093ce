use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use validator::Validate;

use super::serde_ext::{non_empty, option_timestamp};
use crate::error::{ClientError, ClientResult};
use crate::validation::validate_http_url;

pub const MAX_URL_LENGTH: u64 = 2048;

/// Kind of source a content item was ingested from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ContentType {
    #[serde(rename = "article")]
    Article,
    #[serde(rename = "youtube", alias = "video")]
    Video,
    #[serde(rename = "tiktok", alias = "short-video", alias = "short_video")]
    ShortVideo,
}

impl ContentType {
    /// Backend collection holding items of this type
    pub fn collection(&self) -> &'static str {
        match self {
            ContentType::Article => "articles_content",
            ContentType::Video => "youtube_content",
            ContentType::ShortVideo => "tiktok_content",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ContentType::Article => "Article",
            ContentType::Video => "Video",
            ContentType::ShortVideo => "Short video",
        }
    }

    /// Tutorial generation is only offered for articles and long-form video.
    pub fn supports_tutorial(&self) -> bool {
        matches!(self, ContentType::Article | ContentType::Video)
    }
}

impl Display for ContentType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ContentType::Article => write!(f, "article"),
            ContentType::Video => write!(f, "youtube"),
            ContentType::ShortVideo => write!(f, "tiktok"),
        }
    }
}

impl FromStr for ContentType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "article" => Ok(ContentType::Article),
            "youtube" | "video" => Ok(ContentType::Video),
            "tiktok" | "short-video" | "short_video" => Ok(ContentType::ShortVideo),
            _ => Err(anyhow::anyhow!("Invalid content type: {}", s)),
        }
    }
}

/// Body of `POST content/submit`
#[derive(Debug, Clone, Serialize, Validate)]
pub struct UrlSubmissionRequest {
    #[validate(url, length(max = 2048))]
    pub url: String,
    pub content_type: ContentType,
}

impl UrlSubmissionRequest {
    /// Build a submission, rejecting anything that is not a well-formed http(s) URL.
    pub fn new(url: &str, content_type: ContentType) -> ClientResult<Self> {
        let request = Self {
            url: url.trim().to_string(),
            content_type,
        };
        request.validate()?;
        validate_http_url(&request.url).map_err(ClientError::Validation)?;
        Ok(request)
    }
}

/// Body of `GET content/{id}` as sent by the backend
#[derive(Debug, Clone, Deserialize)]
pub struct ContentResponse {
    #[serde(default, alias = "id")]
    pub content_id: Option<String>,
    pub metadata: ContentResponseMetadata,
    pub chunks: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentResponseMetadata {
    pub title: String,
    #[serde(default)]
    pub author: String,
    pub source_url: String,
    pub content_type: ContentType,
    #[serde(default, deserialize_with = "non_empty")]
    pub duration: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub published_date: Option<String>,
    #[serde(default)]
    pub view_count: Option<u64>,
    #[serde(default, with = "option_timestamp")]
    pub processed_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub author: String,
    pub source_url: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(
        default,
        with = "option_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub processed_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentSection {
    pub id: String,
    pub title: String,
    pub content: String,
}

/// An ingested content item, shaped for the reader view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedContent {
    pub metadata: ContentMetadata,
    pub sections: Vec<ContentSection>,
}

impl From<ContentResponse> for ProcessedContent {
    fn from(response: ContentResponse) -> Self {
        let meta = response.metadata;
        let sections = response
            .chunks
            .into_iter()
            .enumerate()
            .map(|(index, chunk)| ContentSection {
                id: format!("section-{}", index),
                title: format!("Section {}", index + 1),
                content: chunk,
            })
            .collect();

        ProcessedContent {
            metadata: ContentMetadata {
                id: response.content_id,
                title: meta.title,
                author: meta.author,
                source_url: meta.source_url,
                content_type: meta.content_type,
                duration: meta.duration,
                summary: meta.summary,
                processed_date: meta.processed_date,
            },
            sections,
        }
    }
}
