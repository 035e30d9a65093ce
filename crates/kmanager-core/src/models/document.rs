use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;
use std::str::FromStr;

use super::serde_ext::{non_empty, option_timestamp, timestamp};
use super::task::TaskStatus;
use crate::error::{ClientError, ClientResult};
use crate::validation::validate_non_empty;

/// Maximum accepted upload size (50MB)
pub const MAX_DOCUMENT_SIZE: usize = 50 * 1024 * 1024;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Pdf,
    #[serde(alias = "docx")]
    Doc,
    Txt,
    #[serde(alias = "markdown")]
    Md,
}

impl FileType {
    /// Infer the file type from a file name's extension.
    pub fn from_file_name(name: &str) -> Option<Self> {
        Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            FileType::Pdf => "application/pdf",
            FileType::Doc => "application/msword",
            FileType::Txt => "text/plain",
            FileType::Md => "text/markdown",
        }
    }
}

impl Display for FileType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            FileType::Pdf => write!(f, "pdf"),
            FileType::Doc => write!(f, "doc"),
            FileType::Txt => write!(f, "txt"),
            FileType::Md => write!(f, "md"),
        }
    }
}

impl FromStr for FileType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pdf" => Ok(FileType::Pdf),
            "doc" | "docx" => Ok(FileType::Doc),
            "txt" => Ok(FileType::Txt),
            "md" | "markdown" => Ok(FileType::Md),
            _ => Err(anyhow::anyhow!("Invalid file type: {}", s)),
        }
    }
}

/// A file queued for `POST document/upload`
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub title: String,
    pub tags: Vec<String>,
}

impl DocumentUpload {
    pub fn new(
        file_name: impl Into<String>,
        bytes: Vec<u8>,
        title: impl Into<String>,
        tags: Vec<String>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
            title: title.into(),
            tags: tags
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    pub fn file_type(&self) -> Option<FileType> {
        FileType::from_file_name(&self.file_name)
    }

    /// Tags as the comma-separated form field the backend expects
    pub fn tags_field(&self) -> String {
        self.tags.join(",")
    }

    pub fn validate(&self) -> ClientResult<()> {
        validate_non_empty("title", &self.title).map_err(ClientError::Validation)?;

        if self.bytes.is_empty() {
            return Err(ClientError::Validation(format!(
                "File '{}' is empty",
                self.file_name
            )));
        }
        if self.bytes.len() > MAX_DOCUMENT_SIZE {
            return Err(ClientError::Validation(format!(
                "File '{}' exceeds the {}MB upload limit",
                self.file_name,
                MAX_DOCUMENT_SIZE / (1024 * 1024)
            )));
        }
        if self.file_type().is_none() {
            return Err(ClientError::Validation(format!(
                "Unsupported file type for '{}' (expected pdf, doc, txt or md)",
                self.file_name
            )));
        }
        Ok(())
    }
}

/// Body returned by `POST document/upload`.
///
/// Backends either answer synchronously with a `document_id` or hand out a
/// `task_id` to poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentUploadResponse {
    #[serde(default, deserialize_with = "non_empty")]
    pub task_id: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub document_id: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl DocumentUploadResponse {
    pub fn failure_message(&self) -> Option<&str> {
        [self.error.as_deref(), self.message.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default, with = "option_timestamp")]
    pub upload_date: Option<DateTime<Utc>>,
}

/// Body of `GET document/{id}` and each hit of `GET document/search`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedDocument {
    pub document_id: String,
    pub content: String,
    pub metadata: DocumentMetadata,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentListItem {
    pub id: String,
    pub title: String,
    pub file_type: FileType,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(with = "timestamp")]
    pub created_date: DateTime<Utc>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Row of the document list view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentGridItem {
    pub id: String,
    /// `{collection}:{id}`, unique across collections
    pub key: String,
    pub title: String,
    pub file_type: FileType,
    pub tags: Vec<String>,
    #[serde(with = "timestamp")]
    pub created_date: DateTime<Utc>,
}

impl DocumentGridItem {
    pub fn from_list_item(collection: &str, item: DocumentListItem) -> Self {
        DocumentGridItem {
            key: format!("{}:{}", collection, item.id),
            id: item.id,
            title: item.title,
            file_type: item.file_type,
            tags: item.tags,
            created_date: item.created_date,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentDetail {
    pub id: String,
    pub title: String,
    pub file_type: FileType,
    pub content: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(with = "timestamp")]
    pub created_date: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub processed_date: DateTime<Utc>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Binary body of `GET document/{id}/download`
#[derive(Debug, Clone)]
pub struct DocumentDownload {
    /// Filename from the `Content-Disposition` header, if any
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}
