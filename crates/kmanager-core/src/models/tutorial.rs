//! Tutorial models
//!
//! The backend emits tutorials in a section-based shape (`ProcessedTutorial`).
//! Older deployments sent the reader view directly, with `summary` as either a
//! single string or a list. Both are accepted through `TutorialPayload` and
//! normalized into `TutorialContent`, whose `summary` is always a list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::content::ContentType;
use super::serde_ext::{one_or_many, timestamp};
use crate::error::{ClientError, ClientResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TutorialSectionType {
    Summary,
    KeyPoints,
    CodeExample,
    Practice,
    Notes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TutorialSection {
    pub id: String,
    #[serde(rename = "type")]
    pub section_type: TutorialSectionType,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

impl TutorialSection {
    fn metadata_str(&self, key: &str) -> Option<String> {
        self.metadata
            .as_ref()?
            .get(key)?
            .as_str()
            .map(str::to_string)
    }

    fn metadata_strings(&self, key: &str) -> Option<Vec<String>> {
        let values = self.metadata.as_ref()?.get(key)?.as_array()?;
        Some(
            values
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TutorialMetadata {
    pub title: String,
    pub content_id: String,
    pub source_url: String,
    pub content_type: ContentType,
    #[serde(with = "timestamp")]
    pub generated_date: DateTime<Utc>,
}

/// Canonical, section-based tutorial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedTutorial {
    pub metadata: TutorialMetadata,
    pub sections: Vec<TutorialSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeExample {
    pub code: String,
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticeExercise {
    pub question: String,
    pub solution: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hints: Option<Vec<String>>,
}

/// Reader view of a tutorial
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TutorialContent {
    #[serde(deserialize_with = "one_or_many")]
    pub summary: Vec<String>,
    #[serde(default, alias = "keyPoints")]
    pub key_points: Vec<String>,
    #[serde(default, alias = "codeExamples")]
    pub code_examples: Vec<CodeExample>,
    #[serde(default, alias = "practiceExercises")]
    pub practice_exercises: Vec<PracticeExercise>,
    #[serde(
        default,
        alias = "additionalNotes",
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_notes: Option<Vec<String>>,
}

impl From<&ProcessedTutorial> for TutorialContent {
    fn from(tutorial: &ProcessedTutorial) -> Self {
        let mut content = TutorialContent::default();
        let mut notes = Vec::new();

        for section in &tutorial.sections {
            match section.section_type {
                TutorialSectionType::Summary => content.summary.push(section.content.clone()),
                TutorialSectionType::KeyPoints => {
                    content.key_points.push(section.content.clone())
                }
                TutorialSectionType::CodeExample => content.code_examples.push(CodeExample {
                    code: section.content.clone(),
                    explanation: section.title.clone(),
                    language: section.metadata_str("language"),
                }),
                TutorialSectionType::Practice => {
                    content.practice_exercises.push(PracticeExercise {
                        question: section.title.clone(),
                        solution: section.content.clone(),
                        hints: section.metadata_strings("hints"),
                    })
                }
                TutorialSectionType::Notes => notes.push(section.content.clone()),
            }
        }

        if !notes.is_empty() {
            content.additional_notes = Some(notes);
        }
        content
    }
}

/// Tutorial as it may appear inline in a status response or from
/// `tutorial/content/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TutorialPayload {
    Sectioned(ProcessedTutorial),
    /// Deprecated flat reader-view shape
    Legacy(TutorialContent),
}

impl TutorialPayload {
    pub fn to_content(&self) -> TutorialContent {
        match self {
            TutorialPayload::Sectioned(tutorial) => TutorialContent::from(tutorial),
            TutorialPayload::Legacy(content) => content.clone(),
        }
    }

    /// Source content id, when the payload carries one
    pub fn content_id(&self) -> Option<&str> {
        match self {
            TutorialPayload::Sectioned(tutorial) => Some(&tutorial.metadata.content_id),
            TutorialPayload::Legacy(_) => None,
        }
    }
}

/// Body of `POST tutorial/generate`
#[derive(Debug, Clone, Serialize)]
pub struct TutorialGenerationRequest {
    pub content_id: String,
    pub content_type: ContentType,
}

impl TutorialGenerationRequest {
    pub fn new(content_id: &str, content_type: ContentType) -> ClientResult<Self> {
        let content_id = content_id.trim();
        if content_id.is_empty() {
            return Err(ClientError::Validation(
                "A content id is required to generate a tutorial".to_string(),
            ));
        }
        if !content_type.supports_tutorial() {
            return Err(ClientError::Validation(format!(
                "Tutorials cannot be generated for {} content",
                content_type.display_name().to_lowercase()
            )));
        }
        Ok(Self {
            content_id: content_id.to_string(),
            content_type,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TutorialListMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Row of `GET tutorials`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutorialListItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub source_url: String,
    #[serde(with = "timestamp")]
    pub generated_date: DateTime<Utc>,
    pub source_type: ContentType,
    #[serde(default)]
    pub section_count: u32,
    #[serde(default)]
    pub metadata: TutorialListMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutorialDetailSection {
    pub section_id: String,
    #[serde(default)]
    pub tutorial_id: String,
    pub title: String,
    pub content: String,
    pub section_type: String,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TutorialDetailMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<String>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Body of `GET tutorials/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutorialDetail {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub source_content_id: Option<String>,
    pub source_type: ContentType,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(with = "timestamp")]
    pub generated_date: DateTime<Utc>,
    pub sections: Vec<TutorialDetailSection>,
    #[serde(default)]
    pub metadata: TutorialDetailMetadata,
}

impl TutorialDetail {
    /// Sections in display order
    pub fn ordered_sections(&self) -> Vec<&TutorialDetailSection> {
        let mut sections: Vec<_> = self.sections.iter().collect();
        sections.sort_by_key(|s| s.order);
        sections
    }
}
