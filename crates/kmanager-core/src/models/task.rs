use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use super::tutorial::TutorialPayload;

/// Status of a backend task as reported by the status endpoints
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[serde(alias = "pending", alias = "queued", alias = "running")]
    Processing,
    Completed,
    #[serde(alias = "error")]
    Failed,
}

impl TaskStatus {
    /// Completed and failed are final; the backend never leaves them.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            TaskStatus::Processing => write!(f, "processing"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for TaskStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "processing" | "pending" | "queued" | "running" => Ok(TaskStatus::Processing),
            "completed" => Ok(TaskStatus::Completed),
            "failed" | "error" => Ok(TaskStatus::Failed),
            _ => Err(anyhow::anyhow!("Invalid task status: {}", s)),
        }
    }
}

/// Kind of long-running backend job a controller tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Content,
    Document,
    Tutorial,
}

impl TaskKind {
    /// Prefix of the progress line shown while polling
    pub fn progress_label(&self) -> &'static str {
        match self {
            TaskKind::Content => "Processing content",
            TaskKind::Document => "Processing document",
            TaskKind::Tutorial => "Generating tutorial",
        }
    }

    /// Message used when the backend reports a failure without any text
    pub fn failure_fallback(&self) -> &'static str {
        match self {
            TaskKind::Content => "Processing failed",
            TaskKind::Document => "Document processing failed",
            TaskKind::Tutorial => "Tutorial generation failed",
        }
    }
}

impl Display for TaskKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            TaskKind::Content => write!(f, "Content processing"),
            TaskKind::Document => write!(f, "Document processing"),
            TaskKind::Tutorial => write!(f, "Tutorial generation"),
        }
    }
}

/// Snapshot returned by `content/task/{id}`, `document/task/{id}` and
/// `tutorial/status/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStatusResponse {
    pub task_id: String,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tutorial_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Interim summary some backends report while content is still processing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Generated tutorial, inlined once a tutorial task completes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tutorial: Option<TutorialPayload>,
}

impl TaskStatusResponse {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Backend-provided failure text, preferring `message` over `error`
    pub fn failure_message(&self) -> Option<&str> {
        [self.message.as_deref(), self.error.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
    }
}
