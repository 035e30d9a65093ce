use std::sync::atomic::{AtomicU64, Ordering};

use kmanager_core::models::{ContentType, ProcessedContent, TutorialContent};
use kmanager_core::{ClientError, ClientResult, ErrorMetadata};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, warn};

use super::{ContentSubmission, SubmissionState, TutorialGeneration};
use crate::ApiClient;

/// Result of ingesting a URL
#[derive(Debug, Clone, Serialize)]
pub struct IngestionOutcome {
    pub content_id: String,
    pub content: ProcessedContent,
    pub tutorial: Option<TutorialContent>,
    /// Why the automatic tutorial could not be produced
    pub tutorial_error: Option<String>,
    /// Offer a manual "generate tutorial" retry
    pub can_generate_tutorial: bool,
}

/// Content submission followed by automatic tutorial generation.
///
/// The tutorial step is best effort: its failure is reported on the outcome
/// while the ingested content is still returned.
pub struct UrlIngestion {
    content: ContentSubmission,
    tutorial: TutorialGeneration,
    generation: AtomicU64,
}

impl UrlIngestion {
    pub fn new(content: ContentSubmission, tutorial: TutorialGeneration) -> Self {
        Self {
            content,
            tutorial,
            generation: AtomicU64::new(0),
        }
    }

    pub fn from_client(client: &ApiClient) -> Self {
        Self::new(
            ContentSubmission::from_client(client),
            TutorialGeneration::from_client(client),
        )
    }

    pub fn content_state(&self) -> watch::Receiver<SubmissionState> {
        self.content.subscribe()
    }

    pub fn tutorial_state(&self) -> watch::Receiver<SubmissionState> {
        self.tutorial.subscribe()
    }

    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.tutorial.cancel();
        self.content.cancel();
    }

    pub async fn ingest(&self, url: &str, content_type: ContentType) -> ClientResult<IngestionOutcome> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        // A tutorial still generating belongs to the previous URL
        self.tutorial.cancel();

        let content = self.content.submit(url, content_type).await?;
        let content_id = content.metadata.id.clone().unwrap_or_default();

        let mut outcome = IngestionOutcome {
            content_id,
            content,
            tutorial: None,
            tutorial_error: None,
            can_generate_tutorial: false,
        };

        if !content_type.supports_tutorial() {
            return Ok(outcome);
        }

        self.attach_tutorial(generation, &mut outcome, content_type).await?;
        Ok(outcome)
    }

    /// Generate the automatic tutorial unless a newer ingestion started since
    /// `generation` was taken.
    async fn attach_tutorial(
        &self,
        generation: u64,
        outcome: &mut IngestionOutcome,
        content_type: ContentType,
    ) -> ClientResult<()> {
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(content_id = %outcome.content_id, "Ingestion superseded, skipping tutorial");
            return Err(ClientError::Cancelled);
        }

        match self.tutorial.generate(&outcome.content_id, content_type).await {
            Ok(tutorial) => outcome.tutorial = Some(tutorial),
            Err(ClientError::Cancelled) => return Err(ClientError::Cancelled),
            Err(e) => {
                warn!(content_id = %outcome.content_id, error = %e, "Tutorial generation failed");
                outcome.tutorial_error = Some(e.client_message());
                outcome.can_generate_tutorial = true;
            }
        }
        Ok(())
    }

    /// Manual retry for content whose automatic tutorial failed.
    pub async fn generate_tutorial(
        &self,
        content_id: &str,
        content_type: ContentType,
    ) -> ClientResult<TutorialContent> {
        self.tutorial.generate(content_id, content_type).await
    }
}
