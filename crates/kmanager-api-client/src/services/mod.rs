//! Domain services
//!
//! Each function maps one UI action to one backend call and reshapes the JSON
//! payload into the UI-facing types from `kmanager_core::models`.

mod collection;
mod content;
mod document;
mod prompt;
mod search;
mod tutorial;

pub use collection::{CollectionService, ContentGridSource, DocumentListSource};
pub use content::ContentService;
pub use document::DocumentService;
pub use prompt::PromptService;
pub use search::SearchService;
pub use tutorial::{TutorialListSource, TutorialService};

use crate::ApiClient;

impl ApiClient {
    pub fn content(&self) -> ContentService {
        ContentService::new(self.clone())
    }

    pub fn documents(&self) -> DocumentService {
        DocumentService::new(self.clone())
    }

    pub fn tutorials(&self) -> TutorialService {
        TutorialService::new(self.clone())
    }

    pub fn search(&self) -> SearchService {
        SearchService::new(self.clone())
    }

    pub fn collections(&self) -> CollectionService {
        CollectionService::new(self.clone())
    }

    pub fn prompts(&self) -> PromptService {
        PromptService::new(self.clone())
    }
}
