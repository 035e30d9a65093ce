use kmanager_core::models::{GeneratedPrompt, PromptRequest};
use kmanager_core::ClientResult;

use crate::ApiClient;

#[derive(Clone, Debug)]
pub struct PromptService {
    client: ApiClient,
}

impl PromptService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Build a prompt from the knowledge base for a free-text query.
    pub async fn generate(&self, query: &str) -> ClientResult<GeneratedPrompt> {
        let request = PromptRequest::new(query)?;
        self.client.post_json("prompt/generate", &request).await
    }
}
