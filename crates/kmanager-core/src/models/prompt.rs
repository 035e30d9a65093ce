use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Body of `POST prompt/generate`
#[derive(Debug, Clone, Serialize)]
pub struct PromptRequest {
    pub query: String,
}

impl PromptRequest {
    pub fn new(query: &str) -> ClientResult<Self> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ClientError::Validation(
                "Prompt query must not be empty".to_string(),
            ));
        }
        Ok(Self {
            query: query.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedPrompt {
    pub prompt: String,
}
