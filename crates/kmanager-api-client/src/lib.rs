//! HTTP client for the kmanager backend.
//!
//! `ApiClient` issues JSON requests against `{api_url}/{api_prefix}/{endpoint}` and
//! normalizes every failure into `ClientError`. Domain services wrap it one call per
//! function, controllers drive long-running backend tasks through the poller, and
//! `PagedList` keeps incremental list state for the views.

pub mod controller;
pub mod paging;
pub mod poller;
pub mod services;

use std::sync::Arc;

use kmanager_core::models::DocumentDownload;
use kmanager_core::{ClientConfig, ClientError, ClientResult};
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

pub use controller::{
    ContentBackend, ContentSubmission, DocumentBackend, DocumentSubmission, IngestionOutcome,
    SubmissionState, SubmissionStatus, TutorialBackend, TutorialGeneration, UrlIngestion,
};
pub use paging::{ListItem, LoadOutcome, PageSource, PagedList};
pub use poller::{PollHandle, PollPolicy, PollProgress, TaskPoller};
pub use services::{
    CollectionService, ContentGridSource, ContentService, DocumentListSource, DocumentService,
    PromptService, SearchService, TutorialListSource, TutorialService,
};

/// Fallback when an error response carries no usable message
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred";

/// HTTP client for the kmanager API.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    config: Arc<ClientConfig>,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    /// Load configuration from the environment and build a client.
    pub fn from_env() -> ClientResult<Self> {
        let config = ClientConfig::from_env().map_err(|e| ClientError::Config(e.to_string()))?;
        Self::new(config)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// `{api_url}/{api_prefix}/{endpoint}`; a leading `/` on the endpoint is ignored.
    pub fn build_url(&self, endpoint: &str) -> String {
        let endpoint = endpoint.trim_start_matches('/');
        let base = self.config.api_url.trim_end_matches('/');
        let prefix = self.config.api_prefix.trim_matches('/');
        if prefix.is_empty() {
            format!("{}/{}", base, endpoint)
        } else {
            format!("{}/{}/{}", base, prefix, endpoint)
        }
    }

    /// GET request with optional query parameters. Deserializes JSON response.
    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> ClientResult<T> {
        let mut request = self.client.get(self.build_url(endpoint));
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = self.send(endpoint, request).await?;
        decode(endpoint, response).await
    }

    /// POST JSON body and deserialize response.
    pub async fn post_json<T: DeserializeOwned, B: serde::Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> ClientResult<T> {
        let request = self.client.post(self.build_url(endpoint)).json(body);
        let response = self.send(endpoint, request).await?;
        decode(endpoint, response).await
    }

    /// POST multipart form and deserialize response.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        form: reqwest::multipart::Form,
    ) -> ClientResult<T> {
        let request = self.client.post(self.build_url(endpoint)).multipart(form);
        let response = self.send(endpoint, request).await?;
        decode(endpoint, response).await
    }

    /// DELETE request. Returns Ok(()) on any 2xx, body ignored.
    pub async fn delete(&self, endpoint: &str) -> ClientResult<()> {
        let request = self.client.delete(self.build_url(endpoint));
        self.send(endpoint, request).await?;
        Ok(())
    }

    /// GET a binary body, keeping the filename from `Content-Disposition`.
    pub async fn get_bytes(&self, endpoint: &str) -> ClientResult<DocumentDownload> {
        let request = self.client.get(self.build_url(endpoint));
        let response = self.send(endpoint, request).await?;

        let headers = response.headers();
        let file_name = headers
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(filename_from_content_disposition);
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(DocumentDownload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        })
    }

    async fn send(&self, endpoint: &str, request: RequestBuilder) -> ClientResult<Response> {
        debug!(endpoint = %endpoint, "Sending API request");

        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        debug!(endpoint = %endpoint, status = status.as_u16(), "API response received");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Http {
            status: status.as_u16(),
            message: extract_error_message(&body),
        })
    }
}

/// Decode a successful response. `204 No Content` and empty bodies decode as JSON `null`.
async fn decode<T: DeserializeOwned>(endpoint: &str, response: Response) -> ClientResult<T> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| ClientError::Network(e.to_string()))?;

    let body = if status == StatusCode::NO_CONTENT || text.trim().is_empty() {
        "null"
    } else {
        text.as_str()
    };

    serde_json::from_str(body).map_err(|e| ClientError::parse(endpoint, e))
}

/// Pull a human-readable message out of an error body.
///
/// Looks at `message`, then `detail`, then `error`. Request validation errors put a
/// list under `detail`; the first entry's `msg` is used.
pub fn extract_error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return UNKNOWN_ERROR_MESSAGE.to_string();
    };

    non_empty(value.get("message"))
        .or_else(|| non_empty(value.get("detail")))
        .or_else(|| {
            value
                .get("detail")
                .and_then(|d| d.as_array())
                .and_then(|items| items.first())
                .and_then(|first| non_empty(first.get("msg")))
        })
        .or_else(|| non_empty(value.get("error")))
        .unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string())
}

fn non_empty(value: Option<&serde_json::Value>) -> Option<String> {
    value
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Extract the filename from a `Content-Disposition` header value.
///
/// Prefers the RFC 5987 `filename*=UTF-8''...` form over plain `filename=`.
pub fn filename_from_content_disposition(header: &str) -> Option<String> {
    let mut plain = None;
    for part in header.split(';').map(str::trim) {
        let Some((key, value)) = part.split_once('=') else {
            continue;
        };
        match key.trim().to_ascii_lowercase().as_str() {
            "filename*" => {
                let encoded = value.trim().trim_matches('"');
                let encoded = encoded
                    .split_once("''")
                    .map(|(_, rest)| rest)
                    .unwrap_or(encoded);
                if let Ok(decoded) = urlencoding::decode(encoded) {
                    if !decoded.is_empty() {
                        return Some(decoded.into_owned());
                    }
                }
            }
            "filename" => {
                let name = value.trim().trim_matches('"');
                if !name.is_empty() {
                    plain = Some(name.to_string());
                }
            }
            _ => {}
        }
    }
    plain
}

/// Percent-encode a single path segment (ids, collection names).
pub(crate) fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

#[cfg(test)]
pub mod test_helpers;
