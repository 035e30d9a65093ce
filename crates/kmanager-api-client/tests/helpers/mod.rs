pub mod fixtures;

use std::time::Duration;

use kmanager_api_client::ApiClient;
use kmanager_core::ClientConfig;
use mockito::{Matcher, Server, ServerGuard};

/// Start an isolated mock backend
pub async fn mock_server() -> ServerGuard {
    Server::new_async().await
}

/// Client pointed at `server_url` with a millisecond poll cadence
pub fn test_client(server_url: &str) -> ApiClient {
    let mut config = ClientConfig::new(server_url);
    config.poll_interval = Duration::from_millis(5);
    config.request_timeout = Duration::from_secs(5);
    config.content_max_attempts = 5;
    config.document_max_attempts = 5;
    config.tutorial_max_attempts = 5;
    ApiClient::new(config).expect("test client")
}

/// Versioned API path: `api_path("/content/submit")` -> `/api/content/submit`
pub fn api_path(path: &str) -> String {
    format!("/api{}", path)
}

/// Match every `(key, value)` pair in the query string
pub fn query(pairs: &[(&str, &str)]) -> Matcher {
    Matcher::AllOf(
        pairs
            .iter()
            .map(|(k, v)| Matcher::UrlEncoded(k.to_string(), v.to_string()))
            .collect(),
    )
}
