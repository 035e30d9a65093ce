//! Configuration module
//!
//! `ClientConfig` is built once at startup and handed to the API client and the
//! controllers. Nothing reads the environment after construction.

use std::env;
use std::time::Duration;

use crate::models::TaskKind;
use crate::validation::is_http_url;

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_API_PREFIX: &str = "api";
const REQUEST_TIMEOUT_SECS: u64 = 60;
const POLL_INTERVAL_MS: u64 = 1000;
const CONTENT_MAX_ATTEMPTS: u32 = 30;
const DOCUMENT_MAX_ATTEMPTS: u32 = 30;
const TUTORIAL_MAX_ATTEMPTS: u32 = 60;
const PAGE_SIZE: u64 = 50;
const CONTENT_COLLECTIONS: &str = "articles_content,youtube_content";
const SEARCH_COLLECTIONS: &str = "articles_content,youtube_content,tutorials";
const DOCUMENT_COLLECTION: &str = "documents";

/// Client configuration
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Backend base URL, without the API prefix
    pub api_url: String,
    /// Path prefix inserted before every endpoint (e.g. "api")
    pub api_prefix: String,
    pub request_timeout: Duration,
    /// Fixed delay between two status requests
    pub poll_interval: Duration,
    pub content_max_attempts: u32,
    pub document_max_attempts: u32,
    pub tutorial_max_attempts: u32,
    /// Page size used by the incremental list views
    pub page_size: u64,
    /// Collections listed by the content grid
    pub content_collections: Vec<String>,
    /// Collections queried when searching "all"
    pub search_collections: Vec<String>,
    pub document_collection: String,
    pub environment: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            poll_interval: Duration::from_millis(POLL_INTERVAL_MS),
            content_max_attempts: CONTENT_MAX_ATTEMPTS,
            document_max_attempts: DOCUMENT_MAX_ATTEMPTS,
            tutorial_max_attempts: TUTORIAL_MAX_ATTEMPTS,
            page_size: PAGE_SIZE,
            content_collections: split_list(CONTENT_COLLECTIONS),
            search_collections: split_list(SEARCH_COLLECTIONS),
            document_collection: DOCUMENT_COLLECTION.to_string(),
            environment: "development".to_string(),
        }
    }
}

impl ClientConfig {
    /// Build a configuration pointing at the given backend, with defaults elsewhere.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Self::default()
        }
    }

    /// Load configuration from the process environment (and `.env` if present).
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_url = lookup("KMANAGER_API_URL")
            .or_else(|| lookup("API_URL"))
            .unwrap_or(defaults.api_url);

        let api_prefix = lookup("KMANAGER_API_PREFIX").unwrap_or(defaults.api_prefix);

        let request_timeout_secs = parse_or(
            &lookup,
            "KMANAGER_REQUEST_TIMEOUT_SECS",
            REQUEST_TIMEOUT_SECS,
        )?;
        let poll_interval_ms = parse_or(&lookup, "KMANAGER_POLL_INTERVAL_MS", POLL_INTERVAL_MS)?;

        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or(defaults.environment);

        let config = Self {
            api_url: api_url.trim().trim_end_matches('/').to_string(),
            api_prefix: api_prefix.trim().trim_matches('/').to_string(),
            request_timeout: Duration::from_secs(request_timeout_secs),
            poll_interval: Duration::from_millis(poll_interval_ms),
            content_max_attempts: parse_or(
                &lookup,
                "KMANAGER_CONTENT_MAX_ATTEMPTS",
                CONTENT_MAX_ATTEMPTS,
            )?,
            document_max_attempts: parse_or(
                &lookup,
                "KMANAGER_DOCUMENT_MAX_ATTEMPTS",
                DOCUMENT_MAX_ATTEMPTS,
            )?,
            tutorial_max_attempts: parse_or(
                &lookup,
                "KMANAGER_TUTORIAL_MAX_ATTEMPTS",
                TUTORIAL_MAX_ATTEMPTS,
            )?,
            page_size: parse_or(&lookup, "KMANAGER_PAGE_SIZE", PAGE_SIZE)?,
            content_collections: lookup("KMANAGER_CONTENT_COLLECTIONS")
                .map(|s| split_list(&s))
                .unwrap_or(defaults.content_collections),
            search_collections: lookup("KMANAGER_SEARCH_COLLECTIONS")
                .map(|s| split_list(&s))
                .unwrap_or(defaults.search_collections),
            document_collection: lookup("KMANAGER_DOCUMENT_COLLECTION")
                .unwrap_or(defaults.document_collection),
            environment,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !is_http_url(&self.api_url) {
            return Err(anyhow::anyhow!(
                "KMANAGER_API_URL must be an http(s) URL, got '{}'",
                self.api_url
            ));
        }

        if self.content_max_attempts == 0
            || self.document_max_attempts == 0
            || self.tutorial_max_attempts == 0
        {
            return Err(anyhow::anyhow!(
                "Polling attempt ceilings must be greater than zero"
            ));
        }

        if self.page_size == 0 {
            return Err(anyhow::anyhow!("KMANAGER_PAGE_SIZE must be greater than zero"));
        }

        if self.content_collections.is_empty() || self.search_collections.is_empty() {
            return Err(anyhow::anyhow!(
                "KMANAGER_CONTENT_COLLECTIONS and KMANAGER_SEARCH_COLLECTIONS must not be empty"
            ));
        }

        Ok(())
    }

    /// Check if the client targets a production deployment
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// Attempt ceiling for the given kind of backend task
    pub fn max_attempts(&self, kind: TaskKind) -> u32 {
        match kind {
            TaskKind::Content => self.content_max_attempts,
            TaskKind::Document => self.document_max_attempts,
            TaskKind::Tutorial => self.tutorial_max_attempts,
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, anyhow::Error>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a valid number, got '{}'", key, raw)),
        None => Ok(default),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
