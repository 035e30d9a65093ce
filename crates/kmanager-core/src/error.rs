//! Error types module
//!
//! Every failure the client can surface is unified under `ClientError`: transport
//! failures, HTTP error statuses, malformed payloads, backend task failures, polling
//! timeouts and local validation. None of them is fatal; the view layer shows the
//! `client_message()` inline and lets the user retry.

use std::io;

use crate::models::TaskKind;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like timeouts
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata describing how an error should be presented to the user
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "NETWORK_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether submitting the same request again may succeed
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the user
    fn suggested_action(&self) -> Option<&'static str>;

    /// Inline, user-visible message
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API request failed with status {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Invalid response from {endpoint}: {message}")]
    Parse { endpoint: String, message: String },

    #[error("{message}")]
    TaskFailed { task_id: String, message: String },

    #[error("{kind} timed out after {attempts} attempts")]
    Timeout {
        task_id: String,
        kind: TaskKind,
        attempts: u32,
    },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<io::Error> for ClientError {
    fn from(err: io::Error) -> Self {
        ClientError::Io(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(err: validator::ValidationErrors) -> Self {
        ClientError::Validation(err.to_string())
    }
}

impl ClientError {
    /// HTTP status code reported by the backend, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ClientError::Cancelled)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Timeout { .. })
    }

    /// Build a parse error for the given endpoint
    pub fn parse(endpoint: impl Into<String>, message: impl ToString) -> Self {
        ClientError::Parse {
            endpoint: endpoint.into(),
            message: message.to_string(),
        }
    }
}

/// Static metadata for each variant: (error_code, recoverable, suggested_action, log_level).
fn client_error_static_metadata(
    err: &ClientError,
) -> (&'static str, bool, Option<&'static str>, LogLevel) {
    match err {
        ClientError::Network(_) => (
            "NETWORK_ERROR",
            true,
            Some("Check that the API server is reachable and retry"),
            LogLevel::Error,
        ),
        ClientError::Http { status, .. } if *status >= 500 => (
            "SERVER_ERROR",
            true,
            Some("Retry after a short delay"),
            LogLevel::Error,
        ),
        ClientError::Http { status: 404, .. } => (
            "NOT_FOUND",
            false,
            Some("Verify the resource ID exists"),
            LogLevel::Debug,
        ),
        ClientError::Http { .. } => (
            "REQUEST_REJECTED",
            false,
            Some("Check request parameters and try again"),
            LogLevel::Warn,
        ),
        ClientError::Parse { .. } => (
            "INVALID_RESPONSE",
            false,
            Some("Check that the client and API server versions match"),
            LogLevel::Error,
        ),
        ClientError::TaskFailed { .. } => (
            "TASK_FAILED",
            true,
            Some("Submit the request again"),
            LogLevel::Warn,
        ),
        ClientError::Timeout { .. } => (
            "TASK_TIMEOUT",
            true,
            Some("The task may still finish; submit again later"),
            LogLevel::Warn,
        ),
        ClientError::Validation(_) => (
            "INVALID_INPUT",
            false,
            Some("Correct the input and try again"),
            LogLevel::Debug,
        ),
        ClientError::Cancelled => ("CANCELLED", true, None, LogLevel::Debug),
        ClientError::Config(_) => (
            "CONFIGURATION_ERROR",
            false,
            Some("Check the KMANAGER_* environment variables"),
            LogLevel::Error,
        ),
        ClientError::Io(_) => (
            "IO_ERROR",
            false,
            Some("Check the file path and permissions"),
            LogLevel::Warn,
        ),
    }
}

impl ErrorMetadata for ClientError {
    fn error_code(&self) -> &'static str {
        client_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        client_error_static_metadata(self).1
    }

    fn suggested_action(&self) -> Option<&'static str> {
        client_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        client_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            ClientError::Network(_) => self.to_string(),
            ClientError::Http { message, .. } => message.clone(),
            ClientError::Parse { .. } => {
                "Received an unexpected response from the server".to_string()
            }
            // Backend failure messages are surfaced verbatim
            ClientError::TaskFailed { message, .. } => message.clone(),
            ClientError::Timeout { .. } => self.to_string(),
            ClientError::Validation(msg) => msg.clone(),
            ClientError::Cancelled => self.to_string(),
            ClientError::Config(msg) => msg.clone(),
            ClientError::Io(msg) => msg.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_server_error() {
        let err = ClientError::Http {
            status: 503,
            message: "Service unavailable".to_string(),
        };
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.error_code(), "SERVER_ERROR");
        assert!(err.is_recoverable());
        assert_eq!(err.client_message(), "Service unavailable");
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_error_metadata_not_found() {
        let err = ClientError::Http {
            status: 404,
            message: "Task not found".to_string(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert!(!err.is_recoverable());
        assert_eq!(
            err.suggested_action(),
            Some("Verify the resource ID exists")
        );
    }

    #[test]
    fn test_task_failed_message_is_verbatim() {
        let err = ClientError::TaskFailed {
            task_id: "t-1".to_string(),
            message: "Could not extract article text".to_string(),
        };
        assert_eq!(err.to_string(), "Could not extract article text");
        assert_eq!(err.client_message(), "Could not extract article text");
    }

    #[test]
    fn test_timeout_message_names_operation() {
        let err = ClientError::Timeout {
            task_id: "t-2".to_string(),
            kind: TaskKind::Tutorial,
            attempts: 60,
        };
        assert!(err.is_timeout());
        assert_eq!(
            err.client_message(),
            "Tutorial generation timed out after 60 attempts"
        );
        assert_eq!(err.log_level(), LogLevel::Warn);
    }

    #[test]
    fn test_parse_error_hides_details_from_user() {
        let err = ClientError::parse("content/abc", "missing field `chunks`");
        assert!(err.to_string().contains("missing field `chunks`"));
        assert_eq!(
            err.client_message(),
            "Received an unexpected response from the server"
        );
        assert_eq!(err.error_code(), "INVALID_RESPONSE");
    }

    #[test]
    fn test_io_error_conversion() {
        let err: ClientError = io::Error::new(io::ErrorKind::NotFound, "no such file").into();
        assert!(matches!(err, ClientError::Io(_)));
        assert!(!err.is_recoverable());
    }
}
