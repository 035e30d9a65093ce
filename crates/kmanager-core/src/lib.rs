//! kmanager Core Library
//!
//! This crate provides the domain models, error types, configuration, and validation
//! shared by the API client and the command-line front end.

pub mod config;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, ErrorMetadata, LogLevel};
