//! Validation modules

pub mod url;

pub use url::{is_http_url, validate_http_url, validate_non_empty};
