//! URL and form-field validation run before anything is sent to the backend.

use validator::ValidateUrl;

/// Validate that `url` is a well-formed absolute http(s) URL with a host.
pub fn validate_http_url(url: &str) -> Result<(), String> {
    let url = url.trim();
    if url.is_empty() {
        return Err("URL is required".to_string());
    }

    let rest = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))
        .ok_or_else(|| "URL must start with http:// or https://".to_string())?;

    if !url.validate_url() {
        return Err(format!("'{}' is not a valid URL", url));
    }

    // authority ends at the first path, query or fragment delimiter
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host = authority.rsplit('@').next().unwrap_or_default();
    if host.is_empty() || host.starts_with(':') {
        return Err("URL must have a host".to_string());
    }

    Ok(())
}

pub fn is_http_url(url: &str) -> bool {
    validate_http_url(url).is_ok()
}

/// Reject empty or whitespace-only form fields.
pub fn validate_non_empty(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} is required", field));
    }
    Ok(())
}
