//! Error response mapping for the Communication Services Email API.
//!
//! The service reports failures either wrapped in an `error` object or as a
//! bare error document:
//!
//! ```json
//! {
//!   "error": {
//!     "code": "InvalidRequest",
//!     "message": "The sender address is not valid",
//!     "target": "senderAddress"
//!   }
//! }
//! ```
//!
//! Bodies that match neither shape become [`EmailError::Transport`] with
//! kind `Status` and a truncated excerpt of the body.

use super::EmailError;
use crate::types::ApiError;
use serde::Deserialize;
use std::time::Duration;

/// Maximum number of characters kept from an unparseable error body.
const EXCERPT_LIMIT: usize = 256;

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorEnvelope {
    Wrapped { error: ApiError },
    Bare(ApiError),
}

/// Parse a structured error document from a response body.
///
/// Returns `None` when the body is not JSON or lacks `code` and `message`.
///
/// # Examples
///
/// ```rust
/// use integrations_azure_email::error::parse_error_body;
///
/// let body = br#"{"error":{"code":"NotFound","message":"missing"}}"#;
/// let error = parse_error_body(body).unwrap();
/// assert_eq!(error.code, "NotFound");
/// ```
pub fn parse_error_body(body: &[u8]) -> Option<ApiError> {
    match serde_json::from_slice::<ErrorEnvelope>(body).ok()? {
        ErrorEnvelope::Wrapped { error } => Some(error),
        ErrorEnvelope::Bare(error) => Some(error),
    }
}

/// Map a non-success response to an [`EmailError`].
///
/// # Arguments
///
/// * `status` - HTTP status code of the response
/// * `body` - Raw response body
/// * `request_id` - Value of the `x-ms-request-id` header, if present
/// * `retry_after` - Parsed retry hint, if present
pub fn map_error_response(
    status: u16,
    body: &[u8],
    request_id: Option<String>,
    retry_after: Option<Duration>,
) -> EmailError {
    match parse_error_body(body) {
        Some(error) => EmailError::Remote {
            code: error.code,
            message: error.message,
            status,
            target: error.target,
            details: error.details,
            request_id,
            retry_after,
        },
        None => EmailError::http_status(status, body_excerpt(body)).with_retry_after(retry_after),
    }
}

/// Lossy UTF-8 rendering of a body, truncated to 256 characters.
pub fn body_excerpt(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let trimmed = text.trim();
    if trimmed.chars().count() <= EXCERPT_LIMIT {
        return trimmed.to_string();
    }
    let mut excerpt: String = trimmed.chars().take(EXCERPT_LIMIT).collect();
    excerpt.push_str("...");
    excerpt
}

/// Parse a `Retry-After` header expressed in whole seconds.
///
/// HTTP-date values are not used by this service and yield `None`.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}
