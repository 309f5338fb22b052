//! Error types for the Azure Communication Services Email client.
//!
//! Every fallible operation in the crate returns [`EmailResult`], whose error
//! side is the single [`EmailError`] enum. Concern-specific errors
//! ([`ConfigError`], [`SigningError`], [`BuilderError`]) convert into it via
//! `From`, so `?` works across module boundaries.
//!
//! # Error Categories
//!
//! - Local failures: configuration, signing, serialization, message validation
//! - Transport failures: network, timeout, or an HTTP status without a usable body
//! - Remote failures: structured API errors returned by the service
//! - Terminal outcomes of the retry policy and the status poller
//!
//! # Examples
//!
//! ```rust
//! use integrations_azure_email::error::EmailError;
//!
//! fn describe(error: &EmailError) {
//!     if error.is_retryable() {
//!         println!("transient failure");
//!     }
//!     if let Some(code) = error.error_code() {
//!         println!("service error code: {}", code);
//!     }
//!     if let Some(status) = error.last_status() {
//!         println!("last known status: {}", status.status);
//!     }
//! }
//! ```

mod mapping;

pub use mapping::{body_excerpt, map_error_response, parse_error_body, parse_retry_after};

use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::builders::BuilderError;
use crate::config::ConfigError;
use crate::signing::SigningError;
use crate::types::{ApiError, StatusResponse};

/// Result type alias used throughout the crate.
pub type EmailResult<T> = Result<T, EmailError>;

/// What went wrong at the transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Connection, DNS or TLS failure before a response arrived.
    Network,
    /// The per-call timeout elapsed.
    Timeout,
    /// The service answered with an error status and no structured body.
    Status,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportErrorKind::Network => write!(f, "network"),
            TransportErrorKind::Timeout => write!(f, "timeout"),
            TransportErrorKind::Status => write!(f, "status"),
        }
    }
}

/// Top-level error type for the email client.
#[derive(Debug, Error)]
pub enum EmailError {
    /// Credential or client configuration problem.
    ///
    /// Raised before any network call is made.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
        /// Optional underlying error source.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The request could not be signed, typically a malformed access key.
    #[error("Signing error: {message}")]
    Signing {
        /// Description of the signing error.
        message: String,
    },

    /// Failure below the API layer.
    #[error("Transport error ({kind}): {message}")]
    Transport {
        /// Failure category.
        kind: TransportErrorKind,
        /// Description, or an excerpt of the response body for `Status`.
        message: String,
        /// HTTP status when a response was received.
        status: Option<u16>,
        /// Server supplied retry hint from the response headers.
        retry_after: Option<Duration>,
        /// Optional underlying error source.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Structured error returned by the service.
    #[error("Service error {status} ({code}): {message}")]
    Remote {
        /// Service error code, e.g. `InvalidRequest`.
        code: String,
        /// Human readable message from the service.
        message: String,
        /// HTTP status of the response.
        status: u16,
        /// Field the error refers to, when reported.
        target: Option<String>,
        /// Nested error details.
        details: Vec<ApiError>,
        /// Value of `x-ms-request-id` on the failed response.
        request_id: Option<String>,
        /// Server supplied retry hint.
        retry_after: Option<Duration>,
    },

    /// JSON encoding or decoding failed, or a response lacked required data.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Description of the serialization error.
        message: String,
    },

    /// The message failed local validation.
    #[error("Message validation failed: {0}")]
    Builder(#[from] BuilderError),

    /// Every attempt allowed by the retry policy failed with a transient error.
    #[error("Request failed after {attempts} attempts: {last_error}")]
    RetryExhausted {
        /// Number of attempts made.
        attempts: u32,
        /// Error from the final attempt.
        #[source]
        last_error: Box<EmailError>,
    },

    /// The status poller reached its deadline before a terminal status.
    #[error("Operation {operation_id} did not complete within {max_wait:?}")]
    PollTimeout {
        /// Operation being polled.
        operation_id: String,
        /// Configured maximum wait.
        max_wait: Duration,
        /// Last status observed, if any.
        last_status: Option<Box<StatusResponse>>,
    },

    /// The caller cancelled the status poller.
    #[error("Polling of operation {operation_id} was canceled")]
    PollCanceled {
        /// Operation being polled.
        operation_id: String,
        /// Last status observed, if any.
        last_status: Option<Box<StatusResponse>>,
    },

    /// The status poller stopped on a fatal error.
    #[error("Polling of operation {operation_id} failed: {source}")]
    PollFailed {
        /// Operation being polled.
        operation_id: String,
        /// Last status observed, if any.
        last_status: Option<Box<StatusResponse>>,
        /// The fatal error.
        #[source]
        source: Box<EmailError>,
    },
}

impl EmailError {
    /// Create a configuration error without a source.
    pub fn configuration(message: impl Into<String>) -> Self {
        EmailError::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        EmailError::Serialization {
            message: message.into(),
        }
    }

    /// Create a network transport error.
    pub fn network(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        EmailError::Transport {
            kind: TransportErrorKind::Network,
            message: message.into(),
            status: None,
            retry_after: None,
            source,
        }
    }

    /// Create a timeout transport error.
    pub fn timeout(message: impl Into<String>) -> Self {
        EmailError::Transport {
            kind: TransportErrorKind::Timeout,
            message: message.into(),
            status: None,
            retry_after: None,
            source: None,
        }
    }

    /// Create a status transport error from an unparseable error response.
    pub fn http_status(status: u16, excerpt: impl Into<String>) -> Self {
        EmailError::Transport {
            kind: TransportErrorKind::Status,
            message: excerpt.into(),
            status: Some(status),
            retry_after: None,
            source: None,
        }
    }

    /// Attach a server retry hint to a status transport or remote error.
    pub fn with_retry_after(mut self, hint: Option<Duration>) -> Self {
        match &mut self {
            EmailError::Transport { retry_after, .. } | EmailError::Remote { retry_after, .. } => {
                *retry_after = hint;
            }
            _ => {}
        }
        self
    }

    /// Check if the error is transient and worth another attempt.
    ///
    /// Network and timeout failures are retryable, as are HTTP 429 and 5xx
    /// responses whether or not they carried a structured body.
    pub fn is_retryable(&self) -> bool {
        match self {
            EmailError::Transport { kind, status, .. } => match kind {
                TransportErrorKind::Network | TransportErrorKind::Timeout => true,
                TransportErrorKind::Status => status.map_or(false, is_transient_status),
            },
            EmailError::Remote { status, .. } => is_transient_status(*status),
            _ => false,
        }
    }

    /// Check if the status poller must stop on this error.
    ///
    /// Signing and configuration errors are fatal, as is any HTTP 4xx
    /// other than 408 and 429 (for example 404 for an unknown operation).
    pub fn is_fatal_for_poll(&self) -> bool {
        match self.root_cause() {
            EmailError::Configuration { .. } | EmailError::Signing { .. } => true,
            other => matches!(
                other.status_code(),
                Some(status) if (400..500).contains(&status) && status != 408 && status != 429
            ),
        }
    }

    /// HTTP status associated with the error, looking through retry wrappers.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            EmailError::Transport { status, .. } => *status,
            EmailError::Remote { status, .. } => Some(*status),
            EmailError::RetryExhausted { last_error, .. } => last_error.status_code(),
            EmailError::PollFailed { source, .. } => source.status_code(),
            _ => None,
        }
    }

    /// Service error code, when the service returned a structured error.
    pub fn error_code(&self) -> Option<&str> {
        match self.root_cause() {
            EmailError::Remote { code, .. } => Some(code.as_str()),
            _ => None,
        }
    }

    /// Server supplied retry hint.
    pub fn retry_after(&self) -> Option<Duration> {
        match self.root_cause() {
            EmailError::Remote { retry_after, .. }
            | EmailError::Transport { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Last status snapshot carried by a poller outcome.
    pub fn last_status(&self) -> Option<&StatusResponse> {
        match self {
            EmailError::PollTimeout { last_status, .. }
            | EmailError::PollCanceled { last_status, .. }
            | EmailError::PollFailed { last_status, .. } => last_status.as_deref(),
            _ => None,
        }
    }

    /// The innermost error, unwrapping retry exhaustion and poll failure.
    pub fn root_cause(&self) -> &EmailError {
        match self {
            EmailError::RetryExhausted { last_error, .. } => last_error.root_cause(),
            EmailError::PollFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// HTTP 429 and every 5xx are worth retrying.
pub(crate) fn is_transient_status(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

impl From<ConfigError> for EmailError {
    fn from(err: ConfigError) -> Self {
        EmailError::Configuration {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<SigningError> for EmailError {
    fn from(err: SigningError) -> Self {
        EmailError::Signing {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for EmailError {
    fn from(err: serde_json::Error) -> Self {
        EmailError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for EmailError {
    fn from(err: url::ParseError) -> Self {
        EmailError::Configuration {
            message: format!("Invalid URL: {}", err),
            source: Some(Box::new(err)),
        }
    }
}

impl From<reqwest::Error> for EmailError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            EmailError::timeout(err.to_string())
        } else {
            EmailError::network(err.to_string(), Some(Box::new(err)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EmailStatus;
    use rstest::rstest;

    fn remote(status: u16) -> EmailError {
        EmailError::Remote {
            code: "Code".to_string(),
            message: "message".to_string(),
            status,
            target: None,
            details: Vec::new(),
            request_id: None,
            retry_after: None,
        }
    }

    #[rstest]
    #[case(429, true)]
    #[case(500, true)]
    #[case(503, true)]
    #[case(400, false)]
    #[case(401, false)]
    #[case(404, false)]
    fn test_remote_retryable_by_status(#[case] status: u16, #[case] expected: bool) {
        assert_eq!(remote(status).is_retryable(), expected);
        assert_eq!(EmailError::http_status(status, "oops").is_retryable(), expected);
    }

    #[test]
    fn test_transport_kinds_retryable() {
        assert!(EmailError::network("reset", None).is_retryable());
        assert!(EmailError::timeout("slow").is_retryable());
        assert!(!EmailError::configuration("bad").is_retryable());
        assert!(!EmailError::serialization("bad json").is_retryable());
        assert!(!EmailError::Signing {
            message: "bad key".to_string()
        }
        .is_retryable());
    }

    #[test]
    fn test_retry_exhausted_is_not_retryable() {
        let err = EmailError::RetryExhausted {
            attempts: 4,
            last_error: Box::new(remote(503)),
        };
        assert!(!err.is_retryable());
        assert_eq!(err.status_code(), Some(503));
        assert_eq!(err.error_code(), Some("Code"));
    }

    #[rstest]
    #[case(404, true)]
    #[case(400, true)]
    #[case(403, true)]
    #[case(408, false)]
    #[case(429, false)]
    #[case(500, false)]
    fn test_fatal_for_poll(#[case] status: u16, #[case] expected: bool) {
        assert_eq!(remote(status).is_fatal_for_poll(), expected);
    }

    #[test]
    fn test_local_errors_fatal_for_poll() {
        assert!(EmailError::configuration("bad").is_fatal_for_poll());
        assert!(EmailError::Signing {
            message: "bad".to_string()
        }
        .is_fatal_for_poll());
        assert!(!EmailError::network("down", None).is_fatal_for_poll());

        let exhausted = EmailError::RetryExhausted {
            attempts: 4,
            last_error: Box::new(remote(503)),
        };
        assert!(!exhausted.is_fatal_for_poll());
    }

    #[test]
    fn test_last_status() {
        let status = StatusResponse::new("op-1", EmailStatus::OutForDelivery);
        let err = EmailError::PollTimeout {
            operation_id: "op-1".to_string(),
            max_wait: Duration::from_secs(1),
            last_status: Some(Box::new(status.clone())),
        };
        assert_eq!(err.last_status(), Some(&status));
        assert!(remote(500).last_status().is_none());
    }

    #[test]
    fn test_display() {
        let err = remote(400);
        assert_eq!(err.to_string(), "Service error 400 (Code): message");
        assert_eq!(
            EmailError::http_status(502, "bad gateway").to_string(),
            "Transport error (status): bad gateway"
        );
    }

    #[test]
    fn test_config_error_conversion() {
        let err: EmailError = ConfigError::MissingField {
            field: "endpoint".to_string(),
        }
        .into();
        assert!(matches!(err, EmailError::Configuration { .. }));
        assert!(err.to_string().contains("endpoint"));
    }
}
