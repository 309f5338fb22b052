//! Response types for Email API operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Delivery status of a send operation.
///
/// The service's long-running-operation names are accepted as aliases.
/// Unrecognized values become [`EmailStatus::Unknown`], which is not terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmailStatus {
    /// Accepted and waiting to be processed.
    #[serde(alias = "NotStarted")]
    Queued,
    /// Being delivered.
    #[serde(alias = "Running")]
    OutForDelivery,
    /// Delivered to the recipients' mail servers.
    #[serde(alias = "Succeeded")]
    Delivered,
    /// Delivery failed.
    Failed,
    /// The operation was canceled.
    #[serde(alias = "Cancelled")]
    Canceled,
    /// A status this client does not recognize.
    #[serde(other)]
    Unknown,
}

impl EmailStatus {
    /// Check whether no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EmailStatus::Delivered | EmailStatus::Failed | EmailStatus::Canceled
        )
    }

    /// Canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailStatus::Queued => "Queued",
            EmailStatus::OutForDelivery => "OutForDelivery",
            EmailStatus::Delivered => "Delivered",
            EmailStatus::Failed => "Failed",
            EmailStatus::Canceled => "Canceled",
            EmailStatus::Unknown => "Unknown",
        }
    }
}

impl Default for EmailStatus {
    fn default() -> Self {
        EmailStatus::Queued
    }
}

impl fmt::Display for EmailStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured error reported by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code.
    pub code: String,
    /// Human readable message.
    pub message: String,
    /// Field the error refers to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Nested details.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ApiError>,
}

/// Result of submitting a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendResponse {
    /// Operation id used to poll for status.
    pub id: String,
    /// Initial status.
    #[serde(default)]
    pub status: EmailStatus,
    /// Error reported with the submission, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

/// Status of a send operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Operation id.
    pub id: String,
    /// Current status.
    pub status: EmailStatus,
    /// Error details for failed operations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    /// When this client received the status.
    #[serde(skip, default = "Utc::now")]
    pub received_at: DateTime<Utc>,
}

impl StatusResponse {
    /// Create a status snapshot received now.
    pub fn new(id: impl Into<String>, status: EmailStatus) -> Self {
        Self {
            id: id.into(),
            status,
            error: None,
            received_at: Utc::now(),
        }
    }

    /// Check whether the status is terminal.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Queued", EmailStatus::Queued)]
    #[case("NotStarted", EmailStatus::Queued)]
    #[case("OutForDelivery", EmailStatus::OutForDelivery)]
    #[case("Running", EmailStatus::OutForDelivery)]
    #[case("Delivered", EmailStatus::Delivered)]
    #[case("Succeeded", EmailStatus::Delivered)]
    #[case("Failed", EmailStatus::Failed)]
    #[case("Canceled", EmailStatus::Canceled)]
    #[case("SomethingNew", EmailStatus::Unknown)]
    fn test_status_deserialization(#[case] wire: &str, #[case] expected: EmailStatus) {
        let status: EmailStatus = serde_json::from_value(serde_json::json!(wire)).unwrap();
        assert_eq!(status, expected);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(EmailStatus::Delivered.is_terminal());
        assert!(EmailStatus::Failed.is_terminal());
        assert!(EmailStatus::Canceled.is_terminal());
        assert!(!EmailStatus::Queued.is_terminal());
        assert!(!EmailStatus::OutForDelivery.is_terminal());
        assert!(!EmailStatus::Unknown.is_terminal());
    }

    #[test]
    fn test_status_response_deserialization() {
        let body = r#"{"id":"op-1","status":"Failed","error":{"code":"Bounced","message":"mailbox full"}}"#;
        let status: StatusResponse = serde_json::from_str(body).unwrap();
        assert_eq!(status.id, "op-1");
        assert!(status.is_terminal());
        assert_eq!(status.error.unwrap().code, "Bounced");
    }

    #[test]
    fn test_send_response_defaults_to_queued() {
        let response: SendResponse = serde_json::from_str(r#"{"id":"op-1"}"#).unwrap();
        assert_eq!(response.status, EmailStatus::Queued);
    }
}
