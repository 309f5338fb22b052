//! Tracked send operation.

use chrono::{DateTime, Utc};

use super::responses::{ApiError, EmailStatus, SendResponse, StatusResponse};

/// A send operation whose status only moves forward.
///
/// Status rank is `Queued < OutForDelivery < {Delivered, Failed, Canceled}`.
/// Updates that would lower the rank are ignored, and nothing changes once a
/// terminal status has been recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    id: String,
    status: EmailStatus,
    last_error: Option<ApiError>,
    last_seen: Option<DateTime<Utc>>,
}

fn rank(status: EmailStatus) -> u8 {
    match status {
        EmailStatus::Unknown | EmailStatus::Queued => 0,
        EmailStatus::OutForDelivery => 1,
        EmailStatus::Delivered | EmailStatus::Failed | EmailStatus::Canceled => 2,
    }
}

impl Operation {
    /// Track an operation id the caller already holds.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: EmailStatus::Queued,
            last_error: None,
            last_seen: None,
        }
    }

    /// Track the operation created by a send.
    pub fn from_send(response: &SendResponse) -> Self {
        let mut operation = Self::new(response.id.clone());
        if response.status != EmailStatus::Unknown {
            operation.status = response.status;
        }
        operation.last_error = response.error.clone();
        operation
    }

    /// Operation id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current status.
    pub fn status(&self) -> EmailStatus {
        self.status
    }

    /// Most recent error reported by the service.
    pub fn last_error(&self) -> Option<&ApiError> {
        self.last_error.as_ref()
    }

    /// When the last accepted update was received.
    pub fn last_seen(&self) -> Option<DateTime<Utc>> {
        self.last_seen
    }

    /// Check whether the operation has finished.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Record a status update.
    ///
    /// Returns `true` if the update was accepted. Unknown statuses are
    /// accepted as a sighting but leave the status unchanged.
    ///
    /// # Example
    ///
    /// ```
    /// use integrations_azure_email::types::{EmailStatus, Operation, StatusResponse};
    ///
    /// let mut op = Operation::new("op-1");
    /// assert!(op.apply(&StatusResponse::new("op-1", EmailStatus::Delivered)));
    /// assert!(!op.apply(&StatusResponse::new("op-1", EmailStatus::Queued)));
    /// assert_eq!(op.status(), EmailStatus::Delivered);
    /// ```
    pub fn apply(&mut self, update: &StatusResponse) -> bool {
        if self.is_terminal() || update.id != self.id {
            return false;
        }

        if update.status != EmailStatus::Unknown {
            if rank(update.status) < rank(self.status) {
                return false;
            }
            self.status = update.status;
        }

        if update.error.is_some() {
            self.last_error = update.error.clone();
        }
        self.last_seen = Some(update.received_at);
        true
    }
}
