//! Builders for constructing email messages.
//!
//! # Examples
//!
//! ```rust
//! use integrations_azure_email::builders::MessageBuilder;
//!
//! let message = MessageBuilder::new()
//!     .from("sender@example.com")
//!     .to(("recipient@example.com", "Recipient"))
//!     .subject("Hello World")
//!     .plain_text("This is a plain text email")
//!     .html("<p>This is an HTML email</p>")
//!     .build()?;
//! # Ok::<(), integrations_azure_email::builders::BuilderError>(())
//! ```

mod email_builder;

pub use email_builder::MessageBuilder;

use std::fmt;
use thiserror::Error;

/// Error type for builder operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuilderError {
    /// The message failed validation. Every problem found is listed.
    #[error("Invalid message: {}", .problems.join("; "))]
    Invalid {
        /// Human readable problems, in the order they were found.
        problems: Vec<String>,
    },

    /// A required field is missing.
    #[error("Missing required field: {field}")]
    MissingField {
        /// The name of the missing field.
        field: String,
    },
}

impl BuilderError {
    /// Create a new missing field error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Problems carried by the error.
    pub fn problems(&self) -> Vec<String> {
        match self {
            Self::Invalid { problems } => problems.clone(),
            other => vec![other.to_string()],
        }
    }
}

/// Which recipient list an address goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecipientKind {
    /// Primary recipients.
    To,
    /// Carbon copy.
    Cc,
    /// Blind carbon copy.
    Bcc,
}

impl fmt::Display for RecipientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecipientKind::To => "to",
            RecipientKind::Cc => "cc",
            RecipientKind::Bcc => "bcc",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_error_missing_field() {
        let error = BuilderError::missing_field("from");
        assert_eq!(error.to_string(), "Missing required field: from");
    }

    #[test]
    fn test_missing_field_is_single_problem() {
        let error = BuilderError::missing_field("subject");
        assert_eq!(error.problems(), vec!["Missing required field: subject".to_string()]);
    }

    #[test]
    fn test_invalid_lists_every_problem() {
        let error = BuilderError::Invalid {
            problems: vec!["sender is required".into(), "subject is required".into()],
        };
        assert_eq!(
            error.to_string(),
            "Invalid message: sender is required; subject is required"
        );
        assert_eq!(error.problems().len(), 2);
    }
}
