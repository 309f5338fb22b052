//! Email message types.
//!
//! These serialize to the JSON payload accepted by `POST /emails:send`.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

/// An email address with an optional display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailAddress {
    /// The address, e.g. `user@example.com`.
    pub address: String,
    /// Display name. Empty names are never serialized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl EmailAddress {
    /// Create an address without a display name.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            display_name: None,
        }
    }

    /// Create an address with a display name.
    ///
    /// # Example
    ///
    /// ```
    /// use integrations_azure_email::types::EmailAddress;
    ///
    /// let addr = EmailAddress::with_name("user@example.com", "");
    /// assert_eq!(addr.display_name, None);
    /// ```
    pub fn with_name(address: impl Into<String>, display_name: impl Into<String>) -> Self {
        let display_name = display_name.into();
        Self {
            address: address.into(),
            display_name: if display_name.trim().is_empty() {
                None
            } else {
                Some(display_name)
            },
        }
    }

    /// Format as `Name <address>` or just the address.
    pub fn format(&self) -> String {
        match &self.display_name {
            Some(name) => format!("{} <{}>", name, self.address),
            None => self.address.clone(),
        }
    }
}

impl From<String> for EmailAddress {
    fn from(address: String) -> Self {
        Self::new(address)
    }
}

impl From<&str> for EmailAddress {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

impl<A: Into<String>, N: Into<String>> From<(A, N)> for EmailAddress {
    fn from((address, name): (A, N)) -> Self {
        Self::with_name(address, name)
    }
}

/// Subject and body of a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailContent {
    /// Subject line.
    pub subject: String,
    /// Plain text body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plain_text: Option<String>,
    /// HTML body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

/// Message recipients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailRecipients {
    /// Primary recipients.
    #[serde(default)]
    pub to: Vec<EmailAddress>,
    /// Carbon copy recipients.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cc: Vec<EmailAddress>,
    /// Blind carbon copy recipients.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bcc: Vec<EmailAddress>,
}

impl EmailRecipients {
    /// Total number of recipients across all lists.
    pub fn count(&self) -> usize {
        self.to.len() + self.cc.len() + self.bcc.len()
    }

    /// Iterate over every recipient.
    pub fn iter(&self) -> impl Iterator<Item = &EmailAddress> {
        self.to.iter().chain(self.cc.iter()).chain(self.bcc.iter())
    }
}

/// A file attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailAttachment {
    /// File name shown to recipients.
    pub name: String,
    /// MIME type, e.g. `application/pdf`.
    pub content_type: String,
    /// Base64 encoded content.
    pub content_in_base64: String,
}

impl EmailAttachment {
    /// Create an attachment from raw bytes.
    pub fn from_bytes(
        name: impl Into<String>,
        content_type: impl Into<String>,
        content: &[u8],
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            content_in_base64: STANDARD.encode(content),
        }
    }
}

/// A complete message ready to send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailMessage {
    /// Verified sender address.
    pub sender_address: String,
    /// Subject and body.
    pub content: EmailContent,
    /// Recipients.
    pub recipients: EmailRecipients,
    /// Reply-to addresses.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reply_to: Vec<EmailAddress>,
    /// Attachments.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<EmailAttachment>,
    /// Disable open and click tracking for this message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_engagement_tracking_disabled: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_address_serialization_omits_empty_name() {
        let addr = EmailAddress::with_name("user@example.com", "");
        assert_eq!(
            serde_json::to_value(&addr).unwrap(),
            json!({"address": "user@example.com"})
        );

        let addr: EmailAddress = ("user@example.com", "User").into();
        assert_eq!(
            serde_json::to_value(&addr).unwrap(),
            json!({"address": "user@example.com", "displayName": "User"})
        );
        assert_eq!(addr.format(), "User <user@example.com>");
    }

    #[test]
    fn test_message_wire_shape() {
        let message = EmailMessage {
            sender_address: "noreply@contoso.com".to_string(),
            content: EmailContent {
                subject: "Hello".to_string(),
                plain_text: Some("Hi".to_string()),
                html: None,
            },
            recipients: EmailRecipients {
                to: vec![EmailAddress::new("a@example.com")],
                ..Default::default()
            },
            reply_to: Vec::new(),
            attachments: vec![EmailAttachment::from_bytes("a.txt", "text/plain", b"hello")],
            user_engagement_tracking_disabled: Some(true),
        };

        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({
                "senderAddress": "noreply@contoso.com",
                "content": {"subject": "Hello", "plainText": "Hi"},
                "recipients": {"to": [{"address": "a@example.com"}]},
                "attachments": [{
                    "name": "a.txt",
                    "contentType": "text/plain",
                    "contentInBase64": "aGVsbG8="
                }],
                "userEngagementTrackingDisabled": true
            })
        );
    }

    #[test]
    fn test_recipient_count() {
        let recipients = EmailRecipients {
            to: vec!["a@x.com".into()],
            cc: vec!["b@x.com".into(), "c@x.com".into()],
            bcc: vec!["d@x.com".into()],
        };
        assert_eq!(recipients.count(), 4);
        assert_eq!(recipients.iter().count(), 4);
    }
}
