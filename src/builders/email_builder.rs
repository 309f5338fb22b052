//! Message builder.

use std::path::Path;

use crate::builders::{BuilderError, RecipientKind};
use crate::logging::DebugLog;
use crate::types::{EmailAddress, EmailAttachment, EmailContent, EmailMessage, EmailRecipients};

/// Builder for constructing an [`EmailMessage`] with a fluent API.
///
/// Validation runs at [`build`](Self::build) and reports every problem at
/// once rather than stopping at the first.
///
/// # Examples
///
/// ## Simple message
///
/// ```rust
/// use integrations_azure_email::builders::MessageBuilder;
///
/// let message = MessageBuilder::new()
///     .from("sender@example.com")
///     .to("recipient@example.com")
///     .subject("Hello World")
///     .plain_text("This is the plain text version")
///     .html("<p>This is the <strong>HTML</strong> version</p>")
///     .build()?;
/// # Ok::<(), integrations_azure_email::builders::BuilderError>(())
/// ```
///
/// ## CC, BCC and reply-to
///
/// ```rust
/// use integrations_azure_email::builders::{MessageBuilder, RecipientKind};
///
/// let message = MessageBuilder::new()
///     .from("sender@example.com")
///     .add_recipients(RecipientKind::To, ["a@example.com", "b@example.com"])
///     .cc("cc@example.com")
///     .bcc("bcc@example.com")
///     .reply_to(("support@example.com", "Support"))
///     .subject("Meeting Invitation")
///     .html("<p>You're invited to our meeting</p>")
///     .build()?;
/// assert_eq!(message.recipients.count(), 4);
/// # Ok::<(), integrations_azure_email::builders::BuilderError>(())
/// ```
///
/// ## Attachments
///
/// ```rust
/// use integrations_azure_email::builders::MessageBuilder;
///
/// let pdf_data = vec![0x25, 0x50, 0x44, 0x46];
///
/// let message = MessageBuilder::new()
///     .from("sender@example.com")
///     .to("recipient@example.com")
///     .subject("Document Attached")
///     .plain_text("Please find the attached document")
///     .attachment("report.pdf", "application/pdf", pdf_data)
///     .build()?;
/// # Ok::<(), integrations_azure_email::builders::BuilderError>(())
/// ```
#[derive(Debug)]
pub struct MessageBuilder {
    from: Option<EmailAddress>,
    recipients: EmailRecipients,
    reply_to: Vec<EmailAddress>,
    subject: Option<String>,
    plain_text: Option<String>,
    html: Option<String>,
    attachments: Vec<EmailAttachment>,
    file_errors: Vec<String>,
    tracking_disabled: bool,
    log: DebugLog,
}

impl Default for MessageBuilder {
    fn default() -> Self {
        Self {
            from: None,
            recipients: EmailRecipients::default(),
            reply_to: Vec::new(),
            subject: None,
            plain_text: None,
            html: None,
            attachments: Vec::new(),
            file_errors: Vec::new(),
            tracking_disabled: false,
            log: DebugLog::disabled(),
        }
    }
}

impl MessageBuilder {
    /// Create a new message builder.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_debug_log(mut self, log: DebugLog) -> Self {
        self.log = log;
        self
    }

    /// Set the sender address.
    ///
    /// The address must be a verified sender of the communication resource.
    pub fn from(mut self, email: impl Into<EmailAddress>) -> Self {
        let email = email.into();
        self.log.log(format_args!("builder: from {}", email.address));
        self.from = Some(email);
        self
    }

    /// Add a "To" recipient.
    pub fn to(self, email: impl Into<EmailAddress>) -> Self {
        self.push_recipient(RecipientKind::To, email.into())
    }

    /// Add a "CC" recipient.
    pub fn cc(self, email: impl Into<EmailAddress>) -> Self {
        self.push_recipient(RecipientKind::Cc, email.into())
    }

    /// Add a "BCC" recipient.
    pub fn bcc(self, email: impl Into<EmailAddress>) -> Self {
        self.push_recipient(RecipientKind::Bcc, email.into())
    }

    /// Add several recipients to one list.
    pub fn add_recipients<I, E>(mut self, kind: RecipientKind, emails: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<EmailAddress>,
    {
        for email in emails {
            self = self.push_recipient(kind, email.into());
        }
        self
    }

    fn push_recipient(mut self, kind: RecipientKind, email: EmailAddress) -> Self {
        self.log
            .log(format_args!("builder: {} {}", kind, email.address));
        match kind {
            RecipientKind::To => self.recipients.to.push(email),
            RecipientKind::Cc => self.recipients.cc.push(email),
            RecipientKind::Bcc => self.recipients.bcc.push(email),
        }
        self
    }

    /// Add a reply-to address.
    pub fn reply_to(mut self, email: impl Into<EmailAddress>) -> Self {
        self.reply_to.push(email.into());
        self
    }

    /// Set the subject line.
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Set the plain text body.
    pub fn plain_text(mut self, text: impl Into<String>) -> Self {
        self.plain_text = Some(text.into());
        self
    }

    /// Set the HTML body.
    pub fn html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    /// Attach in-memory content.
    pub fn attachment(
        mut self,
        name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl AsRef<[u8]>,
    ) -> Self {
        let attachment = EmailAttachment::from_bytes(name, content_type, data.as_ref());
        self.log.log(format_args!(
            "builder: attachment {} ({})",
            attachment.name, attachment.content_type
        ));
        self.attachments.push(attachment);
        self
    }

    /// Attach a file from disk.
    ///
    /// The attachment is named after the file and its content type is guessed
    /// from the extension, falling back to `application/octet-stream`. A file
    /// that cannot be read is reported by [`build`](Self::build).
    pub fn attach_file(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        match std::fs::read(path) {
            Ok(data) => {
                let content_type = mime_guess::from_path(path).first_or_octet_stream();
                self = self.attachment(name, content_type.essence_str(), data);
            }
            Err(e) => {
                self.log.log(format_args!(
                    "builder: cannot read attachment {}: {}",
                    path.display(),
                    e
                ));
                self.file_errors
                    .push(format!("cannot read attachment {}: {}", path.display(), e));
            }
        }
        self
    }

    /// Disable open and click tracking for this message.
    pub fn disable_tracking(mut self) -> Self {
        self.tracking_disabled = true;
        self
    }

    /// Check the message without consuming the builder.
    ///
    /// # Errors
    ///
    /// [`BuilderError::Invalid`] listing every problem found.
    pub fn validate(&self) -> Result<(), BuilderError> {
        let mut problems = Vec::new();

        match &self.from {
            None => problems.push("sender address is required".to_string()),
            Some(from) if !is_valid_address(&from.address) => {
                problems.push(format!("invalid sender address '{}'", from.address))
            }
            Some(_) => {}
        }

        if self.subject.as_deref().map_or(true, |s| s.trim().is_empty()) {
            problems.push("subject is required".to_string());
        }

        if self.plain_text.as_deref().map_or(true, str::is_empty)
            && self.html.as_deref().map_or(true, str::is_empty)
        {
            problems.push("a plain text or HTML body is required".to_string());
        }

        if self.recipients.count() == 0 {
            problems.push("at least one recipient is required".to_string());
        }

        let lists = [
            (RecipientKind::To, &self.recipients.to),
            (RecipientKind::Cc, &self.recipients.cc),
            (RecipientKind::Bcc, &self.recipients.bcc),
        ];
        for (kind, list) in lists {
            for address in list.iter().filter(|a| !is_valid_address(&a.address)) {
                problems.push(format!("invalid {} address '{}'", kind, address.address));
            }
        }

        for address in self.reply_to.iter().filter(|a| !is_valid_address(&a.address)) {
            problems.push(format!("invalid reply-to address '{}'", address.address));
        }

        problems.extend(self.file_errors.iter().cloned());

        if problems.is_empty() {
            Ok(())
        } else {
            Err(BuilderError::Invalid { problems })
        }
    }

    /// Build the [`EmailMessage`].
    ///
    /// # Errors
    ///
    /// [`BuilderError::Invalid`] listing every problem found.
    pub fn build(self) -> Result<EmailMessage, BuilderError> {
        if let Err(e) = self.validate() {
            self.log.log(format_args!("builder: {}", e));
            return Err(e);
        }

        let sender_address = self
            .from
            .map(|f| f.address)
            .ok_or_else(|| BuilderError::missing_field("from"))?;
        let subject = self
            .subject
            .ok_or_else(|| BuilderError::missing_field("subject"))?;

        self.log.log(format_args!(
            "builder: built message with {} recipient(s) and {} attachment(s)",
            self.recipients.count(),
            self.attachments.len()
        ));

        Ok(EmailMessage {
            sender_address,
            content: EmailContent {
                subject,
                plain_text: self.plain_text.filter(|text| !text.is_empty()),
                html: self.html.filter(|markup| !markup.is_empty()),
            },
            recipients: self.recipients,
            reply_to: self.reply_to,
            attachments: self.attachments,
            user_engagement_tracking_disabled: self.tracking_disabled.then_some(true),
        })
    }
}

/// Exactly one `@`, non-empty local and domain parts, and a dotted domain.
fn is_valid_address(address: &str) -> bool {
    let mut parts = address.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && !domain.is_empty()
                && domain.contains('.')
                && !address.chars().any(char::is_whitespace)
        }
        _ => false,
    }
}
