//! Azure Communication Services Email Integration Module
//!
//! Type-safe client for the Azure Communication Services Email API.
//!
//! # Features
//!
//! - **HMAC Request Signing**: Every attempt is signed with a fresh timestamp
//! - **Credential Modes**: Access key, connection string, or pre-computed authorization
//! - **Resilience**: Retries with fixed or exponential backoff, honoring `Retry-After`
//! - **Status Polling**: Bounded, cancellable polling with observer callbacks
//! - **Message Builder**: Fluent construction with validation and file attachments
//! - **Error Handling**: One error enum with retryability information
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use integrations_azure_email::{EmailClient, WaitOptions};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = EmailClient::from_env()?;
//!
//!     let message = client
//!         .new_message()
//!         .from("noreply@contoso.com")
//!         .to(("recipient@example.com", "Recipient"))
//!         .subject("Hello from Azure")
//!         .plain_text("This is a test email.")
//!         .build()?;
//!
//!     let status = client
//!         .send_and_wait(
//!             &message,
//!             WaitOptions::new().max_wait(Duration::from_secs(120)),
//!         )
//!         .await?;
//!     println!("Final status: {}", status.status);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Creating a Client
//!
//! ```rust,no_run
//! use integrations_azure_email::{ClientOptions, EmailClient};
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // From AZURE_COMMUNICATION_* environment variables
//! let client = EmailClient::from_env()?;
//!
//! // With the builder
//! let client = EmailClient::builder()
//!     .endpoint("https://contoso.communication.azure.com")
//!     .access_key("c2VjcmV0")
//!     .max_retries(5)
//!     .build()?;
//!
//! // With explicit options
//! let options = ClientOptions::builder()
//!     .connection_string("endpoint=https://contoso.communication.azure.com;accesskey=c2VjcmV0")
//!     .timeout(Duration::from_secs(10))
//!     .debug(true)
//!     .build()?;
//! let client = EmailClient::new(options)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! ```rust,no_run
//! use integrations_azure_email::{EmailClient, EmailError};
//!
//! # async fn example(client: EmailClient) {
//! match client.get_status("operation-id").await {
//!     Ok(status) => println!("{}", status.status),
//!     Err(EmailError::RetryExhausted { attempts, last_error }) => {
//!         eprintln!("gave up after {} attempts: {}", attempts, last_error);
//!     }
//!     Err(e) if e.status_code() == Some(404) => eprintln!("unknown operation"),
//!     Err(e) => eprintln!("error: {}", e),
//! }
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod builders;
pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod http;
pub mod logging;
pub mod services;
pub mod signing;
pub mod types;

pub use client::{EmailClient, EmailClientBuilder};

pub use config::{
    BackoffStrategy, ClientOptions, ClientOptionsBuilder, ConfigError, ExponentialBackoff,
    FixedBackoff, RetryConfig,
};

pub use credentials::{ConnectionString, Credential};

pub use error::{EmailError, EmailResult, TransportErrorKind};

pub use http::{EmailHttpClient, HttpClient, ReqwestTransport, Transport};

pub use logging::{Logger, StderrLogger, TracingLogger};

pub use services::{
    CallbackObserver, EmailService, NoopObserver, PollObserver, StatusPoller, StatusSource,
    WaitOptions,
};

pub use signing::SigningError;

pub use types::{
    ApiError, EmailAddress, EmailAttachment, EmailContent, EmailMessage, EmailRecipients,
    EmailStatus, Operation, SendResponse, StatusResponse,
};

pub use builders::{BuilderError, MessageBuilder, RecipientKind};

/// Create a client from environment variables.
///
/// Reads `AZURE_COMMUNICATION_CONNECTION_STRING`, or
/// `AZURE_COMMUNICATION_ENDPOINT` with `AZURE_COMMUNICATION_ACCESS_KEY`, plus
/// the optional `AZURE_COMMUNICATION_API_VERSION`.
///
/// # Errors
///
/// Returns [`EmailError::Configuration`] if the variables are missing or invalid.
pub fn create_client_from_env() -> EmailResult<EmailClient> {
    EmailClient::from_env()
}

/// Create a client with explicit options.
///
/// # Errors
///
/// Returns [`EmailError::Configuration`] if no credential can be resolved.
pub fn create_client(options: ClientOptions) -> EmailResult<EmailClient> {
    EmailClient::new(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crate_exports() {
        let _ = std::any::type_name::<EmailError>();
        let _ = std::any::type_name::<ClientOptions>();
        let _ = std::any::type_name::<Credential>();
        let _ = std::any::type_name::<EmailMessage>();
        let _ = std::any::type_name::<StatusPoller<EmailService>>();
    }

    #[test]
    fn test_client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<EmailClient>();
    }
}
