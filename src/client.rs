//! Email client implementation.
//!
//! [`EmailClient`] is the main entry point. It owns the options, the resolved
//! credential and the signed HTTP client, and hands out the email service
//! lazily on first use.
//!
//! # Example
//!
//! ```rust,no_run
//! use integrations_azure_email::EmailClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = EmailClient::from_connection_string(
//!     "endpoint=https://contoso.communication.azure.com;accesskey=c2VjcmV0",
//! )?;
//!
//! let message = client
//!     .new_message()
//!     .from("noreply@contoso.com")
//!     .to("recipient@example.com")
//!     .subject("Hello")
//!     .plain_text("Email body")
//!     .build()?;
//!
//! let sent = client.send(&message).await?;
//! println!("operation {}", sent.id);
//! # Ok(())
//! # }
//! ```

use once_cell::sync::OnceCell;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::builders::MessageBuilder;
use crate::config::{BackoffStrategy, ClientOptions, ClientOptionsBuilder};
use crate::credentials::Credential;
use crate::error::EmailResult;
use crate::http::{EmailHttpClient, HttpClient, Transport};
use crate::logging::{DebugLog, Logger};
use crate::services::{EmailService, StatusPoller, WaitOptions};
use crate::types::{EmailMessage, SendResponse, StatusResponse};

/// Client for the Azure Communication Services Email API.
///
/// # Thread Safety
///
/// `EmailClient` is `Send + Sync`. Clones share the same HTTP client and
/// connection pool.
///
/// # Example
///
/// ```rust,no_run
/// use integrations_azure_email::EmailClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = EmailClient::from_env()?;
///
/// let client_clone = client.clone();
/// tokio::spawn(async move {
///     let _ = client_clone.get_status("operation-id").await;
/// });
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct EmailClient {
    options: Arc<ClientOptions>,
    http_client: Arc<dyn HttpClient>,
    email_service: OnceCell<EmailService>,
    log: DebugLog,
}

impl EmailClient {
    /// Create a client from options.
    ///
    /// The credential is resolved here, so configuration problems surface
    /// before any request is made.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::Configuration`](crate::EmailError) if no usable
    /// credential can be resolved or the HTTP client cannot be built.
    pub fn new(options: ClientOptions) -> EmailResult<Self> {
        let credential = Credential::resolve(&options)?;
        let http_client = EmailHttpClient::new(&options, credential)?;
        Ok(Self::with_http_client(options, Arc::new(http_client)))
    }

    /// Create a client from `AZURE_COMMUNICATION_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the variables are missing or invalid.
    pub fn from_env() -> EmailResult<Self> {
        Self::new(ClientOptions::from_env()?)
    }

    /// Create a client from a connection string with default options.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the connection string is malformed.
    pub fn from_connection_string(conn_str: impl Into<String>) -> EmailResult<Self> {
        Self::new(ClientOptions::builder().connection_string(conn_str).build()?)
    }

    /// Create a client over an existing HTTP client.
    pub fn with_http_client(options: ClientOptions, http_client: Arc<dyn HttpClient>) -> Self {
        let log = DebugLog::new(options.debug, Arc::clone(&options.logger));
        debug!(endpoint = http_client.endpoint(), "Created email client");
        Self {
            options: Arc::new(options),
            http_client,
            email_service: OnceCell::new(),
            log,
        }
    }

    /// Create a client builder.
    pub fn builder() -> EmailClientBuilder {
        EmailClientBuilder::default()
    }

    /// Client options.
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// The underlying HTTP client.
    pub fn http_client(&self) -> &Arc<dyn HttpClient> {
        &self.http_client
    }

    /// Get the email service.
    pub fn emails(&self) -> &EmailService {
        self.email_service
            .get_or_init(|| EmailService::from_arc(Arc::clone(&self.http_client)))
    }

    /// Start building a message.
    ///
    /// Builder steps are logged when the client's debug flag is on.
    pub fn new_message(&self) -> MessageBuilder {
        MessageBuilder::new().with_debug_log(self.log.clone())
    }

    /// Submit a message without waiting for delivery.
    pub async fn send(&self, message: &EmailMessage) -> EmailResult<SendResponse> {
        self.emails().send(message).await
    }

    /// Read the current status of an operation.
    pub async fn get_status(&self, operation_id: &str) -> EmailResult<StatusResponse> {
        self.emails().get_status(operation_id).await
    }

    /// Poll an operation until it reaches a terminal status.
    ///
    /// # Errors
    ///
    /// [`EmailError::PollTimeout`](crate::EmailError::PollTimeout),
    /// [`EmailError::PollCanceled`](crate::EmailError::PollCanceled) or
    /// [`EmailError::PollFailed`](crate::EmailError::PollFailed).
    pub async fn wait_for_completion(
        &self,
        operation_id: &str,
        options: WaitOptions,
    ) -> EmailResult<StatusResponse> {
        StatusPoller::new(self.emails().clone(), options)
            .with_debug_log(self.log.clone())
            .wait(operation_id)
            .await
    }

    /// Submit a message and poll until it reaches a terminal status.
    ///
    /// A send that already reports a terminal status is returned without
    /// polling.
    pub async fn send_and_wait(
        &self,
        message: &EmailMessage,
        options: WaitOptions,
    ) -> EmailResult<StatusResponse> {
        let sent = self.send(message).await?;
        if sent.status.is_terminal() {
            let mut status = StatusResponse::new(sent.id, sent.status);
            status.error = sent.error;
            return Ok(status);
        }
        self.wait_for_completion(&sent.id, options).await
    }
}

impl std::fmt::Debug for EmailClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailClient")
            .field("endpoint", &self.http_client.endpoint())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Builder for [`EmailClient`].
#[derive(Default)]
pub struct EmailClientBuilder {
    options: ClientOptionsBuilder,
    transport: Option<Arc<dyn Transport>>,
}

impl EmailClientBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a connection string.
    pub fn connection_string(mut self, conn_str: impl Into<String>) -> Self {
        self.options = self.options.connection_string(conn_str);
        self
    }

    /// Set the endpoint.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.options = self.options.endpoint(endpoint);
        self
    }

    /// Set the base64 access key.
    pub fn access_key(mut self, key: impl Into<String>) -> Self {
        self.options = self.options.access_key(key);
        self
    }

    /// Set a pre-computed `Authorization` header value.
    pub fn authorization(mut self, authorization: impl Into<String>) -> Self {
        self.options = self.options.authorization(authorization);
        self
    }

    /// Enable debug logging through the injected logger.
    pub fn debug(mut self, debug: bool) -> Self {
        self.options = self.options.debug(debug);
        self
    }

    /// Set the debug logger.
    pub fn logger(mut self, logger: impl Logger + 'static) -> Self {
        self.options = self.options.logger(logger);
        self
    }

    /// Set the per-request timeout.
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.options = self.options.timeout(duration);
        self
    }

    /// Set the API version.
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.options = self.options.api_version(version);
        self
    }

    /// Set the maximum number of retries.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.options = self.options.max_retries(retries);
        self
    }

    /// Set the fixed delay between retries.
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.options = self.options.retry_delay(delay);
        self
    }

    /// Set a custom backoff strategy.
    pub fn backoff(mut self, backoff: impl BackoffStrategy + 'static) -> Self {
        self.options = self.options.backoff(backoff);
        self
    }

    /// Use a custom transport instead of reqwest.
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the options are invalid or no
    /// credential can be resolved.
    pub fn build(self) -> EmailResult<EmailClient> {
        let options = self.options.build()?;
        match self.transport {
            Some(transport) => {
                let credential = Credential::resolve(&options)?;
                let http_client = EmailHttpClient::with_transport(&options, credential, transport);
                Ok(EmailClient::with_http_client(options, Arc::new(http_client)))
            }
            None => EmailClient::new(options),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EmailError;
    use crate::logging::tests::RecordingLogger;
    use crate::types::EmailStatus;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const KEY: &str = "dGVzdC1hY2Nlc3Mta2V5LTAxMjM0NTY3ODlhYmNkZWY=";

    #[test]
    fn test_from_connection_string() {
        let client = EmailClient::from_connection_string(format!(
            "endpoint=https://contoso.communication.azure.com/;accesskey={}",
            KEY
        ))
        .unwrap();

        assert_eq!(
            client.http_client().endpoint(),
            "https://contoso.communication.azure.com"
        );
        let debug = format!("{:?}", client);
        assert!(debug.contains("EmailClient"));
        assert!(!debug.contains(KEY));
    }

    #[test]
    fn test_missing_credentials() {
        let err = EmailClient::builder().build().unwrap_err();
        assert!(matches!(err, EmailError::Configuration { .. }));
    }

    #[test]
    fn test_emails_accessor_is_shared() {
        let client = EmailClient::builder()
            .endpoint("https://contoso.communication.azure.com")
            .access_key(KEY)
            .build()
            .unwrap();
        let first = client.emails() as *const EmailService;
        let second = client.emails() as *const EmailService;
        assert_eq!(first, second);
    }

    #[test]
    fn test_new_message_uses_client_logger() {
        let logger = Arc::new(RecordingLogger::default());
        let options = ClientOptions::builder()
            .endpoint("https://contoso.communication.azure.com")
            .access_key(KEY)
            .debug(true)
            .build()
            .unwrap();
        let options = ClientOptions {
            logger: logger.clone(),
            ..options
        };
        let client = EmailClient::new(options).unwrap();

        client.new_message().from("sender@example.com");
        assert_eq!(logger.lines(), vec!["builder: from sender@example.com".to_string()]);
    }

    #[tokio::test]
    async fn test_send_and_wait() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emails:send"))
            .respond_with(
                ResponseTemplate::new(202).set_body_string(r#"{"id":"op-1","status":"Running"}"#),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/emails/operations/op-1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"id":"op-1","status":"Succeeded"}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = EmailClient::builder()
            .endpoint(server.uri())
            .access_key(KEY)
            .build()
            .unwrap();
        let message = client
            .new_message()
            .from("sender@example.com")
            .to("recipient@example.com")
            .subject("Hi")
            .plain_text("Hello")
            .build()
            .unwrap();

        let status = client
            .send_and_wait(&message, WaitOptions::new().poll_interval(Duration::from_millis(10)))
            .await
            .unwrap();
        assert_eq!(status.status, EmailStatus::Delivered);
    }
}
