//! Transport layer abstraction for HTTP communication.
//!
//! The default implementation uses reqwest, which also owns connection
//! pooling. Other implementations can be provided for testing or alternative
//! HTTP backends.

use async_trait::async_trait;
use reqwest::{Client, Request, Response};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{EmailError, EmailResult};

/// Trait for HTTP transport implementations.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send an HTTP request and return the response.
    ///
    /// Any HTTP status is a successful send; only failures before a response
    /// arrives are errors.
    ///
    /// # Errors
    ///
    /// Returns a network or timeout [`EmailError::Transport`].
    async fn send(&self, request: Request) -> EmailResult<Response>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: Request) -> EmailResult<Response> {
        (**self).send(request).await
    }
}

/// Reqwest-based HTTP transport implementation.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a new reqwest transport.
    ///
    /// # Arguments
    ///
    /// * `timeout` - Request timeout duration
    /// * `connect_timeout` - Connection timeout duration
    /// * `user_agent` - `User-Agent` header value
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use integrations_azure_email::http::ReqwestTransport;
    ///
    /// let transport = ReqwestTransport::new(
    ///     Duration::from_secs(30),
    ///     Duration::from_secs(10),
    ///     "my-app/1.0",
    /// ).unwrap();
    /// ```
    pub fn new(
        timeout: Duration,
        connect_timeout: Duration,
        user_agent: &str,
    ) -> EmailResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .user_agent(user_agent)
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .build()
            .map_err(|e| EmailError::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
                source: Some(Box::new(e)),
            })?;

        Ok(Self { client })
    }

    /// Wrap an existing reqwest client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// Get a reference to the underlying reqwest client.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: Request) -> EmailResult<Response> {
        self.client.execute(request).await.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reqwest_transport_creation() {
        let transport = ReqwestTransport::new(
            Duration::from_secs(30),
            Duration::from_secs(10),
            "test-agent/1.0",
        );
        assert!(transport.is_ok());
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let transport = ReqwestTransport::new(
            Duration::from_secs(5),
            Duration::from_secs(1),
            "test-agent/1.0",
        )
        .unwrap();
        let request = transport
            .client()
            .get("http://127.0.0.1:9/unreachable")
            .build()
            .unwrap();

        let err = transport.send(request).await.unwrap_err();
        assert!(err.is_retryable());
        assert!(matches!(err, EmailError::Transport { .. }));
    }

    #[test]
    fn test_transport_trait_object() {
        let transport: Arc<dyn Transport> = Arc::new(
            ReqwestTransport::new(
                Duration::from_secs(30),
                Duration::from_secs(10),
                "test-agent/1.0",
            )
            .unwrap(),
        );
        let _: &dyn Transport = &*transport;
    }
}
