//! Configuration module for the email client.
//!
//! This module provides [`ClientOptions`] and its builder, covering:
//!
//! - Endpoint and credential inputs (connection string, access key, or
//!   pre-computed authorization)
//! - Timeout and retry settings
//! - API version and user agent
//! - The debug flag and the injected [`Logger`]

use secrecy::SecretString;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub mod error;
pub mod retry;

pub use error::ConfigError;
pub use retry::{
    BackoffStrategy, ExponentialBackoff, FixedBackoff, RetryConfig, DEFAULT_MAX_RETRIES,
    DEFAULT_RETRY_DELAY,
};

use crate::logging::{Logger, StderrLogger};

/// API version sent with every request unless overridden.
pub const DEFAULT_API_VERSION: &str = "2025-09-01";

/// Default timeout for a single HTTP call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for establishing a connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Environment variable holding a full connection string.
pub const ENV_CONNECTION_STRING: &str = "AZURE_COMMUNICATION_CONNECTION_STRING";
/// Environment variable holding the resource endpoint.
pub const ENV_ENDPOINT: &str = "AZURE_COMMUNICATION_ENDPOINT";
/// Environment variable holding the access key.
pub const ENV_ACCESS_KEY: &str = "AZURE_COMMUNICATION_ACCESS_KEY";
/// Environment variable overriding the API version.
pub const ENV_API_VERSION: &str = "AZURE_COMMUNICATION_API_VERSION";

fn default_user_agent() -> String {
    format!("integrations-azure-email/{}", env!("CARGO_PKG_VERSION"))
}

/// Configuration for the email client.
#[derive(Clone)]
pub struct ClientOptions {
    /// Resource endpoint, e.g. `https://contoso.communication.azure.com`.
    pub endpoint: Option<String>,
    /// Base64 access key used with `endpoint`.
    pub access_key: Option<SecretString>,
    /// Connection string; takes precedence over `endpoint` and `access_key`.
    pub connection_string: Option<SecretString>,
    /// Pre-computed `Authorization` value used with `endpoint`.
    pub authorization: Option<SecretString>,
    /// Emit debug lines through `logger`.
    pub debug: bool,
    /// Debug line sink.
    pub logger: Arc<dyn Logger>,
    /// Timeout for a single HTTP call.
    pub timeout: Duration,
    /// Timeout for establishing connections.
    pub connect_timeout: Duration,
    /// `api-version` query parameter.
    pub api_version: String,
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Fixed delay between attempts when no backoff strategy is set.
    pub retry_delay: Duration,
    /// Custom backoff strategy.
    pub backoff: Option<Arc<dyn BackoffStrategy>>,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            endpoint: None,
            access_key: None,
            connection_string: None,
            authorization: None,
            debug: false,
            logger: Arc::new(StderrLogger),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            api_version: DEFAULT_API_VERSION.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            backoff: None,
            user_agent: default_user_agent(),
        }
    }
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("endpoint", &self.endpoint)
            .field("access_key", &self.access_key.as_ref().map(|_| "[REDACTED]"))
            .field(
                "connection_string",
                &self.connection_string.as_ref().map(|_| "[REDACTED]"),
            )
            .field(
                "authorization",
                &self.authorization.as_ref().map(|_| "[REDACTED]"),
            )
            .field("debug", &self.debug)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("api_version", &self.api_version)
            .field("max_retries", &self.max_retries)
            .field("retry_delay", &self.retry_delay)
            .field("backoff", &self.backoff)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl ClientOptions {
    /// Create a new options builder.
    ///
    /// # Example
    ///
    /// ```
    /// use integrations_azure_email::config::ClientOptions;
    /// use std::time::Duration;
    ///
    /// let options = ClientOptions::builder()
    ///     .endpoint("https://contoso.communication.azure.com")
    ///     .access_key("c2VjcmV0")
    ///     .max_retries(5)
    ///     .timeout(Duration::from_secs(10))
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(options.max_retries, 5);
    /// ```
    pub fn builder() -> ClientOptionsBuilder {
        ClientOptionsBuilder::default()
    }

    /// Create options from environment variables.
    ///
    /// Reads `AZURE_COMMUNICATION_CONNECTION_STRING`, or
    /// `AZURE_COMMUNICATION_ENDPOINT` together with
    /// `AZURE_COMMUNICATION_ACCESS_KEY`. `AZURE_COMMUNICATION_API_VERSION`
    /// optionally overrides the API version.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Environment`] when neither credential shape is
    /// present.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let mut builder = Self::builder();
        if let Some(conn_str) = non_empty(ENV_CONNECTION_STRING) {
            builder = builder.connection_string(conn_str);
        } else {
            match (non_empty(ENV_ENDPOINT), non_empty(ENV_ACCESS_KEY)) {
                (Some(endpoint), Some(key)) => {
                    builder = builder.endpoint(endpoint).access_key(key);
                }
                _ => {
                    return Err(ConfigError::Environment {
                        message: format!(
                            "{} or both {} and {} must be set",
                            ENV_CONNECTION_STRING, ENV_ENDPOINT, ENV_ACCESS_KEY
                        ),
                    })
                }
            }
        }

        if let Some(version) = non_empty(ENV_API_VERSION) {
            builder = builder.api_version(version);
        }

        builder.build()
    }

    /// Effective retry settings.
    ///
    /// A custom backoff strategy wins over the fixed `retry_delay`.
    pub fn retry_config(&self) -> RetryConfig {
        let backoff = match &self.backoff {
            Some(backoff) => Arc::clone(backoff),
            None => Arc::new(FixedBackoff::new(self.retry_delay)),
        };
        RetryConfig::new(self.max_retries, backoff)
    }
}

/// Builder for [`ClientOptions`].
#[derive(Default)]
pub struct ClientOptionsBuilder {
    endpoint: Option<String>,
    access_key: Option<String>,
    connection_string: Option<String>,
    authorization: Option<String>,
    debug: Option<bool>,
    logger: Option<Arc<dyn Logger>>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    api_version: Option<String>,
    max_retries: Option<u32>,
    retry_delay: Option<Duration>,
    backoff: Option<Arc<dyn BackoffStrategy>>,
    user_agent: Option<String>,
}

impl ClientOptionsBuilder {
    /// Set the resource endpoint.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the base64 access key.
    pub fn access_key(mut self, key: impl Into<String>) -> Self {
        self.access_key = Some(key.into());
        self
    }

    /// Set a connection string of the form `endpoint=<url>;accesskey=<key>`.
    pub fn connection_string(mut self, conn_str: impl Into<String>) -> Self {
        self.connection_string = Some(conn_str.into());
        self
    }

    /// Set a pre-computed `Authorization` header value.
    pub fn authorization(mut self, authorization: impl Into<String>) -> Self {
        self.authorization = Some(authorization.into());
        self
    }

    /// Enable or disable debug lines.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = Some(debug);
        self
    }

    /// Set the debug line sink.
    ///
    /// # Example
    ///
    /// ```
    /// use integrations_azure_email::config::ClientOptions;
    /// use integrations_azure_email::logging::TracingLogger;
    ///
    /// let builder = ClientOptions::builder()
    ///     .debug(true)
    ///     .logger(TracingLogger);
    /// ```
    pub fn logger(mut self, logger: impl Logger + 'static) -> Self {
        self.logger = Some(Arc::new(logger));
        self
    }

    /// Set the timeout for a single HTTP call.
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Set the connection timeout.
    pub fn connect_timeout(mut self, duration: Duration) -> Self {
        self.connect_timeout = Some(duration);
        self
    }

    /// Set the `api-version` query parameter.
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    /// Set the number of retries after the first attempt.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Set the fixed delay between attempts.
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = Some(delay);
        self
    }

    /// Set a custom backoff strategy.
    ///
    /// # Example
    ///
    /// ```
    /// use integrations_azure_email::config::{ClientOptions, ExponentialBackoff};
    /// use std::time::Duration;
    ///
    /// let builder = ClientOptions::builder().backoff(
    ///     ExponentialBackoff::new(Duration::from_millis(200), Duration::from_secs(10))
    ///         .with_jitter(true),
    /// );
    /// ```
    pub fn backoff(mut self, backoff: impl BackoffStrategy + 'static) -> Self {
        self.backoff = Some(Arc::new(backoff));
        self
    }

    /// Set a custom user agent string.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Build the options.
    ///
    /// Credential inputs are validated when the client is created, so a
    /// builder without credentials still succeeds here.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a zero timeout or an empty API
    /// version or user agent.
    pub fn build(self) -> Result<ClientOptions, ConfigError> {
        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        if timeout.is_zero() {
            return Err(ConfigError::Invalid {
                message: "timeout must be greater than zero".to_string(),
            });
        }

        let api_version = self
            .api_version
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());
        if api_version.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "api_version must not be empty".to_string(),
            });
        }

        let user_agent = self.user_agent.unwrap_or_else(default_user_agent);
        if user_agent.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "user_agent must not be empty".to_string(),
            });
        }

        Ok(ClientOptions {
            endpoint: self.endpoint,
            access_key: self.access_key.map(SecretString::new),
            connection_string: self.connection_string.map(SecretString::new),
            authorization: self.authorization.map(SecretString::new),
            debug: self.debug.unwrap_or(false),
            logger: self.logger.unwrap_or_else(|| Arc::new(StderrLogger)),
            timeout,
            connect_timeout: self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT),
            api_version,
            max_retries: self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            retry_delay: self.retry_delay.unwrap_or(DEFAULT_RETRY_DELAY),
            backoff: self.backoff,
            user_agent,
        })
    }
}
