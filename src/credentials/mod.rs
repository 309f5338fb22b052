//! Credential resolution for Azure Communication Services.
//!
//! Three configuration shapes are supported, checked in this order:
//!
//! 1. A connection string `endpoint=<url>;accesskey=<base64>`
//! 2. An explicit endpoint plus a base64 access key
//! 3. An explicit endpoint plus a pre-computed `Authorization` value
//!
//! Resolution is pure parsing: nothing is fetched and the access key is not
//! decoded until a request is signed.
//!
//! # Example
//!
//! ```
//! use integrations_azure_email::credentials::Credential;
//!
//! let credential = Credential::from_connection_string(
//!     "endpoint=https://contoso.communication.azure.com/;accesskey=c2VjcmV0",
//! ).unwrap();
//!
//! assert_eq!(credential.endpoint(), "https://contoso.communication.azure.com");
//! ```

mod connection_string;

pub use connection_string::ConnectionString;

use crate::config::{ClientOptions, ConfigError};
use crate::signing::{self, SigningError};
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use url::Url;

/// How requests are authenticated.
///
/// Secrets are held in [`SecretString`] and never appear in `Debug` output.
#[derive(Debug, Clone)]
pub enum Credential {
    /// Explicit endpoint and access key.
    AccessKey {
        /// Validated endpoint without a trailing slash.
        endpoint: String,
        /// Base64 access key.
        key: SecretString,
    },
    /// Endpoint and access key parsed from a connection string.
    ConnectionString {
        /// Validated endpoint without a trailing slash.
        endpoint: String,
        /// Base64 access key.
        key: SecretString,
    },
    /// Caller supplied `Authorization` value, attached verbatim.
    PrecomputedAuth {
        /// Validated endpoint without a trailing slash.
        endpoint: String,
        /// Authorization header value.
        authorization: SecretString,
    },
}

/// Authentication header values for a single request attempt.
#[derive(Debug, Clone)]
pub struct RequestAuth {
    /// Value of `x-ms-date`.
    pub date: String,
    /// Value of `x-ms-content-sha256`.
    pub content_hash: String,
    /// Value of `Authorization`.
    pub authorization: SecretString,
}

impl Credential {
    /// Build an access-key credential.
    pub fn access_key(
        endpoint: impl AsRef<str>,
        key: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        Ok(Credential::AccessKey {
            endpoint: normalize_endpoint(endpoint.as_ref())?,
            key: SecretString::new(key.into()),
        })
    }

    /// Parse a connection string into a credential.
    pub fn from_connection_string(conn_str: &str) -> Result<Self, ConfigError> {
        let parsed = ConnectionString::parse(conn_str)?;
        Ok(Credential::ConnectionString {
            endpoint: normalize_endpoint(&parsed.endpoint)?,
            key: parsed.access_key,
        })
    }

    /// Build a credential that attaches a pre-computed authorization value.
    pub fn precomputed(
        endpoint: impl AsRef<str>,
        authorization: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let authorization = authorization.into();
        if authorization.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "authorization".to_string(),
            });
        }
        Ok(Credential::PrecomputedAuth {
            endpoint: normalize_endpoint(endpoint.as_ref())?,
            authorization: SecretString::new(authorization),
        })
    }

    /// Resolve a credential from client options.
    ///
    /// A connection string wins over an explicit endpoint and key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the connection string is malformed, the
    /// endpoint is invalid, or no credential shape is configured.
    pub fn resolve(options: &ClientOptions) -> Result<Self, ConfigError> {
        if let Some(conn_str) = &options.connection_string {
            return Self::from_connection_string(conn_str.expose_secret());
        }

        let endpoint = match &options.endpoint {
            Some(endpoint) => endpoint,
            None => return Err(ConfigError::MissingCredentials),
        };

        if let Some(key) = &options.access_key {
            return Self::access_key(endpoint, key.expose_secret().clone());
        }
        if let Some(authorization) = &options.authorization {
            return Self::precomputed(endpoint, authorization.expose_secret().clone());
        }

        Err(ConfigError::MissingCredentials)
    }

    /// Service endpoint without a trailing slash.
    pub fn endpoint(&self) -> &str {
        match self {
            Credential::AccessKey { endpoint, .. }
            | Credential::ConnectionString { endpoint, .. }
            | Credential::PrecomputedAuth { endpoint, .. } => endpoint,
        }
    }

    /// Short name of the authentication mode, safe to log.
    pub fn kind(&self) -> &'static str {
        match self {
            Credential::AccessKey { .. } => "access_key",
            Credential::ConnectionString { .. } => "connection_string",
            Credential::PrecomputedAuth { .. } => "precomputed_auth",
        }
    }

    /// Compute the authentication headers for one request attempt.
    ///
    /// Key-based credentials produce a fresh HMAC signature for `timestamp`.
    /// A pre-computed authorization value is passed through unchanged.
    pub fn authorize(
        &self,
        method: &str,
        url: &Url,
        body: &[u8],
        timestamp: DateTime<Utc>,
    ) -> Result<RequestAuth, SigningError> {
        match self {
            Credential::AccessKey { key, .. } | Credential::ConnectionString { key, .. } => {
                let host = signing::host_header(url)?;
                let path_and_query = signing::path_and_query(url);
                let signed = signing::sign_request(
                    method,
                    &path_and_query,
                    &host,
                    body,
                    key.expose_secret(),
                    timestamp,
                )?;
                Ok(RequestAuth {
                    authorization: SecretString::new(signed.authorization()),
                    date: signed.date,
                    content_hash: signed.content_hash,
                })
            }
            Credential::PrecomputedAuth { authorization, .. } => Ok(RequestAuth {
                date: signing::format_http_date(&timestamp),
                content_hash: signing::content_hash(body),
                authorization: authorization.clone(),
            }),
        }
    }
}

/// Validate an endpoint and strip trailing slashes.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEndpoint`] unless the value is an absolute
/// `http` or `https` URL with a host.
pub fn normalize_endpoint(endpoint: &str) -> Result<String, ConfigError> {
    let trimmed = endpoint.trim();
    let invalid = |message: String| ConfigError::InvalidEndpoint {
        endpoint: trimmed.to_string(),
        message,
    };

    let url = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme '{}'", other))),
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }
    if url.query().is_some() {
        return Err(invalid("query string not allowed".to_string()));
    }
    if url.fragment().is_some() {
        return Err(invalid("fragment not allowed".to_string()));
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}
