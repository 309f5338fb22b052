//! Connection string parsing.
//!
//! A Communication Services connection string looks like
//! `endpoint=https://contoso.communication.azure.com/;accesskey=<base64>`.

use crate::config::ConfigError;
use secrecy::SecretString;
use std::collections::HashMap;

/// The parts of a parsed connection string.
#[derive(Debug, Clone)]
pub struct ConnectionString {
    /// Raw endpoint value, not yet validated.
    pub endpoint: String,
    /// Base64 access key.
    pub access_key: SecretString,
}

impl ConnectionString {
    /// Parse a connection string.
    ///
    /// Keys are case-insensitive. Values are split on the first `=`, so base64
    /// padding survives. Empty segments and surrounding whitespace are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MalformedConnectionString`] when a segment has no
    /// `=` or when `endpoint` or `accesskey` is missing or empty.
    ///
    /// # Example
    ///
    /// ```
    /// use integrations_azure_email::credentials::ConnectionString;
    ///
    /// let parsed = ConnectionString::parse(
    ///     "endpoint=https://contoso.communication.azure.com/;accesskey=c2VjcmV0==",
    /// ).unwrap();
    /// assert_eq!(parsed.endpoint, "https://contoso.communication.azure.com/");
    /// ```
    pub fn parse(conn_str: &str) -> Result<Self, ConfigError> {
        let mut key_values = parse_into_key_values(conn_str)?;

        let endpoint = take_required(&mut key_values, "endpoint")?;
        let access_key = take_required(&mut key_values, "accesskey")?;

        Ok(Self {
            endpoint,
            access_key: SecretString::new(access_key),
        })
    }
}

fn parse_into_key_values(conn_str: &str) -> Result<HashMap<String, String>, ConfigError> {
    conn_str
        .trim()
        .split(';')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(|field| {
            let (key, value) =
                field
                    .split_once('=')
                    .ok_or_else(|| ConfigError::MalformedConnectionString {
                        message: format!(
                            "expected 'key=value' but found segment '{}'",
                            redact_segment(field)
                        ),
                    })?;
            Ok((key.trim().to_ascii_lowercase(), value.trim().to_string()))
        })
        .collect()
}

fn take_required(key_values: &mut HashMap<String, String>, key: &str) -> Result<String, ConfigError> {
    match key_values.remove(key) {
        Some(value) if !value.is_empty() => Ok(value),
        Some(_) => Err(ConfigError::MalformedConnectionString {
            message: format!("'{}' segment is empty", key),
        }),
        None => Err(ConfigError::MalformedConnectionString {
            message: format!("missing '{}=' segment", key),
        }),
    }
}

// Segments without '=' may be a pasted key; keep only a short prefix in errors.
fn redact_segment(field: &str) -> String {
    if field.chars().count() <= 8 {
        field.to_string()
    } else {
        let prefix: String = field.chars().take(8).collect();
        format!("{}...", prefix)
    }
}
