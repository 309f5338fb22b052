//! Configuration error types for the email client.

use thiserror::Error;

/// Errors that can occur during configuration and credential resolution.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required configuration field is missing.
    #[error("Missing required configuration: {field}")]
    MissingField {
        /// The name of the missing field.
        field: String,
    },

    /// Invalid configuration value or combination.
    #[error("Invalid configuration: {message}")]
    Invalid {
        /// Description of the configuration issue.
        message: String,
    },

    /// The connection string could not be parsed.
    #[error("Malformed connection string: {message}")]
    MalformedConnectionString {
        /// Which part of the connection string is wrong.
        message: String,
    },

    /// The endpoint is not an absolute http(s) URL with a host.
    #[error("Invalid endpoint '{endpoint}': {message}")]
    InvalidEndpoint {
        /// The rejected endpoint.
        endpoint: String,
        /// Why it was rejected.
        message: String,
    },

    /// None of the supported credential shapes was configured.
    #[error("No credentials configured: provide a connection string, an endpoint with an access key, or an endpoint with a pre-computed authorization value")]
    MissingCredentials,

    /// Error reading from environment variables.
    #[error("Environment error: {message}")]
    Environment {
        /// Description of the environment error.
        message: String,
    },
}
