//! Signing error types.

use thiserror::Error;

/// Errors that can occur while computing an HMAC request signature.
#[derive(Debug, Error)]
pub enum SigningError {
    /// The access key is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use integrations_azure_email::signing::SigningError;
    ///
    /// assert_eq!(SigningError::EmptyKey.to_string(), "Access key is empty");
    /// ```
    #[error("Access key is empty")]
    EmptyKey,

    /// The access key is not valid base64.
    #[error("Access key is not valid base64: {message}")]
    InvalidKey {
        /// Decoder error description.
        message: String,
    },

    /// The request URL cannot be signed, for example because it has no host.
    #[error("Invalid URL: {message}")]
    InvalidUrl {
        /// Details about what makes the URL invalid.
        message: String,
    },

    /// The signing operation failed.
    #[error("Signing failed: {message}")]
    SigningFailed {
        /// Details about the signing failure.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_key_error() {
        let error = SigningError::InvalidKey {
            message: "Invalid byte 33, offset 0.".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Access key is not valid base64: Invalid byte 33, offset 0."
        );
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SigningError>();
    }
}
