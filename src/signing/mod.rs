//! HMAC request signing for Azure Communication Services.
//!
//! # Overview
//!
//! Communication Services authenticates access-key requests with an
//! HMAC-SHA256 signature over a canonical representation of the request:
//!
//! 1. Hash the body with SHA-256 and base64-encode the digest
//! 2. Build the string to sign from the method, path and query, date, host and hash
//! 3. Compute HMAC-SHA256 of that string with the base64-decoded access key
//! 4. Attach `x-ms-date`, `x-ms-content-sha256` and `Authorization`
//!
//! # Quick Start
//!
//! ```no_run
//! use integrations_azure_email::signing::sign_request;
//! use chrono::Utc;
//!
//! let signed = sign_request(
//!     "POST",
//!     "/emails:send?api-version=2025-09-01",
//!     "contoso.communication.azure.com",
//!     br#"{"senderAddress":"noreply@contoso.com"}"#,
//!     "bXktYWNjZXNzLWtleQ==",
//!     Utc::now(),
//! ).unwrap();
//!
//! println!("x-ms-date: {}", signed.date);
//! println!("Authorization: {}", signed.authorization());
//! ```
//!
//! # Security Considerations
//!
//! - Never log the access key or the computed signature
//! - Sign every attempt separately; the service rejects stale timestamps

mod error;
mod hmac;

pub use self::hmac::{
    compute_signature, content_hash, format_http_date, host_header, path_and_query, sign_request,
    string_to_sign, SignedRequest, CONTENT_HASH_HEADER, DATE_HEADER, HMAC_ALGORITHM,
    SIGNED_HEADERS,
};
pub use error::SigningError;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_exports() {
        assert_eq!(HMAC_ALGORITHM, "HMAC-SHA256");
        assert_eq!(SIGNED_HEADERS, "x-ms-date;host;x-ms-content-sha256");
        assert_eq!(DATE_HEADER, "x-ms-date");
        assert_eq!(CONTENT_HASH_HEADER, "x-ms-content-sha256");
    }
}
