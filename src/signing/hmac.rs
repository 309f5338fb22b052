//! HMAC-SHA256 request signing for Communication Services.
//!
//! Every request carries three headers computed here:
//!
//! - `x-ms-date`: the request time as an IMF-fixdate
//! - `x-ms-content-sha256`: base64 SHA-256 of the exact body bytes
//! - `Authorization`: the signed-header list and the base64 HMAC signature
//!
//! The string to sign is `METHOD\npath?query\ndate;host;content-hash`.

use super::error::SigningError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::fmt;
use url::Url;

type HmacSha256 = Hmac<Sha256>;

/// Authorization scheme name.
pub const HMAC_ALGORITHM: &str = "HMAC-SHA256";

/// Headers covered by the signature, in signing order.
pub const SIGNED_HEADERS: &str = "x-ms-date;host;x-ms-content-sha256";

/// Header carrying the signing timestamp.
pub const DATE_HEADER: &str = "x-ms-date";

/// Header carrying the body hash.
pub const CONTENT_HASH_HEADER: &str = "x-ms-content-sha256";

/// A request signature and the header values derived from it.
///
/// Built fresh for every attempt; never reuse one across retries.
#[derive(Clone, PartialEq, Eq)]
pub struct SignedRequest {
    /// Uppercase HTTP method.
    pub method: String,
    /// Request path including the query string.
    pub path_and_query: String,
    /// Lowercase host header value.
    pub host: String,
    /// Signing time.
    pub timestamp: DateTime<Utc>,
    /// Value of `x-ms-date`.
    pub date: String,
    /// Value of `x-ms-content-sha256`.
    pub content_hash: String,
    /// Base64 HMAC signature.
    pub signature: String,
}

impl SignedRequest {
    /// Value of the `Authorization` header.
    pub fn authorization(&self) -> String {
        format!(
            "{} SignedHeaders={}&Signature={}",
            HMAC_ALGORITHM, SIGNED_HEADERS, self.signature
        )
    }
}

impl fmt::Debug for SignedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedRequest")
            .field("method", &self.method)
            .field("path_and_query", &self.path_and_query)
            .field("host", &self.host)
            .field("date", &self.date)
            .field("content_hash", &self.content_hash)
            .field("signature", &"[REDACTED]")
            .finish()
    }
}

/// Base64 SHA-256 digest of a request body.
///
/// # Example
///
/// ```
/// use integrations_azure_email::signing::content_hash;
///
/// assert_eq!(content_hash(b""), "47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU=");
/// ```
pub fn content_hash(body: &[u8]) -> String {
    STANDARD.encode(Sha256::digest(body))
}

/// Format a timestamp as an RFC 7231 IMF-fixdate.
///
/// # Example
///
/// ```
/// use integrations_azure_email::signing::format_http_date;
/// use chrono::{TimeZone, Utc};
///
/// let dt = Utc.with_ymd_and_hms(2023, 12, 15, 10, 30, 45).unwrap();
/// assert_eq!(format_http_date(&dt), "Fri, 15 Dec 2023 10:30:45 GMT");
/// ```
pub fn format_http_date(dt: &DateTime<Utc>) -> String {
    dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Build the canonical string to sign.
pub fn string_to_sign(
    method: &str,
    path_and_query: &str,
    date: &str,
    host: &str,
    content_hash: &str,
) -> String {
    format!(
        "{}\n{}\n{};{};{}",
        method.to_ascii_uppercase(),
        path_and_query,
        date,
        host.to_ascii_lowercase(),
        content_hash
    )
}

/// HMAC-SHA256 of `data` under the base64-encoded `access_key`, base64-encoded.
///
/// # Errors
///
/// Returns [`SigningError::EmptyKey`] or [`SigningError::InvalidKey`] when the
/// key is unusable.
pub fn compute_signature(access_key: &str, data: &str) -> Result<String, SigningError> {
    let trimmed = access_key.trim();
    if trimmed.is_empty() {
        return Err(SigningError::EmptyKey);
    }
    let key = STANDARD
        .decode(trimmed)
        .map_err(|e| SigningError::InvalidKey {
            message: e.to_string(),
        })?;
    if key.is_empty() {
        return Err(SigningError::EmptyKey);
    }

    let mut mac = HmacSha256::new_from_slice(&key).map_err(|e| SigningError::SigningFailed {
        message: e.to_string(),
    })?;
    mac.update(data.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Lowercase host header value for a URL, keeping any non-default port.
pub fn host_header(url: &Url) -> Result<String, SigningError> {
    let host = url.host_str().ok_or_else(|| SigningError::InvalidUrl {
        message: format!("URL has no host: {}", url),
    })?;
    let host = host.to_ascii_lowercase();
    Ok(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}

/// Path plus query string of a URL, as it appears on the request line.
pub fn path_and_query(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}

/// Sign a request.
///
/// This is a pure function of its inputs; supply a fixed `timestamp` to get
/// reproducible output.
///
/// # Arguments
///
/// * `method` - HTTP method
/// * `path_and_query` - Request path with query string
/// * `host` - Host header value
/// * `body` - Exact body bytes (empty for GET)
/// * `access_key` - Base64-encoded access key
/// * `timestamp` - Signing time
///
/// # Example
///
/// ```
/// use integrations_azure_email::signing::sign_request;
/// use chrono::Utc;
///
/// let signed = sign_request(
///     "GET",
///     "/emails/operations/abc?api-version=2025-09-01",
///     "contoso.communication.azure.com",
///     b"",
///     "c2VjcmV0",
///     Utc::now(),
/// ).unwrap();
/// assert!(signed.authorization().starts_with("HMAC-SHA256 SignedHeaders="));
/// ```
pub fn sign_request(
    method: &str,
    path_and_query: &str,
    host: &str,
    body: &[u8],
    access_key: &str,
    timestamp: DateTime<Utc>,
) -> Result<SignedRequest, SigningError> {
    let date = format_http_date(&timestamp);
    let hash = content_hash(body);
    let to_sign = string_to_sign(method, path_and_query, &date, host, &hash);
    let signature = compute_signature(access_key, &to_sign)?;

    Ok(SignedRequest {
        method: method.to_ascii_uppercase(),
        path_and_query: path_and_query.to_string(),
        host: host.to_ascii_lowercase(),
        timestamp,
        date,
        content_hash: hash,
        signature,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const KEY: &str = "dGVzdC1hY2Nlc3Mta2V5LTAxMjM0NTY3ODlhYmNkZWY=";
    const BODY: &[u8] = br#"{"senderAddress":"sender@example.com"}"#;
    const HOST: &str = "contoso.communication.azure.com";
    const PATH: &str = "/emails:send?api-version=2025-09-01";

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 12, 15, 10, 30, 45).unwrap()
    }

    #[test]
    fn test_content_hash() {
        assert_eq!(
            content_hash(BODY),
            "WiiLNN/Ssi6nNZ6ycr6lNwLOKaAkgP29t5GPqMx5pvA="
        );
        assert_eq!(
            content_hash(b""),
            "47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU="
        );
    }

    #[test]
    fn test_string_to_sign_layout() {
        let s = string_to_sign("post", PATH, "Fri, 15 Dec 2023 10:30:45 GMT", "Contoso.Example", "HASH");
        assert_eq!(
            s,
            "POST\n/emails:send?api-version=2025-09-01\nFri, 15 Dec 2023 10:30:45 GMT;contoso.example;HASH"
        );
    }

    #[test]
    fn test_known_signature() {
        let signed = sign_request("POST", PATH, HOST, BODY, KEY, fixed_time()).unwrap();
        assert_eq!(signed.date, "Fri, 15 Dec 2023 10:30:45 GMT");
        assert_eq!(signed.signature, "LPfu8Z93P+Lhnu6/U/gV8jrhjwtVcpyE5tqUaeMiXcU=");
        assert_eq!(
            signed.authorization(),
            "HMAC-SHA256 SignedHeaders=x-ms-date;host;x-ms-content-sha256&Signature=LPfu8Z93P+Lhnu6/U/gV8jrhjwtVcpyE5tqUaeMiXcU="
        );
    }

    #[test]
    fn test_signing_is_deterministic() {
        let a = sign_request("POST", PATH, HOST, BODY, KEY, fixed_time()).unwrap();
        let b = sign_request("POST", PATH, HOST, BODY, KEY, fixed_time()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_any_input_change_changes_signature() {
        let base = sign_request("POST", PATH, HOST, BODY, KEY, fixed_time())
            .unwrap()
            .signature;

        let variants = [
            sign_request("GET", PATH, HOST, BODY, KEY, fixed_time()),
            sign_request("POST", "/emails:send?api-version=2024-01-01", HOST, BODY, KEY, fixed_time()),
            sign_request("POST", PATH, "other.communication.azure.com", BODY, KEY, fixed_time()),
            sign_request("POST", PATH, HOST, b"{}", KEY, fixed_time()),
            sign_request("POST", PATH, HOST, BODY, "b3RoZXIta2V5", fixed_time()),
            sign_request(
                "POST",
                PATH,
                HOST,
                BODY,
                KEY,
                fixed_time() + chrono::Duration::seconds(1),
            ),
        ];

        for variant in variants {
            assert_ne!(variant.unwrap().signature, base);
        }
    }

    #[test]
    fn test_invalid_keys() {
        assert!(matches!(
            compute_signature("", "data"),
            Err(SigningError::EmptyKey)
        ));
        assert!(matches!(
            compute_signature("not base64!!", "data"),
            Err(SigningError::InvalidKey { .. })
        ));
    }

    #[test]
    fn test_host_header() {
        let url = Url::parse("https://Contoso.Communication.Azure.com/emails:send").unwrap();
        assert_eq!(host_header(&url).unwrap(), "contoso.communication.azure.com");

        let url = Url::parse("http://127.0.0.1:8080/emails:send").unwrap();
        assert_eq!(host_header(&url).unwrap(), "127.0.0.1:8080");

        let url = Url::parse("https://example.com:443/").unwrap();
        assert_eq!(host_header(&url).unwrap(), "example.com");
    }

    #[test]
    fn test_path_and_query() {
        let url = Url::parse("https://example.com/emails/operations/abc?api-version=2025-09-01").unwrap();
        assert_eq!(path_and_query(&url), "/emails/operations/abc?api-version=2025-09-01");

        let url = Url::parse("https://example.com/emails").unwrap();
        assert_eq!(path_and_query(&url), "/emails");
    }

    #[test]
    fn test_debug_redacts_signature() {
        let signed = sign_request("POST", PATH, HOST, BODY, KEY, fixed_time()).unwrap();
        let debug = format!("{:?}", signed);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains(&signed.signature));
    }
}
