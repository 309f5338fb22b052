//! HTTP response handling for the Email API.

use http::StatusCode;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;

use crate::error::{map_error_response, parse_retry_after, EmailError, EmailResult};

/// A buffered response from the Email API.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

impl ApiResponse {
    /// Create a response from parts. Header names are lowercased.
    pub fn new(status: StatusCode, headers: HashMap<String, String>, body: Vec<u8>) -> Self {
        let headers = headers
            .into_iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v))
            .collect();
        Self {
            status,
            headers,
            body,
        }
    }

    /// Buffer a reqwest response.
    ///
    /// # Errors
    ///
    /// A failure while reading the body is reported as a network error.
    pub async fn from_reqwest(response: reqwest::Response) -> EmailResult<Self> {
        let status = response.status();

        let mut headers = HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                headers.insert(name.as_str().to_ascii_lowercase(), value.to_string());
            }
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EmailError::timeout(format!("Timed out reading response body: {}", e))
                } else {
                    EmailError::network(
                        format!("Failed to read response body: {}", e),
                        Some(Box::new(e)),
                    )
                }
            })?
            .to_vec();

        Ok(Self {
            status,
            headers,
            body,
        })
    }

    /// HTTP status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Raw body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Deserialize the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> EmailResult<T> {
        serde_json::from_slice(&self.body).map_err(Into::into)
    }

    /// Value of `x-ms-request-id`.
    pub fn request_id(&self) -> Option<&str> {
        self.header("x-ms-request-id")
    }

    /// Server retry hint from `retry-after-ms`, `x-ms-retry-after-ms` or `retry-after`.
    pub fn retry_after(&self) -> Option<Duration> {
        self.header("retry-after-ms")
            .or_else(|| self.header("x-ms-retry-after-ms"))
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .or_else(|| self.header("retry-after").and_then(parse_retry_after))
    }

    /// Check for a 2xx status.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Convert a non-success response into an error.
    pub fn into_error(self) -> EmailError {
        let request_id = self.request_id().map(str::to_string);
        let retry_after = self.retry_after();
        map_error_response(self.status.as_u16(), &self.body, request_id, retry_after)
    }
}
