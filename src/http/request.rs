//! HTTP request types for the Email API.
//!
//! An [`ApiRequest`] describes one logical call. It is turned into a signed
//! wire request once per attempt, so it carries no timestamps or signatures.

use http::header::{HeaderName, HeaderValue};
use http::HeaderMap;
use serde::Serialize;
use url::Url;

use crate::error::{EmailError, EmailResult};

/// HTTP methods used by the Email API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET request
    GET,
    /// POST request
    POST,
}

impl HttpMethod {
    /// Convert the HTTP method to a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
        }
    }

    pub(crate) fn to_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::GET => reqwest::Method::GET,
            HttpMethod::POST => reqwest::Method::POST,
        }
    }
}

/// A request to the Email API.
///
/// # Examples
///
/// ```rust
/// use integrations_azure_email::http::ApiRequest;
///
/// let request = ApiRequest::get("/emails/operations/abc")
///     .query("api-version", "2025-09-01");
/// assert_eq!(request.path(), "/emails/operations/abc");
/// ```
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: HttpMethod,
    path: String,
    query_params: Vec<(String, String)>,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
}

impl ApiRequest {
    /// Create a GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::GET, path)
    }

    /// Create a POST request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::POST, path)
    }

    /// Create a request with the given method and path.
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query_params: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Add a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.push((key.into(), value.into()));
        self
    }

    /// Add a header sent unchanged on every attempt.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::Configuration`] for an invalid name or value.
    pub fn header(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> EmailResult<Self> {
        let name = HeaderName::from_bytes(key.as_ref().as_bytes())
            .map_err(|e| EmailError::configuration(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::from_str(value.as_ref())
            .map_err(|e| EmailError::configuration(format!("Invalid header value: {}", e)))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Serialize `json` as the request body.
    pub fn json<T: Serialize>(mut self, json: &T) -> EmailResult<Self> {
        self.body = Some(serde_json::to_vec(json)?);
        Ok(self)
    }

    /// HTTP method.
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Path relative to the endpoint.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query parameters.
    pub fn query_params(&self) -> &[(String, String)] {
        &self.query_params
    }

    /// Extra headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Body bytes, if any.
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Build the full URL for this request.
    ///
    /// Query values are form-encoded. The path is appended as given, so
    /// dynamic segments must already be percent-encoded.
    pub fn build_url(&self, endpoint: &str) -> EmailResult<Url> {
        let mut url = Url::parse(&format!("{}{}", endpoint.trim_end_matches('/'), self.path))?;
        if !self.query_params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query_params {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[test]
    fn test_http_method_as_str() {
        assert_eq!(HttpMethod::GET.as_str(), "GET");
        assert_eq!(HttpMethod::POST.as_str(), "POST");
    }

    #[test]
    fn test_build_url() {
        let request = ApiRequest::post("/emails:send").query("api-version", "2025-09-01");
        let url = request
            .build_url("https://contoso.communication.azure.com/")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://contoso.communication.azure.com/emails:send?api-version=2025-09-01"
        );
    }

    #[test]
    fn test_build_url_keeps_encoded_segments() {
        let request = ApiRequest::get("/emails/operations/a%2Fb");
        let url = request.build_url("http://127.0.0.1:8080").unwrap();
        assert_eq!(url.path(), "/emails/operations/a%2Fb");
    }

    #[test]
    fn test_json_body() {
        #[derive(Serialize)]
        struct Body {
            name: String,
        }

        let request = ApiRequest::post("/emails:send")
            .json(&Body {
                name: "test".to_string(),
            })
            .unwrap();
        assert_eq!(request.body(), Some(br#"{"name":"test"}"#.as_slice()));
    }

    #[test]
    fn test_header() {
        let request = ApiRequest::post("/emails:send")
            .header("Operation-Id", "123")
            .unwrap();
        assert_eq!(request.headers().get("operation-id").unwrap(), "123");

        assert!(ApiRequest::get("/").header("bad header", "x").is_err());
    }
}
