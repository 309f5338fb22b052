//! HTTP client implementation for the Email API.
//!
//! This module provides the signed HTTP client. Every attempt builds a new
//! wire request with a fresh timestamp, signature and client request id.

use async_trait::async_trait;
use chrono::Utc;
use http::header::{HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::Request;
use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::config::ClientOptions;
use crate::credentials::Credential;
use crate::error::{EmailError, EmailResult};
use crate::logging::DebugLog;
use crate::signing::{CONTENT_HASH_HEADER, DATE_HEADER};

use super::request::ApiRequest;
use super::response::ApiResponse;
use super::retry::RetryPolicy;
use super::transport::{ReqwestTransport, Transport};
use super::HttpClient;

/// Header carrying the per-attempt client request id.
pub const CLIENT_REQUEST_ID_HEADER: &str = "x-ms-client-request-id";

const APPLICATION_JSON: &str = "application/json";

/// Signed, retrying HTTP client for the Email API.
pub struct EmailHttpClient {
    credential: Arc<Credential>,
    transport: Arc<dyn Transport>,
    retry: RetryPolicy,
    api_version: String,
    user_agent: String,
    log: DebugLog,
}

impl EmailHttpClient {
    /// Create a client backed by reqwest.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::Configuration`] if the reqwest client cannot be built.
    pub fn new(options: &ClientOptions, credential: Credential) -> EmailResult<Self> {
        let transport = Arc::new(ReqwestTransport::new(
            options.timeout,
            options.connect_timeout,
            &options.user_agent,
        )?) as Arc<dyn Transport>;
        Ok(Self::with_transport(options, credential, transport))
    }

    /// Create a client with a custom transport.
    pub fn with_transport(
        options: &ClientOptions,
        credential: Credential,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            credential: Arc::new(credential),
            transport,
            retry: RetryPolicy::new(options.retry_config()),
            api_version: options.api_version.clone(),
            user_agent: options.user_agent.clone(),
            log: DebugLog::new(options.debug, Arc::clone(&options.logger)),
        }
    }

    /// The resolved credential.
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// The retry policy wrapping every call.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Build and sign a wire request for one attempt.
    fn build_request(&self, api_request: &ApiRequest) -> EmailResult<Request> {
        let url = api_request.build_url(self.credential.endpoint())?;
        let body = api_request.body().unwrap_or_default();

        let auth = self.credential.authorize(
            api_request.method().as_str(),
            &url,
            body,
            Utc::now(),
        )?;

        let mut request = Request::new(api_request.method().to_reqwest(), url);
        let headers = request.headers_mut();

        for (name, value) in api_request.headers() {
            headers.insert(name.clone(), value.clone());
        }

        headers.insert(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));
        if api_request.body().is_some() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
        }
        headers.insert(USER_AGENT, header_value("user-agent", &self.user_agent)?);
        headers.insert(
            CLIENT_REQUEST_ID_HEADER,
            header_value(CLIENT_REQUEST_ID_HEADER, &Uuid::new_v4().to_string())?,
        );
        headers.insert(DATE_HEADER, header_value(DATE_HEADER, &auth.date)?);
        headers.insert(
            CONTENT_HASH_HEADER,
            header_value(CONTENT_HASH_HEADER, &auth.content_hash)?,
        );

        let mut authorization = HeaderValue::from_str(auth.authorization.expose_secret())
            .map_err(|_| EmailError::Signing {
                message: "Authorization value contains invalid header characters".to_string(),
            })?;
        authorization.set_sensitive(true);
        headers.insert(AUTHORIZATION, authorization);

        if let Some(body) = api_request.body() {
            *request.body_mut() = Some(body.to_vec().into());
        }

        Ok(request)
    }

    /// Perform one attempt.
    async fn execute_once(&self, api_request: &ApiRequest, attempt: u32) -> EmailResult<ApiResponse> {
        let request = self.build_request(api_request)?;

        debug!(
            method = api_request.method().as_str(),
            path = api_request.path(),
            attempt,
            "Sending request"
        );
        self.log.log(format_args!(
            "{} {} (attempt {})",
            api_request.method().as_str(),
            api_request.path(),
            attempt
        ));

        let response = self.transport.send(request).await?;
        let response = ApiResponse::from_reqwest(response).await?;

        debug!(
            status = response.status().as_u16(),
            request_id = response.request_id().unwrap_or(""),
            "Received response"
        );
        self.log.log(format_args!(
            "{} {} -> {}",
            api_request.method().as_str(),
            api_request.path(),
            response.status().as_u16()
        ));

        if response.is_success() {
            Ok(response)
        } else {
            Err(response.into_error())
        }
    }
}

fn header_value(name: &str, value: &str) -> EmailResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| EmailError::configuration(format!("Invalid {} header: {}", name, e)))
}

#[async_trait]
impl HttpClient for EmailHttpClient {
    async fn send_request(&self, request: ApiRequest) -> EmailResult<ApiResponse> {
        let operation = format!("{} {}", request.method().as_str(), request.path());
        self.retry
            .execute(&operation, |attempt| self.execute_once(&request, attempt))
            .await
    }

    fn endpoint(&self) -> &str {
        self.credential.endpoint()
    }

    fn api_version(&self) -> &str {
        &self.api_version
    }
}

impl std::fmt::Debug for EmailHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailHttpClient")
            .field("endpoint", &self.credential.endpoint())
            .field("credential", &self.credential.kind())
            .field("api_version", &self.api_version)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}
