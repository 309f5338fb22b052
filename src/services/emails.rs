//! Email send and status operations.
//!
//! - `POST /emails:send` submits a message and returns an operation id
//! - `GET /emails/operations/{id}` reads the delivery status of that operation

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

use crate::error::{EmailError, EmailResult};
use crate::http::{ApiRequest, ApiResponse, HttpClient};
use crate::types::{ApiError, EmailMessage, EmailStatus, SendResponse, StatusResponse};

use super::poller::StatusSource;

/// Header carrying the idempotency key of a send.
pub const OPERATION_ID_HEADER: &str = "Operation-Id";

/// Characters left unescaped in a path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

#[derive(Debug, Default, Deserialize)]
struct SendBody {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    status: Option<EmailStatus>,
    #[serde(default)]
    error: Option<ApiError>,
}

/// Service for email send and status operations.
///
/// # Examples
///
/// ```rust,no_run
/// use integrations_azure_email::config::ClientOptions;
/// use integrations_azure_email::credentials::Credential;
/// use integrations_azure_email::http::EmailHttpClient;
/// use integrations_azure_email::services::EmailService;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let options = ClientOptions::builder().build()?;
/// let credential = Credential::from_connection_string(
///     "endpoint=https://contoso.communication.azure.com;accesskey=c2VjcmV0",
/// )?;
/// let service = EmailService::new(EmailHttpClient::new(&options, credential)?);
///
/// let status = service.get_status("operation-id").await?;
/// println!("{}", status.status);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct EmailService {
    http_client: Arc<dyn HttpClient>,
}

impl EmailService {
    /// Create a new email service.
    pub fn new(http_client: impl HttpClient + 'static) -> Self {
        Self {
            http_client: Arc::new(http_client),
        }
    }

    /// Create a service sharing an existing HTTP client.
    pub fn from_arc(http_client: Arc<dyn HttpClient>) -> Self {
        Self { http_client }
    }

    /// Submit a message.
    ///
    /// One `Operation-Id` is generated per call and reused across retries so
    /// the service can de-duplicate a resubmission. This never waits for
    /// delivery.
    ///
    /// # Errors
    ///
    /// Returns the retry policy's terminal error unchanged, or
    /// [`EmailError::Serialization`] if the response carries no operation id.
    pub async fn send(&self, message: &EmailMessage) -> EmailResult<SendResponse> {
        let idempotency_key = Uuid::new_v4().to_string();
        let request = ApiRequest::post("/emails:send")
            .query("api-version", self.http_client.api_version())
            .header(OPERATION_ID_HEADER, &idempotency_key)?
            .json(message)?;

        debug!(
            recipients = message.recipients.count(),
            attachments = message.attachments.len(),
            operation_id = %idempotency_key,
            "Submitting email"
        );

        let response = self.http_client.send_request(request).await?;
        let send_response = parse_send_response(&response)?;

        info!(
            operation_id = %send_response.id,
            status = %send_response.status,
            "Email accepted"
        );
        Ok(send_response)
    }

    /// Read the status of a send operation.
    ///
    /// # Errors
    ///
    /// A 404 surfaces as [`EmailError::Remote`] or a status transport error;
    /// transient failures follow the retry policy.
    pub async fn get_status(&self, operation_id: &str) -> EmailResult<StatusResponse> {
        if operation_id.trim().is_empty() {
            return Err(EmailError::configuration("operation id must not be empty"));
        }

        let path = format!(
            "/emails/operations/{}",
            utf8_percent_encode(operation_id, PATH_SEGMENT)
        );
        let request = ApiRequest::get(path).query("api-version", self.http_client.api_version());

        let response = self.http_client.send_request(request).await?;
        let status: StatusResponse = response.json()?;

        debug!(operation_id, status = %status.status, "Fetched email status");
        Ok(status)
    }
}

/// Extract the send result from a 200/202 response.
///
/// The id comes from the body, then the `operation-id` header, then the last
/// path segment of `operation-location`.
fn parse_send_response(response: &ApiResponse) -> EmailResult<SendResponse> {
    let body = if response.body().iter().all(u8::is_ascii_whitespace) {
        SendBody::default()
    } else {
        response.json::<SendBody>()?
    };

    let id = body
        .id
        .filter(|id| !id.is_empty())
        .or_else(|| {
            response
                .header("operation-id")
                .filter(|id| !id.is_empty())
                .map(str::to_string)
        })
        .or_else(|| {
            response
                .header("operation-location")
                .and_then(id_from_operation_location)
        })
        .ok_or_else(|| EmailError::serialization("Send response did not include an operation id"))?;

    Ok(SendResponse {
        id,
        status: body.status.unwrap_or(EmailStatus::Queued),
        error: body.error,
    })
}

fn id_from_operation_location(location: &str) -> Option<String> {
    let url = Url::parse(location).ok()?;
    let segment = url.path_segments()?.filter(|s| !s.is_empty()).last()?;
    let decoded = percent_encoding::percent_decode_str(segment)
        .decode_utf8()
        .ok()?;
    Some(decoded.into_owned())
}

#[async_trait]
impl StatusSource for EmailService {
    async fn fetch_status(&self, operation_id: &str) -> EmailResult<StatusResponse> {
        self.get_status(operation_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClientOptions, FixedBackoff};
    use crate::credentials::Credential;
    use crate::http::EmailHttpClient;
    use crate::types::{EmailAddress, EmailContent, EmailRecipients};
    use http::StatusCode;
    use std::collections::HashMap;
    use std::time::Duration;
    use wiremock::matchers::{header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const KEY: &str = "dGVzdC1hY2Nlc3Mta2V5LTAxMjM0NTY3ODlhYmNkZWY=";

    fn service_for(server: &MockServer) -> EmailService {
        let options = ClientOptions::builder()
            .backoff(FixedBackoff::new(Duration::from_millis(5)))
            .build()
            .unwrap();
        let credential = Credential::access_key(server.uri(), KEY).unwrap();
        EmailService::new(EmailHttpClient::new(&options, credential).unwrap())
    }

    fn message() -> EmailMessage {
        EmailMessage {
            sender_address: "noreply@contoso.com".to_string(),
            content: EmailContent {
                subject: "Hello".to_string(),
                plain_text: Some("Hi".to_string()),
                html: None,
            },
            recipients: EmailRecipients {
                to: vec![EmailAddress::new("user@example.com")],
                ..Default::default()
            },
            reply_to: Vec::new(),
            attachments: Vec::new(),
            user_engagement_tracking_disabled: None,
        }
    }

    fn response(headers: &[(&str, &str)], body: &str) -> ApiResponse {
        ApiResponse::new(
            StatusCode::ACCEPTED,
            headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
            body.as_bytes().to_vec(),
        )
    }

    #[test]
    fn test_id_from_body() {
        let parsed =
            parse_send_response(&response(&[], r#"{"id":"op-1","status":"Running"}"#)).unwrap();
        assert_eq!(parsed.id, "op-1");
        assert_eq!(parsed.status, EmailStatus::OutForDelivery);
    }

    #[test]
    fn test_id_from_operation_id_header() {
        let parsed = parse_send_response(&response(&[("Operation-Id", "op-2")], "")).unwrap();
        assert_eq!(parsed.id, "op-2");
        assert_eq!(parsed.status, EmailStatus::Queued);
    }

    #[test]
    fn test_id_from_operation_location() {
        let parsed = parse_send_response(&response(
            &[(
                "Operation-Location",
                "https://contoso.communication.azure.com/emails/operations/op-3?api-version=2025-09-01",
            )],
            "{}",
        ))
        .unwrap();
        assert_eq!(parsed.id, "op-3");
    }

    #[test]
    fn test_missing_id_is_serialization_error() {
        let err = parse_send_response(&response(&[], "{}")).unwrap_err();
        assert!(matches!(err, EmailError::Serialization { .. }));
    }

    #[tokio::test]
    async fn test_send_posts_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emails:send"))
            .and(query_param("api-version", "2025-09-01"))
            .and(header_exists("operation-id"))
            .respond_with(
                ResponseTemplate::new(202).set_body_string(r#"{"id":"op-1","status":"Running"}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let response = service_for(&server).send(&message()).await.unwrap();
        assert_eq!(response.id, "op-1");

        let received = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
        assert_eq!(body["senderAddress"], "noreply@contoso.com");
        assert_eq!(body["recipients"]["to"][0]["address"], "user@example.com");
    }

    #[tokio::test]
    async fn test_send_reuses_operation_id_across_retries() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(202).set_body_string(r#"{"id":"op-1"}"#))
            .mount(&server)
            .await;

        service_for(&server).send(&message()).await.unwrap();

        let received = server.received_requests().await.unwrap();
        assert_eq!(received.len(), 2);
        assert_eq!(
            received[0].headers.get("operation-id"),
            received[1].headers.get("operation-id")
        );
        assert_ne!(
            received[0].headers.get("x-ms-client-request-id"),
            received[1].headers.get("x-ms-client-request-id")
        );
    }

    #[tokio::test]
    async fn test_get_status_encodes_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/emails/operations/a%20b"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"id":"a b","status":"Succeeded"}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let status = service_for(&server).get_status("a b").await.unwrap();
        assert_eq!(status.status, EmailStatus::Delivered);
    }

    #[tokio::test]
    async fn test_get_status_rejects_empty_id() {
        let server = MockServer::start().await;
        let err = service_for(&server).get_status("  ").await.unwrap_err();
        assert!(matches!(err, EmailError::Configuration { .. }));
    }
}
