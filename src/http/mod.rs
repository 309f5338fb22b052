//! HTTP module for Email API communication.
//!
//! - **Transport Layer**: Pluggable transport implementations (reqwest by default)
//! - **HTTP Client**: Request signing and standard headers
//! - **Retry Policy**: The single retry authority wrapping every call
//! - **Request/Response**: Request building and buffered response parsing
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │ EmailHttpClient  │  - Signs every attempt
//! │   RetryPolicy    │  - Retries 429/5xx and network failures
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │    Transport     │  - HTTP transport abstraction
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │     reqwest      │  - Connection pooling, timeouts
//! └──────────────────┘
//! ```

mod client;
mod request;
mod response;
mod retry;
mod transport;

pub use client::{EmailHttpClient, CLIENT_REQUEST_ID_HEADER};
pub use request::{ApiRequest, HttpMethod};
pub use response::ApiResponse;
pub use retry::RetryPolicy;
pub use transport::{ReqwestTransport, Transport};

use crate::error::EmailResult;
use async_trait::async_trait;

/// Trait for HTTP clients that can send Email API requests.
///
/// Implementations own signing and retries; callers see only the final
/// outcome of a logical call.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Send a request and return a successful response.
    ///
    /// # Errors
    ///
    /// Returns the terminal error of the retry policy: the first
    /// non-retryable error, or [`EmailError::RetryExhausted`](crate::EmailError).
    async fn send_request(&self, request: ApiRequest) -> EmailResult<ApiResponse>;

    /// Endpoint requests are sent to.
    fn endpoint(&self) -> &str;

    /// `api-version` query value.
    fn api_version(&self) -> &str;
}
