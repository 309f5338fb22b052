//! Retry executor.
//!
//! [`RetryPolicy`] is the only place in the crate that retries. It runs an
//! attempt closure until it succeeds, fails with a non-transient error, or
//! runs out of attempts.

use std::future::Future;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::RetryConfig;
use crate::error::{EmailError, EmailResult};

/// Retries transient failures according to a [`RetryConfig`].
#[derive(Debug, Clone, Default)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    /// Create a policy from a configuration.
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// The underlying configuration.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Run `attempt_fn` until it succeeds or the policy gives up.
    ///
    /// The closure receives the 1-based attempt number and must build a
    /// fresh request each time. Non-retryable errors are returned unchanged
    /// after a single attempt. When every attempt fails transiently the result
    /// is [`EmailError::RetryExhausted`] holding the last error.
    ///
    /// # Example
    ///
    /// ```rust
    /// use integrations_azure_email::config::RetryConfig;
    /// use integrations_azure_email::http::RetryPolicy;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let policy = RetryPolicy::new(RetryConfig::default());
    /// let value = policy
    ///     .execute("example", |_attempt| async { Ok::<_, integrations_azure_email::EmailError>(42) })
    ///     .await?;
    /// assert_eq!(value, 42);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn execute<T, F, Fut>(&self, operation: &str, mut attempt_fn: F) -> EmailResult<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = EmailResult<T>>,
    {
        let max_attempts = self.config.max_attempts();
        let mut attempt = 1;

        loop {
            let error = match attempt_fn(attempt).await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(operation, attempt, "Request succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(error) => error,
            };

            if !error.is_retryable() {
                return Err(error);
            }

            if attempt >= max_attempts {
                warn!(operation, attempts = attempt, error = %error, "Retries exhausted");
                return Err(EmailError::RetryExhausted {
                    attempts: attempt,
                    last_error: Box::new(error),
                });
            }

            let delay = self.config.calculate_delay(attempt, error.retry_after());
            warn!(
                operation,
                attempt,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Transient failure, retrying"
            );
            sleep(delay).await;
            attempt += 1;
        }
    }
}
