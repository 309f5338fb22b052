//! Retry configuration and backoff strategies.

use rand::Rng;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Default delay between attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Computes the wait before a retry.
///
/// `attempt` is the number of the attempt that just failed, starting at 1.
pub trait BackoffStrategy: Send + Sync + fmt::Debug {
    /// Delay before the next attempt.
    fn delay(&self, attempt: u32) -> Duration;
}

/// The same delay before every retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedBackoff {
    delay: Duration,
}

impl FixedBackoff {
    /// Create a fixed backoff.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for FixedBackoff {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_DELAY)
    }
}

impl BackoffStrategy for FixedBackoff {
    fn delay(&self, _attempt: u32) -> Duration {
        self.delay
    }
}

/// Exponentially growing delay with a cap and optional jitter.
#[derive(Debug, Clone, PartialEq)]
pub struct ExponentialBackoff {
    /// Delay after the first failure.
    pub initial: Duration,
    /// Upper bound on any single delay.
    pub max: Duration,
    /// Growth factor per attempt.
    pub multiplier: f64,
    /// Randomize each delay within `[0, computed]`.
    pub jitter: bool,
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(500),
            max: Duration::from_secs(30),
            multiplier: 2.0,
            jitter: true,
        }
    }
}

impl ExponentialBackoff {
    /// Create an exponential backoff without jitter.
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max,
            multiplier: 2.0,
            jitter: false,
        }
    }

    /// Enable or disable jitter.
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Set the growth factor.
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }
}

impl BackoffStrategy for ExponentialBackoff {
    /// Calculate the delay for a given attempt.
    ///
    /// # Example
    ///
    /// ```
    /// use integrations_azure_email::config::{BackoffStrategy, ExponentialBackoff};
    /// use std::time::Duration;
    ///
    /// let backoff = ExponentialBackoff::new(Duration::from_millis(100), Duration::from_secs(1));
    /// assert_eq!(backoff.delay(1), Duration::from_millis(100));
    /// assert_eq!(backoff.delay(2), Duration::from_millis(200));
    /// assert_eq!(backoff.delay(10), Duration::from_secs(1));
    /// ```
    fn delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31) as i32;
        let base = self.initial.as_secs_f64() * self.multiplier.powi(exponent);
        let capped = base.min(self.max.as_secs_f64()).max(0.0);

        if self.jitter && capped > 0.0 {
            let mut rng = rand::thread_rng();
            Duration::from_secs_f64(rng.gen_range(0.0..=capped))
        } else {
            Duration::from_secs_f64(capped)
        }
    }
}

/// Retry settings for one client.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay strategy between attempts.
    pub backoff: Arc<dyn BackoffStrategy>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff: Arc::new(FixedBackoff::default()),
        }
    }
}

impl RetryConfig {
    /// Create a retry configuration.
    pub fn new(max_retries: u32, backoff: Arc<dyn BackoffStrategy>) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    /// Retry configuration that makes exactly one attempt.
    pub fn disabled() -> Self {
        Self::new(0, Arc::new(FixedBackoff::new(Duration::ZERO)))
    }

    /// Total attempts allowed for one logical call.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before the next attempt.
    ///
    /// A server supplied `retry_after` wins when it is longer.
    pub fn calculate_delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let delay = self.backoff.delay(attempt);
        match retry_after {
            Some(hint) if hint > delay => hint,
            _ => delay,
        }
    }
}
