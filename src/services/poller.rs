//! Delivery status polling.
//!
//! [`StatusPoller`] queries an operation until it reaches a terminal status,
//! the deadline passes, the caller cancels, or a fatal error occurs:
//!
//! ```text
//!              ┌──────────────────────────────┐
//!              ▼                              │ non-terminal status,
//!         ┌─────────┐  terminal status   ┌──────────┐ or non-fatal error
//! start ─►│ Polling │───────────────────►│ Terminal │
//!         └─────────┘                    └──────────┘
//!           │  │  │
//!           │  │  └── deadline reached ──► TimedOut
//!           │  └───── token cancelled ───► Canceled
//!           └──────── fatal error ───────► Errored
//! ```
//!
//! The first tick fires immediately and each later tick fires one poll
//! interval after the previous tick completed. Each tick goes through the
//! HTTP client and therefore through the retry policy.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep_until, timeout, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{EmailError, EmailResult};
use crate::logging::DebugLog;
use crate::types::{Operation, StatusResponse};

/// Default delay between status queries.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default upper bound on a polling session.
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(300);

/// Something that can report the status of an operation.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Fetch the current status of `operation_id`.
    async fn fetch_status(&self, operation_id: &str) -> EmailResult<StatusResponse>;
}

#[async_trait]
impl<T: StatusSource + ?Sized> StatusSource for Arc<T> {
    async fn fetch_status(&self, operation_id: &str) -> EmailResult<StatusResponse> {
        (**self).fetch_status(operation_id).await
    }
}

/// Receives progress notifications from a polling session.
///
/// Observers are informational; they cannot change how polling proceeds.
pub trait PollObserver: Send + Sync {
    /// Called with every status received.
    fn on_status_update(&self, _status: &StatusResponse) {}

    /// Called with every failed tick, fatal or not.
    fn on_error(&self, _error: &EmailError) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl PollObserver for NoopObserver {}

/// Observer built from two closures.
///
/// # Example
///
/// ```
/// use integrations_azure_email::services::{CallbackObserver, WaitOptions};
/// use integrations_azure_email::{EmailError, StatusResponse};
///
/// let options = WaitOptions::default().observer(CallbackObserver::new(
///     |status: &StatusResponse| println!("status: {}", status.status),
///     |error: &EmailError| eprintln!("poll error: {}", error),
/// ));
/// ```
pub struct CallbackObserver<S, E> {
    on_status: S,
    on_error: E,
}

impl<S, E> CallbackObserver<S, E>
where
    S: Fn(&StatusResponse) + Send + Sync,
    E: Fn(&EmailError) + Send + Sync,
{
    /// Create an observer from status and error callbacks.
    pub fn new(on_status: S, on_error: E) -> Self {
        Self {
            on_status,
            on_error,
        }
    }
}

impl<S, E> PollObserver for CallbackObserver<S, E>
where
    S: Fn(&StatusResponse) + Send + Sync,
    E: Fn(&EmailError) + Send + Sync,
{
    fn on_status_update(&self, status: &StatusResponse) {
        (self.on_status)(status);
    }

    fn on_error(&self, error: &EmailError) {
        (self.on_error)(error);
    }
}

/// Settings for one polling session.
#[derive(Clone)]
pub struct WaitOptions {
    /// Delay between the end of one tick and the start of the next.
    pub poll_interval: Duration,
    /// Maximum session length, measured from the start of polling.
    pub max_wait: Duration,
    /// Progress observer.
    pub observer: Arc<dyn PollObserver>,
    /// Cooperative cancellation.
    pub cancellation: CancellationToken,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_wait: DEFAULT_MAX_WAIT,
            observer: Arc::new(NoopObserver),
            cancellation: CancellationToken::new(),
        }
    }
}

impl WaitOptions {
    /// Create options with the defaults (5 s interval, 5 min max wait).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the poll interval.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the maximum wait.
    pub fn max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    /// Set the observer.
    pub fn observer(mut self, observer: impl PollObserver + 'static) -> Self {
        self.observer = Arc::new(observer);
        self
    }

    /// Set the cancellation token.
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }
}

impl fmt::Debug for WaitOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitOptions")
            .field("poll_interval", &self.poll_interval)
            .field("max_wait", &self.max_wait)
            .field("cancelled", &self.cancellation.is_cancelled())
            .finish_non_exhaustive()
    }
}

/// Stop conditions checked between ticks. A terminal status returns `Ok`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PollState {
    Polling,
    TimedOut,
    Canceled,
    Errored,
}

/// Far-future fallback for durations that overflow the clock.
const FAR_FUTURE: Duration = Duration::from_secs(30 * 365 * 24 * 60 * 60);

fn instant_after(start: Instant, duration: Duration) -> Instant {
    start
        .checked_add(duration)
        .unwrap_or_else(|| start + FAR_FUTURE)
}

/// Polls a [`StatusSource`] until the operation completes.
pub struct StatusPoller<S> {
    source: S,
    options: WaitOptions,
    log: DebugLog,
}

impl<S: StatusSource> StatusPoller<S> {
    /// Create a poller.
    pub fn new(source: S, options: WaitOptions) -> Self {
        Self {
            source,
            options,
            log: DebugLog::disabled(),
        }
    }

    pub(crate) fn with_debug_log(mut self, log: DebugLog) -> Self {
        self.log = log;
        self
    }

    /// Poll an operation id until it completes.
    ///
    /// # Errors
    ///
    /// [`EmailError::PollTimeout`], [`EmailError::PollCanceled`] or
    /// [`EmailError::PollFailed`], each carrying the last status seen.
    pub async fn wait(&self, operation_id: &str) -> EmailResult<StatusResponse> {
        let mut operation = Operation::new(operation_id);
        self.poll(&mut operation).await
    }

    /// Poll a tracked operation, recording every status on it.
    pub async fn poll(&self, operation: &mut Operation) -> EmailResult<StatusResponse> {
        let options = &self.options;
        let deadline = instant_after(Instant::now(), options.max_wait);
        let mut last_status: Option<StatusResponse> = None;
        let mut ticks: u32 = 0;

        loop {
            let state = self.check_stop(deadline);
            if state != PollState::Polling {
                return Err(self.finish(state, operation.id(), last_status, None));
            }

            ticks += 1;
            let remaining = deadline.saturating_duration_since(Instant::now());
            debug!(operation_id = operation.id(), tick = ticks, "Polling email status");

            let outcome = timeout(remaining, self.source.fetch_status(operation.id())).await;
            match outcome {
                Err(_) => {
                    return Err(self.finish(PollState::TimedOut, operation.id(), last_status, None));
                }
                Ok(Ok(status)) => {
                    options.observer.on_status_update(&status);
                    self.log.log(format_args!(
                        "operation {} status {} (tick {})",
                        operation.id(),
                        status.status,
                        ticks
                    ));
                    operation.apply(&status);

                    if status.is_terminal() {
                        info!(
                            operation_id = operation.id(),
                            status = %status.status,
                            ticks,
                            "Email operation reached terminal status"
                        );
                        return Ok(status);
                    }
                    last_status = Some(status);
                }
                Ok(Err(error)) => {
                    options.observer.on_error(&error);
                    self.log.log(format_args!(
                        "operation {} poll error: {}",
                        operation.id(),
                        error
                    ));
                    if error.is_fatal_for_poll() {
                        return Err(self.finish(
                            PollState::Errored,
                            operation.id(),
                            last_status,
                            Some(error),
                        ));
                    }
                    warn!(operation_id = operation.id(), error = %error, "Status poll failed, continuing");
                }
            }

            let wake = std::cmp::min(
                instant_after(Instant::now(), options.poll_interval),
                deadline,
            );
            tokio::select! {
                biased;
                _ = options.cancellation.cancelled() => {}
                _ = sleep_until(wake) => {}
            }
        }
    }

    fn check_stop(&self, deadline: Instant) -> PollState {
        if self.options.cancellation.is_cancelled() {
            PollState::Canceled
        } else if Instant::now() >= deadline {
            PollState::TimedOut
        } else {
            PollState::Polling
        }
    }

    fn finish(
        &self,
        state: PollState,
        operation_id: &str,
        last_status: Option<StatusResponse>,
        error: Option<EmailError>,
    ) -> EmailError {
        let operation_id = operation_id.to_string();
        let last_status = last_status.map(Box::new);

        match (state, error) {
            (PollState::Errored, Some(source)) => {
                warn!(operation_id = %operation_id, error = %source, "Status polling failed");
                EmailError::PollFailed {
                    operation_id,
                    last_status,
                    source: Box::new(source),
                }
            }
            (PollState::Canceled, _) => {
                info!(operation_id = %operation_id, "Status polling canceled");
                EmailError::PollCanceled {
                    operation_id,
                    last_status,
                }
            }
            _ => {
                warn!(operation_id = %operation_id, max_wait = ?self.options.max_wait, "Status polling timed out");
                EmailError::PollTimeout {
                    operation_id,
                    max_wait: self.options.max_wait,
                    last_status,
                }
            }
        }
    }
}
