//! Debug logging capability.
//!
//! Structured diagnostics always go through `tracing`. In addition, callers
//! that enable [`ClientOptions::debug`](crate::config::ClientOptions) get
//! human readable progress lines through an injected [`Logger`]. There is no
//! process-wide logger; each client owns its own.

use std::fmt;
use std::io::Write;
use std::sync::Arc;

/// Sink for debug lines.
///
/// # Example
///
/// ```
/// use integrations_azure_email::logging::Logger;
/// use std::fmt;
/// use std::sync::Mutex;
///
/// #[derive(Default)]
/// struct Collecting(Mutex<Vec<String>>);
///
/// impl Logger for Collecting {
///     fn log(&self, args: fmt::Arguments<'_>) {
///         self.0.lock().unwrap().push(args.to_string());
///     }
/// }
/// ```
pub trait Logger: Send + Sync {
    /// Record one line.
    fn log(&self, args: fmt::Arguments<'_>);
}

/// Writes `[DEBUG] ...` lines to standard error.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrLogger;

impl Logger for StderrLogger {
    fn log(&self, args: fmt::Arguments<'_>) {
        let stderr = std::io::stderr();
        let mut handle = stderr.lock();
        let _ = writeln!(handle, "[DEBUG] {}", args);
    }
}

/// Forwards lines to `tracing` at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, args: fmt::Arguments<'_>) {
        tracing::debug!(target: "integrations_azure_email::debug", "{}", args);
    }
}

/// A logger gated by the client's debug flag.
#[derive(Clone)]
pub(crate) struct DebugLog {
    enabled: bool,
    logger: Arc<dyn Logger>,
}

impl DebugLog {
    pub(crate) fn new(enabled: bool, logger: Arc<dyn Logger>) -> Self {
        Self { enabled, logger }
    }

    pub(crate) fn disabled() -> Self {
        Self::new(false, Arc::new(StderrLogger))
    }

    pub(crate) fn log(&self, args: fmt::Arguments<'_>) {
        if self.enabled {
            self.logger.log(args);
        }
    }
}

impl fmt::Debug for DebugLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugLog")
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}
