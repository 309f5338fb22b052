//! Service adapters for the Email API.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                      EmailClient                         │
//! └──────────────────────┬──────────────────────────────────┘
//!                        │
//!                        ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │              Service Adapters (this module)             │
//! │  - emails: send and status operations                   │
//! │  - poller: wait for an operation to complete            │
//! └──────────────────────┬──────────────────────────────────┘
//!                        │
//!                        ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │                   HTTP Client                            │
//! │  (Request signing, retry logic)                         │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod emails;
pub mod poller;

pub use emails::{EmailService, OPERATION_ID_HEADER};
pub use poller::{
    CallbackObserver, NoopObserver, PollObserver, StatusPoller, StatusSource, WaitOptions,
    DEFAULT_MAX_WAIT, DEFAULT_POLL_INTERVAL,
};
