//! Types for Email API operations.
//!
//! Message payloads, send and status responses, and the locally tracked
//! [`Operation`].

mod email;
mod operation;
mod responses;

pub use email::*;
pub use operation::*;
pub use responses::*;
