//! Base types and error handling.
//!
//! - [`NetError`]: errors surfaced to callers of the session API
//! - [`TransportError`]: network-level failures with a reason code

pub mod context;
pub mod neterror;

pub use neterror::{NetError, TransportError, TransportErrorKind};
