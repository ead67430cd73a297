//! Ergonomic error context helpers.
//!
//! Extension traits that turn IO errors into context-rich
//! [`TransportError`] values carrying an OS-level reason code.

use crate::base::neterror::{TransportError, TransportErrorKind};
use std::io;

/// Extension trait for adding context to IO Results.
pub trait IoResultExt<T> {
    /// Add connection context to an IO error.
    ///
    /// # Example
    /// ```ignore
    /// use mimicnet::base::context::IoResultExt;
    ///
    /// let stream = TcpStream::connect(addr).await
    ///     .connection_context("example.com", 443)?;
    /// // Error: "Connection failed (-102): example.com:443: connection refused"
    /// ```
    fn connection_context(self, host: &str, port: u16) -> Result<T, TransportError>;

    /// Add DNS resolution context to an IO error.
    fn dns_context(self, domain: &str) -> Result<T, TransportError>;

    /// Add tunnel context to an IO error raised while talking to a proxy.
    fn tunnel_context(self, proxy: &str) -> Result<T, TransportError>;
}

impl<T> IoResultExt<T> for Result<T, io::Error> {
    fn connection_context(self, host: &str, port: u16) -> Result<T, TransportError> {
        self.map_err(|e| {
            let kind = match e.kind() {
                io::ErrorKind::TimedOut => TransportErrorKind::Timeout,
                _ => TransportErrorKind::ConnectionFailed,
            };
            TransportError::new(kind, format!("{}:{}: {}", host, port, e)).with_code(io_code(&e))
        })
    }

    fn dns_context(self, domain: &str) -> Result<T, TransportError> {
        self.map_err(|e| {
            TransportError::new(TransportErrorKind::NameNotResolved, format!("{}: {}", domain, e))
        })
    }

    fn tunnel_context(self, proxy: &str) -> Result<T, TransportError> {
        self.map_err(|e| {
            TransportError::new(TransportErrorKind::ProxyTunnel, format!("{}: {}", proxy, e))
        })
    }
}

/// Map an IO error to a Chromium-style code.
fn io_code(e: &io::Error) -> i32 {
    match e.kind() {
        io::ErrorKind::ConnectionRefused => -102,
        io::ErrorKind::ConnectionReset => -101,
        io::ErrorKind::ConnectionAborted => -103,
        io::ErrorKind::TimedOut => -118,
        io::ErrorKind::AddrNotAvailable => -109,
        _ => -104,
    }
}
