use std::fmt;
use thiserror::Error;

/// Errors surfaced by the session, configuration and response layers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetError {
    /// Network-level failure reported by the transport (DNS, connect, TLS, timeout).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Proxy string is not `host:port[:user:pass]`.
    #[error("Invalid proxy format: {0:?} (expected host:port[:user:pass])")]
    InvalidProxyFormat(String),

    /// The raw header block could not be parsed.
    #[error("Response parse error: {0}")]
    ResponseParse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("JSON error: {0}")]
    JsonParse(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl NetError {
    /// Numeric reason code, following Chromium's `net_error_list.h` ranges.
    pub fn as_i32(&self) -> i32 {
        match self {
            NetError::Transport(e) => e.code,
            NetError::InvalidProxyFormat(_) => -336,
            NetError::ResponseParse(_) => -320,
            NetError::InvalidUrl(_) => -300,
            NetError::JsonParse(_) => -340,
            NetError::Io(_) => -2,
        }
    }

    /// Returns the transport error if this is one.
    pub fn transport(&self) -> Option<&TransportError> {
        match self {
            NetError::Transport(e) => Some(e),
            _ => None,
        }
    }

    /// True for network timeouts.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            NetError::Transport(TransportError {
                kind: TransportErrorKind::Timeout,
                ..
            })
        )
    }
}

impl From<serde_json::Error> for NetError {
    fn from(e: serde_json::Error) -> Self {
        NetError::JsonParse(e.to_string())
    }
}

/// Category of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportErrorKind {
    NameNotResolved,
    ConnectionFailed,
    Timeout,
    TlsHandshake,
    ProxyTunnel,
    Protocol,
    TooManyRedirects,
    Io,
}

impl TransportErrorKind {
    /// Default reason code for this kind.
    pub fn default_code(self) -> i32 {
        match self {
            TransportErrorKind::ConnectionFailed => -104,
            TransportErrorKind::NameNotResolved => -105,
            TransportErrorKind::TlsHandshake => -107,
            TransportErrorKind::ProxyTunnel => -111,
            TransportErrorKind::Timeout => -118,
            TransportErrorKind::TooManyRedirects => -310,
            TransportErrorKind::Protocol => -370,
            TransportErrorKind::Io => -2,
        }
    }
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransportErrorKind::NameNotResolved => "Name not resolved",
            TransportErrorKind::ConnectionFailed => "Connection failed",
            TransportErrorKind::Timeout => "Connection timed out",
            TransportErrorKind::TlsHandshake => "TLS handshake failed",
            TransportErrorKind::ProxyTunnel => "Tunnel connection failed",
            TransportErrorKind::Protocol => "HTTP protocol error",
            TransportErrorKind::TooManyRedirects => "Too many redirects",
            TransportErrorKind::Io => "IO error",
        };
        f.write_str(s)
    }
}

/// A network-level failure with its underlying reason code.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind} ({code}): {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub code: i32,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: kind.default_code(),
            message: message.into(),
        }
    }

    /// Override the reason code (e.g. an OS errno or a proxy status).
    pub fn with_code(mut self, code: i32) -> Self {
        self.code = code;
        self
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Timeout, message)
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Protocol, message)
    }

    pub fn tls(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::TlsHandshake, message)
    }
}
