//! The transport contract.
//!
//! A [`Transport`] is a reusable, stateful handle in the style of a curl easy
//! handle: options are set one by one, [`Transport::perform`] runs the
//! exchange, and [`Transport::info`] reports metrics afterwards. Options stick
//! until [`Transport::reset`] is called, which is why
//! [`TransportConfig::apply`](config::TransportConfig::apply) always starts
//! with a reset.
//!
//! [`NativeTransport`](native::NativeTransport) is the shipped implementation.

pub mod config;
pub mod native;

pub use config::{RequestOverrides, TransportConfig};
pub use native::NativeTransport;

use crate::base::neterror::TransportError;
use crate::http::info::{InfoKey, InfoValue};
use crate::socket::proxy::ProxySettings;
use bytes::Bytes;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Protocol version requested from the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HttpVersion {
    #[default]
    Http11,
    Http2,
}

impl HttpVersion {
    pub fn is_h2(self) -> bool {
        self == HttpVersion::Http2
    }
}

/// HTTP request method. Anything not listed travels as a literal token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
    Patch,
    Custom(String),
}

impl Method {
    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
            Method::Patch => "PATCH",
            Method::Custom(m) => m,
        }
    }
}

impl FromStr for Method {
    type Err = std::convert::Infallible;

    /// Known methods match case-insensitively; others are upper-cased.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        Ok(match upper.as_str() {
            "GET" => Method::Get,
            "POST" => Method::Post,
            "PUT" => Method::Put,
            "DELETE" => Method::Delete,
            "HEAD" => Method::Head,
            "OPTIONS" => Method::Options,
            "PATCH" => Method::Patch,
            _ => Method::Custom(upper),
        })
    }
}

impl From<&str> for Method {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(m) => m,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a transport writes one exchange.
///
/// `header_bytes` holds every header block received (one per redirect hop),
/// each in HTTP/1 text form and terminated by an empty line. `body` holds the
/// final hop's body as received (still content-encoded).
#[derive(Debug, Clone, Default)]
pub struct ExchangeSink {
    pub header_bytes: Vec<u8>,
    pub body: Vec<u8>,
    /// Verbose trace lines, only filled when verbose mode is on.
    pub debug: Vec<String>,
}

impl ExchangeSink {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A reusable, stateful HTTP transport handle.
pub trait Transport: Send {
    /// Discard every option set since the last reset.
    fn reset(&mut self);

    fn set_url(&mut self, url: &str);

    fn set_method(&mut self, method: &Method);

    /// Request header lines (`"Name: value"`), sent in this order.
    fn set_headers(&mut self, lines: &[String]);

    fn set_http_version(&mut self, version: HttpVersion);

    fn set_proxy(&mut self, proxy: Option<&ProxySettings>);

    /// OpenSSL-style cipher string, applied verbatim.
    fn set_cipher_list(&mut self, ciphers: &str);

    fn set_tls_verify(&mut self, verify: bool);

    fn set_follow_redirects(&mut self, follow: bool);

    fn set_timeout(&mut self, timeout: Duration);

    fn set_body(&mut self, body: Option<Bytes>);

    /// Value of the `Cookie` header; empty means none.
    fn set_cookie(&mut self, cookie: &str);

    fn set_verbose(&mut self, verbose: bool);

    /// Run the exchange with the current options.
    fn perform(&mut self, sink: &mut ExchangeSink) -> Result<(), TransportError>;

    /// Metric from the last `perform`; `None` when unsupported.
    fn info(&self, key: InfoKey) -> Option<InfoValue>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn reset(&mut self) {
        (**self).reset()
    }
    fn set_url(&mut self, url: &str) {
        (**self).set_url(url)
    }
    fn set_method(&mut self, method: &Method) {
        (**self).set_method(method)
    }
    fn set_headers(&mut self, lines: &[String]) {
        (**self).set_headers(lines)
    }
    fn set_http_version(&mut self, version: HttpVersion) {
        (**self).set_http_version(version)
    }
    fn set_proxy(&mut self, proxy: Option<&ProxySettings>) {
        (**self).set_proxy(proxy)
    }
    fn set_cipher_list(&mut self, ciphers: &str) {
        (**self).set_cipher_list(ciphers)
    }
    fn set_tls_verify(&mut self, verify: bool) {
        (**self).set_tls_verify(verify)
    }
    fn set_follow_redirects(&mut self, follow: bool) {
        (**self).set_follow_redirects(follow)
    }
    fn set_timeout(&mut self, timeout: Duration) {
        (**self).set_timeout(timeout)
    }
    fn set_body(&mut self, body: Option<Bytes>) {
        (**self).set_body(body)
    }
    fn set_cookie(&mut self, cookie: &str) {
        (**self).set_cookie(cookie)
    }
    fn set_verbose(&mut self, verbose: bool) {
        (**self).set_verbose(verbose)
    }
    fn perform(&mut self, sink: &mut ExchangeSink) -> Result<(), TransportError> {
        (**self).perform(sink)
    }
    fn info(&self, key: InfoKey) -> Option<InfoValue> {
        (**self).info(key)
    }
}
