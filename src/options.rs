//! Per-call request options.

use crate::http::HeaderMap;
use bytes::Bytes;
use serde::Serialize;
use std::time::Duration;

/// Options for one [`Session::request`](crate::Session::request) call.
///
/// Everything here applies to that call only; the session's own
/// configuration is never changed by it.
///
/// # Example
///
/// ```rust
/// use mimicnet::RequestOptions;
/// use std::time::Duration;
///
/// let opts = RequestOptions::new()
///     .header("X-Trace", "1")
///     .param("q", "rust")
///     .form([("user", "alice")])
///     .timeout(Duration::from_secs(5));
/// assert_eq!(opts.header_map().get("x-trace"), Some("1"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub(crate) headers: HeaderMap,
    pub(crate) params: Vec<(String, String)>,
    pub(crate) data: Option<Vec<(String, String)>>,
    pub(crate) json: Option<Result<Bytes, String>>,
    pub(crate) body: Option<Bytes>,
    pub(crate) proxy: Option<String>,
    pub(crate) timeout: Option<Duration>,
    pub(crate) allow_redirects: Option<bool>,
    pub(crate) http2: bool,
    pub(crate) force_http1: bool,
    pub(crate) verify: Option<bool>,
    pub(crate) debug: bool,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header for this call, overriding a session header of the same name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Merge a set of headers for this call.
    pub fn headers(mut self, headers: &HeaderMap) -> Self {
        self.headers.merge(headers, true);
        self
    }

    /// Append one query parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    pub fn params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Form fields, sent `application/x-www-form-urlencoded`.
    pub fn form<I, K, V>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.data = Some(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// JSON body. Takes precedence over [`form`](Self::form) and [`body`](Self::body).
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.json = Some(
            serde_json::to_vec(value)
                .map(Bytes::from)
                .map_err(|e| e.to_string()),
        );
        self
    }

    /// Raw body bytes, used when neither JSON nor form data is set.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Proxy for this call, `host:port[:user:pass]`.
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn allow_redirects(mut self, allow: bool) -> Self {
        self.allow_redirects = Some(allow);
        self
    }

    /// Ask for HTTP/2 on this call.
    pub fn http2(mut self, enabled: bool) -> Self {
        self.http2 = enabled;
        self
    }

    /// Force HTTP/1.1 on this call, even if the session prefers HTTP/2.
    pub fn force_http1(mut self, enabled: bool) -> Self {
        self.force_http1 = enabled;
        self
    }

    /// Turn TLS certificate verification off for this call with `false`.
    pub fn verify(mut self, verify: bool) -> Self {
        self.verify = Some(verify);
        self
    }

    /// Capture the transport's verbose trace.
    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    /// Headers set on this call.
    pub fn header_map(&self) -> &HeaderMap {
        &self.headers
    }
}
