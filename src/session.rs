//! Stateful client session.
//!
//! A [`Session`] owns one transport handle, one [`TransportConfig`] and one
//! cookie jar. Every call goes through [`Session::request`]:
//!
//! 1. build the call's header set (session headers, then call headers, then
//!    the JSON headers when a JSON body is sent)
//! 2. encode the body and the query string
//! 3. reset and configure the handle ([`TransportConfig::apply`])
//! 4. perform the exchange and decode it ([`ResponseDecoder`])
//! 5. merge the response's cookies into the jar
//!
//! # Example
//!
//! ```rust,no_run
//! use mimicnet::{RequestOptions, Session};
//! use mimicnet::emulation::profiles::Chrome;
//!
//! let mut session = Session::builder().profile(Chrome::V109).build()?;
//! let resp = session.get("https://example.com", RequestOptions::new())?;
//! println!("{} {}", resp.status_code(), resp.http_version());
//! # Ok::<(), mimicnet::NetError>(())
//! ```

use crate::base::neterror::NetError;
use crate::cookies::{Cookie, CookieStore};
use crate::emulation::ProfileFactory;
use crate::http::decoder::ResponseDecoder;
use crate::http::response::Response;
use crate::http::HeaderMap;
use crate::options::RequestOptions;
use crate::transport::config::DEFAULT_TIMEOUT;
use crate::transport::{
    ExchangeSink, Method, NativeTransport, RequestOverrides, Transport, TransportConfig,
};
use std::fmt;
use std::time::Duration;
use tracing::debug;
use url::{form_urlencoded, Url};

/// A browser-like client session.
///
/// Calls take `&mut self`, so one session never runs two exchanges at once.
/// Share a session across threads by wrapping it in a `Mutex`.
pub struct Session {
    transport: Box<dyn Transport>,
    config: TransportConfig,
    cookies: CookieStore,
    timeout: Duration,
    debug_log: Vec<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("cookies", &self.cookies.count())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Session {
    /// Session with no profile: empty headers, library ciphers, HTTP/1.1.
    pub fn new() -> Self {
        Self::with_transport(NativeTransport::new())
    }

    /// Create a new session builder.
    pub fn builder() -> SessionBuilder {
        SessionBuilder::default()
    }

    /// Default configuration on a caller-supplied transport.
    pub fn with_transport<T: Transport + 'static>(transport: T) -> Self {
        Self {
            transport: Box::new(transport),
            config: TransportConfig::default(),
            cookies: CookieStore::new(),
            timeout: DEFAULT_TIMEOUT,
            debug_log: Vec::new(),
        }
    }

    /// Send a request. `method` may be any token; unknown ones pass through.
    pub fn request(
        &mut self,
        method: impl Into<Method>,
        url: &str,
        options: RequestOptions,
    ) -> Result<Response, NetError> {
        let method = method.into();
        Url::parse(url).map_err(|e| NetError::InvalidUrl(format!("{}: {}", url, e)))?;

        let full_url = append_query(url, &options.params);
        let parsed = Url::parse(&full_url)
            .map_err(|e| NetError::InvalidUrl(format!("{}: {}", full_url, e)))?;

        // Call headers win, for this call only.
        let mut headers = self.config.headers.clone();
        headers.merge(&options.headers, true);

        let body = if let Some(json) = options.json {
            let bytes = json.map_err(NetError::JsonParse)?;
            headers.set("Accept", "application/json");
            headers.set("Content-Type", "application/json");
            headers.set("charset", "utf-8");
            Some(bytes)
        } else if let Some(fields) = options.data {
            let encoded = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(fields.iter())
                .finish();
            if !headers.contains("Content-Type") {
                headers.set("Content-Type", "application/x-www-form-urlencoded");
            }
            Some(encoded.into())
        } else {
            options.body
        };

        let cookie = self.cookies.serialize_for_request(parsed.host_str());

        let overrides = RequestOverrides {
            method,
            url: full_url,
            headers,
            http2: options.http2,
            force_http1: options.force_http1,
            proxy: options.proxy,
            verify: options.verify,
            timeout: options.timeout.unwrap_or(self.timeout),
            follow_redirects: options.allow_redirects.unwrap_or(true),
            body,
            cookie,
            verbose: options.debug,
        };

        self.config.apply(self.transport.as_mut(), &overrides)?;

        let mut sink = ExchangeSink::new();
        let performed = self.transport.perform(&mut sink);

        self.debug_log = std::mem::take(&mut sink.debug);
        for line in &self.debug_log {
            debug!(target: "mimicnet::trace", "{}", line);
        }
        performed?;

        let response = ResponseDecoder::decode(sink, self.transport.as_ref(), &overrides.url)?;
        self.cookies.merge_from_store(response.cookies());
        Ok(response)
    }

    /// Sends a GET request.
    pub fn get(&mut self, url: &str, options: RequestOptions) -> Result<Response, NetError> {
        self.request(Method::Get, url, options)
    }

    /// Sends a POST request.
    pub fn post(&mut self, url: &str, options: RequestOptions) -> Result<Response, NetError> {
        self.request(Method::Post, url, options)
    }

    /// Sends a PUT request.
    pub fn put(&mut self, url: &str, options: RequestOptions) -> Result<Response, NetError> {
        self.request(Method::Put, url, options)
    }

    /// Sends a DELETE request.
    pub fn delete(&mut self, url: &str, options: RequestOptions) -> Result<Response, NetError> {
        self.request(Method::Delete, url, options)
    }

    /// Sends a HEAD request.
    pub fn head(&mut self, url: &str, options: RequestOptions) -> Result<Response, NetError> {
        self.request(Method::Head, url, options)
    }

    /// Sends an OPTIONS request.
    pub fn options(&mut self, url: &str, options: RequestOptions) -> Result<Response, NetError> {
        self.request(Method::Options, url, options)
    }

    /// Sends a PATCH request.
    pub fn patch(&mut self, url: &str, options: RequestOptions) -> Result<Response, NetError> {
        self.request(Method::Patch, url, options)
    }

    /// Add a session cookie. An empty `domain` matches every host.
    pub fn add_cookie(&mut self, name: &str, value: &str, domain: &str) {
        self.cookies.add_cookie(Cookie::new(name, value).with_domain(domain));
    }

    /// Empty the jar.
    pub fn remove_all_cookies(&mut self) {
        self.cookies.clear();
    }

    pub fn cookies(&self) -> &CookieStore {
        &self.cookies
    }

    pub fn cookies_mut(&mut self) -> &mut CookieStore {
        &mut self.cookies
    }

    /// Import Netscape cookie-file content. Returns the number of cookies read.
    pub fn import_cookies(&mut self, content: &str) -> usize {
        self.cookies.import_netscape(content)
    }

    /// Trace lines of the last call made with `debug(true)`.
    pub fn debug_log(&self) -> &[String] {
        &self.debug_log
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.config.headers
    }

    /// Replace the session's baseline headers.
    pub fn set_headers(&mut self, headers: HeaderMap) {
        self.config.headers = headers;
    }

    /// Replace the cipher suite; order is kept as given.
    pub fn set_cipher_suite<I, S>(&mut self, ciphers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.cipher_suite = ciphers.into_iter().map(Into::into).collect();
    }

    pub fn set_http2(&mut self, enabled: bool) {
        self.config.http2 = enabled;
    }

    /// Set the session proxy, `host:port[:user:pass]`. Empty clears it.
    pub fn set_proxy(&mut self, proxy: &str) -> Result<(), NetError> {
        self.config.set_proxy(proxy)
    }

    /// `false` disables TLS certificate and hostname verification.
    pub fn set_verify(&mut self, verify: bool) {
        self.config.tls_verify = verify;
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }
}

/// Append `?k=v;&k2=v2;` to `url`.
///
/// Keys and values are form-encoded rather than sent raw: `a b&c` becomes
/// `a+b%26c;`, so `&` or `#` in a value stays inside that value.
fn append_query(url: &str, params: &[(String, String)]) -> String {
    if params.is_empty() {
        return url.to_string();
    }
    let query = params
        .iter()
        .map(|(k, v)| {
            let k: String = form_urlencoded::byte_serialize(k.as_bytes()).collect();
            let v: String = form_urlencoded::byte_serialize(v.as_bytes()).collect();
            format!("{}={};", k, v)
        })
        .collect::<Vec<_>>()
        .join("&");
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}", url, sep, query)
}

/// Builder for creating a [`Session`].
#[derive(Default)]
pub struct SessionBuilder {
    profile: Option<crate::emulation::FingerprintProfile>,
    headers: Option<HeaderMap>,
    cipher_suite: Option<Vec<String>>,
    http2: Option<bool>,
    proxy: Option<String>,
    verify: Option<bool>,
    timeout: Option<Duration>,
    cookies: Option<CookieStore>,
    transport: Option<Box<dyn Transport>>,
}

impl SessionBuilder {
    /// Seed headers, ciphers and HTTP/2 preference from a browser profile.
    pub fn profile<P: ProfileFactory>(mut self, profile: P) -> Self {
        self.profile = Some(profile.profile());
        self
    }

    /// Baseline headers; replaces the profile's.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Cipher suite; replaces the profile's.
    pub fn cipher_suite<I, S>(mut self, ciphers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cipher_suite = Some(ciphers.into_iter().map(Into::into).collect());
        self
    }

    pub fn http2(mut self, enabled: bool) -> Self {
        self.http2 = Some(enabled);
        self
    }

    /// Proxy as `host:port[:user:pass]`; validated by [`build`](Self::build).
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    pub fn verify(mut self, verify: bool) -> Self {
        self.verify = Some(verify);
        self
    }

    /// Accept any certificate and hostname. Removes MITM protection.
    pub fn danger_accept_invalid_certs(self, accept: bool) -> Self {
        self.verify(!accept)
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Start with an existing cookie jar.
    pub fn cookie_store(mut self, store: CookieStore) -> Self {
        self.cookies = Some(store);
        self
    }

    /// Use a custom transport instead of [`NativeTransport`].
    pub fn transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    /// Build the session. Fails on a malformed proxy string.
    pub fn build(self) -> Result<Session, NetError> {
        let mut config = self
            .profile
            .map(TransportConfig::from_profile)
            .unwrap_or_default();
        if let Some(headers) = self.headers {
            config.headers = headers;
        }
        if let Some(ciphers) = self.cipher_suite {
            config.cipher_suite = ciphers;
        }
        if let Some(http2) = self.http2 {
            config.http2 = http2;
        }
        if let Some(verify) = self.verify {
            config.tls_verify = verify;
        }
        if let Some(proxy) = self.proxy {
            config.set_proxy(&proxy)?;
        }

        Ok(Session {
            transport: self
                .transport
                .unwrap_or_else(|| Box::new(NativeTransport::new())),
            config,
            cookies: self.cookies.unwrap_or_default(),
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            debug_log: Vec::new(),
        })
    }
}
