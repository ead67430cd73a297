//! Per-session transport configuration.

use crate::base::neterror::NetError;
use crate::emulation::FingerprintProfile;
use crate::http::HeaderMap;
use crate::socket::proxy::ProxySettings;
use crate::transport::{HttpVersion, Method, Transport};
use bytes::Bytes;
use std::time::Duration;
use tracing::{trace, warn};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Everything a session knows about how to talk to the network.
///
/// Re-applied to the transport handle at the start of every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    pub headers: HeaderMap,
    /// Cipher names in ClientHello order. Empty keeps the TLS library default.
    pub cipher_suite: Vec<String>,
    pub http2: bool,
    pub proxy: Option<ProxySettings>,
    pub tls_verify: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            headers: HeaderMap::new(),
            cipher_suite: Vec::new(),
            http2: false,
            proxy: None,
            tls_verify: true,
        }
    }
}

/// Per-call settings, applied after the session's configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOverrides {
    pub method: Method,
    /// Final URL, query string included.
    pub url: String,
    /// Final header set for this call.
    pub headers: HeaderMap,
    /// Upgrade to HTTP/2 for this call.
    pub http2: bool,
    /// Force HTTP/1.1 even if the session prefers HTTP/2.
    pub force_http1: bool,
    /// Proxy string for this call, `host:port[:user:pass]`.
    pub proxy: Option<String>,
    /// `None` keeps the session's setting.
    pub verify: Option<bool>,
    pub timeout: Duration,
    pub follow_redirects: bool,
    pub body: Option<Bytes>,
    /// `Cookie` header value; empty means none.
    pub cookie: String,
    pub verbose: bool,
}

impl RequestOverrides {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            http2: false,
            force_http1: false,
            proxy: None,
            verify: None,
            timeout: DEFAULT_TIMEOUT,
            follow_redirects: true,
            body: None,
            cookie: String::new(),
            verbose: false,
        }
    }
}

impl TransportConfig {
    /// Seed a configuration from a profile. The profile itself is not retained.
    pub fn from_profile(profile: FingerprintProfile) -> Self {
        Self {
            headers: profile.headers(),
            cipher_suite: profile.cipher_suite(),
            http2: profile.prefer_http2,
            ..Self::default()
        }
    }

    /// Parse and store a session-level proxy. An empty string clears it.
    pub fn set_proxy(&mut self, proxy: &str) -> Result<(), NetError> {
        self.proxy = if proxy.is_empty() {
            None
        } else {
            Some(ProxySettings::parse(proxy)?)
        };
        Ok(())
    }

    /// Version the transport should negotiate for a call.
    pub fn http_version(&self, overrides: &RequestOverrides) -> HttpVersion {
        if (self.http2 || overrides.http2) && !overrides.force_http1 {
            HttpVersion::Http2
        } else {
            HttpVersion::Http11
        }
    }

    /// Configure `handle` for one call.
    ///
    /// Always resets the handle first; nothing set by a previous call
    /// survives. The proxy string of the call is validated before any option
    /// touches the handle, so an invalid proxy fails without side effects.
    pub fn apply<T: Transport + ?Sized>(
        &self,
        handle: &mut T,
        overrides: &RequestOverrides,
    ) -> Result<(), NetError> {
        let call_proxy = overrides
            .proxy
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(ProxySettings::parse)
            .transpose()?;

        // 1. clean slate
        handle.reset();

        // 2. headers, in order
        let lines = overrides.headers.to_lines();
        trace!(count = lines.len(), "applying headers");
        handle.set_headers(&lines);

        // 3. protocol version
        let version = self.http_version(overrides);
        trace!(?version, "applying http version");
        handle.set_http_version(version);

        // 4. proxy, the call's wins
        let proxy = call_proxy.as_ref().or(self.proxy.as_ref());
        if let Some(p) = proxy {
            trace!(proxy = %p.authority(), auth = p.requires_auth(), "applying proxy");
        }
        handle.set_proxy(proxy);

        // 5. ciphers, verbatim
        if !self.cipher_suite.is_empty() {
            let list = self.cipher_suite.join(":");
            trace!(ciphers = %list, "applying cipher list");
            handle.set_cipher_list(&list);
        }

        // 6. certificate verification
        let verify = overrides.verify.unwrap_or(self.tls_verify);
        if !verify {
            warn!(url = %overrides.url, "TLS certificate verification disabled");
        }
        handle.set_tls_verify(verify);

        // 7. per-request options last
        handle.set_method(&overrides.method);
        handle.set_url(&overrides.url);
        handle.set_timeout(overrides.timeout);
        handle.set_follow_redirects(overrides.follow_redirects);
        handle.set_body(overrides.body.clone());
        if !overrides.cookie.is_empty() {
            handle.set_cookie(&overrides.cookie);
        }
        handle.set_verbose(overrides.verbose);

        Ok(())
    }
}
