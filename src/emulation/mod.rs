//! Browser emulation module.
//!
//! A [`FingerprintProfile`] bundles the parts of a browser fingerprint the
//! session controls:
//! - default headers and their order (User-Agent, Accept, sec-ch-ua, ...)
//! - TLS cipher-suite ordering
//! - HTTP/2 preference (ALPN)
//!
//! Profiles are `'static` data. Selecting one seeds a session's configuration
//! with fresh copies; nothing a session does can alter the profile itself.

pub mod profiles;

use crate::http::HeaderMap;

/// Factory trait for creating fingerprint profiles.
///
/// Implemented by the version enums in [`profiles`] and by
/// [`FingerprintProfile`] itself.
pub trait ProfileFactory {
    /// Produce the [`FingerprintProfile`].
    fn profile(self) -> FingerprintProfile;
}

/// One browser identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FingerprintProfile {
    /// Human-readable identity, e.g. `"chrome_109"`.
    pub name: &'static str,
    pub user_agent: &'static str,
    /// Default headers in wire order.
    pub headers: &'static [(&'static str, &'static str)],
    /// Cipher suites in ClientHello order.
    pub cipher_suite: &'static [&'static str],
    pub prefer_http2: bool,
}

impl FingerprintProfile {
    /// Materialize the default headers as a fresh map.
    pub fn headers(&self) -> HeaderMap {
        self.headers.iter().copied().collect()
    }

    /// Cipher suites as owned strings, order preserved.
    pub fn cipher_suite(&self) -> Vec<String> {
        self.cipher_suite.iter().map(|c| c.to_string()).collect()
    }

    /// OpenSSL-style cipher string, `:` separated, order preserved.
    pub fn cipher_list(&self) -> String {
        self.cipher_suite.join(":")
    }
}

impl ProfileFactory for FingerprintProfile {
    #[inline]
    fn profile(self) -> FingerprintProfile {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::profiles::{CHROME_109, FIREFOX_98};

    #[test]
    fn test_headers_are_fresh_copies() {
        let mut a = CHROME_109.headers();
        a.set("User-Agent", "mutated");
        let b = CHROME_109.headers();
        assert_eq!(b.get("user-agent"), Some(CHROME_109.user_agent));
    }

    #[test]
    fn test_cipher_list_keeps_order() {
        let list = FIREFOX_98.cipher_list();
        let first: Vec<_> = list.split(':').take(3).collect();
        assert_eq!(first, &FIREFOX_98.cipher_suite[..3]);
    }
}
