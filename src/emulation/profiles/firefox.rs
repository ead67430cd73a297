//! Firefox browser profiles.

use crate::emulation::{FingerprintProfile, ProfileFactory};

/// Firefox browser versions for emulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum Firefox {
    /// Firefox 98
    V98,
    /// Firefox 109 (latest)
    #[default]
    V109,
}

impl ProfileFactory for Firefox {
    fn profile(self) -> FingerprintProfile {
        match self {
            Firefox::V98 => FIREFOX_98,
            Firefox::V109 => FIREFOX_109,
        }
    }
}

/// Firefox orders ChaCha20 ahead of AES-256 and keeps the CBC-SHA suites.
const FIREFOX_CIPHER_SUITE: &[&str] = &[
    "TLS_AES_128_GCM_SHA256",
    "TLS_CHACHA20_POLY1305_SHA256",
    "TLS_AES_256_GCM_SHA384",
    "ECDHE-ECDSA-AES128-GCM-SHA256",
    "ECDHE-RSA-AES128-GCM-SHA256",
    "ECDHE-ECDSA-CHACHA20-POLY1305",
    "ECDHE-RSA-CHACHA20-POLY1305",
    "ECDHE-ECDSA-AES256-GCM-SHA384",
    "ECDHE-RSA-AES256-GCM-SHA384",
    "ECDHE-ECDSA-AES256-SHA",
    "ECDHE-ECDSA-AES128-SHA",
    "ECDHE-RSA-AES128-SHA",
    "ECDHE-RSA-AES256-SHA",
    "AES128-GCM-SHA256",
    "AES256-GCM-SHA384",
    "AES128-SHA",
    "AES256-SHA",
];

const FIREFOX_98_UA: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:98.0) Gecko/20100101 Firefox/98.0";

/// Firefox 98, Windows.
pub const FIREFOX_98: FingerprintProfile = FingerprintProfile {
    name: "firefox_98",
    user_agent: FIREFOX_98_UA,
    headers: &[
        ("User-Agent", FIREFOX_98_UA),
        (
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
        ("Accept-Language", "en-US,en;q=0.5"),
        ("Accept-Encoding", "gzip, deflate, br"),
        ("Connection", "keep-alive"),
        ("Upgrade-Insecure-Requests", "1"),
        ("Sec-Fetch-Dest", "document"),
        ("Sec-Fetch-Mode", "navigate"),
        ("Sec-Fetch-Site", "none"),
        ("Sec-Fetch-User", "?1"),
    ],
    cipher_suite: FIREFOX_CIPHER_SUITE,
    prefer_http2: true,
};

const FIREFOX_109_UA: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:109.0) Gecko/20100101 Firefox/109.0";

/// Firefox 109, Windows.
pub const FIREFOX_109: FingerprintProfile = FingerprintProfile {
    name: "firefox_109",
    user_agent: FIREFOX_109_UA,
    headers: &[
        ("User-Agent", FIREFOX_109_UA),
        (
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
        ("Accept-Language", "en-US,en;q=0.5"),
        ("Accept-Encoding", "gzip, deflate, br"),
        ("Connection", "keep-alive"),
        ("Upgrade-Insecure-Requests", "1"),
        ("Sec-Fetch-Dest", "document"),
        ("Sec-Fetch-Mode", "navigate"),
        ("Sec-Fetch-Site", "none"),
        ("Sec-Fetch-User", "?1"),
        ("TE", "trailers"),
    ],
    cipher_suite: FIREFOX_CIPHER_SUITE,
    prefer_http2: true,
};
