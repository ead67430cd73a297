//! Chrome browser profiles.

use crate::emulation::{FingerprintProfile, ProfileFactory};

/// Chrome browser versions for emulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum Chrome {
    /// Chrome 109 (macOS user agent)
    V109,
    /// Chrome 120 on Windows (latest)
    #[default]
    V120,
}

impl ProfileFactory for Chrome {
    fn profile(self) -> FingerprintProfile {
        match self {
            Chrome::V109 => CHROME_109,
            Chrome::V120 => CHROME_120,
        }
    }
}

/// Chromium's TLS 1.3 + 1.2 cipher order.
const CHROME_CIPHER_SUITE: &[&str] = &[
    "TLS_AES_128_GCM_SHA256",
    "TLS_AES_256_GCM_SHA384",
    "TLS_CHACHA20_POLY1305_SHA256",
    "ECDHE-ECDSA-AES128-GCM-SHA256",
    "ECDHE-RSA-AES128-GCM-SHA256",
    "ECDHE-ECDSA-AES256-GCM-SHA384",
    "ECDHE-RSA-AES256-GCM-SHA384",
    "ECDHE-ECDSA-CHACHA20-POLY1305",
    "ECDHE-RSA-CHACHA20-POLY1305",
    "ECDHE-RSA-AES128-SHA",
    "ECDHE-RSA-AES256-SHA",
    "AES128-GCM-SHA256",
    "AES256-GCM-SHA384",
    "AES128-SHA",
    "AES256-SHA",
];

const CHROME_109_UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 13_1)\
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/109.0.0.0 Safari/537.36";

/// Chrome 109. Client hints still advertise the 98 brand list.
pub const CHROME_109: FingerprintProfile = FingerprintProfile {
    name: "chrome_109",
    user_agent: CHROME_109_UA,
    headers: &[
        (
            "sec-ch-ua",
            " Not A;Brand\";v=\"99\", \"Chromium\";v=\"98\", \"Google Chrome\";v=\"98",
        ),
        ("sec-ch-ua-mobile", "?0"),
        ("sec-ch-ua-platform", "\"Windows\""),
        ("Upgrade-Insecure-Requests", "1"),
        ("User-Agent", CHROME_109_UA),
        (
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,\
             image/avif,image/webp,image/apng,*/*;q=0.8,\
             application/signed-exchange;v=b3;q=0.9",
        ),
        ("Sec-Fetch-Site", "none"),
        ("Sec-Fetch-Mode", "navigate"),
        ("Sec-Fetch-User", "?1"),
        ("Sec-Fetch-Dest", "document"),
        ("Accept-Encoding", "gzip, deflate, br"),
        ("Accept-Language", "en-US,en;q=0.9"),
    ],
    cipher_suite: CHROME_CIPHER_SUITE,
    prefer_http2: true,
};

const CHROME_120_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Chrome 120, Windows.
pub const CHROME_120: FingerprintProfile = FingerprintProfile {
    name: "chrome_120",
    user_agent: CHROME_120_UA,
    headers: &[
        (
            "sec-ch-ua",
            "\"Not_A Brand\";v=\"8\", \"Chromium\";v=\"120\", \"Google Chrome\";v=\"120\"",
        ),
        ("sec-ch-ua-mobile", "?0"),
        ("sec-ch-ua-platform", "\"Windows\""),
        ("Upgrade-Insecure-Requests", "1"),
        ("User-Agent", CHROME_120_UA),
        (
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,\
             image/avif,image/webp,image/apng,*/*;q=0.8,\
             application/signed-exchange;v=b3;q=0.7",
        ),
        ("Sec-Fetch-Site", "none"),
        ("Sec-Fetch-Mode", "navigate"),
        ("Sec-Fetch-User", "?1"),
        ("Sec-Fetch-Dest", "document"),
        ("Accept-Encoding", "gzip, deflate, br"),
        ("Accept-Language", "en-US,en;q=0.9"),
    ],
    cipher_suite: CHROME_CIPHER_SUITE,
    prefer_http2: true,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chrome_109_user_agent_header_matches() {
        let headers = CHROME_109.headers();
        assert_eq!(headers.get("user-agent"), Some(CHROME_109.user_agent));
        assert!(CHROME_109.user_agent.contains("Chrome/109"));
    }

    #[test]
    fn test_chrome_header_order() {
        let names: Vec<_> = CHROME_120.headers().iter().map(|(n, _)| n.to_string()).collect();
        assert_eq!(names[0], "sec-ch-ua");
        assert_eq!(names.last().map(String::as_str), Some("Accept-Language"));
    }

    #[test]
    fn test_factory() {
        assert_eq!(Chrome::V109.profile(), CHROME_109);
        assert_eq!(Chrome::default().profile().name, "chrome_120");
    }

    #[test]
    fn test_chrome_cipher_suite() {
        assert_eq!(CHROME_109.cipher_suite.len(), 15);
        assert_eq!(CHROME_109.cipher_suite[0], "TLS_AES_128_GCM_SHA256");
        assert!(CHROME_109.prefer_http2);
    }
}
