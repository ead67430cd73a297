//! Netscape cookie-file format (curl, wget).
//!
//! Each line has the format:
//! `domain\tinclude_subdomains\tpath\tsecure\texpiry\tname\tvalue`

use crate::base::neterror::NetError;
use crate::cookies::canonical_cookie::Cookie;
use crate::cookies::store::CookieStore;
use std::path::Path;
use time::OffsetDateTime;

/// curl marks http-only cookies by prefixing the domain with this.
const HTTP_ONLY_PREFIX: &str = "#HttpOnly_";

/// Parse one Netscape line. Comments, blank lines and short lines yield `None`.
pub fn parse_netscape_line(line: &str) -> Option<Cookie> {
    let line = line.trim_end_matches(&['\r', '\n'][..]);

    let (line, http_only) = match line.strip_prefix(HTTP_ONLY_PREFIX) {
        Some(rest) => (rest, true),
        None => (line, false),
    };

    if line.trim().is_empty() || line.starts_with('#') {
        return None;
    }

    let parts: Vec<&str> = line.split('\t').collect();
    if parts.len() < 7 {
        return None;
    }

    let expiry: i64 = parts[4].trim().parse().unwrap_or(0);
    let expires = if expiry > 0 {
        OffsetDateTime::from_unix_timestamp(expiry).ok()
    } else {
        None
    };

    Some(Cookie {
        name: parts[5].to_string(),
        // Values may legitimately contain tabs
        value: parts[6..].join("\t"),
        domain: parts[0].trim_start_matches('.').to_string(),
        path: parts[2].to_string(),
        secure: parts[3].eq_ignore_ascii_case("TRUE"),
        http_only,
        discard: expires.is_none(),
        expires,
        include_subdomains: parts[1].eq_ignore_ascii_case("TRUE"),
    })
}

/// Format a cookie as a Netscape line.
pub fn format_netscape_line(cookie: &Cookie) -> String {
    let domain = if cookie.include_subdomains && !cookie.domain.is_empty() {
        format!(".{}", cookie.domain.trim_start_matches('.'))
    } else {
        cookie.domain.clone()
    };
    let prefix = if cookie.http_only { HTTP_ONLY_PREFIX } else { "" };
    let flag = if cookie.include_subdomains { "TRUE" } else { "FALSE" };
    let secure = if cookie.secure { "TRUE" } else { "FALSE" };
    let expiry = cookie.expires.map(|t| t.unix_timestamp()).unwrap_or(0);

    format!(
        "{}{}\t{}\t{}\t{}\t{}\t{}\t{}",
        prefix, domain, flag, cookie.path, secure, expiry, cookie.name, cookie.value
    )
}

impl CookieStore {
    /// Import Netscape lines, returning how many cookies were added.
    pub fn import_netscape_lines<'a, I>(&mut self, lines: I) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut count = 0;
        for cookie in lines.into_iter().filter_map(parse_netscape_line) {
            self.add_cookie(cookie);
            count += 1;
        }
        count
    }

    /// Import cookies from Netscape format file content.
    ///
    /// # Example
    /// ```rust
    /// use mimicnet::cookies::CookieStore;
    ///
    /// let mut jar = CookieStore::new();
    /// let count = jar.import_netscape(".example.com\tTRUE\t/\tFALSE\t0\tsid\tabc");
    /// assert_eq!(count, 1);
    /// assert_eq!(jar.lookup("sid"), Some("abc"));
    /// ```
    pub fn import_netscape(&mut self, content: &str) -> usize {
        self.import_netscape_lines(content.lines())
    }

    /// Read and import a Netscape cookie file.
    pub fn load_netscape_file(&mut self, path: impl AsRef<Path>) -> Result<usize, NetError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| NetError::Io(format!("{}: {}", path.display(), e)))?;
        Ok(self.import_netscape(&content))
    }

    /// Export cookies to Netscape cookie format.
    pub fn export_netscape(&self) -> String {
        let mut lines = vec![
            "# Netscape HTTP Cookie File".to_string(),
            "# https://curl.se/docs/http-cookies.html".to_string(),
            String::new(),
        ];
        lines.extend(self.iter().map(format_netscape_line));
        lines.join("\n")
    }

    /// Write the jar to a Netscape cookie file.
    pub fn save_netscape_file(&self, path: impl AsRef<Path>) -> Result<(), NetError> {
        let path = path.as_ref();
        std::fs::write(path, self.export_netscape())
            .map_err(|e| NetError::Io(format!("{}: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_line() {
        let c = parse_netscape_line(".example.com\tTRUE\t/\tTRUE\t1735689600\tsession\tabc123")
            .unwrap();
        assert_eq!(c.domain, "example.com");
        assert!(c.include_subdomains);
        assert!(c.secure);
        assert!(!c.http_only);
        assert_eq!(c.expires.map(|t| t.unix_timestamp()), Some(1735689600));
        assert_eq!(c.name, "session");
        assert_eq!(c.value, "abc123");
    }

    #[test]
    fn test_parse_http_only_prefix() {
        let c = parse_netscape_line("#HttpOnly_.example.com\tTRUE\t/\tFALSE\t0\tsid\tx").unwrap();
        assert!(c.http_only);
        assert_eq!(c.domain, "example.com");
        assert!(c.discard);
    }

    #[test]
    fn test_parse_skips_comments_and_short_lines() {
        assert!(parse_netscape_line("# Netscape HTTP Cookie File").is_none());
        assert!(parse_netscape_line("").is_none());
        assert!(parse_netscape_line("example.com\tTRUE\t/").is_none());
    }

    #[test]
    fn test_import_netscape_counts() {
        let content = "# Netscape HTTP Cookie File\n\
                       .example.com\tTRUE\t/\tTRUE\t1735689600\tsession\tabc123\n\
                       .test.com\tFALSE\t/path\tFALSE\t0\tuser\tjohn\n";
        let mut jar = CookieStore::new();
        assert_eq!(jar.import_netscape(content), 2);
        assert_eq!(jar.count(), 2);
        assert_eq!(jar.lookup("user"), Some("john"));
    }

    #[test]
    fn test_export_import_preserves_cookies() {
        let mut jar = CookieStore::new();
        jar.add_cookie(
            Cookie::new("a", "1")
                .with_domain("example.com")
                .with_secure(true),
        );
        let exported = jar.export_netscape();
        assert!(exported.starts_with("# Netscape HTTP Cookie File"));

        let mut other = CookieStore::new();
        assert_eq!(other.import_netscape(&exported), 1);
        let c = other.get("a", "example.com", "/").unwrap();
        assert!(c.secure && c.http_only);
    }
}
