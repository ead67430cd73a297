use time::{OffsetDateTime, PrimitiveDateTime};

/// A single cookie held by a [`CookieStore`](crate::cookies::store::CookieStore).
///
/// Identity for replace-on-set is `(domain, path, name)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    /// Empty when the cookie applies to any host.
    pub domain: String,
    pub path: String,
    pub secure: bool,
    pub http_only: bool,
    pub expires: Option<OffsetDateTime>,
    /// Session cookie, dropped when the session ends.
    pub discard: bool,
    /// Netscape "include subdomains" flag.
    pub include_subdomains: bool,
}

impl Cookie {
    /// Session cookie with path `/`, no domain restriction and `HttpOnly` set.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: String::new(),
            path: "/".to_string(),
            secure: false,
            http_only: true,
            expires: None,
            discard: true,
            include_subdomains: false,
        }
    }

    /// A non-empty domain also covers its subdomains, like a `Domain=` attribute.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self.include_subdomains = !self.domain.is_empty();
        self
    }

    /// Restrict the cookie to exactly its domain.
    pub fn host_only(mut self) -> Self {
        self.include_subdomains = false;
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn with_expires(mut self, expires: OffsetDateTime) -> Self {
        self.expires = Some(expires);
        self.discard = false;
        self
    }

    /// True when `(domain, path, name)` matches.
    pub fn same_identity(&self, other: &Cookie) -> bool {
        self.name == other.name && self.path == other.path && self.domain == other.domain
    }

    /// Informational only; the store does not evict on expiry.
    pub fn is_expired(&self, current_time: OffsetDateTime) -> bool {
        self.expires.is_some_and(|expiry| expiry < current_time)
    }

    /// Whether this cookie should be sent to `host`.
    ///
    /// Empty domains match everything; otherwise the host must equal the
    /// domain, or end with `.domain` when subdomains are included.
    pub fn matches_host(&self, host: &str) -> bool {
        let domain = self.domain.trim_start_matches('.');
        if domain.is_empty() || host.eq_ignore_ascii_case(domain) {
            return true;
        }
        if !self.include_subdomains {
            return false;
        }

        if host.len() > domain.len() {
            let split = host.len() - domain.len();
            let (prefix, suffix) = host.split_at(split);
            return suffix.eq_ignore_ascii_case(domain) && prefix.ends_with('.');
        }

        false
    }

    /// Build a cookie from a parsed `Set-Cookie` value.
    pub(crate) fn from_set_cookie(parsed: &cookie::Cookie<'_>, now: OffsetDateTime) -> Self {
        let domain = parsed
            .domain()
            .map(|d| d.trim_start_matches('.').to_lowercase())
            .unwrap_or_default();

        // Max-Age takes precedence over Expires (RFC 6265 5.3 step 3)
        let expires = match parsed.max_age() {
            Some(max_age) => Some(now.checked_add(max_age).unwrap_or_else(|| {
                if max_age.is_negative() {
                    PrimitiveDateTime::MIN.assume_utc()
                } else {
                    PrimitiveDateTime::MAX.assume_utc()
                }
            })),
            None => parsed.expires_datetime(),
        };

        Self {
            name: parsed.name().to_string(),
            value: parsed.value().to_string(),
            include_subdomains: !domain.is_empty(),
            domain,
            path: parsed.path().unwrap_or("/").to_string(),
            secure: parsed.secure().unwrap_or(false),
            http_only: parsed.http_only().unwrap_or(false),
            discard: expires.is_none(),
            expires,
        }
    }
}
