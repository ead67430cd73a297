use crate::cookies::canonical_cookie::Cookie;
use time::OffsetDateTime;
use url::form_urlencoded;

/// The session cookie jar.
///
/// Cookies are kept in insertion order and keyed by `(domain, path, name)`.
/// The jar never evicts on expiry; entries leave only through [`clear`].
///
/// [`clear`]: CookieStore::clear
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieStore {
    cookies: Vec<Cookie>,
}

impl CookieStore {
    pub fn new() -> Self {
        Self {
            cookies: Vec::new(),
        }
    }

    /// Insert or replace a session cookie for `domain` and `path`.
    pub fn add(&mut self, name: &str, value: &str, domain: &str, path: &str) {
        self.add_cookie(Cookie::new(name, value).with_domain(domain).with_path(path));
    }

    /// Insert or replace by `(domain, path, name)`; a replaced cookie keeps its position.
    pub fn add_cookie(&mut self, cookie: Cookie) {
        if let Some(existing) = self.cookies.iter_mut().find(|c| c.same_identity(&cookie)) {
            *existing = cookie;
        } else {
            self.cookies.push(cookie);
        }
    }

    /// Parse every `Set-Cookie` header in a raw response header stream.
    ///
    /// The input must be the un-deduplicated header pairs: responses routinely
    /// carry several `Set-Cookie` lines and each one is captured. Values that
    /// do not parse are dropped.
    pub fn merge_from_response<'a, I>(&mut self, headers: I)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let now = OffsetDateTime::now_utc();
        for (name, value) in headers {
            if !name.eq_ignore_ascii_case("set-cookie") {
                continue;
            }
            match cookie::Cookie::parse(value) {
                Ok(parsed) => self.add_cookie(Cookie::from_set_cookie(&parsed, now)),
                Err(e) => tracing::debug!(error = %e, value, "dropping malformed Set-Cookie"),
            }
        }
    }

    /// Union with `other`; other's entries win on key collision.
    pub fn merge_from_store(&mut self, other: &CookieStore) {
        for cookie in other.iter() {
            self.add_cookie(cookie.clone());
        }
    }

    /// Clear all cookies.
    pub fn clear(&mut self) {
        self.cookies.clear();
    }

    /// Render the `Cookie` request header value.
    ///
    /// Returns an empty string when nothing matches; callers must then omit
    /// the header rather than send it empty.
    pub fn serialize_for_request(&self, domain_filter: Option<&str>) -> String {
        self.cookies
            .iter()
            .filter(|c| domain_filter.map_or(true, |host| c.matches_host(host)))
            .map(|c| {
                format!(
                    "{}={}",
                    form_urlencoded::byte_serialize(c.name.as_bytes()).collect::<String>(),
                    form_urlencoded::byte_serialize(c.value.as_bytes()).collect::<String>()
                )
            })
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Value of the first cookie named `name`.
    ///
    /// When several domains share a name the first inserted wins; use
    /// [`iter`](Self::iter) to disambiguate.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.value.as_str())
    }

    pub fn get(&self, name: &str, domain: &str, path: &str) -> Option<&Cookie> {
        self.cookies
            .iter()
            .find(|c| c.name == name && c.domain == domain && c.path == path)
    }

    pub fn count(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cookie> {
        self.cookies.iter()
    }
}

impl Extend<Cookie> for CookieStore {
    fn extend<T: IntoIterator<Item = Cookie>>(&mut self, iter: T) {
        for cookie in iter {
            self.add_cookie(cookie);
        }
    }
}

impl FromIterator<Cookie> for CookieStore {
    fn from_iter<T: IntoIterator<Item = Cookie>>(iter: T) -> Self {
        let mut store = CookieStore::new();
        store.extend(iter);
        store
    }
}
