//! Ordered, case-insensitive header map.
//!
//! Header order and casing are part of a browser fingerprint, so unlike
//! `http::HeaderMap` this map keeps the name exactly as first inserted and
//! iterates in insertion order.

use std::fmt;

/// A header map that strictly preserves insertion order and original casing.
///
/// Lookups and overwrites are case-insensitive. At most one entry exists per
/// case-folded name; repeated `Set-Cookie` values are handled by the cookie
/// store from the raw header stream, not here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    /// Headers as (original_name, value) pairs
    entries: Vec<(String, String)>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(n, _)| n.eq_ignore_ascii_case(name))
    }

    /// Insert or overwrite a header.
    ///
    /// An existing entry keeps its position and the casing it was first set
    /// with; only the value changes.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(idx) => self.entries[idx].1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Like [`set`](Self::set), but also replaces the stored name casing.
    pub fn replace(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(idx) => self.entries[idx] = (name, value),
            None => self.entries.push((name, value)),
        }
    }

    /// Get header value (case-insensitive lookup).
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|idx| self.entries[idx].1.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Remove a header, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.position(name).map(|idx| self.entries.remove(idx).1)
    }

    /// Apply every pair of `other` on top of this map.
    ///
    /// With `override_existing` false, names already present are left alone.
    pub fn merge(&mut self, other: &HeaderMap, override_existing: bool) {
        for (name, value) in other.iter() {
            if override_existing || !self.contains(name) {
                self.set(name, value);
            }
        }
    }

    /// Get all headers as-is with original casing, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Render as `Name: value` lines in order.
    pub fn to_lines(&self) -> Vec<String> {
        self.iter().map(|(n, v)| format!("{}: {}", n, v)).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for HeaderMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = HeaderMap::new();
        for (k, v) in iter {
            map.set(k, v);
        }
        map
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for HeaderMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<'a> IntoIterator for &'a HeaderMap {
    type Item = (&'a str, &'a str);
    type IntoIter = std::iter::Map<
        std::slice::Iter<'a, (String, String)>,
        fn(&'a (String, String)) -> (&'a str, &'a str),
    >;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl fmt::Display for HeaderMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (n, v) in self.iter() {
            write!(f, "{}: {}\r\n", n, v)?;
        }
        Ok(())
    }
}
