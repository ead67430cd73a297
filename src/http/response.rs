//! The decoded result of one request.

use crate::base::neterror::NetError;
use crate::cookies::CookieStore;
use crate::http::decoder::{DecodeDegraded, HeaderBlock};
use crate::http::info::{InfoKey, InfoValue};
use crate::http::HeaderMap;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::fmt;

/// HTTP response as seen after the last redirect hop.
///
/// Built by [`ResponseDecoder`](crate::http::decoder::ResponseDecoder); never
/// mutated afterwards.
#[derive(Debug, Clone)]
pub struct Response {
    pub(crate) status_code: u16,
    pub(crate) reason: String,
    pub(crate) http_version: String,
    pub(crate) url: String,
    pub(crate) headers: HeaderMap,
    pub(crate) raw_headers: Vec<(String, String)>,
    pub(crate) history: Vec<HeaderBlock>,
    pub(crate) content: Bytes,
    pub(crate) text: Option<String>,
    pub(crate) decode_error: Option<DecodeDegraded>,
    pub(crate) cookies: CookieStore,
    pub(crate) info: BTreeMap<InfoKey, InfoValue>,
    pub(crate) redirect_count: usize,
}

impl Response {
    /// Get the status code.
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// True for 2xx statuses.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Version from the final status line, e.g. `"HTTP/2"`.
    pub fn http_version(&self) -> &str {
        &self.http_version
    }

    /// Effective URL after redirects.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Final headers; repeated names keep the last value.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Every header pair of the final response, duplicates included.
    pub fn raw_headers(&self) -> &[(String, String)] {
        &self.raw_headers
    }

    /// Header blocks of earlier hops and interim responses, oldest first.
    pub fn history(&self) -> &[HeaderBlock] {
        &self.history
    }

    /// Body bytes exactly as received (still content-encoded).
    pub fn content(&self) -> &Bytes {
        &self.content
    }

    /// Decoded body text; `None` when decoding failed.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn decode_error(&self) -> Option<&DecodeDegraded> {
        self.decode_error.as_ref()
    }

    /// Parse the decoded text as JSON.
    #[cfg(feature = "json")]
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, NetError> {
        match &self.text {
            Some(text) => Ok(serde_json::from_str(text)?),
            None => Err(NetError::JsonParse(
                self.decode_error
                    .as_ref()
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "no decoded body".to_string()),
            )),
        }
    }

    /// Cookies set by this exchange, redirect hops included.
    pub fn cookies(&self) -> &CookieStore {
        &self.cookies
    }

    /// All metrics the transport reported.
    pub fn info(&self) -> &BTreeMap<InfoKey, InfoValue> {
        &self.info
    }

    pub fn info_value(&self, key: InfoKey) -> Option<&InfoValue> {
        self.info.get(&key)
    }

    /// Flat `NAME -> value` view of [`info`](Self::info).
    pub fn info_map(&self) -> BTreeMap<&'static str, String> {
        self.info
            .iter()
            .map(|(k, v)| (k.name(), v.to_string()))
            .collect()
    }

    pub fn redirect_count(&self) -> usize {
        self.redirect_count
    }

    /// Total transfer time in seconds, if reported.
    pub fn elapsed(&self) -> Option<f64> {
        self.info_value(InfoKey::TotalTime).and_then(InfoValue::as_f64)
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Response [{}]>", self.status_code)
    }
}
