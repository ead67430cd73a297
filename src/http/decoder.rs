//! Turns the transport's raw output into a [`Response`].
//!
//! The transport writes every header block it received (one per redirect
//! hop, plus interim `1xx` responses) back to back. A block starts at a status
//! line; the last block describes the final response and the others become
//! its history.

use crate::base::neterror::NetError;
use crate::cookies::CookieStore;
use crate::http::info::{InfoKey, InfoValue};
use crate::http::response::Response;
use crate::http::HeaderMap;
use crate::transport::{ExchangeSink, Transport};
use bytes::Bytes;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::io::Read;
use thiserror::Error;
use tracing::{debug, warn};

/// One status line and the header lines that followed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderBlock {
    /// Version as written on the wire, e.g. `"HTTP/1.1"` or `"HTTP/2"`.
    pub http_version: String,
    pub status_code: u16,
    /// Reason phrase; empty when the status line carried none.
    pub reason: String,
    /// Every header pair in order, duplicates included.
    pub headers: Vec<(String, String)>,
}

impl HeaderBlock {
    /// First value of `name`, case-insensitive.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Headers folded into a [`HeaderMap`]; repeated names keep the last value.
    pub fn header_map(&self) -> HeaderMap {
        self.headers.iter().map(|(n, v)| (n.as_str(), v.as_str())).collect()
    }

    fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

/// The body could not be decoded; the raw bytes are still on the response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not decode {encoding} body: {reason}")]
pub struct DecodeDegraded {
    pub encoding: String,
    pub reason: String,
}

/// Stateless decoder for transport output.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseDecoder;

impl ResponseDecoder {
    /// Build a [`Response`] from one exchange.
    ///
    /// `request_url` is reported when the transport does not know the
    /// effective URL.
    pub fn decode<T: Transport + ?Sized>(
        sink: ExchangeSink,
        transport: &T,
        request_url: &str,
    ) -> Result<Response, NetError> {
        let mut blocks = Self::parse_header_blocks(&sink.header_bytes)?;
        let last = blocks
            .pop()
            .ok_or_else(|| NetError::ResponseParse("no status line".to_string()))?;
        debug!(
            status = last.status_code,
            hops = blocks.len(),
            "parsed response headers"
        );

        let mut cookies = CookieStore::new();
        for block in blocks.iter().chain(std::iter::once(&last)) {
            cookies.merge_from_response(block.pairs());
        }

        let headers = last.header_map();
        let content = Bytes::from(sink.body);
        let (text, decode_error) = match Self::decode_text(&content, &headers) {
            Ok(text) => (Some(text), None),
            Err(degraded) => {
                warn!(error = %degraded, "response body left undecoded");
                (None, Some(degraded))
            }
        };

        let info: BTreeMap<InfoKey, InfoValue> = InfoKey::ALL
            .iter()
            .filter_map(|key| transport.info(*key).map(|value| (*key, value)))
            .collect();

        let url = info
            .get(&InfoKey::EffectiveUrl)
            .and_then(InfoValue::as_str)
            .unwrap_or(request_url)
            .to_string();
        let redirect_count = info
            .get(&InfoKey::RedirectCount)
            .and_then(InfoValue::as_i64)
            .map(|n| n.max(0) as usize)
            .unwrap_or_else(|| blocks.iter().filter(|b| (300..400).contains(&b.status_code)).count());

        Ok(Response {
            status_code: last.status_code,
            reason: last.reason,
            http_version: last.http_version,
            url,
            headers,
            raw_headers: last.headers,
            history: blocks,
            content,
            text,
            decode_error,
            cookies,
            info,
            redirect_count,
        })
    }

    /// Split raw header output into blocks.
    ///
    /// Fails on text before the first status line, on output with no status
    /// line at all, and on a header line without a colon.
    pub fn parse_header_blocks(raw: &[u8]) -> Result<Vec<HeaderBlock>, NetError> {
        let text = String::from_utf8_lossy(raw);
        let mut blocks: Vec<HeaderBlock> = Vec::new();

        for line in text.split('\n') {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if let Some(block) = parse_status_line(line) {
                blocks.push(block);
                continue;
            }
            if line.is_empty() {
                continue;
            }

            let Some(current) = blocks.last_mut() else {
                return Err(NetError::ResponseParse(format!(
                    "data before status line: {:?}",
                    line
                )));
            };

            // obs-fold continuation
            if line.starts_with(' ') || line.starts_with('\t') {
                match current.headers.last_mut() {
                    Some((_, value)) => {
                        if !value.is_empty() {
                            value.push(' ');
                        }
                        value.push_str(line.trim());
                        continue;
                    }
                    None => {
                        return Err(NetError::ResponseParse(format!(
                            "continuation without header: {:?}",
                            line
                        )))
                    }
                }
            }

            let (name, value) = line.split_once(':').ok_or_else(|| {
                NetError::ResponseParse(format!("header line without colon: {:?}", line))
            })?;
            let name = name.trim();
            if name.is_empty() {
                return Err(NetError::ResponseParse(format!("empty header name: {:?}", line)));
            }
            current.headers.push((name.to_string(), value.trim().to_string()));
        }

        if blocks.is_empty() {
            return Err(NetError::ResponseParse("no status line".to_string()));
        }
        Ok(blocks)
    }

    /// Decode content per `Content-Encoding` and `Content-Type`.
    pub fn decode_text(content: &[u8], headers: &HeaderMap) -> Result<String, DecodeDegraded> {
        let encoding = headers
            .get("Content-Encoding")
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let decoded = decompress(content, &encoding)?;

        let latin1 = headers
            .get("Content-Type")
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("iso-8859-1"));
        if latin1 {
            Ok(decoded.iter().map(|&b| b as char).collect())
        } else {
            Ok(String::from_utf8_lossy(&decoded).into_owned())
        }
    }
}

/// `HTTP/<version> <3 digits>[ <reason>]`
fn parse_status_line(line: &str) -> Option<HeaderBlock> {
    let rest = line.strip_prefix("HTTP/")?;
    let (version, rest) = rest.split_once(' ')?;
    if version.is_empty() || !version.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    let code = rest.get(..3)?;
    if !code.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let reason = match &rest[3..] {
        "" => "",
        tail => tail.strip_prefix(' ')?,
    };
    Some(HeaderBlock {
        http_version: format!("HTTP/{}", version),
        status_code: code.parse().ok()?,
        reason: reason.trim().to_string(),
        headers: Vec::new(),
    })
}

fn decompress<'a>(content: &'a [u8], encoding: &str) -> Result<Cow<'a, [u8]>, DecodeDegraded> {
    if content.is_empty() {
        return Ok(Cow::Borrowed(content));
    }
    if encoding.contains("gzip") {
        decode_gzip(content).map(Cow::Owned)
    } else if encoding.contains("deflate") {
        decode_deflate(content).map(Cow::Owned)
    } else if encoding.contains("br") {
        decode_brotli(content).map(Cow::Owned)
    } else {
        Ok(Cow::Borrowed(content))
    }
}

fn degraded(encoding: &str, e: std::io::Error) -> DecodeDegraded {
    DecodeDegraded {
        encoding: encoding.to_string(),
        reason: e.to_string(),
    }
}

/// gzip members, falling back to a zlib stream for mislabelled bodies.
fn decode_gzip(data: &[u8]) -> Result<Vec<u8>, DecodeDegraded> {
    let mut decoded = Vec::new();
    match flate2::read::MultiGzDecoder::new(data).read_to_end(&mut decoded) {
        Ok(_) => Ok(decoded),
        Err(gz_err) => {
            decoded.clear();
            flate2::read::ZlibDecoder::new(data)
                .read_to_end(&mut decoded)
                .map(|_| decoded)
                .map_err(|_| degraded("gzip", gz_err))
        }
    }
}

fn decode_deflate(data: &[u8]) -> Result<Vec<u8>, DecodeDegraded> {
    let mut decoded = Vec::new();
    if flate2::read::ZlibDecoder::new(data).read_to_end(&mut decoded).is_ok() {
        return Ok(decoded);
    }
    decoded.clear();
    flate2::read::DeflateDecoder::new(data)
        .read_to_end(&mut decoded)
        .map(|_| decoded)
        .map_err(|e| degraded("deflate", e))
}

fn decode_brotli(data: &[u8]) -> Result<Vec<u8>, DecodeDegraded> {
    let mut decoded = Vec::new();
    brotli::Decompressor::new(data, 4096)
        .read_to_end(&mut decoded)
        .map(|_| decoded)
        .map_err(|e| degraded("br", e))
}
