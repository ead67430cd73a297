//! Shared test fixtures: a recording transport and a loopback HTTP/1.1 server.

#![allow(dead_code)]

use mimicnet::base::neterror::TransportError;
use mimicnet::http::info::{InfoKey, InfoValue};
use mimicnet::socket::proxy::ProxySettings;
use mimicnet::transport::{ExchangeSink, HttpVersion, Method, Transport};
use std::collections::VecDeque;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// One option call or `perform` observed by [`MockTransport`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Reset,
    Url(String),
    Method(String),
    Headers(Vec<String>),
    Version(HttpVersion),
    Proxy(Option<String>),
    Ciphers(String),
    Verify(bool),
    Follow(bool),
    Timeout(Duration),
    Body(Option<Vec<u8>>),
    Cookie(String),
    Verbose(bool),
    Perform,
}

/// What the next `perform` produces.
#[derive(Debug, Clone, Default)]
pub struct Canned {
    pub headers: Vec<u8>,
    pub body: Vec<u8>,
    pub debug: Vec<String>,
    pub info: Vec<(InfoKey, InfoValue)>,
    pub error: Option<TransportError>,
}

#[derive(Debug, Default)]
pub struct MockState {
    pub calls: Vec<Call>,
    pub queue: VecDeque<Canned>,
    verbose: bool,
    last_info: Vec<(InfoKey, InfoValue)>,
}

/// Transport double. Clones share state, so a test keeps one clone to
/// inspect after handing the other to a session.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    pub state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, canned: Canned) {
        self.state.lock().unwrap().queue.push_back(canned);
    }

    pub fn push_response(&self, raw_headers: &str, body: &[u8]) {
        self.push(Canned {
            headers: raw_headers.as_bytes().to_vec(),
            body: body.to_vec(),
            ..Canned::default()
        });
    }

    pub fn push_error(&self, error: TransportError) {
        self.push(Canned {
            error: Some(error),
            ..Canned::default()
        });
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn perform_count(&self) -> usize {
        self.calls().iter().filter(|c| **c == Call::Perform).count()
    }

    /// Calls made since the most recent reset.
    pub fn last_request(&self) -> Vec<Call> {
        let calls = self.calls();
        let start = calls.iter().rposition(|c| *c == Call::Reset).unwrap_or(0);
        calls[start..].to_vec()
    }

    pub fn headers_sent(&self) -> Vec<String> {
        self.last_request()
            .into_iter()
            .find_map(|c| match c {
                Call::Headers(h) => Some(h),
                _ => None,
            })
            .unwrap_or_default()
    }

    pub fn header_sent(&self, name: &str) -> Option<String> {
        self.headers_sent().into_iter().find_map(|line| {
            let (n, v) = line.split_once(':')?;
            n.trim().eq_ignore_ascii_case(name).then(|| v.trim().to_string())
        })
    }

    pub fn cookie_sent(&self) -> Option<String> {
        self.last_request().into_iter().find_map(|c| match c {
            Call::Cookie(v) => Some(v),
            _ => None,
        })
    }

    pub fn body_sent(&self) -> Option<Vec<u8>> {
        self.last_request().into_iter().find_map(|c| match c {
            Call::Body(b) => b,
            _ => None,
        })
    }

    pub fn url_sent(&self) -> Option<String> {
        self.last_request().into_iter().find_map(|c| match c {
            Call::Url(u) => Some(u),
            _ => None,
        })
    }

    pub fn version_sent(&self) -> Option<HttpVersion> {
        self.last_request().into_iter().find_map(|c| match c {
            Call::Version(v) => Some(v),
            _ => None,
        })
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }
}

impl Transport for MockTransport {
    fn reset(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.verbose = false;
        state.calls.push(Call::Reset);
    }
    fn set_url(&mut self, url: &str) {
        self.record(Call::Url(url.to_string()));
    }
    fn set_method(&mut self, method: &Method) {
        self.record(Call::Method(method.to_string()));
    }
    fn set_headers(&mut self, lines: &[String]) {
        self.record(Call::Headers(lines.to_vec()));
    }
    fn set_http_version(&mut self, version: HttpVersion) {
        self.record(Call::Version(version));
    }
    fn set_proxy(&mut self, proxy: Option<&ProxySettings>) {
        self.record(Call::Proxy(proxy.map(|p| p.authority())));
    }
    fn set_cipher_list(&mut self, ciphers: &str) {
        self.record(Call::Ciphers(ciphers.to_string()));
    }
    fn set_tls_verify(&mut self, verify: bool) {
        self.record(Call::Verify(verify));
    }
    fn set_follow_redirects(&mut self, follow: bool) {
        self.record(Call::Follow(follow));
    }
    fn set_timeout(&mut self, timeout: Duration) {
        self.record(Call::Timeout(timeout));
    }
    fn set_body(&mut self, body: Option<bytes::Bytes>) {
        self.record(Call::Body(body.map(|b| b.to_vec())));
    }
    fn set_cookie(&mut self, cookie: &str) {
        self.record(Call::Cookie(cookie.to_string()));
    }
    fn set_verbose(&mut self, verbose: bool) {
        let mut state = self.state.lock().unwrap();
        state.verbose = verbose;
        state.calls.push(Call::Verbose(verbose));
    }

    fn perform(&mut self, sink: &mut ExchangeSink) -> Result<(), TransportError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Perform);
        let canned = state.queue.pop_front().unwrap_or_else(|| Canned {
            headers: b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n".to_vec(),
            ..Canned::default()
        });
        if state.verbose {
            sink.debug.extend(canned.debug.iter().cloned());
        }
        state.last_info = canned.info.clone();
        if let Some(err) = canned.error {
            return Err(err);
        }
        sink.header_bytes.extend_from_slice(&canned.headers);
        sink.body.extend_from_slice(&canned.body);
        Ok(())
    }

    fn info(&self, key: InfoKey) -> Option<InfoValue> {
        let state = self.state.lock().unwrap();
        state
            .last_info
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.clone())
    }
}

type Handler = dyn Fn(&Request) -> Vec<u8> + Send + Sync;

/// A request as received by [`TestServer`].
#[derive(Debug, Clone)]
pub struct Request {
    pub head: String,
    pub body: Vec<u8>,
}

impl Request {
    pub fn request_line(&self) -> &str {
        self.head.lines().next().unwrap_or("")
    }

    pub fn path(&self) -> &str {
        self.request_line().split(' ').nth(1).unwrap_or("")
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.lines().skip(1).find_map(|line| {
            let (n, v) = line.split_once(':')?;
            n.trim().eq_ignore_ascii_case(name).then(|| v.trim())
        })
    }

    /// Header names in the order they arrived.
    pub fn header_names(&self) -> Vec<String> {
        self.head
            .lines()
            .skip(1)
            .filter_map(|l| l.split_once(':').map(|(n, _)| n.trim().to_string()))
            .collect()
    }
}

/// Loopback HTTP/1.1 server on a background thread.
///
/// Connections are kept alive until the handler's response carries
/// `Connection: close` or the client hangs up.
pub struct TestServer {
    pub addr: SocketAddr,
    pub requests: Arc<Mutex<Vec<Request>>>,
    pub connections: Arc<AtomicUsize>,
}

impl TestServer {
    pub fn start<F>(handler: F) -> Self
    where
        F: Fn(&Request) -> Vec<u8> + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let connections = Arc::new(AtomicUsize::new(0));
        let handler: Arc<Handler> = Arc::new(handler);

        let reqs = requests.clone();
        let conns = connections.clone();
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                conns.fetch_add(1, Ordering::SeqCst);
                let handler = handler.clone();
                let reqs = reqs.clone();
                thread::spawn(move || serve_connection(stream, &*handler, &reqs));
            }
        });

        Self {
            addr,
            requests,
            connections,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

fn serve_connection(mut stream: TcpStream, handler: &Handler, requests: &Mutex<Vec<Request>>) {
    let mut buf: Vec<u8> = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let head_end = loop {
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
            match stream.read(&mut chunk) {
                Ok(0) | Err(_) => return,
                Ok(n) => buf.extend_from_slice(&chunk[..n]),
            }
        };
        let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
        let content_length = head
            .lines()
            .find_map(|l| {
                let (n, v) = l.split_once(':')?;
                n.trim()
                    .eq_ignore_ascii_case("content-length")
                    .then(|| v.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        while buf.len() < head_end + content_length {
            match stream.read(&mut chunk) {
                Ok(0) | Err(_) => return,
                Ok(n) => buf.extend_from_slice(&chunk[..n]),
            }
        }
        let body = buf[head_end..head_end + content_length].to_vec();
        buf.drain(..head_end + content_length);

        let request = Request { head, body };
        requests.lock().unwrap().push(request.clone());
        let response = handler(&request);
        if stream.write_all(&response).is_err() {
            return;
        }
        let text = String::from_utf8_lossy(&response).to_ascii_lowercase();
        if text.contains("connection: close") {
            return;
        }
    }
}

/// Plain response with a body and `Content-Length`.
pub fn response(status: &str, headers: &[(&str, &str)], body: &[u8]) -> Vec<u8> {
    let mut out = format!("HTTP/1.1 {}\r\n", status);
    for (n, v) in headers {
        out.push_str(&format!("{}: {}\r\n", n, v));
    }
    out.push_str(&format!("Content-Length: {}\r\n\r\n", body.len()));
    let mut bytes = out.into_bytes();
    bytes.extend_from_slice(body);
    bytes
}
