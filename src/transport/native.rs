//! BoringSSL + hyper implementation of [`Transport`].
//!
//! Each exchange runs on a private current-thread tokio runtime, so the handle
//! is used from synchronous code and must not be driven from inside another
//! runtime. One idle keep-alive connection survives between exchanges; it is
//! reused only when the next exchange targets the same endpoint with the same
//! protocol, proxy, cipher list and verification settings.

use crate::base::neterror::{TransportError, TransportErrorKind};
use crate::http::info::{InfoKey, InfoValue};
use crate::socket::connectjob::{ConnectInfo, ConnectJob, Endpoint};
use crate::socket::proxy::ProxySettings;
use crate::socket::tls::TlsConfig;
use crate::transport::{ExchangeSink, HttpVersion, Method, Transport};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::client::conn::{http1, http2};
use hyper_util::rt::{TokioExecutor, TokioIo};
use std::time::{Duration, Instant};
use tracing::debug;
use url::Url;

/// Redirect hops followed before giving up.
pub const MAX_REDIRECTS: usize = 30;

/// Headers that have no meaning on an HTTP/2 stream.
const H2_FORBIDDEN: &[&str] = &[
    "host",
    "connection",
    "keep-alive",
    "proxy-connection",
    "transfer-encoding",
    "upgrade",
];

/// Options set since the last reset.
#[derive(Debug, Clone)]
struct Options {
    url: String,
    method: Method,
    headers: Vec<String>,
    version: HttpVersion,
    proxy: Option<ProxySettings>,
    cipher_list: Option<String>,
    verify: bool,
    follow_redirects: bool,
    timeout: Option<Duration>,
    body: Option<Bytes>,
    cookie: String,
    verbose: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            url: String::new(),
            method: Method::Get,
            headers: Vec::new(),
            version: HttpVersion::Http11,
            proxy: None,
            cipher_list: None,
            verify: true,
            follow_redirects: false,
            timeout: None,
            body: None,
            cookie: String::new(),
            verbose: false,
        }
    }
}

impl Options {
    /// The cookie line, if it was built for `url`'s host.
    ///
    /// The line comes from the jar filtered by the first URL's host, so later
    /// hops to another host go without it.
    fn cookie_for(&self, url: &Url) -> Option<&str> {
        if self.cookie.is_empty() {
            return None;
        }
        let origin = Url::parse(&self.url).ok()?;
        match (origin.host_str(), url.host_str()) {
            (Some(a), Some(b)) if a.eq_ignore_ascii_case(b) => Some(&self.cookie),
            _ => None,
        }
    }
}

/// Metrics of the last exchange.
#[derive(Debug, Clone, Default)]
struct TransferInfo {
    performed: bool,
    total: Duration,
    name_lookup: Duration,
    connect: Duration,
    app_connect: Duration,
    pre_transfer: Duration,
    start_transfer: Duration,
    redirect_time: Duration,
    redirect_count: usize,
    redirect_url: Option<String>,
    size_upload: usize,
    size_download: usize,
    header_size: usize,
    request_size: usize,
    content_length: Option<i64>,
    content_type: Option<String>,
    effective_url: Option<String>,
    primary_ip: Option<String>,
    primary_port: Option<u16>,
    http_code: u16,
    connect_code: u16,
    http_version: Option<&'static str>,
    num_connects: usize,
    ssl_verify_result: i64,
}

impl TransferInfo {
    fn record_connect(&mut self, offset: Duration, conn: &ConnectInfo) {
        self.num_connects += 1;
        self.name_lookup = offset + conn.name_lookup;
        self.connect = offset + conn.connect;
        if !conn.app_connect.is_zero() {
            self.app_connect = offset + conn.app_connect;
        }
        self.connect_code = conn.connect_code.unwrap_or(0);
        self.ssl_verify_result = conn.verify_result;
    }

    fn record_peer(&mut self, conn: &ConnectInfo) {
        if let Some(addr) = conn.primary_addr {
            self.primary_ip = Some(addr.ip().to_string());
            self.primary_port = Some(addr.port());
        }
    }
}

/// Identity of a reusable connection.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PoolKey {
    endpoint: Endpoint,
    version: HttpVersion,
    proxy: Option<String>,
    ciphers: Option<String>,
    verify: bool,
}

enum Sender {
    Http1(http1::SendRequest<Full<Bytes>>),
    Http2(http2::SendRequest<Full<Bytes>>),
}

impl Sender {
    fn is_h2(&self) -> bool {
        matches!(self, Sender::Http2(_))
    }

    async fn send(
        &mut self,
        req: ::http::Request<Full<Bytes>>,
    ) -> Result<::http::Response<Incoming>, hyper::Error> {
        match self {
            Sender::Http1(s) => {
                s.ready().await?;
                s.send_request(req).await
            }
            Sender::Http2(s) => {
                s.ready().await?;
                s.send_request(req).await
            }
        }
    }
}

struct Connection {
    key: PoolKey,
    sender: Sender,
    peer: ConnectInfo,
}

/// The default transport: BoringSSL for TLS, hyper for HTTP/1.1 and HTTP/2.
pub struct NativeTransport {
    runtime: Option<tokio::runtime::Runtime>,
    options: Options,
    idle: Option<Connection>,
    info: TransferInfo,
}

impl Default for NativeTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for NativeTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeTransport")
            .field("options", &self.options)
            .field("idle", &self.idle.as_ref().map(|c| &c.key))
            .finish()
    }
}

impl NativeTransport {
    pub fn new() -> Self {
        Self {
            runtime: None,
            options: Options::default(),
            idle: None,
            info: TransferInfo::default(),
        }
    }
}

impl Transport for NativeTransport {
    fn reset(&mut self) {
        self.options = Options::default();
    }

    fn set_url(&mut self, url: &str) {
        self.options.url = url.to_string();
    }

    fn set_method(&mut self, method: &Method) {
        self.options.method = method.clone();
    }

    fn set_headers(&mut self, lines: &[String]) {
        self.options.headers = lines.to_vec();
    }

    fn set_http_version(&mut self, version: HttpVersion) {
        self.options.version = version;
    }

    fn set_proxy(&mut self, proxy: Option<&ProxySettings>) {
        self.options.proxy = proxy.cloned();
    }

    fn set_cipher_list(&mut self, ciphers: &str) {
        self.options.cipher_list = Some(ciphers.to_string()).filter(|c| !c.is_empty());
    }

    fn set_tls_verify(&mut self, verify: bool) {
        self.options.verify = verify;
    }

    fn set_follow_redirects(&mut self, follow: bool) {
        self.options.follow_redirects = follow;
    }

    fn set_timeout(&mut self, timeout: Duration) {
        self.options.timeout = Some(timeout).filter(|t| !t.is_zero());
    }

    fn set_body(&mut self, body: Option<Bytes>) {
        self.options.body = body;
    }

    fn set_cookie(&mut self, cookie: &str) {
        self.options.cookie = cookie.to_string();
    }

    fn set_verbose(&mut self, verbose: bool) {
        self.options.verbose = verbose;
    }

    fn perform(&mut self, sink: &mut ExchangeSink) -> Result<(), TransportError> {
        let Self {
            runtime,
            options,
            idle,
            info,
        } = self;

        let rt = match runtime.take() {
            Some(rt) => rt,
            None => tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| TransportError::new(TransportErrorKind::Io, e.to_string()))?,
        };

        *info = TransferInfo::default();
        let start = Instant::now();
        let mut trace = Vec::new();
        let timeout = options.timeout;

        let result = rt.block_on(async {
            let exchange = run_exchange(options, idle, info, sink, &mut trace, start);
            match timeout {
                Some(limit) => tokio::time::timeout(limit, exchange)
                    .await
                    .unwrap_or_else(|_| {
                        Err(TransportError::timeout(format!(
                            "operation timed out after {} ms",
                            limit.as_millis()
                        )))
                    }),
                None => exchange.await,
            }
        });
        *runtime = Some(rt);

        info.performed = true;
        info.total = start.elapsed();
        info.header_size = sink.header_bytes.len();
        if result.is_err() {
            *idle = None;
        }
        if options.verbose {
            sink.debug.append(&mut trace);
        }
        result
    }

    fn info(&self, key: InfoKey) -> Option<InfoValue> {
        let i = &self.info;
        if !i.performed {
            return None;
        }
        let secs = |d: Duration| Some(InfoValue::Float(d.as_secs_f64()));
        let speed = |bytes: usize| {
            let total = i.total.as_secs_f64();
            let rate = if total > 0.0 { bytes as f64 / total } else { 0.0 };
            Some(InfoValue::Float(rate))
        };
        match key {
            InfoKey::TotalTime => secs(i.total),
            InfoKey::NameLookupTime => secs(i.name_lookup),
            InfoKey::ConnectTime => secs(i.connect),
            InfoKey::AppConnectTime => secs(i.app_connect),
            InfoKey::PreTransferTime => secs(i.pre_transfer),
            InfoKey::StartTransferTime => secs(i.start_transfer),
            InfoKey::RedirectTime => secs(i.redirect_time),
            InfoKey::RedirectCount => Some(InfoValue::Int(i.redirect_count as i64)),
            InfoKey::RedirectUrl => i.redirect_url.clone().map(InfoValue::Text),
            InfoKey::SizeUpload => Some(InfoValue::Int(i.size_upload as i64)),
            InfoKey::SizeDownload => Some(InfoValue::Int(i.size_download as i64)),
            InfoKey::SpeedUpload => speed(i.size_upload),
            InfoKey::SpeedDownload => speed(i.size_download),
            InfoKey::HeaderSize => Some(InfoValue::Int(i.header_size as i64)),
            InfoKey::RequestSize => Some(InfoValue::Int(i.request_size as i64)),
            InfoKey::ContentLengthDownload => i.content_length.map(InfoValue::Int),
            InfoKey::ContentType => i.content_type.clone().map(InfoValue::Text),
            InfoKey::EffectiveUrl => i.effective_url.clone().map(InfoValue::Text),
            InfoKey::PrimaryIp => i.primary_ip.clone().map(InfoValue::Text),
            InfoKey::PrimaryPort => i.primary_port.map(|p| InfoValue::Int(p as i64)),
            InfoKey::HttpCode => Some(InfoValue::Int(i.http_code as i64)),
            InfoKey::HttpConnectCode => Some(InfoValue::Int(i.connect_code as i64)),
            InfoKey::HttpVersion => i.http_version.map(InfoValue::from),
            InfoKey::NumConnects => Some(InfoValue::Int(i.num_connects as i64)),
            InfoKey::SslVerifyResult => Some(InfoValue::Int(i.ssl_verify_result)),
        }
    }
}

/// One `perform`: every redirect hop up to the final response.
async fn run_exchange(
    opts: &Options,
    idle: &mut Option<Connection>,
    info: &mut TransferInfo,
    sink: &mut ExchangeSink,
    trace: &mut Vec<String>,
    start: Instant,
) -> Result<(), TransportError> {
    let mut url = Url::parse(&opts.url).map_err(|e| {
        TransportError::new(TransportErrorKind::Protocol, format!("{}: {}", opts.url, e))
            .with_code(-300)
    })?;
    let mut method = opts.method.clone();
    let mut body = opts.body.clone();
    let mut body_dropped = false;
    let mut redirects = 0usize;

    loop {
        let hop_start = Instant::now();
        let key = pool_key(&url, opts)?;
        let (response, conn) = send_hop(
            &key,
            &url,
            &method,
            body.as_ref(),
            body_dropped,
            opts,
            idle,
            info,
            trace,
            start,
        )
        .await?;

        let status = response.status();
        let block = header_block(&response);
        for line in block.lines().filter(|l| !l.is_empty()) {
            trace.push(format!("< {}", line));
        }
        sink.header_bytes.extend_from_slice(block.as_bytes());

        let keep_alive = is_keep_alive(&response);
        let location = response
            .headers()
            .get(::http::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|loc| url.join(loc).ok());

        info.http_code = status.as_u16();
        info.http_version = Some(if conn.sender.is_h2() { "HTTP/2" } else { "HTTP/1.1" });

        let follow = opts.follow_redirects
            && status.is_redirection()
            && status != ::http::StatusCode::NOT_MODIFIED
            && location.is_some();

        if let (true, Some(next)) = (follow, location.clone()) {
            // Drain so the connection can carry the next hop.
            let drained = response.into_body().collect().await.is_ok();
            park(conn, keep_alive && drained, idle);

            redirects += 1;
            if redirects > MAX_REDIRECTS {
                return Err(TransportError::new(
                    TransportErrorKind::TooManyRedirects,
                    format!("maximum ({}) redirects followed", MAX_REDIRECTS),
                ));
            }
            info.redirect_time += hop_start.elapsed();

            let rewrite_to_get = match status.as_u16() {
                301 | 302 => method == Method::Post,
                303 => method != Method::Head,
                _ => false,
            };
            if rewrite_to_get {
                method = Method::Get;
                body = None;
                body_dropped = true;
            }
            trace.push(format!("* Issue another request to this URL: '{}'", next));
            debug!(from = %url, to = %next, status = status.as_u16(), "following redirect");
            url = next;
            continue;
        }

        if status.is_redirection() {
            info.redirect_url = location.map(|u| u.to_string());
        }
        info.content_type = response
            .headers()
            .get(::http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        info.content_length = response
            .headers()
            .get(::http::header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok());

        let payload = response
            .into_body()
            .collect()
            .await
            .map_err(hyper_err)?
            .to_bytes();
        info.size_download = payload.len();
        sink.body.extend_from_slice(&payload);

        park(conn, keep_alive, idle);
        info.redirect_count = redirects;
        info.effective_url = Some(url.to_string());
        return Ok(());
    }
}

/// Send one request, reusing the parked connection when it matches.
///
/// A reused connection that fails before any response arrives is replaced by
/// a fresh one and the request is sent once more.
#[allow(clippy::too_many_arguments)]
async fn send_hop(
    key: &PoolKey,
    url: &Url,
    method: &Method,
    body: Option<&Bytes>,
    body_dropped: bool,
    opts: &Options,
    idle: &mut Option<Connection>,
    info: &mut TransferInfo,
    trace: &mut Vec<String>,
    start: Instant,
) -> Result<(::http::Response<Incoming>, Connection), TransportError> {
    let (mut conn, mut reused) = match idle.take() {
        Some(c) if &c.key == key => {
            trace.push(format!("* Re-using existing connection to {}", key.endpoint.authority()));
            (c, true)
        }
        _ => (open(key, opts, info, trace, start).await?, false),
    };

    loop {
        let absolute_form = conn.sender.is_h2() || (opts.proxy.is_some() && !key.endpoint.is_tls());
        let (req, request_size) =
            build_request(url, method, body, body_dropped, opts, conn.sender.is_h2(), absolute_form)?;
        for line in request_trace(&req) {
            trace.push(line);
        }

        info.pre_transfer = start.elapsed();
        match conn.sender.send(req).await {
            Ok(resp) => {
                info.start_transfer = start.elapsed();
                info.request_size += request_size;
                info.size_upload = body.map_or(0, |b| b.len());
                info.record_peer(&conn.peer);
                return Ok((resp, conn));
            }
            Err(e) if reused => {
                debug!(error = %e, "reused connection failed, retrying on a fresh one");
                trace.push("* Connection died, retrying a fresh connect".to_string());
                reused = false;
                conn = open(key, opts, info, trace, start).await?;
            }
            Err(e) => return Err(hyper_err(e)),
        }
    }
}

/// DNS, TCP, proxy tunnel, TLS and the HTTP handshake.
async fn open(
    key: &PoolKey,
    opts: &Options,
    info: &mut TransferInfo,
    trace: &mut Vec<String>,
    start: Instant,
) -> Result<Connection, TransportError> {
    let offset = start.elapsed();
    let tls = TlsConfig::new(key.ciphers.clone(), key.version.is_h2(), key.verify);
    let mut steps = Vec::new();
    let connected = ConnectJob::new(&key.endpoint, opts.proxy.as_ref(), &tls)
        .connect(&mut steps)
        .await;
    trace.extend(steps.into_iter().map(|l| format!("* {}", l)));
    let (socket, peer) = connected?;
    info.record_connect(offset, &peer);

    let h2 = socket.negotiated_h2();
    let io = TokioIo::new(socket);
    let sender = if h2 {
        let (sender, conn) = http2::handshake(TokioExecutor::new(), io)
            .await
            .map_err(hyper_err)?;
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                debug!(error = %e, "h2 connection closed");
            }
        });
        Sender::Http2(sender)
    } else {
        let (sender, conn) = http1::Builder::new()
            .title_case_headers(true)
            .handshake(io)
            .await
            .map_err(hyper_err)?;
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                debug!(error = %e, "h1 connection closed");
            }
        });
        Sender::Http1(sender)
    };
    debug!(
        endpoint = %key.endpoint.authority(),
        h2,
        "connection established"
    );

    Ok(Connection {
        key: key.clone(),
        sender,
        peer,
    })
}

fn pool_key(url: &Url, opts: &Options) -> Result<PoolKey, TransportError> {
    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(TransportError::new(
            TransportErrorKind::Protocol,
            format!("unsupported scheme {:?}", scheme),
        )
        .with_code(-301));
    }
    let host = url
        .host_str()
        .ok_or_else(|| TransportError::protocol(format!("{}: missing host", url)).with_code(-300))?
        .trim_matches(|c| c == '[' || c == ']')
        .to_string();
    let port = url
        .port_or_known_default()
        .ok_or_else(|| TransportError::protocol(format!("{}: missing port", url)).with_code(-300))?;

    // HTTP/2 is only negotiated through ALPN.
    let version = if scheme == "https" {
        opts.version
    } else {
        HttpVersion::Http11
    };

    Ok(PoolKey {
        endpoint: Endpoint {
            scheme: scheme.to_string(),
            host,
            port,
        },
        version,
        proxy: opts.proxy.as_ref().map(|p| {
            format!("{}@{}", p.username.as_deref().unwrap_or(""), p.authority())
        }),
        ciphers: opts.cipher_list.clone(),
        verify: opts.verify,
    })
}

/// Build the hyper request. Returns it with its approximate size on the wire.
fn build_request(
    url: &Url,
    method: &Method,
    body: Option<&Bytes>,
    body_dropped: bool,
    opts: &Options,
    h2: bool,
    absolute_form: bool,
) -> Result<(::http::Request<Full<Bytes>>, usize), TransportError> {
    use ::http::header::{self, HeaderName, HeaderValue};

    let method_token = ::http::Method::from_bytes(method.as_str().as_bytes())
        .map_err(|_| TransportError::protocol(format!("invalid method token {:?}", method.as_str())))?;

    let target = if absolute_form {
        let mut u = url.clone();
        u.set_fragment(None);
        u.to_string()
    } else {
        let mut t = url.path().to_string();
        if let Some(q) = url.query() {
            t.push('?');
            t.push_str(q);
        }
        t
    };

    let mut headers = ::http::HeaderMap::new();
    let has_host = opts
        .headers
        .iter()
        .any(|l| l.split(':').next().is_some_and(|n| n.trim().eq_ignore_ascii_case("host")));
    if !h2 && !has_host {
        let host = match url.port() {
            Some(p) => format!("{}:{}", url.host_str().unwrap_or_default(), p),
            None => url.host_str().unwrap_or_default().to_string(),
        };
        let value = HeaderValue::from_str(&host)
            .map_err(|e| TransportError::protocol(format!("host header: {}", e)))?;
        headers.insert(header::HOST, value);
    }

    for line in &opts.headers {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim();
        if h2 && H2_FORBIDDEN.iter().any(|f| f.eq_ignore_ascii_case(name)) {
            continue;
        }
        if body_dropped
            && (name.eq_ignore_ascii_case("content-type") || name.eq_ignore_ascii_case("content-length"))
        {
            continue;
        }
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| TransportError::protocol(format!("invalid header name {:?}", name)))?;
        let value = HeaderValue::from_str(value.trim())
            .map_err(|_| TransportError::protocol(format!("invalid value for header {}", name)))?;
        headers.append(name, value);
    }

    if let Some(cookie) = opts.cookie_for(url) {
        let combined = match headers.get(header::COOKIE).and_then(|v| v.to_str().ok()) {
            Some(existing) => format!("{}; {}", existing, cookie),
            None => cookie.to_string(),
        };
        let value = HeaderValue::from_str(&combined)
            .map_err(|_| TransportError::protocol("invalid cookie header"))?;
        headers.insert(header::COOKIE, value);
    }

    if absolute_form && !h2 {
        if let Some(auth) = opts.proxy.as_ref().and_then(|p| p.get_auth_header()) {
            let value = HeaderValue::from_str(&auth)
                .map_err(|_| TransportError::protocol("invalid proxy credentials"))?;
            headers.insert(header::PROXY_AUTHORIZATION, value);
        }
    }

    let payload = body.cloned().unwrap_or_default();
    let sends_body = body.is_some() || matches!(method, Method::Post | Method::Put | Method::Patch);
    if sends_body && !headers.contains_key(header::CONTENT_LENGTH) {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(payload.len()));
    }

    let version = if h2 {
        ::http::Version::HTTP_2
    } else {
        ::http::Version::HTTP_11
    };
    let request_line = method_token.as_str().len() + target.len() + 12;
    let header_len: usize = headers
        .iter()
        .map(|(n, v)| n.as_str().len() + v.len() + 4)
        .sum();
    let size = request_line + header_len + 2 + payload.len();

    let mut req = ::http::Request::builder()
        .method(method_token)
        .uri(target)
        .version(version)
        .body(Full::new(payload))
        .map_err(|e| TransportError::protocol(e.to_string()))?;
    *req.headers_mut() = headers;
    Ok((req, size))
}

fn request_trace(req: &::http::Request<Full<Bytes>>) -> Vec<String> {
    let version = if req.version() == ::http::Version::HTTP_2 {
        "HTTP/2"
    } else {
        "HTTP/1.1"
    };
    let mut lines = vec![format!("> {} {} {}", req.method(), req.uri(), version)];
    for (name, value) in req.headers() {
        lines.push(format!("> {}: {}", name, String::from_utf8_lossy(value.as_bytes())));
    }
    lines
}

/// Render the response head in HTTP/1 text form, one header per line.
fn header_block(resp: &::http::Response<Incoming>) -> String {
    let status = resp.status();
    let mut block = if resp.version() == ::http::Version::HTTP_2 {
        format!("HTTP/2 {}", status.as_u16())
    } else {
        let version = if resp.version() == ::http::Version::HTTP_10 {
            "1.0"
        } else {
            "1.1"
        };
        let reason = resp
            .extensions()
            .get::<hyper::ext::ReasonPhrase>()
            .map(|r| String::from_utf8_lossy(r.as_bytes()).into_owned())
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_default();
        if reason.is_empty() {
            format!("HTTP/{} {}", version, status.as_u16())
        } else {
            format!("HTTP/{} {} {}", version, status.as_u16(), reason)
        }
    };
    block.push_str("\r\n");
    for (name, value) in resp.headers() {
        block.push_str(name.as_str());
        block.push_str(": ");
        block.push_str(&String::from_utf8_lossy(value.as_bytes()));
        block.push_str("\r\n");
    }
    block.push_str("\r\n");
    block
}

fn is_keep_alive(resp: &::http::Response<Incoming>) -> bool {
    if resp.version() == ::http::Version::HTTP_10 {
        return false;
    }
    !resp
        .headers()
        .get_all(::http::header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.split(',').any(|t| t.trim().eq_ignore_ascii_case("close")))
}

fn park(conn: Connection, keep_alive: bool, idle: &mut Option<Connection>) {
    if keep_alive {
        *idle = Some(conn);
    }
}

fn hyper_err(e: hyper::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::timeout(e.to_string())
    } else if e.is_closed() || e.is_canceled() || e.is_incomplete_message() {
        TransportError::new(TransportErrorKind::ConnectionFailed, e.to_string()).with_code(-100)
    } else {
        TransportError::protocol(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts_with(headers: &[&str]) -> Options {
        Options {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            ..Options::default()
        }
    }

    #[test]
    fn test_pool_key_downgrades_plain_http() {
        let mut opts = Options::default();
        opts.version = HttpVersion::Http2;
        let key = pool_key(&Url::parse("http://a.test/").unwrap(), &opts).unwrap();
        assert_eq!(key.version, HttpVersion::Http11);
        let key = pool_key(&Url::parse("https://a.test/").unwrap(), &opts).unwrap();
        assert_eq!(key.version, HttpVersion::Http2);
        assert_eq!(key.endpoint.port, 443);
    }

    #[test]
    fn test_pool_key_rejects_other_schemes() {
        let err = pool_key(&Url::parse("ftp://a.test/").unwrap(), &Options::default()).unwrap_err();
        assert_eq!(err.kind, TransportErrorKind::Protocol);
    }

    #[test]
    fn test_build_request_origin_form_with_host_first() {
        let url = Url::parse("http://a.test:8080/p?a=1;&b=2;").unwrap();
        let opts = opts_with(&["User-Agent: x", "Accept: */*"]);
        let (req, _) = build_request(&url, &Method::Get, None, false, &opts, false, false).unwrap();
        assert_eq!(req.uri(), "/p?a=1;&b=2;");
        let names: Vec<_> = req.headers().keys().map(|k| k.as_str()).collect();
        assert_eq!(names, ["host", "user-agent", "accept"]);
        assert_eq!(req.headers()["host"], "a.test:8080");
    }

    #[test]
    fn test_build_request_h2_strips_connection_headers() {
        let url = Url::parse("https://a.test/").unwrap();
        let opts = opts_with(&["Connection: keep-alive", "Host: a.test", "TE: trailers"]);
        let (req, _) = build_request(&url, &Method::Get, None, false, &opts, true, true).unwrap();
        assert_eq!(req.uri(), "https://a.test/");
        assert!(req.headers().get("connection").is_none());
        assert!(req.headers().get("host").is_none());
        assert_eq!(req.headers()["te"], "trailers");
    }

    #[test]
    fn test_build_request_post_sets_length_and_cookie() {
        let url = Url::parse("http://a.test/").unwrap();
        let mut opts = opts_with(&[]);
        opts.url = url.to_string();
        opts.cookie = "a=1; b=2".into();
        let body = Bytes::from_static(b"k=v");
        let (req, size) =
            build_request(&url, &Method::Post, Some(&body), false, &opts, false, false).unwrap();
        assert_eq!(req.headers()["content-length"], "3");
        assert_eq!(req.headers()["cookie"], "a=1; b=2");
        assert!(size > 3);

        let (req, _) = build_request(&url, &Method::Post, None, false, &opts, false, false).unwrap();
        assert_eq!(req.headers()["content-length"], "0");
    }

    #[test]
    fn test_cookie_line_stays_on_its_host() {
        let mut opts = opts_with(&["Cookie: manual=1"]);
        opts.url = "http://a.test/start".into();
        opts.cookie = "sid=x".into();

        let same = Url::parse("http://A.test/next").unwrap();
        let (req, _) = build_request(&same, &Method::Get, None, false, &opts, false, false).unwrap();
        assert_eq!(req.headers()["cookie"], "manual=1; sid=x");

        let other = Url::parse("http://b.test/").unwrap();
        let (req, _) = build_request(&other, &Method::Get, None, false, &opts, false, false).unwrap();
        assert_eq!(req.headers()["cookie"], "manual=1");
    }

    #[test]
    fn test_build_request_custom_method() {
        let url = Url::parse("http://a.test/").unwrap();
        let (req, _) = build_request(
            &url,
            &Method::Custom("PURGE".into()),
            None,
            false,
            &Options::default(),
            false,
            false,
        )
        .unwrap();
        assert_eq!(req.method().as_str(), "PURGE");

        let bad = build_request(
            &url,
            &Method::Custom("BAD METHOD".into()),
            None,
            false,
            &Options::default(),
            false,
            false,
        );
        assert!(bad.is_err());
    }

    #[test]
    fn test_reset_clears_options() {
        let mut t = NativeTransport::new();
        t.set_url("http://a.test/");
        t.set_tls_verify(false);
        t.set_cookie("a=1");
        t.reset();
        assert!(t.options.url.is_empty());
        assert!(t.options.verify);
        assert!(t.options.cookie.is_empty());
    }

    #[test]
    fn test_info_absent_before_perform() {
        let t = NativeTransport::new();
        assert!(t.info(InfoKey::TotalTime).is_none());
    }
}
