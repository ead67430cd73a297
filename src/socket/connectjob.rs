use crate::base::context::IoResultExt;
use crate::base::neterror::{TransportError, TransportErrorKind};
use crate::socket::client::SocketType;
use crate::socket::proxy::ProxySettings;
use crate::socket::tls::TlsConfig;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

/// Largest CONNECT response header we accept from a proxy.
const MAX_TUNNEL_RESPONSE: usize = 16 * 1024;

/// Where a connection should end up.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub scheme: String,
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn is_tls(&self) -> bool {
        self.scheme == "https"
    }

    pub fn authority(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

/// Timings and peer details recorded while connecting.
#[derive(Debug, Clone, Default)]
pub struct ConnectInfo {
    pub name_lookup: Duration,
    pub connect: Duration,
    /// Time until the TLS handshake completed; zero for plain connections.
    pub app_connect: Duration,
    pub primary_addr: Option<SocketAddr>,
    /// Status of the proxy's CONNECT response, if a tunnel was built.
    pub connect_code: Option<u16>,
    /// Certificate verification result (0 = ok).
    pub verify_result: i64,
}

/// Manages the connection process: DNS -> TCP -> CONNECT -> TLS.
/// Roughly equivalent to net::ConnectJob.
pub struct ConnectJob<'a> {
    endpoint: &'a Endpoint,
    proxy: Option<&'a ProxySettings>,
    tls: &'a TlsConfig,
}

impl<'a> ConnectJob<'a> {
    pub fn new(endpoint: &'a Endpoint, proxy: Option<&'a ProxySettings>, tls: &'a TlsConfig) -> Self {
        Self { endpoint, proxy, tls }
    }

    /// Run the job. `trace` receives human-readable progress lines.
    pub async fn connect(
        &self,
        trace: &mut Vec<String>,
    ) -> Result<(SocketType, ConnectInfo), TransportError> {
        let start = Instant::now();
        let mut info = ConnectInfo::default();

        // With a proxy, DNS and TCP target the proxy host.
        let (host, port) = match self.proxy {
            Some(p) => (p.host.as_str(), p.port),
            None => (self.endpoint.host.as_str(), self.endpoint.port),
        };

        // 1. DNS Resolution
        let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host, port))
            .await
            .dns_context(host)?
            .collect();
        if addrs.is_empty() {
            return Err(TransportError::new(
                TransportErrorKind::NameNotResolved,
                format!("{}: no addresses", host),
            ));
        }
        info.name_lookup = start.elapsed();
        trace.push(format!("Resolved {} to {} address(es)", host, addrs.len()));

        // 2. TCP Connect, first address that answers wins
        let mut last_err = None;
        let mut stream = None;
        for addr in &addrs {
            trace.push(format!("Trying {}...", addr));
            match TcpStream::connect(addr).await.connection_context(host, port) {
                Ok(s) => {
                    info.primary_addr = Some(*addr);
                    stream = Some(s);
                    break;
                }
                Err(e) => last_err = Some(e),
            }
        }
        let mut stream = match stream {
            Some(s) => s,
            None => {
                return Err(last_err.unwrap_or_else(|| {
                    TransportError::new(TransportErrorKind::ConnectionFailed, host.to_string())
                }))
            }
        };
        let _ = stream.set_nodelay(true);
        info.connect = start.elapsed();
        trace.push(format!("Connected to {} port {}", host, port));
        debug!(host = %host, port = port, "tcp connected");

        // 3. Proxy tunnel for TLS targets; plain HTTP goes in absolute form.
        if let Some(proxy) = self.proxy {
            if self.endpoint.is_tls() {
                let code = self.establish_tunnel(&mut stream, proxy, trace).await?;
                info.connect_code = Some(code);
            }
        }

        // 4. TLS handshake, always after any tunnel
        if !self.endpoint.is_tls() {
            return Ok((SocketType::Tcp(stream), info));
        }

        let connector = self.tls.build_connector()?;
        let config = self.tls.configure(&connector, &self.endpoint.host)?;
        let tls_stream = tokio_boring::connect(config, &self.endpoint.host, stream)
            .await
            .map_err(|e| TransportError::tls(format!("{}: {}", self.endpoint.host, e)))?;

        info.app_connect = start.elapsed();
        info.verify_result = tls_stream.ssl().verify_result().as_raw() as i64;
        let alpn = tls_stream
            .ssl()
            .selected_alpn_protocol()
            .map(|p| String::from_utf8_lossy(p).into_owned());
        trace.push(format!(
            "TLS connection using {} / {}",
            tls_stream.ssl().version_str(),
            tls_stream
                .ssl()
                .current_cipher()
                .map(|c| c.name())
                .unwrap_or("unknown"),
        ));
        if let Some(alpn) = alpn {
            trace.push(format!("ALPN: server accepted {}", alpn));
        }

        Ok((SocketType::Ssl(tls_stream), info))
    }

    /// Send `CONNECT` and wait for a 2xx. Returns the proxy's status code.
    async fn establish_tunnel(
        &self,
        stream: &mut TcpStream,
        proxy: &ProxySettings,
        trace: &mut Vec<String>,
    ) -> Result<u16, TransportError> {
        let target = self.endpoint.authority();
        let proxy_name = proxy.authority();

        let mut connect_req = format!("CONNECT {} HTTP/1.1\r\nHost: {}\r\n", target, target);
        if let Some(auth) = proxy.get_auth_header() {
            connect_req.push_str(&format!("Proxy-Authorization: {}\r\n", auth));
        }
        connect_req.push_str("\r\n");
        trace.push(format!("Establish HTTP proxy tunnel to {}", target));

        stream
            .write_all(connect_req.as_bytes())
            .await
            .tunnel_context(&proxy_name)?;

        let mut response = Vec::with_capacity(512);
        let mut buf = [0u8; 512];
        while !response.windows(4).any(|w| w == b"\r\n\r\n") {
            if response.len() > MAX_TUNNEL_RESPONSE {
                return Err(TransportError::new(
                    TransportErrorKind::ProxyTunnel,
                    format!("{}: CONNECT response too large", proxy_name),
                ));
            }
            let n = stream.read(&mut buf).await.tunnel_context(&proxy_name)?;
            if n == 0 {
                return Err(TransportError::new(
                    TransportErrorKind::ProxyTunnel,
                    format!("{}: closed during CONNECT", proxy_name),
                ));
            }
            response.extend_from_slice(&buf[..n]);
        }

        let head = String::from_utf8_lossy(&response);
        let status_line = head.lines().next().unwrap_or_default();
        trace.push(format!("Proxy replied: {}", status_line));
        let code = parse_status_code(status_line).ok_or_else(|| {
            TransportError::new(
                TransportErrorKind::ProxyTunnel,
                format!("{}: malformed CONNECT response", proxy_name),
            )
        })?;
        if !(200..300).contains(&code) {
            return Err(TransportError::new(
                TransportErrorKind::ProxyTunnel,
                format!("{}: CONNECT returned {}", proxy_name, code),
            ));
        }
        Ok(code)
    }
}

fn parse_status_code(line: &str) -> Option<u16> {
    let mut parts = line.split_whitespace();
    let version = parts.next()?;
    if !version.starts_with("HTTP/") {
        return None;
    }
    parts.next()?.parse().ok()
}
