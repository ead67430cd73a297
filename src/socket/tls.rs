use crate::base::neterror::TransportError;
use boring::ssl::{ConnectConfiguration, SslConnector, SslMethod, SslVerifyMode, SslVersion};
use tracing::trace;

/// Configuration for the TLS ClientHello of one connection.
///
/// The cipher list is applied verbatim, in order; it is what makes the
/// handshake look like the selected browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsConfig {
    pub min_version: Option<SslVersion>,
    pub max_version: Option<SslVersion>,
    /// OpenSSL cipher string; `None` keeps the library default.
    pub cipher_list: Option<String>,
    pub alpn_protos: Vec<String>,
    pub curves: Vec<String>,
    pub sigalgs: String,
    /// Certificate and hostname verification.
    pub verify: bool,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            min_version: Some(SslVersion::TLS1_2),
            max_version: Some(SslVersion::TLS1_3),
            cipher_list: None,
            alpn_protos: vec!["http/1.1".to_string()],
            curves: vec!["X25519".to_string(), "P-256".to_string(), "P-384".to_string()],
            sigalgs: "ECDSA+SHA256:RSA-PSS+SHA256:RSA+SHA256:\
                ECDSA+SHA384:RSA-PSS+SHA384:RSA+SHA384:\
                RSA-PSS+SHA512:RSA+SHA512"
                .to_string(),
            verify: true,
        }
    }
}

impl TlsConfig {
    /// Build a configuration for one exchange.
    pub fn new(cipher_list: Option<String>, http2: bool, verify: bool) -> Self {
        let alpn_protos = if http2 {
            vec!["h2".to_string(), "http/1.1".to_string()]
        } else {
            vec!["http/1.1".to_string()]
        };
        Self {
            cipher_list: cipher_list.filter(|c| !c.is_empty()),
            alpn_protos,
            verify,
            ..Self::default()
        }
    }

    /// ALPN protocol list in wire format (length-prefixed).
    pub fn alpn_wire(&self) -> Result<Vec<u8>, TransportError> {
        let mut wire = Vec::new();
        for proto in &self.alpn_protos {
            if proto.is_empty() || proto.len() > 255 {
                return Err(TransportError::tls(format!("invalid ALPN protocol {:?}", proto)));
            }
            wire.push(proto.len() as u8);
            wire.extend_from_slice(proto.as_bytes());
        }
        Ok(wire)
    }

    /// Build a connector with this configuration applied.
    pub fn build_connector(&self) -> Result<SslConnector, TransportError> {
        let mut builder = SslConnector::builder(SslMethod::tls()).map_err(tls_err)?;

        if let Some(min) = self.min_version {
            builder.set_min_proto_version(Some(min)).map_err(tls_err)?;
        }
        if let Some(max) = self.max_version {
            builder.set_max_proto_version(Some(max)).map_err(tls_err)?;
        }

        if let Some(ciphers) = &self.cipher_list {
            trace!(ciphers = %ciphers, "setting cipher list");
            builder.set_cipher_list(ciphers).map_err(tls_err)?;
        }

        if !self.alpn_protos.is_empty() {
            builder.set_alpn_protos(&self.alpn_wire()?).map_err(tls_err)?;
        }

        if !self.sigalgs.is_empty() {
            builder.set_sigalgs_list(&self.sigalgs).map_err(tls_err)?;
        }

        if !self.curves.is_empty() {
            builder.set_curves_list(&self.curves.join(":")).map_err(tls_err)?;
        }

        if self.verify {
            builder.set_verify(SslVerifyMode::PEER);
        } else {
            builder.set_verify(SslVerifyMode::NONE);
        }

        Ok(builder.build())
    }

    /// Per-connection configuration for `host`.
    pub fn configure(
        &self,
        connector: &SslConnector,
        host: &str,
    ) -> Result<ConnectConfiguration, TransportError> {
        let mut config = connector.configure().map_err(tls_err)?;
        if !self.verify {
            config.set_verify_hostname(false);
        }
        if !Self::should_set_sni(host) {
            config.set_use_server_name_indication(false);
        }
        Ok(config)
    }

    /// Check if SNI (Server Name Indication) should be set for this host.
    /// Per RFC 6066, SNI MUST NOT be set for raw IP addresses.
    pub fn should_set_sni(host: &str) -> bool {
        host.trim_matches(|c| c == '[' || c == ']')
            .parse::<std::net::IpAddr>()
            .is_err()
    }
}

fn tls_err(e: boring::error::ErrorStack) -> TransportError {
    TransportError::tls(e.to_string())
}
