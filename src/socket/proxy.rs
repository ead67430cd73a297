use crate::base::neterror::NetError;
use std::fmt;
use zeroize::Zeroizing;

/// HTTP proxy parsed from `host:port[:user:pass]`.
///
/// HTTPS targets are tunnelled with `CONNECT`; plain HTTP targets are sent to
/// the proxy in absolute form.
#[derive(Clone, PartialEq, Eq)]
pub struct ProxySettings {
    pub host: String,
    pub port: u16,
    /// Proxy username for authentication
    pub username: Option<String>,
    /// Proxy password (zeroized on drop)
    pub password: Option<Zeroizing<String>>,
}

impl ProxySettings {
    /// Parse a `host:port[:user:pass]` string.
    ///
    /// Fewer than two fields, an empty host or a non-numeric port is an
    /// error. Credentials are only taken when all four fields are present.
    pub fn parse(proxy: &str) -> Result<Self, NetError> {
        let fields: Vec<&str> = proxy.split(':').collect();
        if fields.len() < 2 {
            return Err(NetError::InvalidProxyFormat(proxy.to_string()));
        }

        let host = fields[0].trim();
        if host.is_empty() {
            return Err(NetError::InvalidProxyFormat(proxy.to_string()));
        }
        let port: u16 = fields[1]
            .trim()
            .parse()
            .map_err(|_| NetError::InvalidProxyFormat(proxy.to_string()))?;

        let mut settings = Self {
            host: host.to_string(),
            port,
            username: None,
            password: None,
        };
        if fields.len() > 3 {
            // Passwords may themselves contain ':'.
            settings = settings.with_auth(fields[2], &fields[3..].join(":"));
        }
        Ok(settings)
    }

    /// Add authentication credentials.
    pub fn with_auth(mut self, user: &str, pass: &str) -> Self {
        self.username = Some(user.to_string());
        self.password = Some(Zeroizing::new(pass.to_string()));
        self
    }

    /// `host:port` of the proxy itself.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get `Proxy-Authorization` header value.
    pub fn get_auth_header(&self) -> Option<String> {
        if let (Some(u), Some(p)) = (&self.username, &self.password) {
            use base64::{engine::general_purpose, Engine as _};
            let creds = Zeroizing::new(format!("{}:{}", u, p.as_str()));
            let encoded = general_purpose::STANDARD.encode(creds.as_bytes());
            Some(format!("Basic {}", encoded))
        } else {
            None
        }
    }

    /// Check if this proxy requires authentication.
    pub fn requires_auth(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }
}

impl fmt::Debug for ProxySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxySettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl std::str::FromStr for ProxySettings {
    type Err = NetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
