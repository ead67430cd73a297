//! Transfer metadata reported by the transport after an exchange.

use std::fmt;

/// A named metric the transport may report after `perform`.
///
/// Times are seconds since the start of the transfer. Sizes are bytes,
/// speeds bytes per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InfoKey {
    TotalTime,
    NameLookupTime,
    ConnectTime,
    AppConnectTime,
    PreTransferTime,
    StartTransferTime,
    RedirectTime,
    RedirectCount,
    RedirectUrl,
    SizeUpload,
    SizeDownload,
    SpeedUpload,
    SpeedDownload,
    HeaderSize,
    RequestSize,
    ContentLengthDownload,
    ContentType,
    EffectiveUrl,
    PrimaryIp,
    PrimaryPort,
    HttpCode,
    HttpConnectCode,
    HttpVersion,
    NumConnects,
    SslVerifyResult,
}

impl InfoKey {
    /// Every key the decoder asks the transport for.
    pub const ALL: [InfoKey; 25] = [
        InfoKey::TotalTime,
        InfoKey::NameLookupTime,
        InfoKey::ConnectTime,
        InfoKey::AppConnectTime,
        InfoKey::PreTransferTime,
        InfoKey::StartTransferTime,
        InfoKey::RedirectTime,
        InfoKey::RedirectCount,
        InfoKey::RedirectUrl,
        InfoKey::SizeUpload,
        InfoKey::SizeDownload,
        InfoKey::SpeedUpload,
        InfoKey::SpeedDownload,
        InfoKey::HeaderSize,
        InfoKey::RequestSize,
        InfoKey::ContentLengthDownload,
        InfoKey::ContentType,
        InfoKey::EffectiveUrl,
        InfoKey::PrimaryIp,
        InfoKey::PrimaryPort,
        InfoKey::HttpCode,
        InfoKey::HttpConnectCode,
        InfoKey::HttpVersion,
        InfoKey::NumConnects,
        InfoKey::SslVerifyResult,
    ];

    /// Stable upper-case name, as used in the flat metadata mapping.
    pub fn name(self) -> &'static str {
        match self {
            InfoKey::TotalTime => "TOTAL_TIME",
            InfoKey::NameLookupTime => "NAMELOOKUP_TIME",
            InfoKey::ConnectTime => "CONNECT_TIME",
            InfoKey::AppConnectTime => "APPCONNECT_TIME",
            InfoKey::PreTransferTime => "PRETRANSFER_TIME",
            InfoKey::StartTransferTime => "STARTTRANSFER_TIME",
            InfoKey::RedirectTime => "REDIRECT_TIME",
            InfoKey::RedirectCount => "REDIRECT_COUNT",
            InfoKey::RedirectUrl => "REDIRECT_URL",
            InfoKey::SizeUpload => "SIZE_UPLOAD",
            InfoKey::SizeDownload => "SIZE_DOWNLOAD",
            InfoKey::SpeedUpload => "SPEED_UPLOAD",
            InfoKey::SpeedDownload => "SPEED_DOWNLOAD",
            InfoKey::HeaderSize => "HEADER_SIZE",
            InfoKey::RequestSize => "REQUEST_SIZE",
            InfoKey::ContentLengthDownload => "CONTENT_LENGTH_DOWNLOAD",
            InfoKey::ContentType => "CONTENT_TYPE",
            InfoKey::EffectiveUrl => "EFFECTIVE_URL",
            InfoKey::PrimaryIp => "PRIMARY_IP",
            InfoKey::PrimaryPort => "PRIMARY_PORT",
            InfoKey::HttpCode => "HTTP_CODE",
            InfoKey::HttpConnectCode => "HTTP_CONNECTCODE",
            InfoKey::HttpVersion => "HTTP_VERSION",
            InfoKey::NumConnects => "NUM_CONNECTS",
            InfoKey::SslVerifyResult => "SSL_VERIFYRESULT",
        }
    }

    /// Whether the metric is a duration in seconds.
    pub fn is_timing(self) -> bool {
        matches!(
            self,
            InfoKey::TotalTime
                | InfoKey::NameLookupTime
                | InfoKey::ConnectTime
                | InfoKey::AppConnectTime
                | InfoKey::PreTransferTime
                | InfoKey::StartTransferTime
                | InfoKey::RedirectTime
        )
    }
}

impl fmt::Display for InfoKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Value of a transfer metric.
#[derive(Debug, Clone, PartialEq)]
pub enum InfoValue {
    Float(f64),
    Int(i64),
    Text(String),
}

impl InfoValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            InfoValue::Float(f) => Some(*f),
            InfoValue::Int(i) => Some(*i as f64),
            InfoValue::Text(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            InfoValue::Int(i) => Some(*i),
            InfoValue::Float(f) => Some(*f as i64),
            InfoValue::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            InfoValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for InfoValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InfoValue::Float(v) => write!(f, "{}", v),
            InfoValue::Int(v) => write!(f, "{}", v),
            InfoValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<f64> for InfoValue {
    fn from(v: f64) -> Self {
        InfoValue::Float(v)
    }
}

impl From<i64> for InfoValue {
    fn from(v: i64) -> Self {
        InfoValue::Int(v)
    }
}

impl From<String> for InfoValue {
    fn from(v: String) -> Self {
        InfoValue::Text(v)
    }
}

impl From<&str> for InfoValue {
    fn from(v: &str) -> Self {
        InfoValue::Text(v.to_string())
    }
}
