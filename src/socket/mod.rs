//! Socket and connection management.
//!
//! - [`connectjob`]: DNS → TCP → CONNECT → TLS connection flow
//! - [`proxy`]: `host:port[:user:pass]` HTTP proxies
//! - [`tls`]: ClientHello configuration with BoringSSL
//! - [`client`]: the connected stream

pub mod client;
pub mod connectjob;
pub mod proxy;
pub mod tls;
