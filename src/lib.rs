//! # mimicnet
//!
//! A blocking HTTP client that impersonates a browser's network fingerprint.
//!
//! Issuing requests is the easy part. `mimicnet` exists to make the
//! observable signature of those requests match a chosen browser: TLS cipher
//! order in the ClientHello, HTTP/1.1 or HTTP/2 negotiation through ALPN, and
//! the set and order of request headers. A [`Session`] keeps a cookie jar and
//! a keep-alive connection across calls.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mimicnet::{RequestOptions, Session};
//! use mimicnet::emulation::profiles::Chrome;
//!
//! let mut session = Session::builder().profile(Chrome::V109).build()?;
//!
//! let resp = session.post(
//!     "https://httpbin.org/post",
//!     RequestOptions::new().json(&serde_json::json!({ "key": "value" })),
//! )?;
//! println!("{} via {}", resp.status_code(), resp.http_version());
//! println!("cookies now held: {}", session.cookies().count());
//! # Ok::<(), mimicnet::NetError>(())
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error taxonomy and IO error context
//! - [`cookies`] - Cookie jar and Netscape cookie files
//! - [`emulation`] - Browser fingerprint profiles
//! - [`http`] - Ordered headers, response decoding and transfer metrics
//! - [`socket`] - DNS, TCP, proxy tunnels and BoringSSL
//! - [`transport`] - The transport contract and its native implementation
//!
//! ## Logging
//!
//! The crate logs through `tracing` and never installs a subscriber. The
//! verbose trace of a `debug(true)` call is emitted under the
//! `mimicnet::trace` target.

pub mod base;
pub mod cookies;
pub mod emulation;
pub mod http;
pub mod options;
pub mod session;
pub mod socket;
pub mod transport;

pub use base::neterror::{NetError, TransportError, TransportErrorKind};
pub use cookies::{Cookie, CookieStore};
pub use emulation::{FingerprintProfile, ProfileFactory};
pub use http::{HeaderMap, InfoKey, InfoValue, Response};
pub use options::RequestOptions;
pub use session::{Session, SessionBuilder};
pub use transport::{HttpVersion, Method, NativeTransport, Transport};
