//! Cookie storage and import.
//!
//! | Type | Responsibility |
//! |------|----------------|
//! | [`CookieStore`] | Session jar keyed by `(domain, path, name)` |
//! | [`Cookie`] | Single cookie representation |
//! | [`netscape`] | curl/wget cookie-file lines |
//!
//! # Merging a response into the jar
//!
//! ```rust
//! use mimicnet::cookies::CookieStore;
//!
//! let mut jar = CookieStore::new();
//! let raw = [("Set-Cookie", "a=1; Path=/"), ("Set-Cookie", "b=2")];
//! jar.merge_from_response(raw.iter().copied());
//! assert_eq!(jar.serialize_for_request(None), "a=1; b=2");
//! ```

pub mod canonical_cookie;
pub mod netscape;
pub mod store;

pub use canonical_cookie::Cookie;
pub use store::CookieStore;
