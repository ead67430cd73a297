//! Browser profiles for emulation.
//!
//! Contains predefined profiles for the Chromium and Firefox families.

pub mod chrome;
pub mod firefox;

pub use chrome::{Chrome, CHROME_109, CHROME_120};
pub use firefox::{Firefox, FIREFOX_109, FIREFOX_98};
