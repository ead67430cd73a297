pub mod decoder;
pub mod info;
pub mod orderedheaders;
pub mod response;

// Re-exports for convenience
pub use decoder::{DecodeDegraded, HeaderBlock, ResponseDecoder};
pub use info::{InfoKey, InfoValue};
pub use orderedheaders::HeaderMap;
pub use response::Response;
