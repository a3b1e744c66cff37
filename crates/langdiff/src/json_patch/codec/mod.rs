//! Wire codecs for operation lists.
//!
//! Three formats: verbose JSON objects (`json`, the RFC 6902 shape),
//! compact arrays (`compact`), and CBOR bytes over the compact shape
//! (`binary`).

pub mod binary;
pub mod compact;
pub mod json;
