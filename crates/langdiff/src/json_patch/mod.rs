//! JSON Patch operations (RFC 6902 subset plus the `append` extension).
//!
//! `append` means "concatenate to the string at `path`"; it is what makes
//! the Efficient tracker strategy cheap to ship for prefix-extending
//! string writes. Everything else is wire-compatible with RFC 6902.

pub mod apply;
pub mod codec;
pub mod types;

pub use apply::{apply_change, apply_op};
pub use codec::json::{from_json, from_json_patch, to_json, to_json_patch};
pub use types::{ApplyError, Operation, Path};
