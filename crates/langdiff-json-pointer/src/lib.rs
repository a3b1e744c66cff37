//! JSON Pointer (RFC 6901) utilities.
//!
//! Paths are stored as unescaped token lists (`Path`); escaping only
//! happens when a pointer is rendered to or parsed from its string form.
//! Navigation returns a typed [`ReferenceKey`] so callers do not have to
//! re-parse numeric tokens to learn whether a step landed in an object or
//! an array.

use thiserror::Error;

mod get;
mod types;
mod util;
pub mod validate;

pub use get::{find, find_mut, get, get_mut, MutReference, Reference, ReferenceKey};
pub use types::{Path, PathStep};
pub use util::{
    escape_component, format_json_pointer, is_child, is_root, is_valid_index, parent,
    parse_json_pointer, unescape_component,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JsonPointerError {
    #[error("json pointer must be absolute or empty")]
    NotAbsolute,
    #[error("path not found")]
    NotFound,
    #[error("invalid array index")]
    InvalidIndex,
    #[error("root has no parent")]
    NoParent,
}
