//! Core types for the JSON Patch module.

use serde_json::Value;
use thiserror::Error;

pub use langdiff_json_pointer::Path;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApplyError {
    #[error("NOT_FOUND")]
    NotFound,
    #[error("NOT_A_STRING")]
    NotAString,
    #[error("INVALID_INDEX")]
    InvalidIndex,
    #[error("INVALID_TARGET")]
    InvalidTarget,
    #[error("TEST")]
    TestFailed,
    #[error("INVALID_OP: {0}")]
    InvalidOp(String),
}

/// A change operation against a JSON document.
///
/// Paths are unescaped pointer tokens; RFC 6901 escaping happens in the
/// codecs, at the string boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Add { path: Path, value: Value },
    Remove { path: Path },
    Replace { path: Path, value: Value },
    Copy { path: Path, from: Path },
    Move { path: Path, from: Path },
    Test { path: Path, value: Value },
    /// Concatenate `value` to the existing string at `path`.
    Append { path: Path, value: String },
}

impl Operation {
    pub fn op_name(&self) -> &'static str {
        match self {
            Operation::Add { .. } => "add",
            Operation::Remove { .. } => "remove",
            Operation::Replace { .. } => "replace",
            Operation::Copy { .. } => "copy",
            Operation::Move { .. } => "move",
            Operation::Test { .. } => "test",
            Operation::Append { .. } => "append",
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Operation::Add { path, .. } => path,
            Operation::Remove { path } => path,
            Operation::Replace { path, .. } => path,
            Operation::Copy { path, .. } => path,
            Operation::Move { path, .. } => path,
            Operation::Test { path, .. } => path,
            Operation::Append { path, .. } => path,
        }
    }
}
