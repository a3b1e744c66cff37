//! Error kinds raised by the streaming side of the crate.

use thiserror::Error;

/// Atom validation failure, reported at `complete()`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("validation failed: {reason}")]
pub struct ValidationError {
    pub reason: String,
}

impl ValidationError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Errors surfaced by streaming nodes, the scanner, and the parser driver.
///
/// Every variant propagates synchronously out of the `push`/`update`/
/// `complete` call that caused it; nothing is retried or swallowed.
#[derive(Debug, Error)]
pub enum StreamError {
    /// A streamed value regressed instead of extending its previous
    /// observation.
    #[error("stream regressed: {current} cannot extend to {incoming}")]
    Continuity { current: String, incoming: String },

    /// An object key arrived earlier in declaration order than a key that
    /// was already observed.
    #[error("object key {key:?} arrived out of declaration order")]
    OutOfOrderKey { key: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Characters arrived after the root value completed.
    #[error("input continues after the document completed (char {pos})")]
    TrailingInput { pos: u64 },

    /// The input is not JSON. There is no repair mode; the parser is
    /// unusable after this.
    #[error("malformed JSON at char {pos}: unexpected {ch:?}")]
    Syntax { pos: u64, ch: char },

    /// An observation had a JSON type the schema does not declare at that
    /// position.
    #[error("unexpected {got} where {expected} was declared")]
    UnexpectedType {
        expected: &'static str,
        got: &'static str,
    },
}

/// Renders the JSON type name of a value, for error messages.
pub(crate) fn type_name(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
