//! Pointer validation helpers.

use thiserror::Error;

/// Maximum accepted pointer string length.
const MAX_POINTER_LENGTH: usize = 1024;

/// Maximum accepted path depth.
const MAX_PATH_DEPTH: usize = 256;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("pointer must be empty or start with '/'")]
    PointerInvalid,
    #[error("pointer exceeds {MAX_POINTER_LENGTH} characters")]
    PointerTooLong,
    #[error("path exceeds {MAX_PATH_DEPTH} steps")]
    PathTooDeep,
}

/// Validate a JSON Pointer string without parsing it.
pub fn validate_json_pointer(pointer: &str) -> Result<(), ValidationError> {
    if pointer.is_empty() {
        return Ok(());
    }
    if !pointer.starts_with('/') {
        return Err(ValidationError::PointerInvalid);
    }
    if pointer.len() > MAX_POINTER_LENGTH {
        return Err(ValidationError::PointerTooLong);
    }
    Ok(())
}

/// Validate a parsed path's depth.
pub fn validate_path(path: &[String]) -> Result<(), ValidationError> {
    if path.len() > MAX_PATH_DEPTH {
        return Err(ValidationError::PathTooDeep);
    }
    Ok(())
}
