//! Navigation over `serde_json::Value` documents.

use serde_json::Value;

use crate::JsonPointerError;

/// Where a resolved path step landed inside its parent container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceKey {
    /// Object member key.
    Key(String),
    /// Array index; `"-"` resolves to the current array length.
    Index(usize),
}

/// Result of resolving a non-root path: the parent container, the typed
/// key of the last step, and the addressed value when it exists.
#[derive(Debug)]
pub struct Reference<'a> {
    pub parent: &'a Value,
    pub key: ReferenceKey,
    pub value: Option<&'a Value>,
}

/// Mutable counterpart of [`Reference`]. Only the parent is borrowed; the
/// caller re-indexes with `key` to mutate the slot.
#[derive(Debug)]
pub struct MutReference<'a> {
    pub parent: &'a mut Value,
    pub key: ReferenceKey,
}

/// Get the value at `path`, if it exists. `"-"` never resolves.
pub fn get<'a>(doc: &'a Value, path: &[String]) -> Option<&'a Value> {
    let mut current = doc;
    for step in path {
        current = match current {
            Value::Object(map) => map.get(step)?,
            Value::Array(arr) => {
                if step == "-" {
                    return None;
                }
                arr.get(step.parse::<usize>().ok()?)?
            }
            _ => return None,
        };
    }
    Some(current)
}

/// Mutable twin of [`get`].
pub fn get_mut<'a>(doc: &'a mut Value, path: &[String]) -> Option<&'a mut Value> {
    let mut current = doc;
    for step in path {
        current = match current {
            Value::Object(map) => map.get_mut(step)?,
            Value::Array(arr) => {
                if step == "-" {
                    return None;
                }
                arr.get_mut(step.parse::<usize>().ok()?)?
            }
            _ => return None,
        };
    }
    Some(current)
}

fn resolve_key(container: &Value, step: &str) -> Result<ReferenceKey, JsonPointerError> {
    match container {
        Value::Object(_) => Ok(ReferenceKey::Key(step.to_string())),
        Value::Array(arr) => {
            if step == "-" {
                return Ok(ReferenceKey::Index(arr.len()));
            }
            if !crate::is_valid_index(step) {
                return Err(JsonPointerError::InvalidIndex);
            }
            step.parse::<usize>()
                .map(ReferenceKey::Index)
                .map_err(|_| JsonPointerError::InvalidIndex)
        }
        _ => Err(JsonPointerError::NotFound),
    }
}

/// Resolve a non-root path to its parent container and typed last step.
///
/// A missing *final* step is not an error (`value` is `None`); a missing
/// or non-container step anywhere earlier is `NotFound`.
pub fn find<'a>(doc: &'a Value, path: &[String]) -> Result<Reference<'a>, JsonPointerError> {
    let (parent_path, last) = match path.split_last() {
        Some((last, parent)) => (parent, last),
        None => return Err(JsonPointerError::NoParent),
    };
    let parent = get(doc, parent_path).ok_or(JsonPointerError::NotFound)?;
    let key = resolve_key(parent, last)?;
    let value = match (&key, parent) {
        (ReferenceKey::Key(k), Value::Object(map)) => map.get(k.as_str()),
        (ReferenceKey::Index(i), Value::Array(arr)) => arr.get(*i),
        _ => None,
    };
    Ok(Reference { parent, key, value })
}

/// Mutable twin of [`find`].
pub fn find_mut<'a>(
    doc: &'a mut Value,
    path: &[String],
) -> Result<MutReference<'a>, JsonPointerError> {
    let (parent_path, last) = match path.split_last() {
        Some((last, parent)) => (parent, last),
        None => return Err(JsonPointerError::NoParent),
    };
    let parent = get_mut(doc, parent_path).ok_or(JsonPointerError::NotFound)?;
    let key = resolve_key(parent, last)?;
    Ok(MutReference { parent, key })
}
