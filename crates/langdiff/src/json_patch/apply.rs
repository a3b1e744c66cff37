//! Application of operation sequences to plain documents.

use serde_json::Value;

use langdiff_json_pointer::{find_mut, get, get_mut, is_child, JsonPointerError, ReferenceKey};

use super::types::{ApplyError, Operation};

fn pointer_err(err: JsonPointerError) -> ApplyError {
    match err {
        JsonPointerError::NotFound => ApplyError::NotFound,
        JsonPointerError::InvalidIndex => ApplyError::InvalidIndex,
        JsonPointerError::NoParent => ApplyError::InvalidTarget,
        JsonPointerError::NotAbsolute => ApplyError::InvalidOp("relative pointer".to_string()),
    }
}

fn apply_add(doc: &mut Value, path: &[String], value: Value) -> Result<(), ApplyError> {
    if path.is_empty() {
        *doc = value;
        return Ok(());
    }
    let slot = find_mut(doc, path).map_err(pointer_err)?;
    match (slot.parent, slot.key) {
        (Value::Object(map), ReferenceKey::Key(key)) => {
            map.insert(key, value);
            Ok(())
        }
        (Value::Array(arr), ReferenceKey::Index(index)) => {
            if index > arr.len() {
                return Err(ApplyError::InvalidIndex);
            }
            arr.insert(index, value);
            Ok(())
        }
        _ => Err(ApplyError::InvalidTarget),
    }
}

fn take_at(doc: &mut Value, path: &[String]) -> Result<Value, ApplyError> {
    if path.is_empty() {
        return Err(ApplyError::InvalidTarget);
    }
    let slot = find_mut(doc, path).map_err(pointer_err)?;
    match (slot.parent, slot.key) {
        (Value::Object(map), ReferenceKey::Key(key)) => {
            map.remove(&key).ok_or(ApplyError::NotFound)
        }
        (Value::Array(arr), ReferenceKey::Index(index)) => {
            if index >= arr.len() {
                return Err(ApplyError::NotFound);
            }
            Ok(arr.remove(index))
        }
        _ => Err(ApplyError::InvalidTarget),
    }
}

fn apply_replace(doc: &mut Value, path: &[String], value: Value) -> Result<(), ApplyError> {
    if path.is_empty() {
        *doc = value;
        return Ok(());
    }
    let slot = find_mut(doc, path).map_err(pointer_err)?;
    match (slot.parent, slot.key) {
        (Value::Object(map), ReferenceKey::Key(key)) => {
            if !map.contains_key(&key) {
                return Err(ApplyError::NotFound);
            }
            map.insert(key, value);
            Ok(())
        }
        (Value::Array(arr), ReferenceKey::Index(index)) => {
            if index >= arr.len() {
                return Err(ApplyError::NotFound);
            }
            arr[index] = value;
            Ok(())
        }
        _ => Err(ApplyError::InvalidTarget),
    }
}

fn apply_append(doc: &mut Value, path: &[String], suffix: &str) -> Result<(), ApplyError> {
    let target = if path.is_empty() {
        doc
    } else {
        get_mut(doc, path).ok_or(ApplyError::NotFound)?
    };
    match target {
        Value::String(s) => {
            s.push_str(suffix);
            Ok(())
        }
        _ => Err(ApplyError::NotAString),
    }
}

/// Apply a single operation to the document, mutating it in place.
pub fn apply_op(doc: &mut Value, op: &Operation) -> Result<(), ApplyError> {
    match op {
        Operation::Add { path, value } => apply_add(doc, path, value.clone()),
        Operation::Remove { path } => take_at(doc, path).map(|_| ()),
        Operation::Replace { path, value } => apply_replace(doc, path, value.clone()),
        Operation::Copy { path, from } => {
            let source = get(doc, from).cloned().ok_or(ApplyError::NotFound)?;
            apply_add(doc, path, source)
        }
        Operation::Move { path, from } => {
            if is_child(from, path) {
                return Err(ApplyError::InvalidTarget);
            }
            let value = take_at(doc, from)?;
            apply_add(doc, path, value)
        }
        Operation::Test { path, value } => {
            let actual = get(doc, path).ok_or(ApplyError::NotFound)?;
            if actual == value {
                Ok(())
            } else {
                Err(ApplyError::TestFailed)
            }
        }
        Operation::Append { path, value } => apply_append(doc, path, value),
    }
}

/// Replay a sequence of operations into `doc`, in order. The first failing
/// operation aborts the replay, leaving earlier operations applied.
pub fn apply_change(doc: &mut Value, ops: &[Operation]) -> Result<(), ApplyError> {
    for op in ops {
        apply_op(doc, op)?;
    }
    Ok(())
}
