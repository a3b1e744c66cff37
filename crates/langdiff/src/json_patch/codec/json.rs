//! Verbose JSON codec: one `{op, path, value?, from?}` object per
//! operation, wire-compatible with RFC 6902 plus the `append` extension.

use serde_json::{json, Value};

use langdiff_json_pointer::{format_json_pointer, parse_json_pointer, Path};

use crate::json_patch::types::{ApplyError, Operation};

fn encode_path(path: &[String]) -> Value {
    Value::String(format_json_pointer(path))
}

fn decode_path(v: &Value) -> Result<Path, ApplyError> {
    let s = v
        .as_str()
        .ok_or_else(|| ApplyError::InvalidOp("path must be a string".to_string()))?;
    parse_json_pointer(s).map_err(|e| ApplyError::InvalidOp(e.to_string()))
}

/// Serialize one operation.
pub fn to_json(op: &Operation) -> Value {
    match op {
        Operation::Add { path, value } => json!({
            "op": "add",
            "path": encode_path(path),
            "value": value,
        }),
        Operation::Remove { path } => json!({
            "op": "remove",
            "path": encode_path(path),
        }),
        Operation::Replace { path, value } => json!({
            "op": "replace",
            "path": encode_path(path),
            "value": value,
        }),
        Operation::Copy { path, from } => json!({
            "op": "copy",
            "path": encode_path(path),
            "from": encode_path(from),
        }),
        Operation::Move { path, from } => json!({
            "op": "move",
            "path": encode_path(path),
            "from": encode_path(from),
        }),
        Operation::Test { path, value } => json!({
            "op": "test",
            "path": encode_path(path),
            "value": value,
        }),
        Operation::Append { path, value } => json!({
            "op": "append",
            "path": encode_path(path),
            "value": value,
        }),
    }
}

/// Deserialize one operation.
pub fn from_json(v: &Value) -> Result<Operation, ApplyError> {
    let obj = v
        .as_object()
        .ok_or_else(|| ApplyError::InvalidOp("operation must be an object".to_string()))?;
    let op = obj
        .get("op")
        .and_then(Value::as_str)
        .ok_or_else(|| ApplyError::InvalidOp("missing 'op'".to_string()))?;
    let path = decode_path(
        obj.get("path")
            .ok_or_else(|| ApplyError::InvalidOp("missing 'path'".to_string()))?,
    )?;
    let value = |name: &str| -> Result<Value, ApplyError> {
        obj.get("value")
            .cloned()
            .ok_or_else(|| ApplyError::InvalidOp(format!("{name} requires 'value'")))
    };
    let from = |name: &str| -> Result<Path, ApplyError> {
        decode_path(
            obj.get("from")
                .ok_or_else(|| ApplyError::InvalidOp(format!("{name} requires 'from'")))?,
        )
    };
    match op {
        "add" => Ok(Operation::Add { path, value: value("add")? }),
        "remove" => Ok(Operation::Remove { path }),
        "replace" => Ok(Operation::Replace { path, value: value("replace")? }),
        "copy" => Ok(Operation::Copy { path, from: from("copy")? }),
        "move" => Ok(Operation::Move { path, from: from("move")? }),
        "test" => Ok(Operation::Test { path, value: value("test")? }),
        "append" => {
            let value = value("append")?;
            let value = value
                .as_str()
                .ok_or_else(|| ApplyError::InvalidOp("append value must be a string".to_string()))?
                .to_string();
            Ok(Operation::Append { path, value })
        }
        other => Err(ApplyError::InvalidOp(format!("unknown op: {other}"))),
    }
}

/// Serialize an operation list to a JSON array.
pub fn to_json_patch(ops: &[Operation]) -> Value {
    Value::Array(ops.iter().map(to_json).collect())
}

/// Deserialize a JSON array into an operation list.
pub fn from_json_patch(v: &Value) -> Result<Vec<Operation>, ApplyError> {
    let arr = v
        .as_array()
        .ok_or_else(|| ApplyError::InvalidOp("patch must be an array".to_string()))?;
    arr.iter().map(from_json).collect()
}
