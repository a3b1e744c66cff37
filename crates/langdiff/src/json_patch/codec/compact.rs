//! Compact array codec: each operation is `[opcode, path, ...args]`.
//!
//! Encoding always uses numeric opcodes; decoding accepts the string
//! names as well.

use serde_json::{json, Value};

use langdiff_json_pointer::{format_json_pointer, parse_json_pointer, Path};

use crate::json_patch::types::{ApplyError, Operation};

pub const OPCODE_ADD: u8 = 0;
pub const OPCODE_REMOVE: u8 = 1;
pub const OPCODE_REPLACE: u8 = 2;
pub const OPCODE_COPY: u8 = 3;
pub const OPCODE_MOVE: u8 = 4;
pub const OPCODE_TEST: u8 = 5;
pub const OPCODE_APPEND: u8 = 6;

fn encode_op(op: &Operation) -> Value {
    let path = format_json_pointer(op.path());
    match op {
        Operation::Add { value, .. } => json!([OPCODE_ADD, path, value]),
        Operation::Remove { .. } => json!([OPCODE_REMOVE, path]),
        Operation::Replace { value, .. } => json!([OPCODE_REPLACE, path, value]),
        Operation::Copy { from, .. } => {
            json!([OPCODE_COPY, path, format_json_pointer(from)])
        }
        Operation::Move { from, .. } => {
            json!([OPCODE_MOVE, path, format_json_pointer(from)])
        }
        Operation::Test { value, .. } => json!([OPCODE_TEST, path, value]),
        Operation::Append { value, .. } => json!([OPCODE_APPEND, path, value]),
    }
}

/// Encode an operation list as a JSON array of compact arrays.
pub fn encode(ops: &[Operation]) -> Value {
    Value::Array(ops.iter().map(encode_op).collect())
}

fn decode_opcode(v: &Value) -> Result<u8, ApplyError> {
    if let Some(n) = v.as_u64() {
        return u8::try_from(n).map_err(|_| ApplyError::InvalidOp("opcode out of range".to_string()));
    }
    match v.as_str() {
        Some("add") => Ok(OPCODE_ADD),
        Some("remove") => Ok(OPCODE_REMOVE),
        Some("replace") => Ok(OPCODE_REPLACE),
        Some("copy") => Ok(OPCODE_COPY),
        Some("move") => Ok(OPCODE_MOVE),
        Some("test") => Ok(OPCODE_TEST),
        Some("append") => Ok(OPCODE_APPEND),
        _ => Err(ApplyError::InvalidOp("opcode must be a number or name".to_string())),
    }
}

fn decode_path(v: &Value) -> Result<Path, ApplyError> {
    let s = v
        .as_str()
        .ok_or_else(|| ApplyError::InvalidOp("path must be a string".to_string()))?;
    parse_json_pointer(s).map_err(|e| ApplyError::InvalidOp(e.to_string()))
}

fn decode_op(v: &Value) -> Result<Operation, ApplyError> {
    let parts = v
        .as_array()
        .ok_or_else(|| ApplyError::InvalidOp("compact op must be an array".to_string()))?;
    if parts.len() < 2 {
        return Err(ApplyError::InvalidOp("compact op too short".to_string()));
    }
    let opcode = decode_opcode(&parts[0])?;
    let path = decode_path(&parts[1])?;
    let arg = |idx: usize| -> Result<&Value, ApplyError> {
        parts
            .get(idx)
            .ok_or_else(|| ApplyError::InvalidOp("compact op missing argument".to_string()))
    };
    match opcode {
        OPCODE_ADD => Ok(Operation::Add { path, value: arg(2)?.clone() }),
        OPCODE_REMOVE => Ok(Operation::Remove { path }),
        OPCODE_REPLACE => Ok(Operation::Replace { path, value: arg(2)?.clone() }),
        OPCODE_COPY => Ok(Operation::Copy { path, from: decode_path(arg(2)?)? }),
        OPCODE_MOVE => Ok(Operation::Move { path, from: decode_path(arg(2)?)? }),
        OPCODE_TEST => Ok(Operation::Test { path, value: arg(2)?.clone() }),
        OPCODE_APPEND => {
            let value = arg(2)?
                .as_str()
                .ok_or_else(|| ApplyError::InvalidOp("append value must be a string".to_string()))?
                .to_string();
            Ok(Operation::Append { path, value })
        }
        other => Err(ApplyError::InvalidOp(format!("unknown opcode: {other}"))),
    }
}

/// Decode a JSON array of compact arrays.
pub fn decode(v: &Value) -> Result<Vec<Operation>, ApplyError> {
    let arr = v
        .as_array()
        .ok_or_else(|| ApplyError::InvalidOp("compact patch must be an array".to_string()))?;
    arr.iter().map(decode_op).collect()
}
