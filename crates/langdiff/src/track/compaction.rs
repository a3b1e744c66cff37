//! Operation-buffer compaction.

use serde_json::Value;

use crate::json_patch::Operation;

/// Merge adjacent operations that describe one logical string write: a run
/// of `append`s to the same path collapses into one, and an `append`
/// immediately following an `add` or `replace` of a string at the same
/// path folds into that operation's value.
///
/// This is an optional pass; `flush` never compacts implicitly.
pub fn compact_ops(ops: Vec<Operation>) -> Vec<Operation> {
    let mut out: Vec<Operation> = Vec::with_capacity(ops.len());
    for op in ops {
        if let Operation::Append { path, value } = &op {
            match out.last_mut() {
                Some(Operation::Append { path: prev, value: acc }) if prev == path => {
                    acc.push_str(value);
                    continue;
                }
                Some(Operation::Add { path: prev, value: Value::String(acc) })
                    if prev == path =>
                {
                    acc.push_str(value);
                    continue;
                }
                Some(Operation::Replace { path: prev, value: Value::String(acc) })
                    if prev == path =>
                {
                    acc.push_str(value);
                    continue;
                }
                _ => {}
            }
        }
        out.push(op);
    }
    out
}
