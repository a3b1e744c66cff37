//! Mutation tracker: owns a document, intercepts mutations through typed
//! handles, and buffers one JSON Patch operation per observed change.
//!
//! There are no transparent proxies in Rust, so mutations go through a
//! builder-style handle API: [`ChangeTracker::root`] yields a path-tagged
//! [`NodeRef`], which narrows to [`ObjRef`]/[`ArrRef`]/[`StrRef`] for the
//! actual writes. Every handle re-derives its path from the root, so the
//! synthesised operation paths always reflect where the write landed.
//!
//! The buffered operations replay with [`crate::json_patch::apply_change`]
//! to reproduce the tracked document on a remote replica.

mod compaction;

pub use compaction::compact_ops;

use serde_json::{Map, Value};
use thiserror::Error;

use langdiff_json_pointer::{get, get_mut, Path};

use crate::json_patch::Operation;

// ── Strategy ──────────────────────────────────────────────────────────────

/// How scalar overwrites are classified into operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChangeStrategy {
    /// Every overwrite is a `replace`.
    Standard,
    /// Prefix-extending string overwrites become `append` operations;
    /// everything else falls back to `replace`.
    #[default]
    Efficient,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrackError {
    #[error("path not found")]
    PathNotFound,
    #[error("target is not an object")]
    NotObject,
    #[error("target is not an array")]
    NotArray,
    #[error("target is not a string")]
    NotString,
    #[error("index {index} out of bounds (len {len})")]
    IndexOutOfBounds { index: usize, len: usize },
}

// ── Tracker ───────────────────────────────────────────────────────────────

/// Wraps a document for change tracking under the [`Efficient`] strategy.
///
/// [`Efficient`]: ChangeStrategy::Efficient
pub fn track_change(doc: Value) -> ChangeTracker {
    track_change_with(doc, ChangeStrategy::default())
}

/// Wraps a document for change tracking under an explicit strategy.
pub fn track_change_with(doc: Value, strategy: ChangeStrategy) -> ChangeTracker {
    ChangeTracker {
        doc,
        strategy,
        ops: Vec::new(),
    }
}

/// The tracked document and its operation buffer. Single-owner,
/// single-consumer; handles borrow it mutably for the duration of a write.
pub struct ChangeTracker {
    doc: Value,
    strategy: ChangeStrategy,
    ops: Vec<Operation>,
}

impl ChangeTracker {
    /// The current document.
    pub fn value(&self) -> &Value {
        &self.doc
    }

    /// Release the document, discarding any unflushed operations.
    pub fn into_inner(self) -> Value {
        self.doc
    }

    /// Handle on the document root.
    pub fn root(&mut self) -> NodeRef<'_> {
        NodeRef {
            tracker: self,
            path: Vec::new(),
        }
    }

    /// Copy of the buffered operations, without clearing them.
    pub fn get_changes(&self) -> Vec<Operation> {
        self.ops.clone()
    }

    /// Drain the buffered operations in insertion order.
    pub fn flush(&mut self) -> Vec<Operation> {
        std::mem::take(&mut self.ops)
    }

    /// Drop the buffered operations.
    pub fn clear(&mut self) {
        self.ops.clear();
    }

    fn record(&mut self, op: Operation) {
        self.ops.push(op);
    }
}

// ── Write classification ──────────────────────────────────────────────────

enum Write {
    Add,
    Replace,
    Append(String),
    Suppress,
}

fn classify(strategy: ChangeStrategy, old: Option<&Value>, new: &Value) -> Write {
    let old = match old {
        None => return Write::Add,
        Some(old) => old,
    };
    if old == new {
        return Write::Suppress;
    }
    if strategy == ChangeStrategy::Efficient {
        if let (Value::String(old), Value::String(new)) = (old, new) {
            if new.len() > old.len() && new.starts_with(old.as_str()) {
                return Write::Append(new[old.len()..].to_string());
            }
        }
    }
    Write::Replace
}

fn child_path(path: &Path, token: impl Into<String>) -> Path {
    let mut out = path.clone();
    out.push(token.into());
    out
}

// ── Handles ───────────────────────────────────────────────────────────────

/// A path-tagged handle on one position in the tracked document.
pub struct NodeRef<'a> {
    tracker: &'a mut ChangeTracker,
    path: Path,
}

impl<'a> NodeRef<'a> {
    /// Narrow to an object member.
    pub fn at_key(mut self, key: impl Into<String>) -> Self {
        self.path.push(key.into());
        self
    }

    /// Narrow to an array element.
    pub fn at_index(mut self, index: usize) -> Self {
        self.path.push(index.to_string());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy of the value at this handle, if present.
    pub fn read(&self) -> Option<Value> {
        get(&self.tracker.doc, &self.path).cloned()
    }

    pub fn as_obj(self) -> Result<ObjRef<'a>, TrackError> {
        match get(&self.tracker.doc, &self.path) {
            Some(Value::Object(_)) => Ok(ObjRef { node: self }),
            Some(_) => Err(TrackError::NotObject),
            None => Err(TrackError::PathNotFound),
        }
    }

    pub fn as_arr(self) -> Result<ArrRef<'a>, TrackError> {
        match get(&self.tracker.doc, &self.path) {
            Some(Value::Array(_)) => Ok(ArrRef { node: self }),
            Some(_) => Err(TrackError::NotArray),
            None => Err(TrackError::PathNotFound),
        }
    }

    pub fn as_str(self) -> Result<StrRef<'a>, TrackError> {
        match get(&self.tracker.doc, &self.path) {
            Some(Value::String(_)) => Ok(StrRef { node: self }),
            Some(_) => Err(TrackError::NotString),
            None => Err(TrackError::PathNotFound),
        }
    }
}

/// Object handle: key writes and deletes.
pub struct ObjRef<'a> {
    node: NodeRef<'a>,
}

impl<'a> ObjRef<'a> {
    fn map_mut(&mut self) -> Result<&mut Map<String, Value>, TrackError> {
        match get_mut(&mut self.node.tracker.doc, &self.node.path) {
            Some(Value::Object(map)) => Ok(map),
            Some(_) => Err(TrackError::NotObject),
            None => Err(TrackError::PathNotFound),
        }
    }

    pub fn has(&self, key: &str) -> bool {
        get(&self.node.tracker.doc, &self.node.path)
            .and_then(Value::as_object)
            .is_some_and(|map| map.contains_key(key))
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        get(&self.node.tracker.doc, &self.node.path)
            .and_then(Value::as_object)
            .and_then(|map| map.get(key))
            .cloned()
    }

    /// Write a key. Absent keys synthesise `add`; existing keys synthesise
    /// `replace`, or `append` under the Efficient strategy when the new
    /// string extends the old one. Writing the current value back is a
    /// no-op.
    pub fn set(&mut self, key: &str, value: Value) -> Result<(), TrackError> {
        let strategy = self.node.tracker.strategy;
        let map = self.map_mut()?;
        let decision = classify(strategy, map.get(key), &value);
        if matches!(decision, Write::Suppress) {
            return Ok(());
        }
        map.insert(key.to_string(), value.clone());
        let path = child_path(&self.node.path, key);
        let op = match decision {
            Write::Add => Operation::Add { path, value },
            Write::Append(delta) => Operation::Append { path, value: delta },
            _ => Operation::Replace { path, value },
        };
        self.node.tracker.record(op);
        Ok(())
    }

    /// Delete a key. Returns whether the key existed; deleting an absent
    /// key produces no operation.
    pub fn del(&mut self, key: &str) -> Result<bool, TrackError> {
        let map = self.map_mut()?;
        if map.remove(key).is_none() {
            return Ok(false);
        }
        let path = child_path(&self.node.path, key);
        self.node.tracker.record(Operation::Remove { path });
        Ok(true)
    }

    /// Re-open this handle at a member key.
    pub fn at_key(self, key: impl Into<String>) -> NodeRef<'a> {
        self.node.at_key(key)
    }
}

/// Array handle: push/pop/splice/index writes.
pub struct ArrRef<'a> {
    node: NodeRef<'a>,
}

impl<'a> ArrRef<'a> {
    fn vec_mut(&mut self) -> Result<&mut Vec<Value>, TrackError> {
        match get_mut(&mut self.node.tracker.doc, &self.node.path) {
            Some(Value::Array(arr)) => Ok(arr),
            Some(_) => Err(TrackError::NotArray),
            None => Err(TrackError::PathNotFound),
        }
    }

    pub fn len(&self) -> usize {
        get(&self.node.tracker.doc, &self.node.path)
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        get(&self.node.tracker.doc, &self.node.path)
            .and_then(Value::as_array)
            .and_then(|arr| arr.get(index))
            .cloned()
    }

    /// Append one element; synthesises `add` at `path/-`.
    pub fn push(&mut self, value: Value) -> Result<(), TrackError> {
        let arr = self.vec_mut()?;
        arr.push(value.clone());
        let path = child_path(&self.node.path, "-");
        self.node.tracker.record(Operation::Add { path, value });
        Ok(())
    }

    /// Append several elements; one `add` per element.
    pub fn extend(
        &mut self,
        values: impl IntoIterator<Item = Value>,
    ) -> Result<(), TrackError> {
        for value in values {
            self.push(value)?;
        }
        Ok(())
    }

    /// Remove and return the last element; synthesises `remove` at its
    /// index. Popping an empty array is a no-op.
    pub fn pop(&mut self) -> Result<Option<Value>, TrackError> {
        let arr = self.vec_mut()?;
        let popped = match arr.pop() {
            Some(v) => v,
            None => return Ok(None),
        };
        let new_len = arr.len();
        let path = child_path(&self.node.path, new_len.to_string());
        self.node.tracker.record(Operation::Remove { path });
        Ok(Some(popped))
    }

    /// Overwrite an element. In-bounds writes classify like object-key
    /// overwrites; writing at exactly `len` appends.
    pub fn set(&mut self, index: usize, value: Value) -> Result<(), TrackError> {
        let strategy = self.node.tracker.strategy;
        let arr = self.vec_mut()?;
        let len = arr.len();
        if index > len {
            return Err(TrackError::IndexOutOfBounds { index, len });
        }
        if index == len {
            arr.push(value.clone());
            let path = child_path(&self.node.path, "-");
            self.node.tracker.record(Operation::Add { path, value });
            return Ok(());
        }
        let decision = classify(strategy, Some(&arr[index]), &value);
        if matches!(decision, Write::Suppress) {
            return Ok(());
        }
        arr[index] = value.clone();
        let path = child_path(&self.node.path, index.to_string());
        let op = match decision {
            Write::Append(delta) => Operation::Append { path, value: delta },
            _ => Operation::Replace { path, value },
        };
        self.node.tracker.record(op);
        Ok(())
    }

    /// Remove `delete_count` elements at `start`, then insert `items`
    /// there. Removals are recorded highest-index-first so the operation
    /// sequence replays correctly one at a time.
    pub fn splice(
        &mut self,
        start: usize,
        delete_count: usize,
        items: Vec<Value>,
    ) -> Result<Vec<Value>, TrackError> {
        let arr = self.vec_mut()?;
        let len = arr.len();
        if start > len {
            return Err(TrackError::IndexOutOfBounds { index: start, len });
        }
        let delete_count = delete_count.min(len - start);
        let removed: Vec<Value> = arr.drain(start..start + delete_count).collect();
        for (offset, item) in items.iter().enumerate() {
            arr.insert(start + offset, item.clone());
        }
        for offset in (0..delete_count).rev() {
            let path = child_path(&self.node.path, (start + offset).to_string());
            self.node.tracker.record(Operation::Remove { path });
        }
        for (offset, item) in items.into_iter().enumerate() {
            let path = child_path(&self.node.path, (start + offset).to_string());
            self.node.tracker.record(Operation::Add { path, value: item });
        }
        Ok(removed)
    }

    /// Re-open this handle at an element index.
    pub fn at_index(self, index: usize) -> NodeRef<'a> {
        self.node.at_index(index)
    }
}

/// String handle: whole-value writes and chunk appends.
pub struct StrRef<'a> {
    node: NodeRef<'a>,
}

impl<'a> StrRef<'a> {
    fn string_mut(&mut self) -> Result<&mut String, TrackError> {
        match get_mut(&mut self.node.tracker.doc, &self.node.path) {
            Some(Value::String(s)) => Ok(s),
            Some(_) => Err(TrackError::NotString),
            None => Err(TrackError::PathNotFound),
        }
    }

    pub fn get(&self) -> Option<String> {
        get(&self.node.tracker.doc, &self.node.path)
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    /// Overwrite the string, classifying per the strategy.
    pub fn set(&mut self, value: impl Into<String>) -> Result<(), TrackError> {
        let value = value.into();
        let strategy = self.node.tracker.strategy;
        let target = self.string_mut()?;
        let decision = classify(
            strategy,
            Some(&Value::String(target.clone())),
            &Value::String(value.clone()),
        );
        if matches!(decision, Write::Suppress) {
            return Ok(());
        }
        *target = value.clone();
        let path = self.node.path.clone();
        let op = match decision {
            Write::Append(delta) => Operation::Append { path, value: delta },
            _ => Operation::Replace { path, value: Value::String(value) },
        };
        self.node.tracker.record(op);
        Ok(())
    }

    /// Append a chunk. Empty chunks produce no operation.
    pub fn push_str(&mut self, chunk: &str) -> Result<(), TrackError> {
        if chunk.is_empty() {
            return Ok(());
        }
        let strategy = self.node.tracker.strategy;
        let target = self.string_mut()?;
        target.push_str(chunk);
        let full = target.clone();
        let path = self.node.path.clone();
        let op = match strategy {
            ChangeStrategy::Efficient => Operation::Append {
                path,
                value: chunk.to_string(),
            },
            ChangeStrategy::Standard => Operation::Replace {
                path,
                value: Value::String(full),
            },
        };
        self.node.tracker.record(op);
        Ok(())
    }
}
