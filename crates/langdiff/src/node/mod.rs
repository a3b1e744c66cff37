//! Runtime streaming nodes: the stateful counterpart of a schema
//! descriptor.
//!
//! A node receives successive partial observations of its slice of the
//! document through `update`, fires lifecycle callbacks (`start`,
//! `append`, `update`, `complete`) synchronously on the caller's stack,
//! and is finished exactly once through `complete` (either by its parent,
//! under the declaration-order finality rule, or by the parser driver for
//! the root).
//!
//! Lifecycle guarantees: `start` fires at most once, before any other
//! callback on the node; `complete` fires at most once; nothing fires
//! after `complete`. Callbacks registered after an event has fired do not
//! back-fire.

mod array;
mod atom;
mod object;
mod string;

pub use array::ArrayNode;
pub use atom::AtomNode;
pub use object::ObjectNode;
pub use string::StringNode;

use serde_json::Value;

use crate::error::StreamError;
use crate::schema::{Schema, SchemaKind};

pub(crate) type StartCallback = Box<dyn FnMut()>;
pub(crate) type ChunkCallback = Box<dyn FnMut(&str)>;
pub(crate) type ValueCallback = Box<dyn FnMut(&Value)>;
pub(crate) type StringCompleteCallback = Box<dyn FnMut(Option<&str>)>;
pub(crate) type ChildCallback = Box<dyn FnMut(&mut Node, usize)>;

/// A streaming node. Sealed sum over the four descriptor variants; every
/// operation dispatches on the variant.
pub enum Node {
    String(StringNode),
    Atom(AtomNode),
    Array(ArrayNode),
    Object(ObjectNode),
}

impl Node {
    pub(crate) fn from_schema(schema: &Schema) -> Node {
        match &schema.kind {
            SchemaKind::String => Node::String(StringNode::new()),
            SchemaKind::Atom { validator, .. } => {
                Node::Atom(AtomNode::new(validator.clone()))
            }
            SchemaKind::Array { element } => Node::Array(ArrayNode::new(element)),
            SchemaKind::Object { fields } => Node::Object(ObjectNode::new(fields)),
        }
    }

    /// Feed the next partial observation of this node's value.
    pub fn update(&mut self, v: &Value) -> Result<(), StreamError> {
        match self {
            Node::String(n) => n.update(v),
            Node::Atom(n) => n.update(v),
            Node::Array(n) => n.update(v),
            Node::Object(n) => n.update(v),
        }
    }

    /// Mark the value final, firing `complete` callbacks.
    pub fn complete(&mut self) -> Result<(), StreamError> {
        match self {
            Node::String(n) => n.complete(),
            Node::Atom(n) => n.complete(),
            Node::Array(n) => n.complete(),
            Node::Object(n) => n.complete(),
        }
    }

    /// The currently accumulated value.
    pub fn value(&self) -> Value {
        match self {
            Node::String(n) => n.value(),
            Node::Atom(n) => n.value(),
            Node::Array(n) => n.value(),
            Node::Object(n) => n.value(),
        }
    }

    pub fn is_started(&self) -> bool {
        match self {
            Node::String(n) => n.is_started(),
            Node::Atom(n) => n.is_started(),
            Node::Array(n) => n.is_started(),
            Node::Object(n) => n.is_started(),
        }
    }

    pub fn is_completed(&self) -> bool {
        match self {
            Node::String(n) => n.is_completed(),
            Node::Atom(n) => n.is_completed(),
            Node::Array(n) => n.is_completed(),
            Node::Object(n) => n.is_completed(),
        }
    }

    /// Register a callback for the `start` event, whatever the variant.
    pub fn on_start(&mut self, cb: impl FnMut() + 'static) {
        match self {
            Node::String(n) => n.on_start(cb),
            Node::Atom(n) => n.on_start(cb),
            Node::Array(n) => n.on_start(cb),
            Node::Object(n) => n.on_start(cb),
        }
    }

    pub fn as_string_mut(&mut self) -> Option<&mut StringNode> {
        match self {
            Node::String(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_atom_mut(&mut self) -> Option<&mut AtomNode> {
        match self {
            Node::Atom(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut ArrayNode> {
        match self {
            Node::Array(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut ObjectNode> {
        match self {
            Node::Object(n) => Some(n),
            _ => None,
        }
    }
}
