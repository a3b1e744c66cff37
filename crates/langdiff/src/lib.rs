//! langdiff — incremental, schema-bound parsing of LLM JSON streams and
//! JSON Patch change tracking.
//!
//! Two independent subsystems:
//!
//! - **Streaming parser.** Declare the expected shape with the [`schema`]
//!   factories, materialise a [`node::Node`] tree, register lifecycle
//!   callbacks, and drive character chunks through [`parser::Parser`].
//!   String leaves stream chunk by chunk; containers announce children in
//!   declaration order; observing a later object field finalises the
//!   earlier ones.
//! - **Mutation tracker.** Wrap a document with [`track::track_change`],
//!   mutate it through typed handles, and ship the buffered JSON Patch
//!   operations (RFC 6902 plus an `append` extension) to a replica, which
//!   replays them with [`json_patch::apply_change`].
//!
//! A typical application composes the two: parser callbacks mutate a
//! tracked document, so the network output is the diff stream.
//!
//! ```
//! use langdiff::{object, string, scoped, track_change};
//! use serde_json::json;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let schema = object([("message", string())]);
//! let mut root = schema.create();
//!
//! let tracker = Rc::new(RefCell::new(track_change(json!({"message": ""}))));
//! let sink = tracker.clone();
//! root.as_object_mut()
//!     .unwrap()
//!     .field_mut("message")
//!     .unwrap()
//!     .as_string_mut()
//!     .unwrap()
//!     .on_append(move |chunk| {
//!         let mut tracker = sink.borrow_mut();
//!         tracker
//!             .root()
//!             .at_key("message")
//!             .as_str()
//!             .unwrap()
//!             .push_str(chunk)
//!             .unwrap();
//!     });
//!
//! scoped(&mut root, |parser| {
//!     parser.push("{\"mess")?;
//!     parser.push("age\": \"Hi\"}")
//! })
//! .unwrap();
//!
//! let ops = tracker.borrow_mut().flush();
//! assert_eq!(ops.len(), 1);
//! assert_eq!(tracker.borrow().value(), &json!({"message": "Hi"}));
//! ```

pub mod error;
pub mod json_patch;
pub mod node;
pub mod parser;
pub mod schema;
pub mod track;

pub use error::{StreamError, ValidationError};
pub use json_patch::{apply_change, ApplyError, Operation};
pub use node::{ArrayNode, AtomNode, Node, ObjectNode, StringNode};
pub use parser::{scoped, Parser, ScanStatus, Scanner};
pub use schema::{
    array, atom, boolean, from_external_schema, number, object, string, Schema, SchemaError,
    Validate,
};
pub use track::{
    compact_ops, track_change, track_change_with, ChangeStrategy, ChangeTracker, TrackError,
};

/// Returns the crate version at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
