//! Object container with declaration-order finality.

use serde_json::{Map, Value};

use super::{Node, StartCallback, ValueCallback};
use crate::error::{type_name, StreamError};
use crate::schema::Schema;

struct ObjectField {
    key: String,
    node: Node,
    observed: bool,
    finalized: bool,
}

/// An object whose fields are declared in a fixed order. Observing a
/// later-declared field confirms that every earlier observed field has
/// received its final value; that finality rule is what allows
/// fine-grained streaming over key-ordered LLM output.
///
/// Fields are materialised eagerly so handlers can be attached before the
/// first character of the stream arrives.
pub struct ObjectNode {
    fields: Vec<ObjectField>,
    last_key_index: Option<usize>,
    started: bool,
    completed: bool,
    on_start: Vec<StartCallback>,
    on_update: Vec<ValueCallback>,
    on_complete: Vec<ValueCallback>,
}

impl ObjectNode {
    pub(crate) fn new(fields: &[(String, Schema)]) -> Self {
        Self {
            fields: fields
                .iter()
                .map(|(key, schema)| ObjectField {
                    key: key.clone(),
                    node: schema.create(),
                    observed: false,
                    finalized: false,
                })
                .collect(),
            last_key_index: None,
            started: false,
            completed: false,
            on_start: Vec::new(),
            on_update: Vec::new(),
            on_complete: Vec::new(),
        }
    }

    pub fn on_start(&mut self, cb: impl FnMut() + 'static) {
        self.on_start.push(Box::new(cb));
    }

    /// Called with every raw partial observation of the object.
    pub fn on_update(&mut self, cb: impl FnMut(&Value) + 'static) {
        self.on_update.push(Box::new(cb));
    }

    /// Called once with the assembled value of all observed fields.
    pub fn on_complete(&mut self, cb: impl FnMut(&Value) + 'static) {
        self.on_complete.push(Box::new(cb));
    }

    pub fn field(&self, key: &str) -> Option<&Node> {
        self.fields.iter().find(|f| f.key == key).map(|f| &f.node)
    }

    pub fn field_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.fields
            .iter_mut()
            .find(|f| f.key == key)
            .map(|f| &mut f.node)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.key.as_str())
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    fn fire_start(&mut self) {
        if !self.started {
            self.started = true;
            for cb in self.on_start.iter_mut() {
                cb();
            }
        }
    }

    pub(crate) fn update(&mut self, v: &Value) -> Result<(), StreamError> {
        if self.completed {
            return Ok(());
        }
        let map = match v {
            Value::Object(map) => map,
            Value::Null => {
                self.fire_start();
                return Ok(());
            }
            other => {
                return Err(StreamError::UnexpectedType {
                    expected: "object",
                    got: type_name(other),
                })
            }
        };
        self.fire_start();
        self.forward(map)?;
        for cb in self.on_update.iter_mut() {
            cb(v);
        }
        Ok(())
    }

    fn forward(&mut self, map: &Map<String, Value>) -> Result<(), StreamError> {
        // Keys not declared in the schema are ignored.
        let mut max_idx = None;
        for (i, field) in self.fields.iter().enumerate() {
            if map.contains_key(&field.key) {
                max_idx = Some(i);
            }
        }
        let max_idx = match max_idx {
            Some(i) => i,
            None => return Ok(()),
        };
        if let Some(last) = self.last_key_index {
            if max_idx < last {
                return Err(StreamError::OutOfOrderKey {
                    key: self.fields[max_idx].key.clone(),
                });
            }
        }
        // Observing the field at max_idx makes every earlier observed
        // field final.
        for i in 0..max_idx {
            let field = &mut self.fields[i];
            if field.finalized {
                continue;
            }
            if let Some(value) = map.get(&field.key) {
                field.observed = true;
                field.node.update(value)?;
                field.node.complete()?;
                field.finalized = true;
            }
        }
        let field = &mut self.fields[max_idx];
        if !field.finalized {
            if let Some(value) = map.get(&field.key) {
                field.observed = true;
                field.node.update(value)?;
            }
        }
        self.last_key_index = Some(max_idx);
        Ok(())
    }

    pub(crate) fn complete(&mut self) -> Result<(), StreamError> {
        if self.completed {
            return Ok(());
        }
        if let Some(last) = self.last_key_index {
            let field = &mut self.fields[last];
            if !field.finalized {
                field.node.complete()?;
                field.finalized = true;
            }
        }
        self.completed = true;
        let value = self.value();
        for cb in self.on_complete.iter_mut() {
            cb(&value);
        }
        Ok(())
    }

    /// Assembled value of the observed fields, in declaration order.
    /// Fields never observed are absent.
    pub(crate) fn value(&self) -> Value {
        let mut out = Map::new();
        for field in &self.fields {
            if field.observed {
                out.insert(field.key.clone(), field.node.value());
            }
        }
        Value::Object(out)
    }
}
