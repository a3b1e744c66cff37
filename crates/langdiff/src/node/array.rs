//! Array container with per-element lifecycle.

use serde_json::Value;

use super::{ChildCallback, Node, StartCallback, ValueCallback};
use crate::error::{type_name, StreamError};
use crate::schema::{Schema, SchemaKind};

/// An array whose children are created on demand as the stream reveals
/// them. A child becomes final as soon as a later sibling appears; the
/// last child becomes final at `complete()`.
///
/// For streaming elements (strings, objects, nested arrays) `on_append`
/// fires when the child first appears, before any value flows, so
/// handlers can register child callbacks. For atom elements the child is
/// only announced once its value is final and validated.
pub struct ArrayNode {
    element: Schema,
    atom_elements: bool,
    items: Vec<Node>,
    started: bool,
    completed: bool,
    on_start: Vec<StartCallback>,
    on_append: Vec<ChildCallback>,
    on_complete: Vec<ValueCallback>,
}

impl ArrayNode {
    pub(crate) fn new(element: &Schema) -> Self {
        Self {
            atom_elements: matches!(element.kind, SchemaKind::Atom { .. }),
            element: element.clone(),
            items: Vec::new(),
            started: false,
            completed: false,
            on_start: Vec::new(),
            on_append: Vec::new(),
            on_complete: Vec::new(),
        }
    }

    pub fn on_start(&mut self, cb: impl FnMut() + 'static) {
        self.on_start.push(Box::new(cb));
    }

    /// Called with each child and its index, in strictly increasing index
    /// order.
    pub fn on_append(&mut self, cb: impl FnMut(&mut Node, usize) + 'static) {
        self.on_append.push(Box::new(cb));
    }

    /// Called once with the final list of child values.
    pub fn on_complete(&mut self, cb: impl FnMut(&Value) + 'static) {
        self.on_complete.push(Box::new(cb));
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item_mut(&mut self, index: usize) -> Option<&mut Node> {
        self.items.get_mut(index)
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

    fn fire_append(&mut self, index: usize) {
        let Self {
            items, on_append, ..
        } = self;
        for cb in on_append.iter_mut() {
            cb(&mut items[index], index);
        }
    }

    /// Forward the final value to a child and finish it. Atom children are
    /// announced here, once the value is validated.
    fn finalize_item(&mut self, index: usize, final_value: &Value) -> Result<(), StreamError> {
        self.items[index].update(final_value)?;
        self.items[index].complete()?;
        if self.atom_elements {
            self.fire_append(index);
        }
        Ok(())
    }

    pub(crate) fn update(&mut self, v: &Value) -> Result<(), StreamError> {
        if self.completed {
            return Ok(());
        }
        let xs = match v {
            Value::Null => {
                self.fire_start();
                return Ok(());
            }
            Value::Array(xs) => xs,
            other => {
                return Err(StreamError::UnexpectedType {
                    expected: "array",
                    got: type_name(other),
                })
            }
        };
        self.fire_start();
        if xs.is_empty() {
            return Ok(());
        }
        let prev = self.items.len();
        if xs.len() < prev {
            return Err(StreamError::Continuity {
                current: format!("array of {prev}"),
                incoming: format!("array of {}", xs.len()),
            });
        }
        if xs.len() == prev {
            // Only the trailing element can still be streaming.
            self.items[prev - 1].update(&xs[prev - 1])?;
            return Ok(());
        }
        // Growth: the previous trailing element is now known final.
        if prev > 0 {
            self.finalize_item(prev - 1, &xs[prev - 1])?;
        }
        for i in prev..xs.len() {
            self.items.push(self.element.create());
            let is_last = i == xs.len() - 1;
            if self.atom_elements {
                if is_last {
                    self.items[i].update(&xs[i])?;
                } else {
                    self.finalize_item(i, &xs[i])?;
                }
            } else {
                self.fire_append(i);
                self.items[i].update(&xs[i])?;
                if !is_last {
                    self.items[i].complete()?;
                }
            }
        }
        Ok(())
    }

    pub(crate) fn complete(&mut self) -> Result<(), StreamError> {
        if self.completed {
            return Ok(());
        }
        if let Some(last) = self.items.len().checked_sub(1) {
            if !self.items[last].is_completed() {
                self.items[last].complete()?;
                if self.atom_elements {
                    self.fire_append(last);
                }
            }
        }
        self.completed = true;
        let value = self.value();
        for cb in self.on_complete.iter_mut() {
            cb(&value);
        }
        Ok(())
    }

    /// The accumulated child values. A null observation and an empty list
    /// both yield `[]`.
    pub(crate) fn value(&self) -> Value {
        Value::Array(self.items.iter().map(Node::value).collect())
    }
}
