//! Character-streamed string leaf.

use serde_json::Value;

use super::{ChunkCallback, StartCallback, StringCompleteCallback};
use crate::error::{type_name, StreamError};

/// A string leaf that accumulates by prefix extension. Every observed
/// value must extend the previous one; the delta is delivered through
/// `on_append` in document order.
pub struct StringNode {
    started: bool,
    completed: bool,
    value: Option<String>,
    on_start: Vec<StartCallback>,
    on_append: Vec<ChunkCallback>,
    on_complete: Vec<StringCompleteCallback>,
}

impl StringNode {
    pub(crate) fn new() -> Self {
        Self {
            started: false,
            completed: false,
            value: None,
            on_start: Vec::new(),
            on_append: Vec::new(),
            on_complete: Vec::new(),
        }
    }

    pub fn on_start(&mut self, cb: impl FnMut() + 'static) {
        self.on_start.push(Box::new(cb));
    }

    /// Called with each newly arrived chunk of the string.
    pub fn on_append(&mut self, cb: impl FnMut(&str) + 'static) {
        self.on_append.push(Box::new(cb));
    }

    /// Called once with the final value; `None` when the stream carried
    /// an explicit null.
    pub fn on_complete(&mut self, cb: impl FnMut(Option<&str>) + 'static) {
        self.on_complete.push(Box::new(cb));
    }

    /// The text accumulated so far.
    pub fn text(&self) -> Option<&str> {
        self.value.as_deref()
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
        match v {
            Value::Null => {
                self.fire_start();
                Ok(())
            }
            Value::String(s) => {
                self.fire_start();
                let delta = match self.value.as_deref() {
                    None => Some(s.clone()),
                    Some(current) if s == current => None,
                    Some(current) if s.starts_with(current) => {
                        Some(s[current.len()..].to_string())
                    }
                    Some(current) => {
                        return Err(StreamError::Continuity {
                            current: format!("{current:?}"),
                            incoming: format!("{s:?}"),
                        })
                    }
                };
                if let Some(delta) = delta {
                    self.value = Some(s.clone());
                    for cb in self.on_append.iter_mut() {
                        cb(&delta);
                    }
                }
                Ok(())
            }
            other => Err(StreamError::UnexpectedType {
                expected: "string",
                got: type_name(other),
            }),
        }
    }

    pub(crate) fn complete(&mut self) -> Result<(), StreamError> {
        if self.completed {
            return Ok(());
        }
        self.completed = true;
        let value = self.value.clone();
        for cb in self.on_complete.iter_mut() {
            cb(value.as_deref());
        }
        Ok(())
    }

    pub(crate) fn value(&self) -> Value {
        match &self.value {
            Some(s) => Value::String(s.clone()),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn chunks_of(node: &mut StringNode) -> Rc<RefCell<Vec<String>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        node.on_append(move |chunk| sink.borrow_mut().push(chunk.to_string()));
        log
    }

    #[test]
    fn first_observation_is_the_first_chunk() {
        let mut node = StringNode::new();
        let log = chunks_of(&mut node);
        node.update(&json!("Hel")).unwrap();
        node.update(&json!("Hello")).unwrap();
        assert_eq!(*log.borrow(), ["Hel", "lo"]);
        assert_eq!(node.text(), Some("Hello"));
    }

    #[test]
    fn identical_observation_is_a_no_op() {
        let mut node = StringNode::new();
        let log = chunks_of(&mut node);
        node.update(&json!("abc")).unwrap();
        node.update(&json!("abc")).unwrap();
        assert_eq!(*log.borrow(), ["abc"]);
    }

    #[test]
    fn empty_string_fires_an_empty_append() {
        let mut node = StringNode::new();
        let log = chunks_of(&mut node);
        node.update(&json!("")).unwrap();
        assert_eq!(*log.borrow(), [""]);
    }

    #[test]
    fn regression_is_a_continuity_error() {
        let mut node = StringNode::new();
        node.update(&json!("hello")).unwrap();
        let err = node.update(&json!("help")).unwrap_err();
        assert!(matches!(err, StreamError::Continuity { .. }));
    }

    #[test]
    fn null_completes_as_none_without_append() {
        let mut node = StringNode::new();
        let log = chunks_of(&mut node);
        let finals = Rc::new(RefCell::new(Vec::new()));
        let sink = finals.clone();
        node.on_complete(move |v| sink.borrow_mut().push(v.map(str::to_string)));
        node.update(&json!(null)).unwrap();
        node.complete().unwrap();
        assert!(log.borrow().is_empty());
        assert_eq!(*finals.borrow(), [None]);
    }

    #[test]
    fn start_fires_once_before_append() {
        let mut node = StringNode::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        let s = order.clone();
        node.on_start(move || s.borrow_mut().push("start"));
        let s = order.clone();
        node.on_append(move |_| s.borrow_mut().push("append"));
        node.update(&json!("a")).unwrap();
        node.update(&json!("ab")).unwrap();
        assert_eq!(*order.borrow(), ["start", "append", "append"]);
    }

    #[test]
    fn complete_fires_once() {
        let mut node = StringNode::new();
        let count = Rc::new(RefCell::new(0));
        let c = count.clone();
        node.on_complete(move |_| *c.borrow_mut() += 1);
        node.update(&json!("x")).unwrap();
        node.complete().unwrap();
        node.complete().unwrap();
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn update_after_complete_is_ignored() {
        let mut node = StringNode::new();
        node.update(&json!("x")).unwrap();
        node.complete().unwrap();
        let log = chunks_of(&mut node);
        node.update(&json!("xy")).unwrap();
        assert!(log.borrow().is_empty());
        assert_eq!(node.text(), Some("x"));
    }

    #[test]
    fn non_string_observation_is_rejected() {
        let mut node = StringNode::new();
        let err = node.update(&json!(5)).unwrap_err();
        assert!(matches!(err, StreamError::UnexpectedType { .. }));
    }
}
