//! Whole-value leaf, validated once at completion.

use std::sync::Arc;

use serde_json::Value;

use super::{StartCallback, ValueCallback};
use crate::error::StreamError;
use crate::schema::Validate;

/// A leaf that records raw partial observations and validates the final
/// value exactly once, at `complete()`. Mid-stream partials never fail
/// validation because validation never runs on them.
pub struct AtomNode {
    started: bool,
    completed: bool,
    raw: Option<Value>,
    validated: Option<Value>,
    validator: Option<Arc<dyn Validate + Send + Sync>>,
    on_start: Vec<StartCallback>,
    on_complete: Vec<ValueCallback>,
}

impl AtomNode {
    pub(crate) fn new(validator: Option<Arc<dyn Validate + Send + Sync>>) -> Self {
        Self {
            started: false,
            completed: false,
            raw: None,
            validated: None,
            validator,
            on_start: Vec::new(),
            on_complete: Vec::new(),
        }
    }

    pub fn on_start(&mut self, cb: impl FnMut() + 'static) {
        self.on_start.push(Box::new(cb));
    }

    /// Called once with the validated final value.
    pub fn on_complete(&mut self, cb: impl FnMut(&Value) + 'static) {
        self.on_complete.push(Box::new(cb));
    }

    /// The most recent raw observation.
    pub fn raw(&self) -> Option<&Value> {
        self.raw.as_ref()
    }

    /// The validated value, present after `complete()`.
    pub fn validated(&self) -> Option<&Value> {
        self.validated.as_ref()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub(crate) fn update(&mut self, v: &Value) -> Result<(), StreamError> {
        if self.completed {
            return Ok(());
        }
        if !self.started {
            self.started = true;
            for cb in self.on_start.iter_mut() {
                cb();
            }
        }
        self.raw = Some(v.clone());
        Ok(())
    }

    pub(crate) fn complete(&mut self) -> Result<(), StreamError> {
        if self.completed {
            return Ok(());
        }
        // A null (or absent) value completes as null without validation,
        // so nullable atoms do not need null-aware validators.
        let value = match &self.raw {
            None | Some(Value::Null) => Value::Null,
            Some(raw) => match &self.validator {
                Some(validator) => validator.validate(raw)?,
                None => raw.clone(),
            },
        };
        self.completed = true;
        self.validated = Some(value.clone());
        for cb in self.on_complete.iter_mut() {
            cb(&value);
        }
        Ok(())
    }

    pub(crate) fn value(&self) -> Value {
        if let Some(validated) = &self.validated {
            return validated.clone();
        }
        self.raw.clone().unwrap_or(Value::Null)
    }
}
