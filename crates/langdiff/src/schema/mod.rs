//! Schema descriptors: the immutable declaration of a streaming shape.
//!
//! A descriptor tree is built once through the factory functions
//! ([`string`], [`number`], [`boolean`], [`atom`], [`array`], [`object`])
//! and then materialised into runtime streaming nodes with
//! [`Schema::create`]. Descriptors also render to and from external
//! validation schemas (JSON Schema), the format constrained-generation
//! SDKs consume; see [`external`].

mod external;

pub use external::from_external_schema;

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::error::ValidationError;
use crate::node::Node;

// ── Errors ────────────────────────────────────────────────────────────────

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Descriptions and defaults are mutually exclusive with an external
    /// schema: once one side is set, the other is rejected.
    #[error("description/default metadata conflicts with an external schema")]
    Conflict,

    /// Validators attach to atom descriptors only.
    #[error("validator can only be attached to an atom descriptor")]
    ValidatorTarget,

    #[error("unsupported external schema: {0}")]
    Unsupported(String),
}

// ── Validation interface ──────────────────────────────────────────────────

/// Whole-value validation for atoms, injected by the caller and run exactly
/// once, at `complete()`. Mid-stream partials are never validated.
pub trait Validate {
    /// Validates (and possibly normalises) the raw value.
    fn validate(&self, raw: &Value) -> Result<Value, ValidationError>;
}

/// Built-in validator checking JSON type membership.
pub(crate) struct TypeValidator {
    pub(crate) expected: &'static str,
}

impl Validate for TypeValidator {
    fn validate(&self, raw: &Value) -> Result<Value, ValidationError> {
        let ok = match self.expected {
            "number" => raw.is_number(),
            "boolean" => raw.is_boolean(),
            "string" => raw.is_string(),
            other => {
                return Err(ValidationError::new(format!(
                    "unknown expected type {other:?}"
                )))
            }
        };
        if ok {
            Ok(raw.clone())
        } else {
            Err(ValidationError::new(format!(
                "expected {}, got {}",
                self.expected,
                crate::error::type_name(raw)
            )))
        }
    }
}

/// Built-in validator checking enum membership.
struct EnumValidator {
    allowed: Vec<Value>,
}

impl Validate for EnumValidator {
    fn validate(&self, raw: &Value) -> Result<Value, ValidationError> {
        if self.allowed.iter().any(|v| v == raw) {
            Ok(raw.clone())
        } else {
            Err(ValidationError::new(format!("{raw} is not a permitted value")))
        }
    }
}

// ── Descriptor tree ───────────────────────────────────────────────────────

/// Variant-specific part of a descriptor.
#[derive(Clone)]
pub enum SchemaKind {
    /// Character-streamed string leaf.
    String,
    /// Whole-value leaf, validated as one unit at completion.
    Atom {
        /// JSON type emitted into the external schema for built-in atoms.
        type_hint: Option<&'static str>,
        validator: Option<Arc<dyn Validate + Send + Sync>>,
    },
    /// Homogeneous array of another descriptor.
    Array { element: Box<Schema> },
    /// Fields in declaration order. Order is load-bearing: the streaming
    /// object node finalises earlier fields when later ones are observed.
    Object { fields: Vec<(String, Schema)> },
}

impl fmt::Debug for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaKind::String => f.write_str("String"),
            SchemaKind::Atom { type_hint, validator } => f
                .debug_struct("Atom")
                .field("type_hint", type_hint)
                .field("validator", &validator.is_some())
                .finish(),
            SchemaKind::Array { element } => {
                f.debug_tuple("Array").field(element).finish()
            }
            SchemaKind::Object { fields } => {
                f.debug_map().entries(fields.iter().map(|(k, v)| (k, v))).finish()
            }
        }
    }
}

/// Shared descriptor metadata.
#[derive(Debug, Clone, Default)]
pub struct Meta {
    pub(crate) description: Option<String>,
    pub(crate) default: Option<Value>,
    pub(crate) external: Option<Value>,
}

/// A schema descriptor. Immutable once built; `create()` materialises a
/// fresh streaming-node tree each time it is called.
#[derive(Debug, Clone)]
pub struct Schema {
    pub(crate) kind: SchemaKind,
    pub(crate) meta: Meta,
}

// ── Factories ─────────────────────────────────────────────────────────────

/// A character-streamed string leaf.
pub fn string() -> Schema {
    Schema {
        kind: SchemaKind::String,
        meta: Meta::default(),
    }
}

/// A numeric leaf, validated whole at completion.
pub fn number() -> Schema {
    builtin_atom("number")
}

/// A boolean leaf, validated whole at completion.
pub fn boolean() -> Schema {
    builtin_atom("boolean")
}

fn builtin_atom(type_hint: &'static str) -> Schema {
    Schema {
        kind: SchemaKind::Atom {
            type_hint: Some(type_hint),
            validator: Some(Arc::new(TypeValidator { expected: type_hint })),
        },
        meta: Meta::default(),
    }
}

/// A whole-value leaf described by an external validation schema. The
/// external schema is the source of truth for its metadata; no validator
/// is installed unless one is injected with [`Schema::with_validator`].
pub fn atom(external_schema: Value) -> Schema {
    Schema {
        kind: SchemaKind::Atom {
            type_hint: None,
            validator: None,
        },
        meta: Meta {
            external: Some(external_schema),
            ..Meta::default()
        },
    }
}

/// An array of `element` descriptors.
pub fn array(element: Schema) -> Schema {
    Schema {
        kind: SchemaKind::Array {
            element: Box::new(element),
        },
        meta: Meta::default(),
    }
}

/// An object with fields in declaration order.
pub fn object<K: Into<String>>(fields: impl IntoIterator<Item = (K, Schema)>) -> Schema {
    Schema {
        kind: SchemaKind::Object {
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        },
        meta: Meta::default(),
    }
}

pub(crate) fn enum_atom(allowed: Vec<Value>, external: Value) -> Schema {
    Schema {
        kind: SchemaKind::Atom {
            type_hint: None,
            validator: Some(Arc::new(EnumValidator { allowed })),
        },
        meta: Meta {
            external: Some(external),
            ..Meta::default()
        },
    }
}

// ── Fluent configuration ──────────────────────────────────────────────────

impl Schema {
    /// Attach a human-readable description.
    pub fn describe(mut self, text: impl Into<String>) -> Result<Self, SchemaError> {
        if self.meta.external.is_some() {
            return Err(SchemaError::Conflict);
        }
        self.meta.description = Some(text.into());
        Ok(self)
    }

    /// Attach a default value.
    pub fn default_value(mut self, value: Value) -> Result<Self, SchemaError> {
        if self.meta.external.is_some() {
            return Err(SchemaError::Conflict);
        }
        self.meta.default = Some(value);
        Ok(self)
    }

    /// Attach an external validation schema, making it the source of truth
    /// for this descriptor's metadata.
    pub fn with_external_schema(mut self, schema: Value) -> Result<Self, SchemaError> {
        if self.meta.description.is_some() || self.meta.default.is_some() {
            return Err(SchemaError::Conflict);
        }
        self.meta.external = Some(schema);
        Ok(self)
    }

    /// Inject a whole-value validator. Atoms only.
    pub fn with_validator(
        mut self,
        validator: Arc<dyn Validate + Send + Sync>,
    ) -> Result<Self, SchemaError> {
        match &mut self.kind {
            SchemaKind::Atom { validator: slot, .. } => {
                *slot = Some(validator);
                Ok(self)
            }
            _ => Err(SchemaError::ValidatorTarget),
        }
    }

    pub fn description(&self) -> Option<&str> {
        self.meta.description.as_deref()
    }

    pub fn default(&self) -> Option<&Value> {
        self.meta.default.as_ref()
    }

    /// Render the descriptor as an external validation schema suitable for
    /// handing to a constrained-generation SDK.
    pub fn to_external_schema(&self) -> Value {
        external::to_external_schema(self)
    }

    /// Materialise the runtime streaming-node tree for this descriptor.
    /// Object fields are created eagerly so callbacks can be registered
    /// before the first character arrives; array children are created on
    /// demand as the stream reveals them.
    pub fn create(&self) -> Node {
        Node::from_schema(self)
    }
}
