//! Adapter between descriptor trees and external validation schemas.
//!
//! The external format is the JSON Schema subset that constrained-generation
//! SDKs accept: `type`, `properties`, `required`, `items`, `enum`,
//! `description`, `default`, and the two common nullable spellings
//! (`"type": [T, "null"]` and `anyOf` with a null arm).

use std::sync::Arc;

use serde_json::{json, Map, Value};

use super::{array, object, string, Schema, SchemaError, SchemaKind, TypeValidator};

// ── Descriptor → external schema ──────────────────────────────────────────

pub(crate) fn to_external_schema(schema: &Schema) -> Value {
    if let Some(external) = &schema.meta.external {
        return external.clone();
    }
    let mut out = Map::new();
    match &schema.kind {
        SchemaKind::String => {
            out.insert("type".to_string(), json!("string"));
        }
        SchemaKind::Atom { type_hint, .. } => {
            if let Some(hint) = type_hint {
                out.insert("type".to_string(), json!(hint));
            }
        }
        SchemaKind::Array { element } => {
            out.insert("type".to_string(), json!("array"));
            out.insert("items".to_string(), to_external_schema(element));
        }
        SchemaKind::Object { fields } => {
            let mut properties = Map::new();
            let mut required = Vec::with_capacity(fields.len());
            for (key, field) in fields {
                properties.insert(key.clone(), to_external_schema(field));
                required.push(Value::String(key.clone()));
            }
            out.insert("type".to_string(), json!("object"));
            out.insert("properties".to_string(), Value::Object(properties));
            out.insert("required".to_string(), Value::Array(required));
            out.insert("additionalProperties".to_string(), json!(false));
        }
    }
    if let Some(description) = &schema.meta.description {
        out.insert("description".to_string(), json!(description));
    }
    if let Some(default) = &schema.meta.default {
        out.insert("default".to_string(), default.clone());
    }
    Value::Object(out)
}

// ── External schema → descriptor ──────────────────────────────────────────

/// Rebuild a descriptor tree from an external validation schema.
///
/// Mapping: string → streamed string; number/integer/boolean/enum → atom;
/// array of string → array of streamed strings; array of object → array of
/// streamed objects; array of any other leaf → array of whole-validated
/// atoms; object → object with fields in `properties` order; nullable
/// wrappers unwrap to the inner schema.
pub fn from_external_schema(schema: &Value) -> Result<Schema, SchemaError> {
    let map = schema
        .as_object()
        .ok_or_else(|| SchemaError::Unsupported("schema must be an object".to_string()))?;

    if let Some(inner) = unwrap_nullable(map) {
        return from_external_schema(&inner);
    }

    if let Some(allowed) = map.get("enum") {
        let allowed = allowed
            .as_array()
            .ok_or_else(|| SchemaError::Unsupported("enum must be an array".to_string()))?
            .clone();
        return Ok(super::enum_atom(allowed, schema.clone()));
    }

    let ty = map
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| SchemaError::Unsupported("missing type".to_string()))?;

    let built = match ty {
        "string" => with_meta(string(), map)?,
        "number" | "integer" => typed_atom(schema.clone(), "number"),
        "boolean" => typed_atom(schema.clone(), "boolean"),
        "array" => {
            let items = map
                .get("items")
                .ok_or_else(|| SchemaError::Unsupported("array without items".to_string()))?;
            with_meta(array(from_external_schema(items)?), map)?
        }
        "object" => {
            let properties = map
                .get("properties")
                .and_then(Value::as_object)
                .ok_or_else(|| {
                    SchemaError::Unsupported("object without properties".to_string())
                })?;
            let mut fields = Vec::with_capacity(properties.len());
            for (key, field_schema) in properties {
                fields.push((key.clone(), from_external_schema(field_schema)?));
            }
            with_meta(object(fields), map)?
        }
        other => return Err(SchemaError::Unsupported(format!("type {other:?}"))),
    };
    Ok(built)
}

fn typed_atom(external: Value, expected: &'static str) -> Schema {
    Schema {
        kind: SchemaKind::Atom {
            type_hint: None,
            validator: Some(Arc::new(TypeValidator { expected })),
        },
        meta: super::Meta {
            external: Some(external),
            ..super::Meta::default()
        },
    }
}

fn with_meta(schema: Schema, map: &Map<String, Value>) -> Result<Schema, SchemaError> {
    let mut schema = schema;
    if let Some(description) = map.get("description").and_then(Value::as_str) {
        schema = schema.describe(description)?;
    }
    if let Some(default) = map.get("default") {
        schema = schema.default_value(default.clone())?;
    }
    Ok(schema)
}

/// Detects the two nullable spellings and returns the non-null inner
/// schema when one matches.
fn unwrap_nullable(map: &Map<String, Value>) -> Option<Value> {
    if let Some(arms) = map.get("anyOf").and_then(Value::as_array) {
        let non_null: Vec<&Value> = arms
            .iter()
            .filter(|arm| arm.get("type").and_then(Value::as_str) != Some("null"))
            .collect();
        if non_null.len() == 1 && non_null.len() < arms.len() {
            return Some(non_null[0].clone());
        }
        return None;
    }
    if let Some(types) = map.get("type").and_then(Value::as_array) {
        let non_null: Vec<&Value> = types
            .iter()
            .filter(|t| t.as_str() != Some("null"))
            .collect();
        if non_null.len() == 1 {
            let mut inner = map.clone();
            inner.insert("type".to_string(), non_null[0].clone());
            return Some(Value::Object(inner));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{atom, boolean, number, Validate};

    #[test]
    fn object_schema_renders_declaration_order() {
        let schema = object([
            ("title", string().describe("headline").unwrap()),
            ("count", number()),
            ("done", boolean()),
        ]);
        let external = schema.to_external_schema();
        let keys: Vec<&str> = external["properties"]
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, ["title", "count", "done"]);
        assert_eq!(external["properties"]["title"]["description"], "headline");
        assert_eq!(external["required"], json!(["title", "count", "done"]));
        assert_eq!(external["additionalProperties"], json!(false));
    }

    #[test]
    fn external_schema_is_source_of_truth() {
        let fragment = json!({"type": "integer", "minimum": 0});
        let schema = atom(fragment.clone());
        assert_eq!(schema.to_external_schema(), fragment);
    }

    #[test]
    fn rebuild_string_field() {
        let schema = from_external_schema(&json!({
            "type": "object",
            "properties": {"message": {"type": "string"}},
        }))
        .unwrap();
        match &schema.kind {
            SchemaKind::Object { fields } => {
                assert!(matches!(fields[0].1.kind, SchemaKind::String));
            }
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn rebuild_array_of_strings_streams() {
        let schema = from_external_schema(&json!({
            "type": "array",
            "items": {"type": "string"},
        }))
        .unwrap();
        match &schema.kind {
            SchemaKind::Array { element } => {
                assert!(matches!(element.kind, SchemaKind::String));
            }
            _ => panic!("expected array"),
        }
    }

    #[test]
    fn rebuild_array_of_numbers_is_atomic_per_item() {
        let schema = from_external_schema(&json!({
            "type": "array",
            "items": {"type": "number"},
        }))
        .unwrap();
        match &schema.kind {
            SchemaKind::Array { element } => {
                assert!(matches!(element.kind, SchemaKind::Atom { .. }));
            }
            _ => panic!("expected array"),
        }
    }

    #[test]
    fn rebuild_unwraps_nullable_type_array() {
        let schema =
            from_external_schema(&json!({"type": ["string", "null"]})).unwrap();
        assert!(matches!(schema.kind, SchemaKind::String));
    }

    #[test]
    fn rebuild_unwraps_nullable_any_of() {
        let schema = from_external_schema(&json!({
            "anyOf": [{"type": "number"}, {"type": "null"}],
        }))
        .unwrap();
        assert!(matches!(schema.kind, SchemaKind::Atom { .. }));
    }

    #[test]
    fn rebuild_enum_validates_membership() {
        let schema = from_external_schema(&json!({"enum": ["red", "green"]})).unwrap();
        let node_validates = match &schema.kind {
            SchemaKind::Atom {
                validator: Some(v), ..
            } => {
                v.validate(&json!("red")).is_ok() && v.validate(&json!("blue")).is_err()
            }
            _ => false,
        };
        assert!(node_validates);
    }

    #[test]
    fn rebuild_preserves_property_order() {
        let schema = from_external_schema(&json!({
            "type": "object",
            "properties": {
                "zeta": {"type": "string"},
                "alpha": {"type": "boolean"},
            },
        }))
        .unwrap();
        match &schema.kind {
            SchemaKind::Object { fields } => {
                let keys: Vec<&str> = fields.iter().map(|(k, _)| k.as_str()).collect();
                assert_eq!(keys, ["zeta", "alpha"]);
            }
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn rebuild_rejects_untyped() {
        assert!(matches!(
            from_external_schema(&json!({"format": "uuid"})),
            Err(SchemaError::Unsupported(_))
        ));
    }
}
