//! Field type classification of JSON Schema nodes.

use serde_json::Value;

use crate::types::{Composition, FieldType, SchemaKind, COMPOSITION_KEYWORDS};

/// Effective primitive type of a schema node.
///
/// For a type array (`["string", "null"]`) this is the first entry that is
/// not `"null"`.
pub fn effective_type(schema: &Value) -> Option<&str> {
    match schema.get("type")? {
        Value::String(s) => Some(s.as_str()),
        Value::Array(types) => types
            .iter()
            .filter_map(Value::as_str)
            .find(|t| *t != "null"),
        _ => None,
    }
}

/// Classify a schema node into the field type used to pick legal widgets.
///
/// Precedence: `anyOf`, `allOf`, `oneOf`, `enum`, then the effective
/// primitive type.
pub fn classify(schema: &Value) -> FieldType {
    if let Some(comp) = composition(schema) {
        return match comp {
            Composition::AnyOf => FieldType::AnyOf,
            Composition::AllOf => FieldType::AllOf,
            Composition::OneOf => FieldType::OneOf,
        };
    }
    if has_key(schema, "enum") {
        return FieldType::Enum;
    }
    match effective_type(schema) {
        Some("integer") | Some("number") => FieldType::Number,
        Some("boolean") => FieldType::Bool,
        Some("string") => FieldType::String,
        Some("array") => FieldType::Array,
        Some("object") => FieldType::Object,
        _ => FieldType::Unknown,
    }
}

/// First composition keyword present, in classification precedence.
pub fn composition(schema: &Value) -> Option<Composition> {
    COMPOSITION_KEYWORDS
        .iter()
        .find(|keyword| has_key(schema, keyword))
        .and_then(|keyword| Composition::from_keyword(keyword))
}

/// A keyword counts as present unless missing or `null`.
fn has_key(schema: &Value, key: &str) -> bool {
    schema.get(key).is_some_and(|v| !v.is_null())
}

impl SchemaKind {
    /// Tag a schema node for generator dispatch.
    ///
    /// Primitive type wins over composition and enum; those two only tag
    /// nodes without a recognized type.
    pub fn of(schema: &Value) -> Self {
        match effective_type(schema) {
            Some("string") => SchemaKind::String,
            Some("number") | Some("integer") => SchemaKind::Number,
            Some("boolean") => SchemaKind::Boolean,
            Some("array") => SchemaKind::Array,
            Some("object") => SchemaKind::Object,
            _ => {
                if let Some(comp) = composition(schema) {
                    SchemaKind::Composition(comp)
                } else if has_key(schema, "enum") {
                    SchemaKind::Enum
                } else {
                    SchemaKind::Unknown
                }
            }
        }
    }
}
