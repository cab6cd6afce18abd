//! Editing operations on a live UI schema.
//!
//! All edits go through [`path::set`], so the caller's tree is never
//! mutated in place.

use serde_json::{json, Value};

use crate::catalog::{allowed_widgets, widget_defaults, WIDGET_DEFAULT_KEYS};
use crate::error::WidgetError;
use crate::path;
use crate::types::{keys, pointer_string, FieldType, PathSegment};

/// Widgets the node at `node_path` may switch to.
///
/// A node without `ui:fieldType` is treated as a string field; an
/// unrecognized field type is treated as `unknown`.
pub fn widget_choices(root: &Value, node_path: &[PathSegment]) -> &'static [&'static str] {
    let stamped = path::get(root, node_path)
        .and_then(|node| node.get(keys::FIELD_TYPE))
        .and_then(Value::as_str);
    match stamped {
        None => allowed_widgets(FieldType::String),
        Some(name) => allowed_widgets(FieldType::parse(name).unwrap_or(FieldType::Unknown)),
    }
}

/// Switch the widget of the node at `node_path`.
///
/// Settings that belong to the previous widget (`ui:rows`, `ui:accept`,
/// ...) are removed and the new widget's defaults written.
///
/// # Errors
///
/// Returns `WidgetError::NotANode` if there is no object at `node_path`,
/// or `WidgetError::NotAllowed` if the widget is not legal for the node's
/// field type.
pub fn change_widget(root: &Value, node_path: &[PathSegment], widget: &str) -> Result<Value, WidgetError> {
    let Some(Value::Object(node)) = path::get(root, node_path) else {
        return Err(WidgetError::NotANode {
            path: pointer_string(node_path),
        });
    };

    if !widget_choices(root, node_path).contains(&widget) {
        let field_type = node
            .get(keys::FIELD_TYPE)
            .and_then(Value::as_str)
            .unwrap_or(FieldType::String.as_str());
        return Err(WidgetError::NotAllowed {
            widget: widget.to_string(),
            field_type: field_type.to_string(),
        });
    }

    let mut node = node.clone();
    node.insert(keys::WIDGET.into(), json!(widget));
    for key in WIDGET_DEFAULT_KEYS {
        node.shift_remove(&format!("{}{}", keys::PREFIX, key));
    }
    for (key, value) in widget_defaults(widget) {
        node.insert(format!("{}{}", keys::PREFIX, key), value);
    }
    log::debug!("widget at {} set to {}", pointer_string(node_path), widget);
    Ok(path::set(root, node_path, Some(Value::Object(node))))
}

/// Keys of a node in editing order: `ui:order` entries first, then every
/// other key in insertion order. `ui:order` itself is not listed.
pub fn ordered_keys(node: &Value) -> Vec<String> {
    let Value::Object(map) = node else {
        return Vec::new();
    };
    let order: Vec<&str> = map
        .get(keys::ORDER)
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let mut result: Vec<String> = order.iter().map(|k| k.to_string()).collect();
    result.extend(
        map.keys()
            .filter(|k| k.as_str() != keys::ORDER && !order.contains(&k.as_str()))
            .cloned(),
    );
    result
}

/// JSON type of a `ui:emptyValue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyValueKind {
    String,
    Number,
    Boolean,
    Object,
    Array,
}

impl EmptyValueKind {
    /// Kind of an existing value; `null` reads as a string.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Bool(_) => EmptyValueKind::Boolean,
            Value::Number(_) => EmptyValueKind::Number,
            Value::Array(_) => EmptyValueKind::Array,
            Value::Object(_) => EmptyValueKind::Object,
            Value::String(_) | Value::Null => EmptyValueKind::String,
        }
    }

    /// Value written when the kind is switched.
    pub fn default_value(&self) -> Value {
        match self {
            EmptyValueKind::String => json!(""),
            EmptyValueKind::Number => json!(0),
            EmptyValueKind::Boolean => json!(false),
            EmptyValueKind::Object => json!({}),
            EmptyValueKind::Array => json!([]),
        }
    }

    /// Parse text typed for this kind.
    ///
    /// Numbers that fail to parse become `0`; booleans are true only for
    /// `"true"`.
    ///
    /// # Errors
    ///
    /// Returns the parser error for malformed object/array JSON, or when
    /// the JSON is of the other container type.
    pub fn parse(&self, text: &str) -> Result<Value, serde_json::Error> {
        match self {
            EmptyValueKind::String => Ok(json!(text)),
            EmptyValueKind::Boolean => Ok(json!(text == "true")),
            EmptyValueKind::Number => {
                let trimmed = text.trim();
                Ok(trimmed
                    .parse::<i64>()
                    .map(Value::from)
                    .ok()
                    .or_else(|| {
                        trimmed
                            .parse::<f64>()
                            .ok()
                            .and_then(serde_json::Number::from_f64)
                            .map(Value::Number)
                    })
                    .unwrap_or_else(|| json!(0)))
            }
            EmptyValueKind::Object => serde_json::from_str::<serde_json::Map<String, Value>>(text).map(Value::Object),
            EmptyValueKind::Array => serde_json::from_str::<Vec<Value>>(text).map(Value::Array),
        }
    }
}
