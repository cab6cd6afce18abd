//! Static widget catalog and per-widget defaults.

use serde_json::{json, Value};

use crate::types::FieldType;

const STRING_WIDGETS: &[&str] = &[
    "text", "textarea", "password", "hidden", "file", "datetime", "date", "time",
];
const NUMBER_WIDGETS: &[&str] = &["updown", "text", "hidden", "range"];
const BOOL_WIDGETS: &[&str] = &["checkbox", "hidden"];
const CHOICE_WIDGETS: &[&str] = &["select", "RadioWidget", "CheckboxesWidget", "hidden"];
const HIDDEN_ONLY: &[&str] = &["hidden"];

/// Legal widget ids for a field type, in display order.
pub fn allowed_widgets(field_type: FieldType) -> &'static [&'static str] {
    match field_type {
        FieldType::String => STRING_WIDGETS,
        FieldType::Number => NUMBER_WIDGETS,
        FieldType::Bool => BOOL_WIDGETS,
        FieldType::Enum
        | FieldType::Array
        | FieldType::OneOf
        | FieldType::AnyOf
        | FieldType::AllOf => CHOICE_WIDGETS,
        FieldType::Object | FieldType::Unknown => HIDDEN_ONLY,
    }
}

/// Whether `widget` may be set on a node of `field_type`.
pub fn is_allowed(field_type: FieldType, widget: &str) -> bool {
    allowed_widgets(field_type).contains(&widget)
}

/// Keys written by [`widget_defaults`] for any widget.
///
/// Cleared when a node switches widget so stale settings don't linger.
pub const WIDGET_DEFAULT_KEYS: &[&str] = &["rows", "autocomplete", "accept", "filePreview", "inputType"];

/// Settings a widget starts with, as unprefixed option keys.
pub fn widget_defaults(widget: &str) -> Vec<(&'static str, Value)> {
    match widget {
        "textarea" => vec![("rows", json!(5)), ("autocomplete", json!("off"))],
        "file" => vec![("filePreview", json!(false)), ("accept", json!(""))],
        "text" => vec![("inputType", json!(""))],
        _ => Vec::new(),
    }
}
