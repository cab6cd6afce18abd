//! Strip a UI schema down to what a form renderer needs.

use serde_json::{Map, Value};

use crate::types::keys;

/// Produce the minimal render tree.
///
/// Drops `ui:fieldType` everywhere, then every key whose cleaned value is
/// empty-equivalent: `""`, `false`, `"off"`, `"false"`, or an object left
/// empty. Lists are kept (their object elements are cleaned in place).
/// Cleaning a clean tree changes nothing.
pub fn clean(node: &Value) -> Value {
    match node {
        Value::Object(map) => Value::Object(clean_map(map)),
        Value::Array(arr) => Value::Array(arr.iter().map(clean).collect()),
        other => other.clone(),
    }
}

fn clean_map(map: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    for (key, value) in map {
        if key == keys::FIELD_TYPE {
            continue;
        }
        let cleaned = clean(value);
        if is_empty_equivalent(&cleaned) {
            continue;
        }
        out.insert(key.clone(), cleaned);
    }
    out
}

/// Values a renderer treats the same as an absent key.
pub fn is_empty_equivalent(value: &Value) -> bool {
    match value {
        Value::String(s) => s.is_empty() || s == "off" || s == "false",
        Value::Bool(b) => !b,
        Value::Object(map) => map.is_empty(),
        Value::Null | Value::Number(_) | Value::Array(_) => false,
    }
}
