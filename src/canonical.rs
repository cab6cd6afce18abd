//! Canonical UI schema shape.
//!
//! A UI schema may carry derived extras either flattened (`ui:placeholder`)
//! or wrapped (`ui:options.placeholder`). Everything downstream of import
//! works on the flattened form produced here.

use serde_json::{Map, Value};

use crate::types::keys;

/// Presentation keys copied out of `ui:options` verbatim.
pub const PRESENTATION_KEYS: &[&str] = &["description", "help", "title", "placeholder", "readonly", "disabled"];

/// Hoist every `ui:options` entry to a sibling `ui:<key>`, recursively.
///
/// Presentation values are copied as-is; other values are canonicalized
/// themselves. A key already present as an explicit sibling wins over the
/// wrapped copy.
pub fn canonicalize(node: &Value) -> Value {
    match node {
        Value::Array(arr) => Value::Array(arr.iter().map(canonicalize).collect()),
        Value::Object(map) => Value::Object(canonicalize_map(map)),
        other => other.clone(),
    }
}

fn canonicalize_map(map: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    for (key, value) in map {
        match value {
            Value::Object(bag) if key == keys::OPTIONS => {
                for (opt_key, opt_value) in bag {
                    let hoisted = prefixed(opt_key);
                    if map.contains_key(&hoisted) {
                        continue;
                    }
                    let opt_value = if PRESENTATION_KEYS.contains(&opt_key.as_str()) {
                        opt_value.clone()
                    } else {
                        canonicalize(opt_value)
                    };
                    out.insert(hoisted, opt_value);
                }
            }
            _ => {
                out.insert(key.clone(), canonicalize(value));
            }
        }
    }
    out
}

fn prefixed(key: &str) -> String {
    if key.starts_with(keys::PREFIX) {
        key.to_string()
    } else {
        format!("{}{}", keys::PREFIX, key)
    }
}

/// Whether the tree contains no `ui:options` bag anywhere.
pub fn is_canonical(node: &Value) -> bool {
    match node {
        Value::Array(arr) => arr.iter().all(is_canonical),
        Value::Object(map) => {
            !map.get(keys::OPTIONS).is_some_and(Value::is_object) && map.values().all(is_canonical)
        }
        _ => true,
    }
}
