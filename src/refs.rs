//! `$ref` inlining.
//!
//! Two resolvers:
//! - [`resolve_definitions`] inlines `#/definitions/<name>` only and drops
//!   the root `definitions` map.
//! - [`resolve_all_refs`] follows arbitrary JSON Pointer fragments against
//!   the root document and merges sibling keys over the target.
//!
//! Both track the pointers currently being expanded and fail with
//! [`ReferenceError::Cyclic`] on re-entry instead of recursing forever.

use serde_json::{Map, Value};

use crate::error::ReferenceError;

const DEFINITIONS_PREFIX: &str = "#/definitions/";

/// Inline `#/definitions/<name>` refs and remove `definitions`.
///
/// Returns the schema unchanged when it has no `definitions`. Refs of any
/// other form are left in place; sibling keys of an inlined ref are
/// replaced by the definition.
///
/// # Errors
///
/// Returns `ReferenceError` if a definition is missing or refers back to
/// itself.
pub fn resolve_definitions(schema: &Value) -> Result<Value, ReferenceError> {
    let Some(definitions) = schema.get("definitions") else {
        return Ok(schema.clone());
    };
    let definitions = definitions.as_object().cloned().unwrap_or_default();

    let mut root = schema.clone();
    if let Value::Object(map) = &mut root {
        map.shift_remove("definitions");
    }
    inline_definitions(&root, &definitions, &mut Vec::new())
}

fn inline_definitions(
    value: &Value,
    definitions: &Map<String, Value>,
    active: &mut Vec<String>,
) -> Result<Value, ReferenceError> {
    match value {
        Value::Object(map) => {
            if let Some(pointer) = map.get("$ref").and_then(Value::as_str) {
                if let Some(name) = pointer.strip_prefix(DEFINITIONS_PREFIX) {
                    let target = definitions.get(&unescape(name)).ok_or_else(|| {
                        ReferenceError::Unresolved {
                            pointer: pointer.to_string(),
                        }
                    })?;
                    enter(active, pointer)?;
                    log::debug!("inlining {}", pointer);
                    let resolved = inline_definitions(target, definitions, active);
                    active.pop();
                    return resolved;
                }
                log::debug!("leaving non-definitions ref {} in place", pointer);
            }
            let mut result = Map::new();
            for (key, child) in map {
                result.insert(key.clone(), inline_definitions(child, definitions, active)?);
            }
            Ok(Value::Object(result))
        }
        Value::Array(arr) => arr
            .iter()
            .map(|item| inline_definitions(item, definitions, active))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        other => Ok(other.clone()),
    }
}

/// Inline every `$ref` in the document.
///
/// Each pointer is followed against the original root. Keys next to the
/// `$ref` are merged over the target (siblings win; two objects merge
/// recursively), and the merged result is resolved again.
///
/// # Errors
///
/// Returns `ReferenceError` if a pointer does not lead to a value, is not a
/// local fragment, or forms a cycle.
pub fn resolve_all_refs(schema: &Value) -> Result<Value, ReferenceError> {
    resolve_node(schema, schema, &mut Vec::new())
}

fn resolve_node(
    value: &Value,
    root: &Value,
    active: &mut Vec<String>,
) -> Result<Value, ReferenceError> {
    match value {
        Value::Object(map) => {
            if let Some(ref_val) = map.get("$ref") {
                let pointer = match ref_val {
                    Value::String(s) => s.as_str(),
                    other => {
                        return Err(ReferenceError::Unresolved {
                            pointer: other.to_string(),
                        })
                    }
                };
                let target = navigate_pointer(root, pointer)?;

                let mut merged = target.clone();
                for (key, sibling) in map {
                    if key == "$ref" {
                        continue;
                    }
                    let sibling = resolve_node(sibling, root, active)?;
                    overlay(&mut merged, key, sibling);
                }

                enter(active, pointer)?;
                log::debug!("inlining {}", pointer);
                let resolved = resolve_node(&merged, root, active);
                active.pop();
                return resolved;
            }
            let mut result = Map::new();
            for (key, child) in map {
                result.insert(key.clone(), resolve_node(child, root, active)?);
            }
            Ok(Value::Object(result))
        }
        Value::Array(arr) => arr
            .iter()
            .map(|item| resolve_node(item, root, active))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        other => Ok(other.clone()),
    }
}

/// Write a sibling key over the resolved target.
fn overlay(target: &mut Value, key: &str, sibling: Value) {
    // A non-object target has no room for siblings; the siblings win.
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    let Value::Object(map) = target else {
        return;
    };
    let both_objects = sibling.is_object() && map.get(key).is_some_and(Value::is_object);
    if !both_objects {
        map.insert(key.to_string(), sibling);
        return;
    }
    if let (Some(existing), Value::Object(incoming)) = (map.get_mut(key), sibling) {
        for (k, v) in incoming {
            overlay(existing, &k, v);
        }
    }
}

/// Follow a local JSON Pointer fragment (`#/a/b/0`) from the root.
pub fn navigate_pointer<'a>(root: &'a Value, pointer: &str) -> Result<&'a Value, ReferenceError> {
    let unresolved = || ReferenceError::Unresolved {
        pointer: pointer.to_string(),
    };
    let Some(path) = pointer.strip_prefix('#') else {
        return Err(unresolved());
    };
    let path = path.strip_prefix('/').unwrap_or(path);
    if path.is_empty() {
        return Ok(root);
    }

    let mut current = root;
    for part in path.split('/') {
        let key = unescape(part);
        current = match current {
            Value::Object(map) => map.get(&key),
            Value::Array(arr) => key.parse::<usize>().ok().and_then(|i| arr.get(i)),
            _ => None,
        }
        .ok_or_else(unresolved)?;
    }
    Ok(current)
}

fn unescape(part: &str) -> String {
    part.replace("~1", "/").replace("~0", "~")
}

fn enter(active: &mut Vec<String>, pointer: &str) -> Result<(), ReferenceError> {
    if active.iter().any(|p| p == pointer) {
        return Err(ReferenceError::Cyclic {
            pointer: pointer.to_string(),
        });
    }
    active.push(pointer.to_string());
    Ok(())
}

/// Whether any node in the tree still carries `$ref`.
pub fn contains_ref(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.contains_key("$ref") || map.values().any(contains_ref),
        Value::Array(arr) => arr.iter().any(contains_ref),
        _ => false,
    }
}
