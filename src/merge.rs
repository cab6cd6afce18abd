//! Structural merge of UI schema trees.
//!
//! On import the human-edited tree is merged under a freshly generated one:
//! generated values win, keys the generator does not produce survive.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::catalog::is_allowed;
use crate::error::MergeError;
use crate::types::{json_type_name, keys, pointer_string, FieldType, PathSegment};

/// Keys that belong to a node's widget and go away with it.
const WIDGET_KEYS: &[&str] = &[
    keys::WIDGET,
    keys::FIELD_TYPE,
    keys::EMPTY_VALUE,
    keys::ENUM_NAMES,
    keys::ENUM_DISABLED,
];

/// Merge two UI schema trees and expand `ui:order` wildcards.
///
/// `high` wins every conflict. Lists in `high` replace lists in `low`
/// wholesale; two objects merge recursively.
///
/// # Errors
///
/// Returns `MergeError` if a merged `ui:order` is not a list of strings.
pub fn merge(low: &Value, high: &Value) -> Result<Value, MergeError> {
    expand_orders(&deep_merge(low, high))
}

/// Structural merge without order expansion.
///
/// Keys come out in `high`'s order followed by keys only `low` has, so
/// child fields follow the freshly declared order.
pub fn deep_merge(low: &Value, high: &Value) -> Value {
    match (low, high) {
        (Value::Object(low_map), Value::Object(high_map)) => {
            let mut out = Map::new();
            for (key, high_value) in high_map {
                let merged = match (low_map.get(key), high_value) {
                    (Some(low_value @ Value::Object(_)), Value::Object(_)) => {
                        deep_merge(low_value, high_value)
                    }
                    _ => high_value.clone(),
                };
                out.insert(key.clone(), merged);
            }
            for (key, low_value) in low_map {
                if !high_map.contains_key(key) {
                    out.insert(key.clone(), low_value.clone());
                }
            }
            Value::Object(out)
        }
        (_, high) => high.clone(),
    }
}

/// Expand `ui:order` wildcards throughout the tree.
///
/// Each `"*"` becomes the child field keys not listed elsewhere in the
/// order, in the node's key order. Duplicates and entries naming no child
/// are dropped, and unlisted children are appended, so every order ends up
/// a permutation of its node's child keys.
///
/// # Errors
///
/// Returns `MergeError` if a `ui:order` is not a list of strings.
pub fn expand_orders(node: &Value) -> Result<Value, MergeError> {
    expand_node(node, &mut Vec::new())
}

fn expand_node(node: &Value, path: &mut Vec<PathSegment>) -> Result<Value, MergeError> {
    match node {
        Value::Object(map) => {
            let mut out = Map::new();
            for (key, value) in map {
                if key == keys::ORDER {
                    out.insert(key.clone(), value.clone());
                    continue;
                }
                path.push(PathSegment::from(key.as_str()));
                let expanded = expand_node(value, path)?;
                path.pop();
                out.insert(key.clone(), expanded);
            }
            if let Some(order) = map.get(keys::ORDER) {
                let expanded = expand_order(order, &child_keys(map), path)?;
                out.insert(keys::ORDER.into(), expanded);
            }
            Ok(Value::Object(out))
        }
        Value::Array(arr) => {
            let mut out = Vec::with_capacity(arr.len());
            for (i, item) in arr.iter().enumerate() {
                path.push(PathSegment::from(i));
                out.push(expand_node(item, path)?);
                path.pop();
            }
            Ok(Value::Array(out))
        }
        other => Ok(other.clone()),
    }
}

fn expand_order(order: &Value, children: &[&str], path: &[PathSegment]) -> Result<Value, MergeError> {
    let order_path = || {
        let mut p = path.to_vec();
        p.push(PathSegment::from(keys::ORDER));
        pointer_string(&p)
    };
    let Value::Array(entries) = order else {
        return Err(MergeError::OrderNotSequence {
            path: order_path(),
            found: json_type_name(order),
        });
    };
    let entries = entries
        .iter()
        .map(|entry| {
            entry.as_str().ok_or_else(|| MergeError::InvalidOrderEntry {
                path: order_path(),
                entry: entry.to_string(),
            })
        })
        .collect::<Result<Vec<&str>, _>>()?;

    let explicit: HashSet<&str> = entries
        .iter()
        .copied()
        .filter(|e| *e != keys::ORDER_WILDCARD)
        .collect();
    let known: HashSet<&str> = children.iter().copied().collect();

    let mut seen = HashSet::new();
    let mut result = Vec::new();
    for entry in entries {
        if entry == keys::ORDER_WILDCARD {
            for child in children {
                if !explicit.contains(child) && seen.insert(*child) {
                    result.push(*child);
                }
            }
        } else if known.contains(entry) && seen.insert(entry) {
            result.push(entry);
        }
    }
    for child in children {
        if seen.insert(*child) {
            result.push(*child);
        }
    }

    Ok(Value::Array(result.into_iter().map(|k| Value::String(k.to_string())).collect()))
}

/// Child field keys of a UI node: unprefixed keys holding a node.
pub fn child_keys(map: &Map<String, Value>) -> Vec<&str> {
    map.iter()
        .filter(|(k, v)| !k.starts_with(keys::PREFIX) && v.is_object())
        .map(|(k, _)| k.as_str())
        .collect()
}

/// Drop child nodes of `stale` that `fresh` no longer has.
///
/// Used before merging an old UI schema under a regenerated one so removed
/// schema properties do not linger as orphan nodes.
pub fn prune_stale_fields(stale: &Value, fresh: &Value) -> Value {
    match (stale, fresh) {
        (Value::Object(stale_map), Value::Object(fresh_map)) => {
            let mut out = Map::new();
            for (key, value) in stale_map {
                let is_child = !key.starts_with(keys::PREFIX) && value.is_object();
                match fresh_map.get(key) {
                    Some(fresh_value) => {
                        out.insert(key.clone(), prune_stale_fields(value, fresh_value));
                    }
                    None if is_child => {
                        log::debug!("dropping stale ui node {:?}", key);
                    }
                    None => {
                        out.insert(key.clone(), value.clone());
                    }
                }
            }
            Value::Object(out)
        }
        _ => stale.clone(),
    }
}

/// Strip widget settings from `merged` that `fresh` no longer backs.
///
/// Where the fresh node has no `ui:widget`, every widget key it does not
/// carry itself is removed.
/// Where it has one, a merged widget the catalog rejects for the fresh
/// `ui:fieldType` is replaced by the fresh widget.
pub fn drop_stale_widgets(merged: &Value, fresh: &Value) -> Value {
    drop_stale_node(merged, fresh, &mut Vec::new())
}

fn drop_stale_node(merged: &Value, fresh: &Value, path: &mut Vec<PathSegment>) -> Value {
    match (merged, fresh) {
        (Value::Object(map), Value::Object(fresh_map)) => {
            let fresh_widget = fresh_map.get(keys::WIDGET);
            let mut out = Map::new();
            for (key, value) in map {
                let backed = fresh_widget.is_some() || fresh_map.contains_key(key);
                if !backed && WIDGET_KEYS.contains(&key.as_str()) {
                    log::debug!("dropping stale {} at {}", key, pointer_string(path));
                    continue;
                }
                let value = match fresh_map.get(key) {
                    Some(fresh_value) => {
                        path.push(PathSegment::from(key.as_str()));
                        let value = drop_stale_node(value, fresh_value, path);
                        path.pop();
                        value
                    }
                    None => value.clone(),
                };
                out.insert(key.clone(), value);
            }
            if let Some(fresh_widget) = fresh_widget {
                let field_type = fresh_map
                    .get(keys::FIELD_TYPE)
                    .and_then(Value::as_str)
                    .and_then(FieldType::parse)
                    .unwrap_or(FieldType::Unknown);
                let legal = out
                    .get(keys::WIDGET)
                    .and_then(Value::as_str)
                    .is_some_and(|widget| is_allowed(field_type, widget));
                if !legal {
                    out.insert(keys::WIDGET.into(), fresh_widget.clone());
                }
            }
            Value::Object(out)
        }
        (Value::Array(items), Value::Array(fresh_items)) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                match fresh_items.get(i) {
                    Some(fresh_item) => {
                        path.push(PathSegment::from(i));
                        out.push(drop_stale_node(item, fresh_item, path));
                        path.pop();
                    }
                    None => out.push(item.clone()),
                }
            }
            Value::Array(out)
        }
        _ => merged.clone(),
    }
}
