//! Get and set values by path in a UI schema tree.
//!
//! `set` never mutates its input; it returns a patched copy so callers can
//! detect changes by comparing roots.

use serde_json::{Map, Value};

use crate::types::PathSegment;

/// Look up the value at `path`.
///
/// Returns `None` if any hop is missing or lands on a scalar.
pub fn get<'a>(root: &'a Value, path: &[PathSegment]) -> Option<&'a Value> {
    path.iter().try_fold(root, |current, seg| step(current, seg))
}

fn step<'a>(current: &'a Value, seg: &PathSegment) -> Option<&'a Value> {
    match (current, seg) {
        (Value::Object(map), PathSegment::Key(k)) => map.get(k),
        (Value::Object(map), PathSegment::Index(i)) => map.get(&i.to_string()),
        (Value::Array(arr), PathSegment::Index(i)) => arr.get(*i),
        (Value::Array(arr), PathSegment::Key(k)) => k.parse::<usize>().ok().and_then(|i| arr.get(i)),
        _ => None,
    }
}

/// Return a copy of `root` with `value` written at `path`.
///
/// Missing intermediate containers are created: an array when the next
/// segment is an index, an object otherwise. Arrays only grow by one: an
/// index equal to the length appends, a larger one leaves `root` unchanged.
/// Passing `None` deletes the final key instead. An empty path replaces the
/// root (or yields an empty object when deleting).
pub fn set(root: &Value, path: &[PathSegment], value: Option<Value>) -> Value {
    let mut patched = root.clone();
    match path.split_last() {
        None => value.unwrap_or_else(|| Value::Object(Map::new())),
        Some((last, parents)) => {
            write(&mut patched, parents, last, value);
            patched
        }
    }
}

/// Remove the value at `path`. Shorthand for `set(root, path, None)`.
pub fn remove(root: &Value, path: &[PathSegment]) -> Value {
    set(root, path, None)
}

fn write(current: &mut Value, parents: &[PathSegment], last: &PathSegment, value: Option<Value>) {
    match parents.split_first() {
        None => write_leaf(current, last, value),
        Some((seg, rest)) => {
            let next_is_index = rest.first().unwrap_or(last).is_index();
            if let Some(slot) = slot_mut(current, seg, value.is_some()) {
                if !slot.is_object() && !slot.is_array() {
                    if value.is_none() {
                        // Nothing below a scalar to delete.
                        return;
                    }
                    *slot = empty_container(next_is_index);
                }
                write(slot, rest, last, value);
            }
        }
    }
}

fn empty_container(array: bool) -> Value {
    if array {
        Value::Array(Vec::new())
    } else {
        Value::Object(Map::new())
    }
}

/// Child slot for `seg`, created as `Null` when `create` is set.
fn slot_mut<'a>(current: &'a mut Value, seg: &PathSegment, create: bool) -> Option<&'a mut Value> {
    if !current.is_object() && !current.is_array() {
        if !create {
            return None;
        }
        *current = empty_container(seg.is_index());
    }
    match current {
        Value::Object(map) => {
            let key = seg.to_string();
            if create {
                Some(map.entry(key).or_insert(Value::Null))
            } else {
                map.get_mut(&key)
            }
        }
        Value::Array(arr) => {
            let idx = match seg {
                PathSegment::Index(i) => *i,
                PathSegment::Key(k) => match k.parse::<usize>() {
                    Ok(i) => i,
                    Err(_) => {
                        log::warn!("key segment {:?} cannot address an array", k);
                        return None;
                    }
                },
            };
            if idx > arr.len() || (idx == arr.len() && !create) {
                if create {
                    log::warn!("index {} is past the end of an array of length {}", idx, arr.len());
                }
                return None;
            }
            if idx == arr.len() {
                arr.push(Value::Null);
            }
            arr.get_mut(idx)
        }
        _ => None,
    }
}

fn write_leaf(current: &mut Value, last: &PathSegment, value: Option<Value>) {
    match value {
        Some(value) => {
            if let Some(slot) = slot_mut(current, last, true) {
                *slot = value;
            }
        }
        None => match current {
            Value::Object(map) => {
                map.shift_remove(&last.to_string());
            }
            Value::Array(arr) => {
                let idx = match last {
                    PathSegment::Index(i) => Some(*i),
                    PathSegment::Key(k) => k.parse::<usize>().ok(),
                };
                if let Some(i) = idx.filter(|i| *i < arr.len()) {
                    arr.remove(i);
                }
            }
            _ => {}
        },
    }
}

/// Parse a slash-separated path (`"name/items/0"` or `"/name/items/0"`).
///
/// Segments made only of digits become indices. `~1` and `~0` are
/// unescaped as in JSON Pointer.
pub fn parse_path(s: &str) -> Vec<PathSegment> {
    let trimmed = s.trim_start_matches('#').trim_start_matches('/');
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed
        .split('/')
        .map(|part| {
            let key = part.replace("~1", "/").replace("~0", "~");
            if !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit()) {
                match key.parse::<usize>() {
                    Ok(i) => PathSegment::Index(i),
                    Err(_) => PathSegment::Key(key),
                }
            } else {
                PathSegment::Key(key)
            }
        })
        .collect()
}
