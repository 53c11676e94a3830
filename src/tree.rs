//! Pure operations over the state tree.
//!
//! The tree is a plain [`serde_json::Value`]. Every function here leaves its
//! inputs untouched and hands back owned results, so callers can never reach
//! into a host's slot through a returned value.

use crate::error::{Error, Result};
use crate::keypath::{Key, Path};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// How many `null`s a single write may append to pad a sequence.
pub const MAX_PADDING: usize = 1024;

/// Convert any serializable value into a tree.
pub fn from_plain<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

/// Convert a tree (or subtree) into a typed value.
pub fn to_plain<T: DeserializeOwned>(tree: &Value) -> Result<T> {
    Ok(T::deserialize(tree)?)
}

/// Look up the node at `path`. Returns `None` if any segment is missing.
pub fn get_in<'a>(tree: &'a Value, path: &Path) -> Option<&'a Value> {
    path.keys().iter().try_fold(tree, child)
}

/// Whether `path` names an existing node (a stored `null` counts as present).
pub fn has_in(tree: &Value, path: &Path) -> bool {
    get_in(tree, path).is_some()
}

/// Return a copy of `tree` with `value` stored at `path`.
///
/// Intermediate nodes that are missing or `null` are created as empty
/// mappings. Indexing a sequence past its end pads it with `null`, up to
/// [`MAX_PADDING`] new slots; a farther index fails with
/// [`Error::IndexOutOfRange`]. Walking through a scalar fails with
/// [`Error::PathConflict`].
///
/// # Examples
///
/// ```
/// use statelens::{path, tree};
/// use serde_json::json;
///
/// let before = json!({"foo": {"qwerty": 2}});
/// let after = tree::set_in(&before, &path!("foo", "bar", "baz"), json!(2)).unwrap();
/// assert_eq!(after, json!({"foo": {"bar": {"baz": 2}, "qwerty": 2}}));
/// assert_eq!(before, json!({"foo": {"qwerty": 2}}));
/// ```
pub fn set_in(tree: &Value, path: &Path, value: Value) -> Result<Value> {
    let mut next = tree.clone();
    write_at(&mut next, path, 0, value)?;
    Ok(next)
}

/// Shallow merge: top-level keys of `partial` replace those of `tree`.
///
/// Both sides must be mappings.
pub fn merge(tree: &Value, partial: &Value) -> Result<Value> {
    let Value::Object(incoming) = partial else {
        return Err(Error::NotAMapping {
            found: type_name(partial),
        });
    };
    let mut merged = match tree {
        Value::Object(map) => map.clone(),
        Value::Null => Map::new(),
        other => {
            return Err(Error::NotAMapping {
                found: type_name(other),
            });
        }
    };
    for (key, value) in incoming {
        merged.insert(key.clone(), value.clone());
    }
    Ok(Value::Object(merged))
}

/// A short human-readable name for the kind of node `value` is.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn child<'a>(node: &'a Value, key: &Key) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map.get(&key.as_field()),
        Value::Array(items) => items.get(key.as_index()?),
        _ => None,
    }
}

fn write_at(node: &mut Value, path: &Path, depth: usize, value: Value) -> Result<()> {
    let Some(key) = path.keys().get(depth) else {
        *node = value;
        return Ok(());
    };

    if node.is_null() {
        *node = Value::Object(Map::new());
    }

    let slot = match node {
        Value::Object(map) => map.entry(key.as_field()).or_insert(Value::Null),
        Value::Array(items) => {
            let Some(index) = key.as_index() else {
                return Err(conflict(path, depth, "array"));
            };
            if index >= items.len() {
                let len = items.len();
                let new_len = index
                    .checked_add(1)
                    .filter(|&new_len| new_len - len <= MAX_PADDING)
                    .ok_or_else(|| Error::IndexOutOfRange {
                        path: path.prefix(depth),
                        index,
                        len,
                    })?;
                items.resize(new_len, Value::Null);
            }
            &mut items[index]
        }
        other => return Err(conflict(path, depth, type_name(other))),
    };

    write_at(slot, path, depth + 1, value)
}

fn conflict(path: &Path, depth: usize, found: &'static str) -> Error {
    Error::PathConflict {
        path: path.prefix(depth),
        found,
    }
}
