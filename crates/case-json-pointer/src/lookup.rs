//! Typed navigation through `serde_json::Value` documents.

use serde_json::Value;

use crate::types::Lookup;
use crate::validate::parse_index;

/// Walks `path` from `doc`, reporting where and why the walk stopped.
///
/// The `-` segment (one past the end of a sequence) never resolves to a value.
pub fn lookup<'a>(doc: &'a Value, path: &[String]) -> Lookup<&'a Value> {
    let mut current = doc;
    for (depth, step) in path.iter().enumerate() {
        current = match current {
            Value::Object(map) => match map.get(step) {
                Some(v) => v,
                None => return Lookup::NotFound { depth },
            },
            Value::Array(arr) => {
                if step == "-" {
                    return Lookup::NotFound { depth };
                }
                let Some(idx) = parse_index(step) else {
                    return Lookup::WrongKind { depth };
                };
                match arr.get(idx) {
                    Some(v) => v,
                    None => return Lookup::NotFound { depth },
                }
            }
            _ => return Lookup::WrongKind { depth },
        };
    }
    Lookup::Found(current)
}

/// Mutable counterpart of [`lookup`].
pub fn lookup_mut<'a>(doc: &'a mut Value, path: &[String]) -> Lookup<&'a mut Value> {
    let mut current = doc;
    for (depth, step) in path.iter().enumerate() {
        current = match current {
            Value::Object(map) => match map.get_mut(step) {
                Some(v) => v,
                None => return Lookup::NotFound { depth },
            },
            Value::Array(arr) => {
                if step == "-" {
                    return Lookup::NotFound { depth };
                }
                let Some(idx) = parse_index(step) else {
                    return Lookup::WrongKind { depth };
                };
                match arr.get_mut(idx) {
                    Some(v) => v,
                    None => return Lookup::NotFound { depth },
                }
            }
            _ => return Lookup::WrongKind { depth },
        };
    }
    Lookup::Found(current)
}

/// Get a value by path, `None` on any miss.
pub fn get<'a>(doc: &'a Value, path: &[String]) -> Option<&'a Value> {
    lookup(doc, path).found()
}

/// Get a mutable value by path, `None` on any miss.
pub fn get_mut<'a>(doc: &'a mut Value, path: &[String]) -> Option<&'a mut Value> {
    lookup_mut(doc, path).found()
}
