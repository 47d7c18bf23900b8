//! Per-operation filters: ignored equivalences and bulk-edit suppression.

use case_json_patch::Op;
use case_json_pointer::get;
use serde_json::Value;

/// `null`, `""` and `[]`: the values a form treats as "not filled in".
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        _ => false,
    }
}

/// Emptiness used by the dependent-property rules. `false` and `0` hold data.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(m) => m.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// `None` stands for an absent key.
fn is_nullish(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

fn is_empty_str(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::String(s)) if s.is_empty())
}

fn is_empty_array(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::Array(a)) if a.is_empty())
}

/// The pairs a reviewer cannot tell apart: `""`, `null`, absent, and `[]`
/// against `null`/absent. Never `false`.
pub fn is_ignored_equivalence(old: Option<&Value>, new: Option<&Value>) -> bool {
    let one_way = |a: Option<&Value>, b: Option<&Value>| {
        is_nullish(a) && (is_nullish(b) || is_empty_str(b) || is_empty_array(b))
    };
    one_way(old, new) || one_way(new, old)
}

fn parent_is_object(doc: &Value, path: &[String]) -> bool {
    match path.split_last() {
        Some((_, parent)) => matches!(get(doc, parent), Some(Value::Object(_))),
        None => false,
    }
}

/// True when `op` only moves a field between equivalent empty states.
///
/// `before` is the document the operation was diffed from. `add` and
/// `remove` count only when they target an object key, where absence is
/// the "undefined" side of the equivalence.
pub fn is_noop_change(op: &Op, before: &Value) -> bool {
    match op {
        Op::Replace { path, value } => is_ignored_equivalence(get(before, path), Some(value)),
        Op::Add { path, value } => {
            parent_is_object(before, path) && is_ignored_equivalence(None, Some(value))
        }
        Op::Remove { path } => {
            parent_is_object(before, path) && is_ignored_equivalence(get(before, path), None)
        }
        _ => false,
    }
}

/// True for a path naming a whole element of one of `collections`,
/// e.g. `/startingActions/2`.
pub fn is_collection_element_root(path: &[String], collections: &[String]) -> bool {
    match path {
        [collection, index] => {
            collections.iter().any(|c| c == collection)
                && !index.is_empty()
                && index.bytes().all(|b| b.is_ascii_digit())
        }
        _ => false,
    }
}
