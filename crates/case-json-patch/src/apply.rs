//! Patch application.
//!
//! Operations mutate the target in place and in declared order. The only
//! validation performed is structural: a parent that cannot be reached, a
//! container of the wrong kind, or a `test` mismatch fails the operation.
//! Callers that need the original untouched must clone first.

use case_json_pointer::{format_json_pointer, is_child, lookup, lookup_mut, parse_index, Lookup};
use serde_json::Value;

use crate::types::{Op, PatchError};

// ── Path navigation ───────────────────────────────────────────────────────

fn miss_error<T>(path: &[String], res: Lookup<T>) -> Result<T, PatchError> {
    match res {
        Lookup::Found(v) => Ok(v),
        Lookup::NotFound { depth } => Err(PatchError::NotFound {
            path: format_json_pointer(&path[..=depth]),
        }),
        Lookup::WrongKind { depth } => Err(PatchError::WrongKind {
            path: format_json_pointer(&path[..depth]),
        }),
    }
}

fn parent_mut<'a>(doc: &'a mut Value, parent_path: &[String]) -> Result<&'a mut Value, PatchError> {
    miss_error(parent_path, lookup_mut(doc, parent_path))
}

fn index_of(path: &[String], key: &str) -> Result<usize, PatchError> {
    parse_index(key).ok_or_else(|| PatchError::InvalidIndex { path: format_json_pointer(path) })
}

fn not_found(path: &[String]) -> PatchError {
    PatchError::NotFound { path: format_json_pointer(path) }
}

fn wrong_kind(path: &[String]) -> PatchError {
    PatchError::WrongKind { path: format_json_pointer(path) }
}

// ── Individual operation applicators ─────────────────────────────────────

fn apply_add(doc: &mut Value, path: &[String], value: Value) -> Result<Option<Value>, PatchError> {
    let Some((key, parent_path)) = path.split_last() else {
        return Ok(Some(std::mem::replace(doc, value)));
    };
    match parent_mut(doc, parent_path)? {
        Value::Object(map) => Ok(map.insert(key.clone(), value)),
        Value::Array(arr) => {
            if key == "-" {
                arr.push(value);
                return Ok(None);
            }
            let idx = index_of(path, key)?;
            // Splice semantics: an index past the end appends.
            if idx >= arr.len() {
                arr.push(value);
            } else {
                arr.insert(idx, value);
            }
            Ok(None)
        }
        _ => Err(wrong_kind(parent_path)),
    }
}

fn apply_remove(doc: &mut Value, path: &[String]) -> Result<Option<Value>, PatchError> {
    let Some((key, parent_path)) = path.split_last() else {
        return Ok(Some(std::mem::take(doc)));
    };
    match parent_mut(doc, parent_path)? {
        Value::Object(map) => map.shift_remove(key).map(Some).ok_or_else(|| not_found(path)),
        Value::Array(arr) => {
            let idx = index_of(path, key)?;
            if idx >= arr.len() {
                return Err(not_found(path));
            }
            Ok(Some(arr.remove(idx)))
        }
        _ => Err(wrong_kind(parent_path)),
    }
}

fn apply_replace(doc: &mut Value, path: &[String], value: Value) -> Result<Option<Value>, PatchError> {
    let Some((key, parent_path)) = path.split_last() else {
        return Ok(Some(std::mem::replace(doc, value)));
    };
    match parent_mut(doc, parent_path)? {
        Value::Object(map) => match map.get_mut(key) {
            Some(slot) => Ok(Some(std::mem::replace(slot, value))),
            None => Err(not_found(path)),
        },
        Value::Array(arr) => {
            let idx = index_of(path, key)?;
            match arr.get_mut(idx) {
                Some(slot) => Ok(Some(std::mem::replace(slot, value))),
                None => Err(not_found(path)),
            }
        }
        _ => Err(wrong_kind(parent_path)),
    }
}

fn apply_copy(doc: &mut Value, path: &[String], from: &[String]) -> Result<Option<Value>, PatchError> {
    let src = miss_error(from, lookup(doc, from))?.clone();
    apply_add(doc, path, src)
}

fn apply_move(doc: &mut Value, path: &[String], from: &[String]) -> Result<Option<Value>, PatchError> {
    if path == from {
        return Ok(None);
    }
    if is_child(from, path) {
        return Err(PatchError::MoveIntoChild {
            from: format_json_pointer(from),
            path: format_json_pointer(path),
        });
    }
    let value = apply_remove(doc, from)?.ok_or_else(|| not_found(from))?;
    apply_add(doc, path, value)
}

fn apply_test(doc: &Value, path: &[String], expected: &Value) -> Result<(), PatchError> {
    let actual = lookup(doc, path).found();
    if actual == Some(expected) {
        return Ok(());
    }
    Err(PatchError::TestFailed {
        path: format_json_pointer(path),
        expected: expected.clone(),
        actual: actual.cloned(),
    })
}

// ── Main apply function ───────────────────────────────────────────────────

/// Apply a single operation to the document (in-place mutation).
///
/// Returns the value displaced at the target path, if any.
pub fn apply_op(doc: &mut Value, op: &Op) -> Result<Option<Value>, PatchError> {
    match op {
        Op::Add { path, value } => apply_add(doc, path, value.clone()),
        Op::Remove { path } => apply_remove(doc, path),
        Op::Replace { path, value } => apply_replace(doc, path, value.clone()),
        Op::Copy { path, from } => apply_copy(doc, path, from),
        Op::Move { path, from } => apply_move(doc, path, from),
        Op::Test { path, value } => {
            apply_test(doc, path, value)?;
            Ok(None)
        }
    }
}

/// Apply a sequence of operations in place, stopping at the first failure.
///
/// On failure `doc` holds the effects of the operations that preceded the
/// failing one.
pub fn apply_ops(doc: &mut Value, ops: &[Op]) -> Result<(), PatchError> {
    for op in ops {
        apply_op(doc, op)?;
    }
    Ok(())
}

/// Apply a sequence of operations to an owned document and return it.
pub fn apply_patch(mut doc: Value, ops: &[Op]) -> Result<Value, PatchError> {
    apply_ops(&mut doc, ops)?;
    Ok(doc)
}

// ── Tests ─────────────────────────────────────────────────────────────────
