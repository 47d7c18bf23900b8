//! Core types for the patch engine.

use serde_json::Value;
use thiserror::Error;

pub use case_json_pointer::Path;

// ── Error ─────────────────────────────────────────────────────────────────

/// Structural failure while applying an operation.
///
/// Paths are carried as formatted JSON Pointer strings.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PatchError {
    #[error("NOT_FOUND: {path}")]
    NotFound { path: String },
    #[error("WRONG_KIND: {path} is not a container for the next segment")]
    WrongKind { path: String },
    #[error("INVALID_INDEX: {path}")]
    InvalidIndex { path: String },
    #[error("TEST: {path} expected {expected}, found {}", display_actual(.actual))]
    TestFailed {
        path: String,
        expected: Value,
        actual: Option<Value>,
    },
    #[error("MOVE_INTO_CHILD: cannot move {from} into {path}")]
    MoveIntoChild { from: String, path: String },
    #[error("INVALID_OP: {0}")]
    InvalidOp(String),
}

fn display_actual(actual: &Option<Value>) -> String {
    match actual {
        Some(v) => v.to_string(),
        None => "nothing".to_string(),
    }
}

// ── Op enum ───────────────────────────────────────────────────────────────

/// A JSON Patch operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    /// Insert at `path`. On a sequence parent `-` appends and an index
    /// inserts before that position.
    Add { path: Path, value: Value },
    Remove { path: Path },
    Replace { path: Path, value: Value },
    Move { path: Path, from: Path },
    /// Duplicate the value at `from` into `path`.
    Copy { path: Path, from: Path },
    /// Assert that the value at `path` equals `value`.
    Test { path: Path, value: Value },
}

impl Op {
    /// Returns the wire name of the operation.
    pub fn op_name(&self) -> &'static str {
        match self {
            Op::Add { .. } => "add",
            Op::Remove { .. } => "remove",
            Op::Replace { .. } => "replace",
            Op::Move { .. } => "move",
            Op::Copy { .. } => "copy",
            Op::Test { .. } => "test",
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Op::Add { path, .. }
            | Op::Remove { path }
            | Op::Replace { path, .. }
            | Op::Move { path, .. }
            | Op::Copy { path, .. }
            | Op::Test { path, .. } => path,
        }
    }

    /// The value carried by `add`, `replace` and `test`.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Op::Add { value, .. } | Op::Replace { value, .. } | Op::Test { value, .. } => {
                Some(value)
            }
            _ => None,
        }
    }

    /// The last segment of the target path, `None` for the root.
    pub fn last_key(&self) -> Option<&str> {
        self.path().last().map(String::as_str)
    }

    pub fn pointer(&self) -> String {
        case_json_pointer::format_json_pointer(self.path())
    }
}
