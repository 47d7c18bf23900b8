//! Structural diff and JSON Patch engine for case-record documents.
//!
//! Documents are `serde_json::Value` trees. [`diff`] produces a
//! deterministic list of [`Op`]s; [`apply_patch`] replays them. The engine
//! has no domain knowledge: filtering and integrity rules live in
//! `case-changelog`.
//!
//! # Operations
//!
//! `add`, `remove`, `replace`, `move`, `copy`, `test`, serialized as
//! `{ "op", "path", "value"?, "from"? }` with RFC 6901 pointer strings.
//!
//! ```
//! use case_json_patch::{apply_patch, diff};
//! use serde_json::json;
//!
//! let before = json!(["a", "c"]);
//! let after = json!(["b", "c", "a", 5]);
//! let ops = diff(&before, &after);
//! assert_eq!(apply_patch(before, &ops).unwrap(), after);
//! ```

pub mod apply;
pub mod cli;
pub mod codec;
pub mod diff;
pub mod types;

pub use apply::{apply_op, apply_ops, apply_patch};
pub use codec::{from_json, from_json_patch, to_json, to_json_patch};
pub use diff::diff;
pub use types::{Op, PatchError, Path};
