//! Change logs for case-record transactions.
//!
//! Wraps the structural diff of `case-json-patch` with the case rules:
//!
//! 1. operations on hidden, audit and flow-of-funds keys are dropped;
//! 2. `replace`s between indistinguishable empty states (`""`, `null`,
//!    absent, `[]`) are dropped, but `false` always counts;
//! 3. a toggle may not be switched off while its dependent field holds
//!    data ([`ChangeLogError::DependentNotEmpty`]);
//! 4. bulk edits drop removals and whole-element collection changes.
//!
//! ```
//! use case_changelog::{generate_change_logs, GenerateOptions};
//! use serde_json::json;
//!
//! let before = json!({"txnId": "a", "purposeOfTxn": null});
//! let after = json!({"txnId": "b", "purposeOfTxn": ""});
//! assert!(generate_change_logs(&before, &after, GenerateOptions::default())
//!     .unwrap()
//!     .is_empty());
//! ```

pub mod changelog;
pub mod config;
pub mod entry;
pub mod error;
pub mod filter;

pub use changelog::{apply_change_logs, generate_change_logs, ChangeLogs, GenerateOptions};
pub use config::{ChangeLogConfig, DependentRule, ToggleKind};
pub use entry::{ops_of, ChangeLogEntry};
pub use error::{ChangeLogError, EntryError};
