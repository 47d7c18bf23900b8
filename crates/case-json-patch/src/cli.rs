//! Core logic for the `case-diff` and `case-patch` binaries.

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::{apply_patch, diff, from_json_patch, to_json_patch, PatchError};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Patch(#[from] PatchError),
}

/// Diff two JSON documents and return the patch as pretty-printed JSON.
pub fn diff_documents(before_json: &str, after_json: &str) -> Result<String, CliError> {
    let before: Value = serde_json::from_str(before_json)?;
    let after: Value = serde_json::from_str(after_json)?;
    let ops = diff(&before, &after);
    debug!(ops = ops.len(), "computed diff");
    Ok(serde_json::to_string_pretty(&to_json_patch(&ops))?)
}

/// Apply a JSON Patch to a document and return the result as pretty-printed JSON.
pub fn apply_json_patch(doc_json: &str, patch_json: &str) -> Result<String, CliError> {
    let doc: Value = serde_json::from_str(doc_json)?;
    let ops_raw: Value = serde_json::from_str(patch_json)?;
    let ops = from_json_patch(&ops_raw)?;
    debug!(ops = ops.len(), "applying patch");
    let result = apply_patch(doc, &ops)?;
    Ok(serde_json::to_string_pretty(&result)?)
}
