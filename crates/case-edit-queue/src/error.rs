use case_changelog::ChangeLogError;
use thiserror::Error;

use crate::EntityId;

/// Failure reported by a [`CaseStore`](crate::CaseStore).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The eTag sent with a save no longer matches the server's.
    #[error("version conflict: sent eTag {sent}")]
    Conflict { sent: u64 },
    #[error("{0}")]
    Other(String),
}

/// Failure of an edit intent.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EditError {
    /// Integrity rejection or patch failure while resolving the edit.
    #[error(transparent)]
    ChangeLog(#[from] ChangeLogError),
    #[error("case {case_id} changed on the server (sent eTag {sent})")]
    Conflict { case_id: String, sent: u64 },
    #[error("persistence failed: {0}")]
    Persistence(String),
    #[error("unknown entity {0}")]
    UnknownEntity(EntityId),
    /// An added entity's id is already taken.
    #[error("entity {0} already exists")]
    DuplicateEntity(EntityId),
    #[error("edit session is closed")]
    Closed,
    #[error("edit worker stopped: {0}")]
    Worker(String),
}

impl EditError {
    pub(crate) fn from_store(case_id: &str, err: StoreError) -> Self {
        match err {
            StoreError::Conflict { sent } => EditError::Conflict { case_id: case_id.to_string(), sent },
            StoreError::Other(msg) => EditError::Persistence(msg),
        }
    }
}
