//! Collaborators the pipeline consumes: persistence and error reporting.

use async_trait::async_trait;
use case_changelog::ChangeLogEntry;
use case_json_patch::Op;
use serde_json::Value;
use tracing::error;

use crate::error::{EditError, StoreError};
use crate::EntityId;

/// Case-level fields of a fetched case record.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseSnapshot {
    pub case_id: String,
    pub e_tag: u64,
    pub updated_at: Option<String>,
    pub updated_by: Option<String>,
}

/// One entity as stored: its base value and the change logs recorded on it.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub base: Value,
    pub change_logs: Vec<ChangeLogEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityChangeLogs {
    pub id: EntityId,
    pub ops: Vec<Op>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewEntity {
    pub id: EntityId,
    pub value: Value,
}

/// What a single versioned save carries.
#[derive(Debug, Clone, PartialEq)]
pub enum SavePayload {
    ChangeLogs(Vec<EntityChangeLogs>),
    Add(Vec<NewEntity>),
    Remove(Vec<EntityId>),
    /// Discard every change log recorded on these entities.
    Reset(Vec<EntityId>),
}

impl SavePayload {
    pub fn entity_ids(&self) -> Vec<&str> {
        match self {
            SavePayload::ChangeLogs(items) => items.iter().map(|c| c.id.as_str()).collect(),
            SavePayload::Add(items) => items.iter().map(|e| e.id.as_str()).collect(),
            SavePayload::Remove(ids) | SavePayload::Reset(ids) => {
                ids.iter().map(String::as_str).collect()
            }
        }
    }
}

/// Server acknowledgement of a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveAck {
    pub e_tag: u64,
    pub updated_at: String,
    pub updated_by: String,
}

/// Versioned persistence for case records.
///
/// `save` must reject with [`StoreError::Conflict`] when `e_tag` does not
/// match the version the server holds, without applying anything.
#[async_trait]
pub trait CaseStore: Send + Sync {
    async fn save(&self, case_id: &str, e_tag: u64, payload: &SavePayload) -> Result<SaveAck, StoreError>;

    async fn fetch_case(&self, case_id: &str) -> Result<CaseSnapshot, StoreError>;

    async fn fetch_entities(&self, case_id: &str) -> Result<Vec<EntitySnapshot>, StoreError>;
}

/// Sink for failures that must not stop the pipeline.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, error: &EditError);
}

/// Reports by logging at `error` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, err: &EditError) {
        error!(error = %err, "edit failed");
    }
}
