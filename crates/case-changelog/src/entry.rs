//! Persisted change-log entries.

use case_json_patch::{from_json, to_json, Op};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::EntryError;

/// An operation stamped with the version and audit data of the save that
/// persisted it.
///
/// Serialized as the operation object plus `eTag`, `updatedAt` and
/// `updatedBy`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeLogEntry {
    pub op: Op,
    pub e_tag: u64,
    pub updated_at: String,
    pub updated_by: String,
}

impl ChangeLogEntry {
    pub fn new(op: Op, e_tag: u64, updated_at: &str, updated_by: &str) -> Self {
        Self {
            op,
            e_tag,
            updated_at: updated_at.to_string(),
            updated_by: updated_by.to_string(),
        }
    }

    pub fn to_json(&self) -> Value {
        let mut value = to_json(&self.op);
        if let Value::Object(m) = &mut value {
            m.insert("eTag".into(), Value::from(self.e_tag));
            m.insert("updatedAt".into(), Value::String(self.updated_at.clone()));
            m.insert("updatedBy".into(), Value::String(self.updated_by.clone()));
        }
        value
    }

    pub fn from_json(value: &Value) -> Result<Self, EntryError> {
        let op = from_json(value)?;
        let field = |field: &'static str| value.get(field).ok_or(EntryError::MissingField { field });
        let e_tag = field("eTag")?
            .as_u64()
            .ok_or(EntryError::WrongType { field: "eTag" })?;
        let text = |name: &'static str| -> Result<String, EntryError> {
            field(name)?
                .as_str()
                .map(str::to_string)
                .ok_or(EntryError::WrongType { field: name })
        };
        Ok(Self {
            op,
            e_tag,
            updated_at: text("updatedAt")?,
            updated_by: text("updatedBy")?,
        })
    }
}

/// Strip audit data, leaving the replayable operations.
pub fn ops_of(entries: &[ChangeLogEntry]) -> Vec<Op> {
    entries.iter().map(|e| e.op.clone()).collect()
}

impl Serialize for ChangeLogEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ChangeLogEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        ChangeLogEntry::from_json(&raw).map_err(serde::de::Error::custom)
    }
}
