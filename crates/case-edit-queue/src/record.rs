//! The in-memory case aggregate and the view published from it.

use case_changelog::{ops_of, ChangeLogEntry, ChangeLogError, ChangeLogs};
use case_json_patch::Op;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::store::{CaseSnapshot, EntitySnapshot, SaveAck};
use crate::EntityId;

/// An entity's base value, its recorded change logs, and the value those
/// logs project to.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRecord {
    base: Value,
    change_logs: Vec<ChangeLogEntry>,
    displayed: Value,
}

impl EntityRecord {
    pub fn new(base: Value) -> Self {
        Self {
            displayed: base.clone(),
            base,
            change_logs: Vec::new(),
        }
    }

    pub fn from_snapshot(
        snapshot: EntitySnapshot,
        logs: &ChangeLogs,
    ) -> Result<Self, ChangeLogError> {
        let displayed = logs.apply(&snapshot.base, &ops_of(&snapshot.change_logs))?;
        Ok(Self {
            base: snapshot.base,
            change_logs: snapshot.change_logs,
            displayed,
        })
    }

    pub fn base(&self) -> &Value {
        &self.base
    }

    pub fn change_logs(&self) -> &[ChangeLogEntry] {
        &self.change_logs
    }

    /// `base` with every change log applied in order.
    pub fn displayed(&self) -> &Value {
        &self.displayed
    }
}

/// Local consequence of a save, folded in once the server accepts it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Effect {
    Append {
        id: EntityId,
        ops: Vec<Op>,
        displayed: Value,
    },
    Insert {
        id: EntityId,
        value: Value,
    },
    Delete {
        id: EntityId,
    },
    Reset {
        id: EntityId,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseRecord {
    case_id: String,
    e_tag: u64,
    updated_at: Option<String>,
    updated_by: Option<String>,
    entities: IndexMap<EntityId, EntityRecord>,
}

impl CaseRecord {
    pub fn from_snapshots(
        case: CaseSnapshot,
        entities: Vec<EntitySnapshot>,
        logs: &ChangeLogs,
    ) -> Result<Self, ChangeLogError> {
        let entities = entities
            .into_iter()
            .map(|snapshot| {
                let id = snapshot.id.clone();
                EntityRecord::from_snapshot(snapshot, logs).map(|record| (id, record))
            })
            .collect::<Result<IndexMap<_, _>, _>>()?;
        Ok(Self {
            case_id: case.case_id,
            e_tag: case.e_tag,
            updated_at: case.updated_at,
            updated_by: case.updated_by,
            entities,
        })
    }

    pub fn case_id(&self) -> &str {
        &self.case_id
    }

    pub fn e_tag(&self) -> u64 {
        self.e_tag
    }

    pub fn entity(&self, id: &str) -> Option<&EntityRecord> {
        self.entities.get(id)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn view(&self) -> CaseView {
        CaseView {
            case_id: self.case_id.clone(),
            e_tag: self.e_tag,
            updated_at: self.updated_at.clone(),
            updated_by: self.updated_by.clone(),
            entities: self
                .entities
                .iter()
                .map(|(id, record)| (id.clone(), record.displayed.clone()))
                .collect(),
        }
    }

    /// Fold an accepted save into the aggregate. Returns the ids whose
    /// displayed value must be re-rendered.
    pub(crate) fn settle(&mut self, ack: &SaveAck, effects: Vec<Effect>) -> Vec<EntityId> {
        self.e_tag = ack.e_tag;
        self.updated_at = Some(ack.updated_at.clone());
        self.updated_by = Some(ack.updated_by.clone());

        let mut touched = Vec::with_capacity(effects.len());
        for effect in effects {
            match effect {
                Effect::Append { id, ops, displayed } => {
                    if let Some(record) = self.entities.get_mut(&id) {
                        record.change_logs.extend(ops.into_iter().map(|op| {
                            ChangeLogEntry::new(op, ack.e_tag, &ack.updated_at, &ack.updated_by)
                        }));
                        record.displayed = displayed;
                        touched.push(id);
                    }
                }
                Effect::Insert { id, value } => {
                    self.entities.insert(id.clone(), EntityRecord::new(value));
                    touched.push(id);
                }
                Effect::Delete { id } => {
                    self.entities.shift_remove(&id);
                }
                Effect::Reset { id } => {
                    if let Some(record) = self.entities.get_mut(&id) {
                        record.change_logs.clear();
                        record.displayed = record.base.clone();
                        touched.push(id);
                    }
                }
            }
        }
        touched
    }
}

/// Immutable snapshot of a case as displayed to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseView {
    pub case_id: String,
    pub e_tag: u64,
    pub updated_at: Option<String>,
    pub updated_by: Option<String>,
    pub entities: IndexMap<EntityId, Value>,
}

impl CaseView {
    pub fn entity(&self, id: &str) -> Option<&Value> {
        self.entities.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use case_json_patch::Op;
    use serde_json::json;

    fn record() -> CaseRecord {
        let case = CaseSnapshot {
            case_id: "case-1".into(),
            e_tag: 3,
            updated_at: None,
            updated_by: None,
        };
        let entities = vec![EntitySnapshot {
            id: "txn-1".into(),
            base: json!({"amount": 1}),
            change_logs: vec![ChangeLogEntry::new(
                Op::Replace {
                    path: vec!["amount".into()],
                    value: json!(2),
                },
                3,
                "2024-01-01T00:00:00Z",
                "analyst",
            )],
        }];
        CaseRecord::from_snapshots(case, entities, &ChangeLogs::default()).unwrap()
    }

    fn ack(e_tag: u64) -> SaveAck {
        SaveAck {
            e_tag,
            updated_at: "2024-01-02T00:00:00Z".into(),
            updated_by: "reviewer".into(),
        }
    }

    #[test]
    fn displayed_value_replays_logs() {
        let record = record();
        let entity = record.entity("txn-1").unwrap();
        assert_eq!(entity.base(), &json!({"amount": 1}));
        assert_eq!(entity.displayed(), &json!({"amount": 2}));
        assert_eq!(record.view().entity("txn-1"), Some(&json!({"amount": 2})));
    }

    #[test]
    fn corrupt_logs_fail_to_load() {
        let case = CaseSnapshot {
            case_id: "case-1".into(),
            e_tag: 1,
            updated_at: None,
            updated_by: None,
        };
        let entities = vec![EntitySnapshot {
            id: "txn-1".into(),
            base: json!({}),
            change_logs: vec![ChangeLogEntry::new(
                Op::Remove {
                    path: vec!["missing".into()],
                },
                1,
                "t",
                "u",
            )],
        }];
        assert!(CaseRecord::from_snapshots(case, entities, &ChangeLogs::default()).is_err());
    }

    #[test]
    fn settle_stamps_appended_logs() {
        let mut record = record();
        let op = Op::Add {
            path: vec!["currency".into()],
            value: json!("CAD"),
        };
        let touched = record.settle(
            &ack(4),
            vec![Effect::Append {
                id: "txn-1".into(),
                ops: vec![op.clone()],
                displayed: json!({"amount": 2, "currency": "CAD"}),
            }],
        );
        assert_eq!(touched, vec!["txn-1".to_string()]);
        assert_eq!(record.e_tag(), 4);
        let entity = record.entity("txn-1").unwrap();
        assert_eq!(entity.change_logs().len(), 2);
        assert_eq!(entity.change_logs()[1].op, op);
        assert_eq!(entity.change_logs()[1].e_tag, 4);
        assert_eq!(entity.change_logs()[1].updated_by, "reviewer");
        assert_eq!(entity.displayed(), &json!({"amount": 2, "currency": "CAD"}));
    }

    #[test]
    fn settle_reset_insert_and_delete() {
        let mut record = record();
        let touched = record.settle(
            &ack(4),
            vec![
                Effect::Reset { id: "txn-1".into() },
                Effect::Insert {
                    id: "txn-2".into(),
                    value: json!({"amount": 5}),
                },
            ],
        );
        assert_eq!(touched, vec!["txn-1".to_string(), "txn-2".to_string()]);
        let entity = record.entity("txn-1").unwrap();
        assert!(entity.change_logs().is_empty());
        assert_eq!(entity.displayed(), &json!({"amount": 1}));

        let touched = record.settle(&ack(5), vec![Effect::Delete { id: "txn-1".into() }]);
        assert!(touched.is_empty());
        assert!(record.entity("txn-1").is_none());
        let ids: Vec<_> = record.view().entities.keys().cloned().collect();
        assert_eq!(ids, vec!["txn-2".to_string()]);
    }
}
