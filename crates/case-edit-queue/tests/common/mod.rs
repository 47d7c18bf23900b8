#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use case_changelog::ChangeLogEntry;
use case_edit_queue::{
    CaseSnapshot, CaseStore, EditError, EditQueueConfig, EditSession, EntitySnapshot,
    ErrorReporter, SaveAck, SavePayload, StoreError,
};
use case_json_patch::Op;
use indexmap::IndexMap;
use serde_json::{json, Value};
use tokio::sync::Notify;

pub const CASE_ID: &str = "case-1";

pub struct ServerState {
    pub e_tag: u64,
    pub entities: IndexMap<String, EntitySnapshot>,
    /// Every save attempt with the eTag it carried.
    pub saves: Vec<(u64, SavePayload)>,
    pub fail_next: Option<String>,
}

/// In-memory store that enforces eTags like the server does.
pub struct MemoryStore {
    state: Mutex<ServerState>,
    refetch_gate: Mutex<Option<Arc<Notify>>>,
}

impl MemoryStore {
    pub fn new(e_tag: u64, entities: Vec<(&str, Value)>) -> Arc<Self> {
        let entities = entities
            .into_iter()
            .map(|(id, base)| {
                let snapshot = EntitySnapshot {
                    id: id.to_string(),
                    base,
                    change_logs: Vec::new(),
                };
                (id.to_string(), snapshot)
            })
            .collect();
        Arc::new(Self {
            state: Mutex::new(ServerState {
                e_tag,
                entities,
                saves: Vec::new(),
                fail_next: None,
            }),
            refetch_gate: Mutex::new(None),
        })
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&mut ServerState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub fn saves(&self) -> Vec<(u64, SavePayload)> {
        self.with_state(|s| s.saves.clone())
    }

    pub fn fail_next_save(&self, message: &str) {
        self.with_state(|s| s.fail_next = Some(message.to_string()));
    }

    /// Hold `fetch_entities` until the returned handle is notified.
    pub fn gate_fetches(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.refetch_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    /// Another user records `op` on `id`, moving the server eTag on.
    pub fn concurrent_edit(&self, id: &str, op: Op) {
        self.with_state(|s| {
            s.e_tag += 1;
            let e_tag = s.e_tag;
            let entity = s.entities.get_mut(id).unwrap();
            entity
                .change_logs
                .push(ChangeLogEntry::new(op, e_tag, "2024-02-01T00:00:00Z", "colleague"));
        });
    }

    pub fn change_logs(&self, id: &str) -> Vec<ChangeLogEntry> {
        self.with_state(|s| s.entities[id].change_logs.clone())
    }
}

#[async_trait]
impl CaseStore for MemoryStore {
    async fn save(
        &self,
        case_id: &str,
        e_tag: u64,
        payload: &SavePayload,
    ) -> Result<SaveAck, StoreError> {
        assert_eq!(case_id, CASE_ID);
        let mut state = self.state.lock().unwrap();
        state.saves.push((e_tag, payload.clone()));
        if let Some(message) = state.fail_next.take() {
            return Err(StoreError::Other(message));
        }
        if e_tag != state.e_tag {
            return Err(StoreError::Conflict { sent: e_tag });
        }

        state.e_tag += 1;
        let ack = SaveAck {
            e_tag: state.e_tag,
            updated_at: format!("2024-01-01T00:00:{:02}Z", state.e_tag),
            updated_by: "analyst".to_string(),
        };
        match payload {
            SavePayload::ChangeLogs(items) => {
                for item in items {
                    let entity = state.entities.get_mut(&item.id).unwrap();
                    entity.change_logs.extend(item.ops.iter().map(|op| {
                        ChangeLogEntry::new(op.clone(), ack.e_tag, &ack.updated_at, &ack.updated_by)
                    }));
                }
            }
            SavePayload::Add(items) => {
                for item in items {
                    let snapshot = EntitySnapshot {
                        id: item.id.clone(),
                        base: item.value.clone(),
                        change_logs: Vec::new(),
                    };
                    state.entities.insert(item.id.clone(), snapshot);
                }
            }
            SavePayload::Remove(ids) => {
                for id in ids {
                    state.entities.shift_remove(id);
                }
            }
            SavePayload::Reset(ids) => {
                for id in ids {
                    if let Some(entity) = state.entities.get_mut(id) {
                        entity.change_logs.clear();
                    }
                }
            }
        }
        Ok(ack)
    }

    async fn fetch_case(&self, case_id: &str) -> Result<CaseSnapshot, StoreError> {
        let e_tag = self.with_state(|s| s.e_tag);
        Ok(CaseSnapshot {
            case_id: case_id.to_string(),
            e_tag,
            updated_at: None,
            updated_by: None,
        })
    }

    async fn fetch_entities(&self, _case_id: &str) -> Result<Vec<EntitySnapshot>, StoreError> {
        let gate = self.refetch_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Ok(self.with_state(|s| s.entities.values().cloned().collect()))
    }
}

#[derive(Default)]
pub struct CollectingReporter {
    errors: Mutex<Vec<EditError>>,
}

impl CollectingReporter {
    pub fn errors(&self) -> Vec<EditError> {
        self.errors.lock().unwrap().clone()
    }
}

impl ErrorReporter for CollectingReporter {
    fn report(&self, error: &EditError) {
        self.errors.lock().unwrap().push(error.clone());
    }
}

pub fn transaction(amount: i64) -> Value {
    json!({
        "txnId": "t-1",
        "amount": amount,
        "currency": "CAD",
        "purposeOfTxn": null,
        "wasCondInfoObtained": true,
        "conductors": [{"name": "Alex"}],
        "startingActions": [{"amount": amount, "currency": "CAD"}]
    })
}

pub fn default_store() -> Arc<MemoryStore> {
    MemoryStore::new(
        3,
        vec![
            ("txn-1", transaction(100)),
            ("txn-2", json!({"amount": 5, "startingActions": []})),
        ],
    )
}

pub async fn open(store: &Arc<MemoryStore>, reporter: &Arc<CollectingReporter>) -> EditSession {
    open_with(store, reporter, EditQueueConfig::default()).await
}

pub async fn open_with(
    store: &Arc<MemoryStore>,
    reporter: &Arc<CollectingReporter>,
    config: EditQueueConfig,
) -> EditSession {
    let store: Arc<dyn CaseStore> = store.clone();
    let reporter: Arc<dyn ErrorReporter> = reporter.clone();
    EditSession::open(store, reporter, config, CASE_ID).await.unwrap()
}
