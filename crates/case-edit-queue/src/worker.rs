//! The single consumer of the edit queue.
//!
//! Each intent runs to completion before the next is taken: resolve it
//! against the current aggregate, save it under the current eTag, then
//! settle. Settlement publishes the new view before the intent's ids
//! leave the in-flight set.

use std::sync::Arc;

use case_changelog::{ChangeLogs, GenerateOptions};
use serde_json::Value;
use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, info, info_span, warn, Instrument};

use crate::error::{EditError, StoreError};
use crate::in_flight::InFlight;
use crate::intake::Submitted;
use crate::intent::{EditIntent, IntentKind};
use crate::record::{CaseRecord, CaseView, Effect};
use crate::store::{CaseStore, EntityChangeLogs, ErrorReporter, SavePayload};
use crate::EntityId;

/// Outcome notifications, one or more per processed intent.
#[derive(Debug, Clone, PartialEq)]
pub enum EditEvent {
    /// The server accepted the save; `recompute` lists the entities whose
    /// displayed value changed.
    Saved {
        kind: IntentKind,
        e_tag: u64,
        recompute: Vec<EntityId>,
    },
    /// The intent produced nothing to save.
    NoChanges { kind: IntentKind },
    /// The server rejected the eTag; a refetch follows.
    Conflict { kind: IntentKind, sent_e_tag: u64 },
    /// The aggregate was replaced from the server.
    Refetched { e_tag: u64 },
    Failed { kind: IntentKind, error: EditError },
}

/// A resolved intent: what to send, and what to fold in on success.
struct Pending {
    payload: SavePayload,
    effects: Vec<Effect>,
}

pub(crate) struct Worker {
    pub(crate) store: Arc<dyn CaseStore>,
    pub(crate) reporter: Arc<dyn ErrorReporter>,
    pub(crate) change_logs: ChangeLogs,
    pub(crate) highlight_field: String,
    pub(crate) record: CaseRecord,
    pub(crate) view: watch::Sender<Arc<CaseView>>,
    pub(crate) events: broadcast::Sender<EditEvent>,
    pub(crate) in_flight: InFlight,
}

impl Worker {
    pub(crate) async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Submitted>) -> CaseRecord {
        while let Some(Submitted { intent, ids }) = rx.recv().await {
            let span = info_span!(
                "edit",
                case_id = %self.record.case_id(),
                kind = ?intent.kind(),
                entities = ids.len()
            );
            self.process(intent).instrument(span).await;
            self.in_flight.release(&ids);
        }
        debug!(case_id = %self.record.case_id(), "edit queue drained");
        self.record
    }

    async fn process(&mut self, intent: EditIntent) {
        let kind = intent.kind();
        match self.resolve(intent) {
            Ok(Some(pending)) => self.save(kind, pending).await,
            Ok(None) => {
                debug!("nothing to save");
                self.emit(EditEvent::NoChanges { kind });
            }
            Err(err) => self.fail(kind, err),
        }
    }

    fn resolve(&self, intent: EditIntent) -> Result<Option<Pending>, EditError> {
        match intent {
            EditIntent::Save { id, after } => {
                self.resolve_edits(vec![(id, after)], GenerateOptions::default())
            }
            EditIntent::BulkSave { ids, form } => {
                let ids = dedup(ids);
                let mut edits = Vec::with_capacity(ids.len());
                for id in ids {
                    let before = self.displayed(&id)?;
                    let after = self.change_logs.overlay_bulk(before, &form);
                    edits.push((id, after));
                }
                self.resolve_edits(edits, GenerateOptions::bulk())
            }
            EditIntent::Highlight { colors } => {
                let mut edits = Vec::with_capacity(colors.len());
                for (id, color) in colors {
                    let mut after = self.displayed(&id)?.clone();
                    if let Value::Object(map) = &mut after {
                        match color {
                            Some(color) => {
                                map.insert(self.highlight_field.clone(), Value::String(color));
                            }
                            None => {
                                map.shift_remove(&self.highlight_field);
                            }
                        }
                    }
                    edits.push((id, after));
                }
                self.resolve_edits(edits, GenerateOptions::default())
            }
            EditIntent::Add { entities } => {
                if entities.is_empty() {
                    return Ok(None);
                }
                {
                    let mut seen = indexmap::IndexSet::new();
                    for entity in &entities {
                        let taken = self.record.entity(&entity.id).is_some();
                        if taken || !seen.insert(entity.id.as_str()) {
                            return Err(EditError::DuplicateEntity(entity.id.clone()));
                        }
                    }
                }
                let effects = entities
                    .iter()
                    .map(|entity| Effect::Insert {
                        id: entity.id.clone(),
                        value: entity.value.clone(),
                    })
                    .collect();
                Ok(Some(Pending {
                    payload: SavePayload::Add(entities),
                    effects,
                }))
            }
            EditIntent::Remove { ids } => {
                let ids: Vec<EntityId> = dedup(ids)
                    .into_iter()
                    .filter(|id| self.record.entity(id).is_some())
                    .collect();
                if ids.is_empty() {
                    return Ok(None);
                }
                let effects = ids.iter().map(|id| Effect::Delete { id: id.clone() }).collect();
                Ok(Some(Pending {
                    payload: SavePayload::Remove(ids),
                    effects,
                }))
            }
            EditIntent::Reset { ids } => {
                let ids: Vec<EntityId> = dedup(ids)
                    .into_iter()
                    .filter(|id| {
                        self.record
                            .entity(id)
                            .is_some_and(|record| !record.change_logs().is_empty())
                    })
                    .collect();
                if ids.is_empty() {
                    return Ok(None);
                }
                let effects = ids.iter().map(|id| Effect::Reset { id: id.clone() }).collect();
                Ok(Some(Pending {
                    payload: SavePayload::Reset(ids),
                    effects,
                }))
            }
        }
    }

    /// Generate change logs for each `(id, after)` pair. Any integrity
    /// failure rejects the whole intent before anything is sent.
    fn resolve_edits(
        &self,
        edits: Vec<(EntityId, Value)>,
        options: GenerateOptions,
    ) -> Result<Option<Pending>, EditError> {
        let mut changes = Vec::new();
        let mut effects = Vec::new();
        for (id, after) in edits {
            let before = self.displayed(&id)?;
            let ops = self.change_logs.generate(before, &after, options)?;
            if ops.is_empty() {
                continue;
            }
            let displayed = self.change_logs.apply(before, &ops)?;
            changes.push(EntityChangeLogs {
                id: id.clone(),
                ops: ops.clone(),
            });
            effects.push(Effect::Append { id, ops, displayed });
        }
        if changes.is_empty() {
            return Ok(None);
        }
        Ok(Some(Pending {
            payload: SavePayload::ChangeLogs(changes),
            effects,
        }))
    }

    fn displayed(&self, id: &str) -> Result<&Value, EditError> {
        self.record
            .entity(id)
            .map(|record| record.displayed())
            .ok_or_else(|| EditError::UnknownEntity(id.to_string()))
    }

    async fn save(&mut self, kind: IntentKind, pending: Pending) {
        let sent = self.record.e_tag();
        let case_id = self.record.case_id().to_string();
        match self.store.save(&case_id, sent, &pending.payload).await {
            Ok(ack) => {
                let recompute = self.record.settle(&ack, pending.effects);
                info!(e_tag = ack.e_tag, entities = recompute.len(), "saved");
                self.publish();
                self.emit(EditEvent::Saved {
                    kind,
                    e_tag: ack.e_tag,
                    recompute,
                });
            }
            Err(StoreError::Conflict { .. }) => {
                warn!(sent_e_tag = sent, "case changed on the server; refetching");
                self.emit(EditEvent::Conflict {
                    kind,
                    sent_e_tag: sent,
                });
                self.refetch().await;
            }
            Err(err) => self.fail(kind, EditError::from_store(&case_id, err)),
        }
    }

    /// Replace the aggregate with the server's copy. On failure the current
    /// aggregate stays.
    async fn refetch(&mut self) {
        let case_id = self.record.case_id().to_string();
        let fetched = async {
            let case = self.store.fetch_case(&case_id).await?;
            let entities = self.store.fetch_entities(&case_id).await?;
            Ok::<_, StoreError>((case, entities))
        }
        .await;

        let result = fetched
            .map_err(|err| EditError::from_store(&case_id, err))
            .and_then(|(case, entities)| {
                Ok(CaseRecord::from_snapshots(case, entities, &self.change_logs)?)
            });
        match result {
            Ok(record) => {
                self.record = record;
                info!(e_tag = self.record.e_tag(), "refetched case");
                self.publish();
                self.emit(EditEvent::Refetched {
                    e_tag: self.record.e_tag(),
                });
            }
            Err(err) => {
                warn!(error = %err, "refetch failed");
                self.reporter.report(&err);
            }
        }
    }

    fn fail(&self, kind: IntentKind, err: EditError) {
        warn!(error = %err, "edit rejected");
        self.reporter.report(&err);
        self.emit(EditEvent::Failed { kind, error: err });
    }

    fn publish(&self) {
        self.view.send_replace(Arc::new(self.record.view()));
    }

    fn emit(&self, event: EditEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

fn dedup(ids: Vec<EntityId>) -> Vec<EntityId> {
    let set: indexmap::IndexSet<EntityId> = ids.into_iter().collect();
    set.into_iter().collect()
}
