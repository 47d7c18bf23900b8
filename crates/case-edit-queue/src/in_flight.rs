//! Which entities have an edit queued or being saved.

use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

use crate::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    count: usize,
    /// Assigned when the id entered the set; a later entry gets a new one.
    generation: u64,
}

/// Snapshot of the in-flight set.
///
/// An id stays in flight while any intent touching it is unsettled. Each
/// entry into the set is stamped with a fresh generation, so a waiter can
/// tell that the id left even if it re-entered before the waiter looked.
/// Released ids leave nothing behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InFlightState {
    pending: BTreeMap<EntityId, Entry>,
    next_generation: u64,
}

impl InFlightState {
    pub fn contains(&self, id: &str) -> bool {
        self.pending.contains_key(id)
    }

    pub fn ids(&self) -> BTreeSet<EntityId> {
        self.pending.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    fn generation(&self, id: &str) -> Option<u64> {
        self.pending.get(id).map(|entry| entry.generation)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct InFlight {
    tx: Arc<watch::Sender<InFlightState>>,
}

impl InFlight {
    pub(crate) fn new() -> Self {
        let (tx, _) = watch::channel(InFlightState::default());
        Self { tx: Arc::new(tx) }
    }

    pub(crate) fn acquire(&self, ids: &[EntityId]) {
        if ids.is_empty() {
            return;
        }
        self.tx.send_modify(|state| {
            for id in ids {
                let generation = state.next_generation;
                let entry = state
                    .pending
                    .entry(id.clone())
                    .or_insert(Entry { count: 0, generation });
                if entry.generation == generation {
                    state.next_generation += 1;
                }
                entry.count += 1;
            }
        });
    }

    pub(crate) fn release(&self, ids: &[EntityId]) {
        if ids.is_empty() {
            return;
        }
        self.tx.send_modify(|state| {
            for id in ids {
                let Some(entry) = state.pending.get_mut(id) else {
                    continue;
                };
                entry.count -= 1;
                if entry.count == 0 {
                    state.pending.remove(id);
                }
            }
        });
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<InFlightState> {
        self.tx.subscribe()
    }

    pub(crate) fn snapshot(&self) -> InFlightState {
        self.tx.borrow().clone()
    }

    /// Resolves once every id that is in flight now has left the set at
    /// least once. Ids not in flight at the call are already settled.
    pub(crate) fn when_settled<I>(&self, ids: I) -> impl Future<Output = ()> + Send + 'static
    where
        I: IntoIterator<Item = EntityId>,
    {
        let mut rx = self.tx.subscribe();
        let mut waiting: Vec<(EntityId, u64)> = Vec::new();
        {
            let state = rx.borrow_and_update();
            for id in ids {
                if let Some(generation) = state.generation(&id) {
                    waiting.push((id, generation));
                }
            }
        }

        async move {
            loop {
                {
                    let state = rx.borrow_and_update();
                    waiting.retain(|(id, generation)| state.generation(id) == Some(*generation));
                }
                if waiting.is_empty() {
                    return;
                }
                if rx.changed().await.is_err() {
                    return;
                }
            }
        }
    }
}
