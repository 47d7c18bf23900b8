//! Batching of rapid highlight requests into one save.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use indexmap::IndexMap;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::intake::Intake;
use crate::intent::EditIntent;
use crate::EntityId;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Accumulates highlight requests and submits them as a single
/// [`EditIntent::Highlight`] once no request has arrived for `delay`.
///
/// A later request for the same entity overwrites the earlier one.
#[derive(Debug)]
pub(crate) struct HighlightDebouncer {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    delay: Duration,
    runtime: Handle,
    intake: Intake,
    pending: Mutex<IndexMap<EntityId, Option<String>>>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl HighlightDebouncer {
    pub(crate) fn new(delay: Duration, intake: Intake, runtime: Handle) -> Self {
        Self {
            inner: Arc::new(Inner {
                delay,
                runtime,
                intake,
                pending: Mutex::new(IndexMap::new()),
                timer: Mutex::new(None),
            }),
        }
    }

    /// The timer runs on the runtime the debouncer was built with, so this
    /// may be called from any thread.
    pub(crate) fn push(&self, id: EntityId, color: Option<String>) {
        lock(&self.inner.pending).insert(id, color);

        let inner = Arc::clone(&self.inner);
        let task = self.inner.runtime.spawn(async move {
            tokio::time::sleep(inner.delay).await;
            inner.flush();
        });
        if let Some(previous) = lock(&self.inner.timer).replace(task) {
            previous.abort();
        }
    }

    /// Number of entities waiting for the timer.
    pub(crate) fn pending(&self) -> usize {
        lock(&self.inner.pending).len()
    }

    /// Stop the timer and discard the pending batch. Returns how many
    /// highlights were discarded.
    pub(crate) fn cancel(&self) -> usize {
        if let Some(task) = lock(&self.inner.timer).take() {
            task.abort();
        }
        let discarded = std::mem::take(&mut *lock(&self.inner.pending)).len();
        if discarded > 0 {
            debug!(discarded, "discarded pending highlights");
        }
        discarded
    }
}

impl Drop for HighlightDebouncer {
    fn drop(&mut self) {
        if let Some(task) = lock(&self.inner.timer).take() {
            task.abort();
        }
    }
}

impl Inner {
    fn flush(&self) {
        let colors = std::mem::take(&mut *lock(&self.pending));
        if colors.is_empty() {
            return;
        }
        debug!(count = colors.len(), "submitting highlight batch");
        if let Err(err) = self.intake.submit(EditIntent::Highlight { colors }) {
            warn!(error = %err, "dropped highlight batch");
        }
    }
}
