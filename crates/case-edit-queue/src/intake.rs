use tokio::sync::mpsc;

use crate::error::EditError;
use crate::in_flight::InFlight;
use crate::intent::EditIntent;
use crate::EntityId;

/// An intent together with the ids it holds in flight.
#[derive(Debug)]
pub(crate) struct Submitted {
    pub(crate) intent: EditIntent,
    pub(crate) ids: Vec<EntityId>,
}

/// Sending half of the edit queue.
#[derive(Debug, Clone)]
pub(crate) struct Intake {
    tx: mpsc::UnboundedSender<Submitted>,
    in_flight: InFlight,
}

impl Intake {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Submitted>, in_flight: InFlight) -> Self {
        Self { tx, in_flight }
    }

    /// Mark the intent's ids in flight and enqueue it. The ids are visible
    /// as in flight before this returns.
    pub(crate) fn submit(&self, intent: EditIntent) -> Result<Vec<EntityId>, EditError> {
        let ids = intent.entity_ids();
        self.in_flight.acquire(&ids);
        let submitted = Submitted {
            intent,
            ids: ids.clone(),
        };
        if self.tx.send(submitted).is_err() {
            self.in_flight.release(&ids);
            return Err(EditError::Closed);
        }
        Ok(ids)
    }
}
