use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;

use case_changelog::ChangeLogs;
use serde_json::Value;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::info;

use crate::config::EditQueueConfig;
use crate::debounce::HighlightDebouncer;
use crate::error::EditError;
use crate::in_flight::{InFlight, InFlightState};
use crate::intake::Intake;
use crate::intent::EditIntent;
use crate::record::{CaseRecord, CaseView};
use crate::store::{CaseStore, ErrorReporter, NewEntity};
use crate::worker::{EditEvent, Worker};
use crate::EntityId;

/// Handle to the edit queue of one open case.
///
/// Intents submitted through the handle are saved one at a time, in
/// submission order, each against the eTag left by the previous one. The
/// displayed [`CaseView`] only changes once the server has accepted a save
/// or the case has been refetched after a conflict.
pub struct EditSession {
    case_id: String,
    intake: Intake,
    in_flight: InFlight,
    highlights: HighlightDebouncer,
    view: watch::Receiver<Arc<CaseView>>,
    events: broadcast::Sender<EditEvent>,
    worker: JoinHandle<CaseRecord>,
}

impl EditSession {
    /// Fetch the case and its entities and start the save worker on the
    /// current tokio runtime.
    pub async fn open(
        store: Arc<dyn CaseStore>,
        reporter: Arc<dyn ErrorReporter>,
        config: EditQueueConfig,
        case_id: &str,
    ) -> Result<Self, EditError> {
        let runtime = Handle::try_current().map_err(|err| EditError::Worker(err.to_string()))?;
        let case = store
            .fetch_case(case_id)
            .await
            .map_err(|err| EditError::from_store(case_id, err))?;
        let entities = store
            .fetch_entities(case_id)
            .await
            .map_err(|err| EditError::from_store(case_id, err))?;
        let change_logs = ChangeLogs::new(config.change_logs.clone());
        let record = CaseRecord::from_snapshots(case, entities, &change_logs)?;
        info!(
            case_id,
            e_tag = record.e_tag(),
            entities = record.entity_count(),
            "opened edit session"
        );

        let (view_tx, view) = watch::channel(Arc::new(record.view()));
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        let in_flight = InFlight::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let intake = Intake::new(tx, in_flight.clone());
        let highlights = HighlightDebouncer::new(
            config.highlight_debounce(),
            intake.clone(),
            runtime.clone(),
        );

        let worker = Worker {
            store,
            reporter,
            change_logs,
            highlight_field: config.highlight_field,
            record,
            view: view_tx,
            events: events.clone(),
            in_flight: in_flight.clone(),
        };
        let worker = runtime.spawn(worker.run(rx));

        Ok(Self {
            case_id: case_id.to_string(),
            intake,
            in_flight,
            highlights,
            view,
            events,
            worker,
        })
    }

    pub fn case_id(&self) -> &str {
        &self.case_id
    }

    /// The currently displayed case.
    pub fn view(&self) -> Arc<CaseView> {
        Arc::clone(&self.view.borrow())
    }

    pub fn subscribe_view(&self) -> watch::Receiver<Arc<CaseView>> {
        self.view.clone()
    }

    pub fn events(&self) -> broadcast::Receiver<EditEvent> {
        self.events.subscribe()
    }

    pub fn in_flight(&self) -> BTreeSet<EntityId> {
        self.in_flight.snapshot().ids()
    }

    pub fn is_in_flight(&self, id: &str) -> bool {
        self.in_flight.snapshot().contains(id)
    }

    pub fn subscribe_in_flight(&self) -> watch::Receiver<InFlightState> {
        self.in_flight.subscribe()
    }

    /// Enqueue an intent. Its ids are in flight when this returns.
    pub fn submit(&self, intent: EditIntent) -> Result<(), EditError> {
        self.intake.submit(intent).map(|_| ())
    }

    pub fn save(&self, id: impl Into<EntityId>, after: Value) -> Result<(), EditError> {
        self.submit(EditIntent::Save {
            id: id.into(),
            after,
        })
    }

    /// Apply the same partial `form` to every entity in `ids`.
    pub fn bulk_save(&self, ids: Vec<EntityId>, form: Value) -> Result<(), EditError> {
        self.submit(EditIntent::BulkSave { ids, form })
    }

    pub fn add(&self, entities: Vec<NewEntity>) -> Result<(), EditError> {
        self.submit(EditIntent::Add { entities })
    }

    pub fn reset(&self, ids: Vec<EntityId>) -> Result<(), EditError> {
        self.submit(EditIntent::Reset { ids })
    }

    pub fn remove(&self, ids: Vec<EntityId>) -> Result<(), EditError> {
        self.submit(EditIntent::Remove { ids })
    }

    /// Request a highlight color change. Requests are batched and saved
    /// together once they stop arriving; the ids enter the in-flight set
    /// when the batch is submitted. Callable from outside the runtime.
    pub fn highlight(&self, id: impl Into<EntityId>, color: Option<String>) {
        self.highlights.push(id.into(), color);
    }

    pub fn pending_highlights(&self) -> usize {
        self.highlights.pending()
    }

    /// Resolves once each of `ids` that is in flight now has settled.
    pub fn when_settled<I>(&self, ids: I) -> impl Future<Output = ()> + Send + 'static
    where
        I: IntoIterator<Item = EntityId>,
    {
        self.in_flight.when_settled(ids)
    }

    /// Stop accepting intents, discard any unsent highlight batch, and
    /// wait for the queued intents to settle. Returns the final view.
    pub async fn close(self) -> Result<CaseView, EditError> {
        let EditSession {
            case_id,
            intake,
            highlights,
            worker,
            ..
        } = self;
        let discarded = highlights.cancel();
        drop(highlights);
        drop(intake);

        let record = worker
            .await
            .map_err(|err| EditError::Worker(err.to_string()))?;
        info!(case_id = %case_id, e_tag = record.e_tag(), discarded, "closed edit session");
        Ok(record.view())
    }
}
