//! Optimistic, serialized editing of a versioned case record.
//!
//! An [`EditSession`] owns the in-memory aggregate of one case. Edits are
//! submitted as [`EditIntent`]s and handled strictly one at a time:
//!
//! - the intent is resolved into change logs against the displayed value;
//! - integrity failures are reported without contacting the store;
//! - the save carries the current eTag, and a conflict refetches the case.
//!
//! Storage and error reporting are supplied through the [`CaseStore`] and
//! [`ErrorReporter`] traits.

pub mod config;
mod debounce;
pub mod error;
mod in_flight;
mod intake;
pub mod intent;
pub mod record;
mod session;
pub mod store;
mod worker;

pub type EntityId = String;

pub use config::EditQueueConfig;
pub use error::{EditError, StoreError};
pub use in_flight::InFlightState;
pub use intent::{EditIntent, IntentKind};
pub use record::{CaseRecord, CaseView, EntityRecord};
pub use session::EditSession;
pub use store::{
    CaseSnapshot, CaseStore, EntityChangeLogs, EntitySnapshot, ErrorReporter, NewEntity,
    SaveAck, SavePayload, TracingReporter,
};
pub use worker::EditEvent;
