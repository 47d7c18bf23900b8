use indexmap::{IndexMap, IndexSet};
use serde_json::Value;

use crate::store::NewEntity;
use crate::EntityId;

/// A user edit waiting to be resolved and saved.
#[derive(Debug, Clone, PartialEq)]
pub enum EditIntent {
    /// Record the edit from the entity's displayed value to `after`.
    Save { id: EntityId, after: Value },
    /// Overlay the same partial form onto every listed entity.
    BulkSave { ids: Vec<EntityId>, form: Value },
    /// Set (or clear, with `None`) the highlight color of each entity.
    Highlight { colors: IndexMap<EntityId, Option<String>> },
    Add { entities: Vec<NewEntity> },
    Reset { ids: Vec<EntityId> },
    Remove { ids: Vec<EntityId> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntentKind {
    Save,
    BulkSave,
    Highlight,
    Add,
    Reset,
    Remove,
}

impl EditIntent {
    pub fn kind(&self) -> IntentKind {
        match self {
            EditIntent::Save { .. } => IntentKind::Save,
            EditIntent::BulkSave { .. } => IntentKind::BulkSave,
            EditIntent::Highlight { .. } => IntentKind::Highlight,
            EditIntent::Add { .. } => IntentKind::Add,
            EditIntent::Reset { .. } => IntentKind::Reset,
            EditIntent::Remove { .. } => IntentKind::Remove,
        }
    }

    /// Entities the intent touches, without duplicates, in first-seen order.
    pub fn entity_ids(&self) -> Vec<EntityId> {
        let ids: IndexSet<EntityId> = match self {
            EditIntent::Save { id, .. } => std::iter::once(id.clone()).collect(),
            EditIntent::BulkSave { ids, .. }
            | EditIntent::Reset { ids }
            | EditIntent::Remove { ids } => ids.iter().cloned().collect(),
            EditIntent::Highlight { colors } => colors.keys().cloned().collect(),
            EditIntent::Add { entities } => entities.iter().map(|e| e.id.clone()).collect(),
        };
        ids.into_iter().collect()
    }
}
