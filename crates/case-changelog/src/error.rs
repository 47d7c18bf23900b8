use case_json_patch::PatchError;
use thiserror::Error;

/// Failure while generating or applying change logs.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ChangeLogError {
    /// A toggle was switched off (or away from its required value, or
    /// removed) while its dependent field still holds data.
    #[error("{dependent} must be empty when {toggle} is changed (at {path})")]
    DependentNotEmpty {
        toggle: String,
        dependent: String,
        path: String,
    },
    /// The dependent-property tables disagree with each other. This is a
    /// configuration defect, not a user error.
    #[error("unknown dependent property {dependent} for toggle {toggle}")]
    UnknownDependentProperty { toggle: String, dependent: String },
    #[error(transparent)]
    Patch(#[from] PatchError),
}

impl ChangeLogError {
    /// True for the dependent-property failures raised during generation.
    pub fn is_integrity(&self) -> bool {
        !matches!(self, ChangeLogError::Patch(_))
    }
}

/// A persisted change-log entry that cannot be read back.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EntryError {
    #[error(transparent)]
    Op(#[from] PatchError),
    #[error("{field} is required")]
    MissingField { field: &'static str },
    #[error("{field} has the wrong type")]
    WrongType { field: &'static str },
}
