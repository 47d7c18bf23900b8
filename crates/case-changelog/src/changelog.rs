//! Change-log generation and application.

use case_json_patch::{apply_patch, diff, Op};
use case_json_pointer::{format_json_pointer, get};
use serde_json::Value;
use tracing::debug;

use crate::config::ChangeLogConfig;
use crate::error::ChangeLogError;
use crate::filter::{is_blank, is_collection_element_root, is_empty_value, is_noop_change};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Bulk edits never delete and never add or replace whole collection
    /// elements.
    pub is_bulk_edit: bool,
}

impl GenerateOptions {
    pub fn bulk() -> Self {
        Self { is_bulk_edit: true }
    }
}

/// Change-log generator bound to a rule set.
#[derive(Debug, Clone, Default)]
pub struct ChangeLogs {
    config: ChangeLogConfig,
}

impl ChangeLogs {
    pub fn new(config: ChangeLogConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ChangeLogConfig {
        &self.config
    }

    /// Compute the change logs that record the edit from `before` to `after`.
    ///
    /// Fails with an integrity error, and records nothing, when a toggle
    /// change would strand data in its dependent field.
    pub fn generate(
        &self,
        before: &Value,
        after: &Value,
        options: GenerateOptions,
    ) -> Result<Vec<Op>, ChangeLogError> {
        let mut logs: Vec<Op> = diff(before, after)
            .into_iter()
            .filter(|op| self.keep(op, before))
            .collect();

        self.check_dependents(&logs, after)?;

        if options.is_bulk_edit {
            logs.retain(|op| self.keep_for_bulk(op));
        }
        Ok(logs)
    }

    /// Replay `logs` onto a copy of `before`. `before` is never touched,
    /// even when a log fails to apply.
    pub fn apply(&self, before: &Value, logs: &[Op]) -> Result<Value, ChangeLogError> {
        Ok(apply_patch(before.clone(), logs)?)
    }

    fn keep(&self, op: &Op, before: &Value) -> bool {
        if let Some(key) = op.last_key() {
            if self.config.is_ignored_key(key) {
                debug!(path = %op.pointer(), "dropping change to ignored key");
                return false;
            }
        }
        if is_noop_change(op, before) {
            debug!(path = %op.pointer(), op = op.op_name(), "dropping equivalent empty change");
            return false;
        }
        true
    }

    fn keep_for_bulk(&self, op: &Op) -> bool {
        if matches!(op, Op::Remove { .. }) {
            debug!(path = %op.pointer(), "bulk edit: dropping remove");
            return false;
        }
        if is_collection_element_root(op.path(), &self.config.bulk_element_collections) {
            debug!(path = %op.pointer(), "bulk edit: dropping whole-element change");
            return false;
        }
        true
    }

    fn check_dependents(&self, logs: &[Op], after: &Value) -> Result<(), ChangeLogError> {
        for op in logs {
            let Some((toggle, parent)) = op.path().split_last() else {
                continue;
            };
            let Some(dependents) = self.config.toggle_dependents.get(toggle) else {
                continue;
            };
            for dependent in dependents {
                let rule = self
                    .config
                    .dependent_properties
                    .get(dependent)
                    .filter(|rule| &rule.toggle == toggle)
                    .ok_or_else(|| ChangeLogError::UnknownDependentProperty {
                        toggle: toggle.clone(),
                        dependent: dependent.clone(),
                    })?;

                let mut dep_path = parent.to_vec();
                dep_path.push(dependent.clone());
                let holds_data = get(after, &dep_path).is_some_and(|v| !is_empty_value(v));
                if !holds_data {
                    continue;
                }

                let switched_off = match op {
                    Op::Remove { .. } => true,
                    Op::Add { value, .. } | Op::Replace { value, .. } => rule.kind.is_off(value),
                    _ => false,
                };
                if switched_off {
                    let path = format_json_pointer(&dep_path);
                    debug!(%toggle, %dependent, %path, "rejecting change: dependent not empty");
                    return Err(ChangeLogError::DependentNotEmpty {
                        toggle: toggle.clone(),
                        dependent: dependent.clone(),
                        path,
                    });
                }
            }
        }
        Ok(())
    }

    /// Build the "after" value of a bulk edit for one entity.
    ///
    /// Maps merge key by key, sequences merge by position, and a form scalar
    /// wins only when it is filled in. Form elements beyond the entity's
    /// sequence are kept so that [`generate`](Self::generate) can drop them
    /// as whole-element additions; a configured collection missing from the
    /// entity is never created.
    pub fn overlay_bulk(&self, before: &Value, form: &Value) -> Value {
        match (before, form) {
            (Value::Object(b), Value::Object(f)) => {
                let mut out = b.clone();
                for (key, form_val) in f {
                    let merged = match b.get(key) {
                        Some(before_val) => self.overlay_bulk(before_val, form_val),
                        None if is_unset(form_val) => continue,
                        None if self.config.bulk_element_collections.contains(key) => continue,
                        None => form_val.clone(),
                    };
                    out.insert(key.clone(), merged);
                }
                Value::Object(out)
            }
            (Value::Array(b), Value::Array(f)) => {
                let len = b.len().max(f.len());
                let merged = (0..len)
                    .filter_map(|i| match (b.get(i), f.get(i)) {
                        (Some(bv), Some(fv)) => Some(self.overlay_bulk(bv, fv)),
                        (Some(bv), None) => Some(bv.clone()),
                        (None, Some(fv)) => Some(fv.clone()),
                        (None, None) => None,
                    })
                    .collect();
                Value::Array(merged)
            }
            (_, f) if is_unset(f) => before.clone(),
            (_, f) => f.clone(),
        }
    }
}

/// A form value that sets nothing: blank, or a map of such values.
fn is_unset(value: &Value) -> bool {
    match value {
        Value::Object(m) => m.values().all(is_unset),
        other => is_blank(other),
    }
}

/// [`ChangeLogs::generate`] with the default case rules.
pub fn generate_change_logs(
    before: &Value,
    after: &Value,
    options: GenerateOptions,
) -> Result<Vec<Op>, ChangeLogError> {
    ChangeLogs::default().generate(before, after, options)
}

/// [`ChangeLogs::apply`] with the default case rules.
pub fn apply_change_logs(before: &Value, logs: &[Op]) -> Result<Value, ChangeLogError> {
    ChangeLogs::default().apply(before, logs)
}
