//! Tables that drive change-log filtering and integrity checks.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a toggle controls its dependent field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToggleKind {
    /// The dependent may hold data only while the toggle is truthy.
    Boolean,
    /// The dependent may hold data only while the toggle equals `required`
    /// (trimmed, case-insensitive).
    Enumerated { required: String },
}

impl ToggleKind {
    /// True when `value` switches the toggle off for its dependent.
    pub fn is_off(&self, value: &Value) -> bool {
        match self {
            ToggleKind::Boolean => is_falsy(value),
            ToggleKind::Enumerated { required } => !value
                .as_str()
                .is_some_and(|s| s.trim().eq_ignore_ascii_case(required.trim())),
        }
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::Array(_) | Value::Object(_) => false,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependentRule {
    pub toggle: String,
    #[serde(flatten)]
    pub kind: ToggleKind,
}

/// Change-log rules for a case record.
///
/// `dependent_properties` is keyed by dependent field, `toggle_dependents`
/// by toggle field; the two must agree. [`ChangeLogConfig::with_dependent`]
/// keeps them in step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangeLogConfig {
    pub hidden_key_prefix: String,
    pub ignored_keys: BTreeSet<String>,
    pub ignored_key_prefixes: Vec<String>,
    pub dependent_properties: BTreeMap<String, DependentRule>,
    pub toggle_dependents: BTreeMap<String, Vec<String>>,
    /// Repeating sub-entity collections whose whole elements bulk edits
    /// never add or replace.
    pub bulk_element_collections: Vec<String>,
}

impl ChangeLogConfig {
    /// An empty rule set: nothing ignored, no dependents, no collections.
    pub fn empty() -> Self {
        Self {
            hidden_key_prefix: String::new(),
            ignored_keys: BTreeSet::new(),
            ignored_key_prefixes: Vec::new(),
            dependent_properties: BTreeMap::new(),
            toggle_dependents: BTreeMap::new(),
            bulk_element_collections: Vec::new(),
        }
    }

    /// Register `dependent` as controlled by `toggle`.
    pub fn with_dependent(mut self, dependent: &str, toggle: &str, kind: ToggleKind) -> Self {
        self.dependent_properties.insert(
            dependent.to_string(),
            DependentRule { toggle: toggle.to_string(), kind },
        );
        let deps = self.toggle_dependents.entry(toggle.to_string()).or_default();
        if !deps.iter().any(|d| d == dependent) {
            deps.push(dependent.to_string());
        }
        self
    }

    /// True when operations targeting `key` are never recorded.
    pub fn is_ignored_key(&self, key: &str) -> bool {
        (!self.hidden_key_prefix.is_empty() && key.starts_with(&self.hidden_key_prefix))
            || self.ignored_keys.contains(key)
            || self.ignored_key_prefixes.iter().any(|p| key.starts_with(p.as_str()))
    }
}

impl Default for ChangeLogConfig {
    fn default() -> Self {
        let other = || ToggleKind::Enumerated { required: "Other".to_string() };
        let mut config = Self::empty();
        config.hidden_key_prefix = "_".to_string();
        config.ignored_keys = ["caseRecordId", "eTag", "txnId"]
            .into_iter()
            .map(String::from)
            .collect();
        config.ignored_key_prefixes = vec!["flowOfFunds".to_string()];
        config.bulk_element_collections =
            vec!["startingActions".to_string(), "completingActions".to_string()];
        config
            .with_dependent("accountHolders", "hasAccountHolders", ToggleKind::Boolean)
            .with_dependent("conductors", "wasCondInfoObtained", ToggleKind::Boolean)
            .with_dependent("onBehalfOf", "wasConductedOnBehalf", ToggleKind::Boolean)
            .with_dependent("involvedIn", "wasAnyOtherSubInvolved", ToggleKind::Boolean)
            .with_dependent("beneficiaries", "wasBenInfoObtained", ToggleKind::Boolean)
            .with_dependent("methodOfTxnOther", "methodOfTxn", other())
            .with_dependent("typeOfFundsOther", "typeOfFunds", other())
            .with_dependent("detailsOfDispoOther", "detailsOfDispo", other())
            .with_dependent("accountTypeOther", "accountType", other())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_ignores_hidden_audit_and_flow_of_funds() {
        let config = ChangeLogConfig::default();
        assert!(config.is_ignored_key("_hiddenValidation"));
        assert!(config.is_ignored_key("eTag"));
        assert!(config.is_ignored_key("caseRecordId"));
        assert!(config.is_ignored_key("flowOfFundsAmount"));
        assert!(!config.is_ignored_key("amount"));
        assert!(!config.is_ignored_key("flow"));
    }

    #[test]
    fn default_tables_agree() {
        let config = ChangeLogConfig::default();
        for (toggle, deps) in &config.toggle_dependents {
            for dep in deps {
                assert_eq!(&config.dependent_properties[dep].toggle, toggle);
            }
        }
    }

    #[test]
    fn boolean_toggle_off_values() {
        let kind = ToggleKind::Boolean;
        assert!(kind.is_off(&json!(false)));
        assert!(kind.is_off(&json!(null)));
        assert!(kind.is_off(&json!("")));
        assert!(kind.is_off(&json!(0)));
        assert!(!kind.is_off(&json!(true)));
        assert!(!kind.is_off(&json!("yes")));
    }

    #[test]
    fn enumerated_toggle_matches_trimmed_case_insensitive() {
        let kind = ToggleKind::Enumerated { required: "Other".into() };
        assert!(!kind.is_off(&json!("Other")));
        assert!(!kind.is_off(&json!("  oTHER ")));
        assert!(kind.is_off(&json!("Cash")));
        assert!(kind.is_off(&json!(null)));
    }
}
