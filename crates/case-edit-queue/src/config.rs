use std::time::Duration;

use case_changelog::ChangeLogConfig;
use serde::{Deserialize, Serialize};

/// Configuration for an [`EditSession`](crate::EditSession).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditQueueConfig {
    /// Quiet period after the last highlight request before the batch is
    /// submitted.
    pub highlight_debounce_ms: u64,
    /// Field a highlight writes on each entity.
    pub highlight_field: String,
    /// Buffer of the [`EditEvent`](crate::EditEvent) broadcast channel.
    pub event_capacity: usize,
    pub change_logs: ChangeLogConfig,
}

impl EditQueueConfig {
    pub fn highlight_debounce(&self) -> Duration {
        Duration::from_millis(self.highlight_debounce_ms)
    }
}

impl Default for EditQueueConfig {
    fn default() -> Self {
        Self {
            highlight_debounce_ms: 500,
            highlight_field: "highlightColor".to_string(),
            event_capacity: 64,
            change_logs: ChangeLogConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: EditQueueConfig = toml::from_str("highlight_debounce_ms = 250\n").unwrap();
        assert_eq!(config.highlight_debounce(), Duration::from_millis(250));
        assert_eq!(config.highlight_field, "highlightColor");
        assert_eq!(config.event_capacity, 64);
        assert_eq!(config.change_logs, ChangeLogConfig::default());
    }

    #[test]
    fn nested_change_log_rules() {
        let config: EditQueueConfig = toml::from_str(
            r#"
            event_capacity = 8

            [change_logs]
            ignored_keys = ["rev"]
            "#,
        )
        .unwrap();
        assert_eq!(config.event_capacity, 8);
        assert!(config.change_logs.is_ignored_key("rev"));
        assert!(config.change_logs.is_ignored_key("_draft"));
    }
}
