//! Scoring rules injected into the engine.

use crate::catalog::TaskId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or applying engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Default task {id} is not in the task catalog")]
    UnknownDefaultTask { id: TaskId },
}

/// Point values and matching rules for every event.
///
/// Missing keys in a JSON document fall back to the reference values:
///
/// ```rust
/// use wellquest::engine::EngineConfig;
///
/// let config = EngineConfig::from_json_str(r#"{"study_start_bonus": 15}"#).unwrap();
/// assert_eq!(config.study_start_bonus, 15);
/// assert_eq!(config.points_per_minute, 2);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Points per whole minute of a completed task
    pub points_per_minute: u64,
    /// Flat credit for starting a study session
    pub study_start_bonus: u64,
    /// Debit for stopping a study session early
    pub study_stop_penalty: u64,
    /// Credit for naming this app as the most used one
    pub self_report_bonus: u64,
    /// Labels that count as naming this app, compared case-insensitively
    pub self_report_aliases: Vec<String>,
    /// Task credited when a completion names none
    pub default_task_id: TaskId,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            points_per_minute: 2,
            study_start_bonus: 10,
            study_stop_penalty: 5,
            self_report_bonus: 20,
            self_report_aliases: vec![
                "wellness app".to_string(),
                "this app".to_string(),
                "this one".to_string(),
            ],
            default_task_id: 1,
        }
    }
}

impl EngineConfig {
    /// Load from JSON. Aliases are lowercased once here.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_json::from_str(raw)?;
        config.self_report_aliases = config
            .self_report_aliases
            .iter()
            .map(|alias| alias.to_lowercase())
            .collect();
        Ok(config)
    }

    /// Whether `label` names this app. Case-insensitive exact match; whitespace counts.
    pub fn is_self_report(&self, label: &str) -> bool {
        let label = label.to_lowercase();
        self.self_report_aliases
            .iter()
            .any(|alias| alias.to_lowercase() == label)
    }
}
