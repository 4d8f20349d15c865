//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.

mod agent;
mod ledger;
mod logging;
mod oracle;
mod routing;

pub use agent::FileAgentConfig;
pub use ledger::FileLedgerConfig;
pub use logging::FileLoggingConfig;
pub use oracle::FileOracleConfig;
pub use routing::FileRoutingConfig;

use expense_application::BehaviorConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigValidationError {
    #[error("oracle.timeout_secs cannot be 0")]
    InvalidTimeout,

    #[error("oracle.model cannot be empty")]
    EmptyModelName,

    #[error("oracle.temperature must be within 0.0..=2.0, got {0}")]
    TemperatureOutOfRange(f32),

    #[error("agent.similarity_threshold must be within 0.0..=1.0, got {0}")]
    ThresholdOutOfRange(f64),

    #[error("ledger.path cannot be empty")]
    EmptyLedgerPath,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Generative service settings
    pub oracle: FileOracleConfig,
    /// Where saved expenses go
    pub ledger: FileLedgerConfig,
    /// Planning and memory settings
    pub agent: FileAgentConfig,
    /// Manager routing settings
    pub routing: FileRoutingConfig,
    /// Tracing and event log settings
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut issues = Vec::new();

        if self.oracle.timeout_secs == 0 {
            issues.push(ConfigValidationError::InvalidTimeout);
        }
        if self.oracle.model.trim().is_empty() {
            issues.push(ConfigValidationError::EmptyModelName);
        }
        if !(0.0..=2.0).contains(&self.oracle.temperature) {
            issues.push(ConfigValidationError::TemperatureOutOfRange(
                self.oracle.temperature,
            ));
        }
        if !(0.0..=1.0).contains(&self.agent.similarity_threshold) {
            issues.push(ConfigValidationError::ThresholdOutOfRange(
                self.agent.similarity_threshold,
            ));
        }
        if self.ledger.path.as_os_str().is_empty() {
            issues.push(ConfigValidationError::EmptyLedgerPath);
        }

        issues
    }

    /// Application behavior derived from the `[agent]` and `[routing]` sections.
    pub fn behavior(&self) -> BehaviorConfig {
        BehaviorConfig {
            max_adaptations: self.agent.max_adaptations,
            similar_experience_limit: self.agent.similar_experience_limit,
            similarity_threshold: self.agent.similarity_threshold,
            memory_capacity: self.agent.memory_capacity,
            collaboration_enabled: self.routing.collaboration_enabled,
            routing: self.routing.windows(),
            routing_preview_chars: self.routing.preview_chars,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[oracle]
api_key = "secret"
model = "gemini-1.5-pro"
temperature = 0.2

[ledger]
path = "/tmp/expenses.csv"

[agent]
max_adaptations = 1

[routing]
collaboration_enabled = false
min_decisions = 5

[logging]
level = "debug"
event_log = "/tmp/events.jsonl"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.oracle.api_key.as_deref(), Some("secret"));
        assert_eq!(config.oracle.model, "gemini-1.5-pro");
        assert_eq!(config.ledger.path.to_str(), Some("/tmp/expenses.csv"));
        assert_eq!(config.logging.level.as_deref(), Some("debug"));

        let behavior = config.behavior();
        assert_eq!(behavior.max_adaptations, 1);
        assert!(!behavior.collaboration_enabled);
        assert_eq!(behavior.routing.min_decisions, 5);
        assert_eq!(behavior.routing.context, 20);
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: FileConfig = toml::from_str("[oracle]\ntimeout_secs = 10\n").unwrap();
        assert_eq!(config.oracle.timeout_secs, 10);
        assert_eq!(config.oracle.model, FileOracleConfig::default().model);
        assert_eq!(config.agent, FileAgentConfig::default());
    }

    #[test]
    fn test_default_behavior_matches_application_defaults() {
        let from_file = FileConfig::default().behavior();
        let defaults = BehaviorConfig::default();
        assert_eq!(from_file.max_adaptations, defaults.max_adaptations);
        assert_eq!(from_file.memory_capacity, defaults.memory_capacity);
        assert_eq!(from_file.routing, defaults.routing);
        assert_eq!(from_file.routing_preview_chars, defaults.routing_preview_chars);
    }

    #[test]
    fn test_validate() {
        assert!(FileConfig::default().validate().is_empty());

        let mut config = FileConfig::default();
        config.oracle.timeout_secs = 0;
        config.oracle.model = " ".into();
        config.agent.similarity_threshold = 1.5;
        assert_eq!(
            config.validate(),
            vec![
                ConfigValidationError::InvalidTimeout,
                ConfigValidationError::EmptyModelName,
                ConfigValidationError::ThresholdOutOfRange(1.5),
            ]
        );
    }
}
