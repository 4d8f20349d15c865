//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw logging configuration from TOML
///
/// # Example
///
/// ```toml
/// [logging]
/// level = "info"                       # used when no -v flag is given
/// directory = "~/.local/state/expense-agent"
/// event_log = "./events.jsonl"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Tracing filter directive
    pub level: Option<String>,
    /// Directory for daily rolling log files
    pub directory: Option<PathBuf>,
    /// JSONL file for structured execution events
    pub event_log: Option<PathBuf>,
}
