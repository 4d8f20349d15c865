//! Routing configuration from TOML (`[routing]` section)

use expense_domain::RoutingWindows;
use serde::{Deserialize, Serialize};

/// Raw routing configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRoutingConfig {
    /// Allow requests to run through several agents
    pub collaboration_enabled: bool,
    /// Recent decisions summarized for the routing prompt
    pub context_window: usize,
    /// Decisions aggregated into per-agent success rates
    pub performance_window: usize,
    /// Decisions needed before a success rate is reported
    pub min_decisions: usize,
    /// Characters of text shown to the routing oracle
    pub preview_chars: usize,
}

impl Default for FileRoutingConfig {
    fn default() -> Self {
        let windows = RoutingWindows::default();
        Self {
            collaboration_enabled: true,
            context_window: windows.context,
            performance_window: windows.performance,
            min_decisions: windows.min_decisions,
            preview_chars: 200,
        }
    }
}

impl FileRoutingConfig {
    pub fn windows(&self) -> RoutingWindows {
        RoutingWindows {
            context: self.context_window,
            performance: self.performance_window,
            min_decisions: self.min_decisions,
        }
    }
}
