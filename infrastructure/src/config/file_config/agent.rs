//! Agent configuration from TOML (`[agent]` section)

use expense_domain::agent::memory::{
    DEFAULT_MEMORY_CAPACITY, DEFAULT_SIMILAR_LIMIT, DEFAULT_SIMILARITY_THRESHOLD,
};
use serde::{Deserialize, Serialize};

/// Raw agent configuration from TOML
///
/// # Example
///
/// ```toml
/// [agent]
/// max_adaptations = 3
/// similar_experience_limit = 5
/// similarity_threshold = 0.3
/// memory_capacity = 1000
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentConfig {
    /// Plan replacements allowed per request
    pub max_adaptations: usize,
    pub similar_experience_limit: usize,
    pub similarity_threshold: f64,
    pub memory_capacity: usize,
}

impl Default for FileAgentConfig {
    fn default() -> Self {
        Self {
            max_adaptations: 3,
            similar_experience_limit: DEFAULT_SIMILAR_LIMIT,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            memory_capacity: DEFAULT_MEMORY_CAPACITY,
        }
    }
}
