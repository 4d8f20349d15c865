//! Application-level configuration.
//!
//! [`BehaviorConfig`] groups the knobs that control how agents plan and adapt
//! and how the manager routes. Infrastructure maps file configuration into it.

use expense_domain::RoutingWindows;
use expense_domain::agent::memory::{
    DEFAULT_MEMORY_CAPACITY, DEFAULT_SIMILAR_LIMIT, DEFAULT_SIMILARITY_THRESHOLD,
};

/// Application behavior configuration.
#[derive(Debug, Clone)]
pub struct BehaviorConfig {
    /// Plan replacements allowed per request before giving up.
    pub max_adaptations: usize,
    /// Similar experiences handed to the planning prompt.
    pub similar_experience_limit: usize,
    /// Context similarity an experience must exceed to be recalled.
    pub similarity_threshold: f64,
    /// Experiences kept per agent before the oldest half is dropped.
    pub memory_capacity: usize,
    /// Whether the manager may run several agents for one request.
    pub collaboration_enabled: bool,
    pub routing: RoutingWindows,
    /// Text preview length sent to the routing oracle.
    pub routing_preview_chars: usize,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            max_adaptations: 3,
            similar_experience_limit: DEFAULT_SIMILAR_LIMIT,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            memory_capacity: DEFAULT_MEMORY_CAPACITY,
            collaboration_enabled: true,
            routing: RoutingWindows::default(),
            routing_preview_chars: 200,
        }
    }
}

impl BehaviorConfig {
    pub fn with_max_adaptations(mut self, max: usize) -> Self {
        self.max_adaptations = max;
        self
    }

    pub fn with_collaboration(mut self, enabled: bool) -> Self {
        self.collaboration_enabled = enabled;
        self
    }

    pub fn with_routing(mut self, routing: RoutingWindows) -> Self {
        self.routing = routing;
        self
    }
}
