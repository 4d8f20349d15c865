//! Per-agent experience memory.
//!
//! Every finished request is remembered as an [`Experience`]. Planning looks
//! up similar experiences by comparing the key sets of the request contexts.

use super::entities::Plan;
use super::value_objects::{AgentOutcome, ContextMap};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Default similarity a past experience must exceed to be recalled.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.3;
/// Default number of similar experiences handed to planning.
pub const DEFAULT_SIMILAR_LIMIT: usize = 5;
/// Default number of experiences kept before the oldest half is dropped.
pub const DEFAULT_MEMORY_CAPACITY: usize = 1000;

/// One remembered request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub timestamp: DateTime<Utc>,
    pub context: ContextMap,
    pub plan_id: String,
    pub goal: String,
    pub task_count: usize,
    pub success: bool,
    /// Outcome message on success, error on failure
    pub summary: String,
}

/// Jaccard index of the key sets of two contexts.
///
/// Two empty contexts are identical and score 1.0.
pub fn context_similarity(a: &ContextMap, b: &ContextMap) -> f64 {
    let a: HashSet<&String> = a.keys().collect();
    let b: HashSet<&String> = b.keys().collect();
    let union = a.union(&b).count();
    if union == 0 {
        return 1.0;
    }
    a.intersection(&b).count() as f64 / union as f64
}

/// Key under which a plan shape is counted: `<goal>_<task count>`.
pub fn pattern_key(goal: &str, task_count: usize) -> String {
    format!("{}_{}", goal, task_count)
}

/// Experience log plus success/failure counters per plan pattern.
#[derive(Debug, Clone)]
pub struct AgentMemory {
    experiences: Vec<Experience>,
    successful_patterns: BTreeMap<String, usize>,
    failed_patterns: BTreeMap<String, usize>,
    capacity: usize,
    threshold: f64,
}

impl Default for AgentMemory {
    fn default() -> Self {
        Self::new(DEFAULT_MEMORY_CAPACITY, DEFAULT_SIMILARITY_THRESHOLD)
    }
}

impl AgentMemory {
    pub fn new(capacity: usize, threshold: f64) -> Self {
        Self {
            experiences: Vec::new(),
            successful_patterns: BTreeMap::new(),
            failed_patterns: BTreeMap::new(),
            capacity: capacity.max(2),
            threshold,
        }
    }

    /// Record the outcome of executing `plan` for `context`.
    pub fn remember(&mut self, context: &ContextMap, plan: &Plan, outcome: &AgentOutcome) {
        self.experiences.push(Experience {
            timestamp: Utc::now(),
            context: context.clone(),
            plan_id: plan.id.to_string(),
            goal: plan.goal.clone(),
            task_count: plan.tasks.len(),
            success: outcome.success,
            summary: outcome.summary(),
        });

        let counters = if outcome.success {
            &mut self.successful_patterns
        } else {
            &mut self.failed_patterns
        };
        *counters.entry(pattern_key(&plan.goal, plan.tasks.len())).or_insert(0) += 1;

        if self.experiences.len() > self.capacity {
            let keep = self.capacity / 2;
            let drop = self.experiences.len() - keep;
            self.experiences.drain(..drop);
        }
    }

    /// Up to `limit` experiences whose context similarity exceeds the
    /// threshold, most similar first. Ties keep recording order.
    pub fn similar_experiences(&self, context: &ContextMap, limit: usize) -> Vec<&Experience> {
        let mut scored: Vec<(f64, &Experience)> = self
            .experiences
            .iter()
            .map(|exp| (context_similarity(context, &exp.context), exp))
            .filter(|(score, _)| *score > self.threshold)
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.into_iter().take(limit).map(|(_, exp)| exp).collect()
    }

    pub fn experiences(&self) -> &[Experience] {
        &self.experiences
    }

    pub fn successful_count(&self, pattern: &str) -> usize {
        self.successful_patterns.get(pattern).copied().unwrap_or(0)
    }

    pub fn failed_count(&self, pattern: &str) -> usize {
        self.failed_patterns.get(pattern).copied().unwrap_or(0)
    }

    pub fn summary(&self) -> MemorySummary {
        let recent_start = self.experiences.len().saturating_sub(5);
        MemorySummary {
            total_experiences: self.experiences.len(),
            successful_patterns: self.successful_patterns.clone(),
            failed_patterns: self.failed_patterns.clone(),
            recent_experiences: self.experiences[recent_start..].to_vec(),
        }
    }

    pub fn reset(&mut self) {
        self.experiences.clear();
        self.successful_patterns.clear();
        self.failed_patterns.clear();
    }
}

/// Introspection view of an agent's memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemorySummary {
    pub total_experiences: usize,
    pub successful_patterns: BTreeMap<String, usize>,
    pub failed_patterns: BTreeMap<String, usize>,
    /// Last five experiences, oldest first
    pub recent_experiences: Vec<Experience>,
}
