//! Routing history, per-agent performance and the collaboration log.

use crate::agent::value_objects::InputKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// One routed request as seen by one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingRecord {
    pub timestamp: DateTime<Utc>,
    pub agent: String,
    pub input_kind: InputKind,
    pub confidence: f64,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collaboration_id: Option<String>,
}

impl RoutingRecord {
    pub fn new(agent: impl Into<String>, input_kind: InputKind, confidence: f64, success: bool) -> Self {
        Self {
            timestamp: Utc::now(),
            agent: agent.into(),
            input_kind,
            confidence,
            success,
            collaboration_id: None,
        }
    }

    pub fn in_collaboration(mut self, id: impl Into<String>) -> Self {
        self.collaboration_id = Some(id.into());
        self
    }
}

/// Lifetime counters and the windowed success estimate of one agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentPerformance {
    pub attempts: usize,
    pub successes: usize,
    /// Successes over attempts inside the performance window; `None` until
    /// enough decisions have accumulated
    pub success_rate: Option<f64>,
}

/// Bounds of the routing history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutingWindows {
    /// Records summarized for routing prompts
    pub context: usize,
    /// Records aggregated into success rates
    pub performance: usize,
    /// Records needed before rates are computed
    pub min_decisions: usize,
}

impl Default for RoutingWindows {
    fn default() -> Self {
        Self {
            context: 20,
            performance: 50,
            min_decisions: 10,
        }
    }
}

/// Capped routing history with per-agent performance.
#[derive(Debug, Clone, Default)]
pub struct RoutingHistory {
    windows: RoutingWindows,
    records: VecDeque<RoutingRecord>,
    performance: BTreeMap<String, AgentPerformance>,
}

impl RoutingHistory {
    pub fn new(windows: RoutingWindows) -> Self {
        Self {
            windows,
            records: VecDeque::new(),
            performance: BTreeMap::new(),
        }
    }

    pub fn record(&mut self, record: RoutingRecord) {
        let perf = self.performance.entry(record.agent.clone()).or_default();
        perf.attempts += 1;
        if record.success {
            perf.successes += 1;
        }

        self.records.push_back(record);
        while self.records.len() > self.windows.performance.max(1) {
            self.records.pop_front();
        }

        if self.records.len() >= self.windows.min_decisions {
            self.recompute_rates();
        }
    }

    fn recompute_rates(&mut self) {
        let mut window: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
        for record in &self.records {
            let entry = window.entry(record.agent.as_str()).or_default();
            entry.0 += 1;
            if record.success {
                entry.1 += 1;
            }
        }
        for (agent, perf) in self.performance.iter_mut() {
            perf.success_rate = window
                .get(agent.as_str())
                .map(|(attempts, successes)| *successes as f64 / *attempts as f64);
        }
    }

    /// Most recent records, oldest first, limited to the context window.
    pub fn recent(&self) -> Vec<&RoutingRecord> {
        let skip = self.records.len().saturating_sub(self.windows.context);
        self.records.iter().skip(skip).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn performance(&self) -> &BTreeMap<String, AgentPerformance> {
        &self.performance
    }

    pub fn success_rate(&self, agent: &str) -> Option<f64> {
        self.performance.get(agent).and_then(|p| p.success_rate)
    }

    /// Compact text of recent decisions for routing prompts.
    pub fn context_summary(&self) -> String {
        self.recent()
            .iter()
            .map(|r| {
                format!(
                    "{} input -> {} ({})",
                    r.input_kind,
                    r.agent,
                    if r.success { "success" } else { "failure" }
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// One agent's part in a collaboration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participation {
    pub agent: String,
    pub success: bool,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Append-only record of one collaborative request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollaborationRecord {
    pub collaboration_id: String,
    pub started_at: DateTime<Utc>,
    pub participants: Vec<Participation>,
}

impl CollaborationRecord {
    pub fn new(collaboration_id: impl Into<String>) -> Self {
        Self {
            collaboration_id: collaboration_id.into(),
            started_at: Utc::now(),
            participants: Vec::new(),
        }
    }

    pub fn push(&mut self, agent: impl Into<String>, success: bool, message: impl Into<String>) {
        self.participants.push(Participation {
            agent: agent.into(),
            success,
            message: message.into(),
            timestamp: Utc::now(),
        });
    }

    pub fn successful_agents(&self) -> usize {
        self.participants.iter().filter(|p| p.success).count()
    }

    pub fn total_agents(&self) -> usize {
        self.participants.len()
    }
}
