//! Agent manager: routing and collaboration
//!
//! [`AgentManager::route`] asks the oracle which registered agent should take
//! a request, falls back to input-kind routing when the answer is unusable,
//! and either dispatches to one agent or runs several agents in sequence
//! over a shared context.

use crate::agent::Agent;
use crate::config::BehaviorConfig;
use crate::ports::event_logger::{EventLogger, ExecutionEvent, NoEventLogger};
use crate::ports::oracle::{Oracle, interpret_response};
use expense_domain::{
    AgentInput, AgentOutcome, AgentPerformance, AgentProfile, CollaborationRecord, ContextMap,
    RoutingDecision, RoutingHistory, RoutingPromptTemplate, RoutingRecord,
};
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{info, warn};

/// Reason code when no agent could be chosen for a request.
pub const ROUTING_FAILED: &str = "routing_failed";
/// Reason code when a chosen agent name is not registered.
pub const UNKNOWN_AGENT: &str = "unknown_agent";
/// Reason code when every collaborating agent failed.
pub const COLLABORATION_FAILED: &str = "collaboration_failed";

const COLLABORATION_LOG_CAP: usize = 1000;
const ORACLE_PROBE: &str = "Reply with the single word OK.";

#[derive(Default)]
struct ManagerState {
    history: RoutingHistory,
    collaborations: Vec<CollaborationRecord>,
    total_routed: usize,
}

/// Per-agent numbers in [`ManagerAnalytics`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentAnalytics {
    pub name: String,
    pub attempts: usize,
    pub successes: usize,
    pub success_rate: Option<f64>,
    pub remembered_experiences: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManagerAnalytics {
    pub agents: Vec<AgentAnalytics>,
    pub total_routed: usize,
    pub collaborations: usize,
}

/// Health snapshot for status displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemStatus {
    pub registered_agents: usize,
    pub oracle_available: bool,
    pub oracle_detail: String,
    pub available_agents: Vec<AgentProfile>,
    pub total_routed: usize,
    pub collaborations: usize,
}

pub struct AgentManager {
    agents: Vec<Arc<Agent>>,
    oracle: Arc<dyn Oracle>,
    logger: Arc<dyn EventLogger>,
    config: BehaviorConfig,
    state: Mutex<ManagerState>,
}

impl AgentManager {
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        Self::with_config(oracle, BehaviorConfig::default())
    }

    pub fn with_config(oracle: Arc<dyn Oracle>, config: BehaviorConfig) -> Self {
        Self {
            agents: Vec::new(),
            oracle,
            logger: Arc::new(NoEventLogger),
            state: Mutex::new(ManagerState {
                history: RoutingHistory::new(config.routing),
                ..Default::default()
            }),
            config,
        }
    }

    pub fn with_event_logger(mut self, logger: Arc<dyn EventLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Add an agent to the roster. Registration order is routing order for
    /// fallback decisions.
    pub fn register_agent(&mut self, agent: Arc<Agent>) {
        info!("Registered agent: {}", agent.name());
        self.agents.push(agent);
    }

    pub fn agent_roster(&self) -> Vec<AgentProfile> {
        self.agents.iter().map(|a| a.profile().clone()).collect()
    }

    pub fn agent(&self, name: &str) -> Option<&Arc<Agent>> {
        self.agents.iter().find(|a| a.name() == name)
    }

    /// Route a request to one or more agents. Always returns an outcome.
    pub async fn route(&self, input: AgentInput) -> AgentOutcome {
        let decision = self.analyze_for_routing(&input).await;
        info!(
            agent = decision.best_agent.as_deref().unwrap_or("-"),
            confidence = decision.confidence,
            collaborative = decision.requires_collaboration,
            fallback = decision.fallback,
            "Routing decision: {}",
            decision.reasoning
        );
        self.logger.log(ExecutionEvent::new(
            "routing_decision",
            json!({
                "input_kind": input.kind(),
                "decision": decision,
            }),
        ));

        if decision.requires_collaboration && self.config.collaboration_enabled {
            self.execute_collaborative(&decision, input).await
        } else {
            self.dispatch(&decision, input).await
        }
    }

    /// One oracle call choosing agents; degrades to input-kind routing.
    pub async fn analyze_for_routing(&self, input: &AgentInput) -> RoutingDecision {
        let roster = self.agent_roster();
        let recent = self.lock_state().history.context_summary();
        let prompt = RoutingPromptTemplate::routing(
            &input.preview(self.config.routing_preview_chars),
            &roster,
            &recent,
        );

        match self.oracle.call(&prompt).await.and_then(interpret_response) {
            Ok(response) => match RoutingDecision::parse(&response) {
                Some(decision) => decision,
                None => {
                    warn!("Unusable routing analysis, routing by input kind");
                    RoutingDecision::fallback(input.kind(), &roster)
                }
            },
            Err(e) => {
                warn!("Routing oracle call failed ({}), routing by input kind", e);
                RoutingDecision::fallback(input.kind(), &roster)
            }
        }
    }

    /// Run a named agent directly, bypassing routing analysis.
    pub async fn execute_agent(&self, name: &str, input: AgentInput) -> AgentOutcome {
        let Some(agent) = self.agent(name).cloned() else {
            return AgentOutcome::failure(format!("Agent '{}' is not registered", name), UNKNOWN_AGENT);
        };
        let kind = input.kind();
        self.logger.log(ExecutionEvent::new(
            "routing_decision",
            json!({ "input_kind": kind, "direct": true, "agent": name }),
        ));
        let outcome = agent.execute(input).await;
        self.record(RoutingRecord::new(name, kind, 1.0, outcome.success));
        outcome
    }

    async fn dispatch(&self, decision: &RoutingDecision, input: AgentInput) -> AgentOutcome {
        let Some(name) = decision.best_agent.as_deref() else {
            return AgentOutcome::failure("No suitable agent found for this input", ROUTING_FAILED)
                .with_data(json!({ "reasoning": decision.reasoning }));
        };
        let Some(agent) = self.agent(name).cloned() else {
            warn!("Routing chose unregistered agent '{}'", name);
            return AgentOutcome::failure(format!("Agent '{}' is not registered", name), UNKNOWN_AGENT);
        };

        let kind = input.kind();
        let outcome = agent.execute(input).await;
        self.record(RoutingRecord::new(name, kind, decision.confidence, outcome.success));
        outcome
    }

    async fn execute_collaborative(&self, decision: &RoutingDecision, input: AgentInput) -> AgentOutcome {
        let collaboration_id = format!("collab_{}", uuid::Uuid::new_v4().simple());
        let kind = input.kind();
        info!(
            collaboration_id = %collaboration_id,
            "Starting collaboration: {}",
            decision.collaborative_agents.join(" -> ")
        );

        let mut shared = ContextMap::new();
        shared.insert("collaboration_id".into(), json!(collaboration_id));
        let mut record = CollaborationRecord::new(&collaboration_id);
        let mut results: Vec<(String, AgentOutcome)> = Vec::new();

        for name in &decision.collaborative_agents {
            let Some(agent) = self.agent(name).cloned() else {
                warn!(collaboration_id = %collaboration_id, "Skipping unregistered agent '{}'", name);
                let outcome = AgentOutcome::failure(
                    format!("Agent '{}' is not registered", name),
                    UNKNOWN_AGENT,
                );
                record.push(name, false, outcome.summary());
                results.push((name.clone(), outcome));
                continue;
            };

            let outcome = agent.execute_with_context(input.clone(), &shared).await;
            if outcome.success
                && let Some(data) = &outcome.data
            {
                shared.insert(format!("{}_result", name), data.clone());
            }
            record.push(name, outcome.success, outcome.summary());
            self.record(
                RoutingRecord::new(name, kind, decision.confidence, outcome.success)
                    .in_collaboration(&collaboration_id),
            );
            results.push((name.clone(), outcome));
        }

        let successful = record.successful_agents();
        let total = record.total_agents();
        self.logger.log(ExecutionEvent::new(
            "collaboration_completed",
            json!({
                "collaboration_id": collaboration_id,
                "successful_agents": successful,
                "total_agents": total,
            }),
        ));
        {
            let mut state = self.lock_state();
            state.collaborations.push(record);
            if state.collaborations.len() > COLLABORATION_LOG_CAP {
                let excess = state.collaborations.len() - COLLABORATION_LOG_CAP / 2;
                state.collaborations.drain(..excess);
            }
        }

        self.synthesize_collaborative(&results).await
    }

    /// Combine collaborating agents' outcomes into one.
    ///
    /// The payload is the largest successful payload, annotated with the
    /// prose synthesis and participation counts.
    async fn synthesize_collaborative(&self, results: &[(String, AgentOutcome)]) -> AgentOutcome {
        let total = results.len();
        let successes: Vec<&(String, AgentOutcome)> =
            results.iter().filter(|(_, o)| o.success).collect();
        if successes.is_empty() {
            return AgentOutcome::failure("All collaborating agents failed", COLLABORATION_FAILED)
                .with_data(json!({ "successful_agents": 0, "total_agents": total }));
        }

        let summaries: Vec<(String, String)> = successes
            .iter()
            .map(|(name, outcome)| (name.clone(), outcome.message.clone()))
            .collect();
        let prompt = RoutingPromptTemplate::collaborative_synthesis(&summaries);
        let synthesis = match self.oracle.call(&prompt).await.and_then(interpret_response) {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                warn!("Collaborative synthesis failed ({}), joining agent messages", e);
                summaries
                    .iter()
                    .map(|(_, message)| message.as_str())
                    .collect::<Vec<_>>()
                    .join("\n\n")
            }
        };

        let largest = successes
            .iter()
            .filter_map(|(_, o)| o.data.as_ref())
            .max_by_key(|data| data.to_string().len());
        let mut data = match largest {
            Some(Value::Object(object)) => object.clone(),
            Some(other) => {
                let mut wrapped = Map::new();
                wrapped.insert("result".into(), other.clone());
                wrapped
            }
            None => Map::new(),
        };
        data.insert("synthesis".into(), json!(synthesis));
        data.insert("successful_agents".into(), json!(successes.len()));
        data.insert("total_agents".into(), json!(total));

        AgentOutcome::success(synthesis).with_data(Value::Object(data))
    }

    fn record(&self, record: RoutingRecord) {
        let mut state = self.lock_state();
        state.total_routed += 1;
        state.history.record(record);
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, ManagerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn agent_performance(&self) -> BTreeMap<String, AgentPerformance> {
        self.lock_state().history.performance().clone()
    }

    /// Recent routing decisions, oldest first.
    pub fn routing_summary(&self) -> Vec<RoutingRecord> {
        self.lock_state()
            .history
            .recent()
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn collaboration_log(&self) -> Vec<CollaborationRecord> {
        self.lock_state().collaborations.clone()
    }

    pub fn analytics(&self) -> ManagerAnalytics {
        let state = self.lock_state();
        let performance = state.history.performance();
        let agents = self
            .agents
            .iter()
            .map(|agent| {
                let perf = performance.get(agent.name()).cloned().unwrap_or_default();
                AgentAnalytics {
                    name: agent.name().to_string(),
                    attempts: perf.attempts,
                    successes: perf.successes,
                    success_rate: perf.success_rate,
                    remembered_experiences: agent.memory_summary().total_experiences,
                }
            })
            .collect();
        ManagerAnalytics {
            agents,
            total_routed: state.total_routed,
            collaborations: state.collaborations.len(),
        }
    }

    /// Probe the oracle and report the roster.
    pub async fn system_status(&self) -> SystemStatus {
        let (oracle_available, oracle_detail) =
            match self.oracle.call(ORACLE_PROBE).await.and_then(interpret_response) {
                Ok(_) => (true, "Connected".to_string()),
                Err(e) => (false, e.to_string()),
            };
        let state = self.lock_state();
        SystemStatus {
            registered_agents: self.agents.len(),
            oracle_available,
            oracle_detail,
            available_agents: self.agent_roster(),
            total_routed: state.total_routed,
            collaborations: state.collaborations.len(),
        }
    }
}
