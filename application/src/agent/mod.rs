//! Self-planning expense agents
//!
//! An [`Agent`] handles one request at a time per call, in five steps:
//!
//! | Step | Method | Oracle calls |
//! |------|--------|--------------|
//! | 1. Analyze input | [`Agent::analyze_input`] | none |
//! | 2. Plan | [`Agent::create_plan`] | one (falls back on failure) |
//! | 3. Execute | [`Agent::execute_plan`] | per ANALYZE/REASON task |
//! | 4. Adapt | on task failure, bounded | one per adaptation |
//! | 5. Synthesize | [`Specialist::synthesize`] | none |
//!
//! What differs between agents lives in a [`Specialist`].

mod execution;
mod planning;
pub mod receipt;
pub mod specialist;
pub mod text;

pub use receipt::{RECEIPT_AGENT_NAME, ReceiptSpecialist};
pub use specialist::{ALL_TASKS_FAILED, Specialist};
pub use text::{TEXT_AGENT_NAME, TextSpecialist};

use crate::config::BehaviorConfig;
use crate::ports::event_logger::{EventLogger, NoEventLogger};
use crate::ports::oracle::Oracle;
use crate::ports::tool::ToolExecutorPort;
use chrono::Local;
use expense_domain::{
    AgentInput, AgentMemory, AgentOutcome, AgentProfile, ContextMap, MemorySummary, PlanProgress,
};
use serde_json::json;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{error, info};

/// Text preview length used for oracle prompts and stored contexts.
const PREVIEW_CHARS: usize = 200;

/// An agent that plans, executes and adapts its own work.
///
/// Safe to share behind an `Arc`; concurrent requests only contend on the
/// memory and plan snapshot locks, which are never held across an await.
pub struct Agent {
    specialist: Box<dyn Specialist>,
    oracle: Arc<dyn Oracle>,
    tools: Arc<dyn ToolExecutorPort>,
    logger: Arc<dyn EventLogger>,
    config: BehaviorConfig,
    memory: Mutex<AgentMemory>,
    current_plan: Mutex<Option<PlanProgress>>,
}

impl Agent {
    pub fn new(
        specialist: Box<dyn Specialist>,
        oracle: Arc<dyn Oracle>,
        tools: Arc<dyn ToolExecutorPort>,
    ) -> Self {
        let config = BehaviorConfig::default();
        Self {
            specialist,
            oracle,
            tools,
            logger: Arc::new(NoEventLogger),
            memory: Mutex::new(AgentMemory::new(
                config.memory_capacity,
                config.similarity_threshold,
            )),
            config,
            current_plan: Mutex::new(None),
        }
    }

    /// The Receipt Processing Agent.
    pub fn receipt_processing(oracle: Arc<dyn Oracle>, tools: Arc<dyn ToolExecutorPort>) -> Self {
        Self::new(Box::new(ReceiptSpecialist::default()), oracle, tools)
    }

    /// The Text Expense Agent.
    pub fn text_expense(oracle: Arc<dyn Oracle>, tools: Arc<dyn ToolExecutorPort>) -> Self {
        Self::new(Box::new(TextSpecialist::default()), oracle, tools)
    }

    /// Replaces the configuration; resets memory to the new bounds.
    pub fn with_config(mut self, config: BehaviorConfig) -> Self {
        self.memory = Mutex::new(AgentMemory::new(
            config.memory_capacity,
            config.similarity_threshold,
        ));
        self.config = config;
        self
    }

    pub fn with_event_logger(mut self, logger: Arc<dyn EventLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn name(&self) -> &str {
        &self.specialist.profile().name
    }

    pub fn profile(&self) -> &AgentProfile {
        self.specialist.profile()
    }

    /// Process one request end to end. Always returns an outcome.
    pub async fn execute(&self, input: AgentInput) -> AgentOutcome {
        self.execute_with_context(input, &ContextMap::new()).await
    }

    /// Like [`Agent::execute`], with extra context shared by collaborating
    /// agents merged into the plan context.
    pub async fn execute_with_context(&self, input: AgentInput, shared: &ContextMap) -> AgentOutcome {
        let mut context = self.analyze_input(&input);
        for (key, value) in shared {
            context.insert(key.clone(), value.clone());
        }
        info!(agent = %self.name(), kind = %input.kind(), "Analyzed input: {} context keys", context.len());

        let plan = self.create_plan(&context, input.kind()).await;
        let (outcome, plan) = self.run_plan(plan, &input, &context).await;

        self.memory
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remember(&context, &plan, &outcome);

        if outcome.success {
            info!(agent = %self.name(), "Request completed");
        } else {
            error!(
                agent = %self.name(),
                error = outcome.error.as_deref().unwrap_or(""),
                "Request failed"
            );
        }
        outcome
    }

    /// Build the planning context for a request.
    ///
    /// Raw payloads are reduced to previews; the specialist adds its own
    /// analysis keys.
    pub fn analyze_input(&self, input: &AgentInput) -> ContextMap {
        let mut context = input.preview(PREVIEW_CHARS);
        context.insert("input_type".into(), json!(input.kind()));
        context.insert("timestamp".into(), json!(Local::now().to_rfc3339()));
        context.insert("agent_name".into(), json!(self.name()));
        context.extend(self.specialist.analyze(input));
        context
    }

    pub fn memory_summary(&self) -> MemorySummary {
        self.memory
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .summary()
    }

    pub fn reset_memory(&self) {
        self.memory
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .reset();
    }

    /// Progress of the plan most recently executed by this agent.
    pub fn current_plan(&self) -> Option<PlanProgress> {
        self.current_plan
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_current_plan(&self, progress: PlanProgress) {
        *self
            .current_plan
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(progress);
    }
}
