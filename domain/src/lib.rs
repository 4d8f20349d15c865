//! Domain layer for expense-agent
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Plans
//!
//! An agent turns every request into a [`Plan`]: an ordered graph of
//! [`Task`]s with dependencies. Plans come from the oracle (see
//! [`parse_plan`]) or, when the oracle is unusable, from a deterministic
//! [`fallback_plan`]. A failed task may cause the whole plan to be replaced.
//!
//! ## Memory
//!
//! Each agent remembers finished requests in an [`AgentMemory`] and recalls
//! similar ones when planning.
//!
//! ## Routing
//!
//! The manager sends a request to one agent or to several in sequence,
//! guided by a [`RoutingDecision`] and the [`RoutingHistory`].

pub mod agent;
pub mod core;
pub mod expense;
pub mod prompt;
pub mod routing;
pub mod util;

// Re-export commonly used types
pub use agent::{
    entities::{Plan, PlanProgress, PlanStatus, Task, TaskKind, TaskStatus},
    fallback::{FALLBACK_GOAL, ToolBindings, fallback_plan},
    memory::{AgentMemory, Experience, MemorySummary, context_similarity, pattern_key},
    value_objects::{
        AgentInput, AgentOutcome, AgentProfile, ContextMap, IMAGE_DATA_KEY, InputKind,
        MESSAGE_DATE_KEY, PlanId, TEXT_KEY, TaskId, TaskResult,
    },
};
pub use core::error::{OrchestrationError, PlanError};
pub use expense::{ExpenseData, ExpenseError, ExpenseItem, ProcessedItem};
pub use prompt::{
    AgentPromptTemplate, ExtractionPromptTemplate, RoutingPromptTemplate, ToolPromptTemplate,
};
pub use routing::{
    AgentPerformance, CollaborationRecord, ComplexityLevel, Participation, RoutingDecision,
    RoutingHistory, RoutingRecord, RoutingWindows,
};

// Re-export plan parser
pub use agent::plan_parser::{DEFAULT_GOAL, PlanParseError, parse_plan, parse_plan_json};
