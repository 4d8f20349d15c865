//! Agent domain module
//!
//! Plans, tasks, memory and the deterministic fallbacks of the
//! self-planning expense agents.

pub mod entities;
pub mod fallback;
pub mod memory;
pub mod plan_parser;
pub mod value_objects;

pub use entities::{Plan, PlanProgress, PlanStatus, Task, TaskKind, TaskStatus};
pub use fallback::{ToolBindings, fallback_plan};
pub use memory::{AgentMemory, Experience, MemorySummary};
pub use value_objects::{
    AgentInput, AgentOutcome, AgentProfile, ContextMap, InputKind, PlanId, TaskId, TaskResult,
};
