//! Application layer for expense-agent
//!
//! This crate contains the self-planning agents, the agent manager, port
//! definitions and application configuration.
//! It depends only on the domain layer.

pub mod agent;
pub mod config;
pub mod manager;
pub mod ports;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use agent::{
    ALL_TASKS_FAILED, Agent, RECEIPT_AGENT_NAME, ReceiptSpecialist, Specialist, TEXT_AGENT_NAME,
    TextSpecialist,
};
pub use config::BehaviorConfig;
pub use manager::{
    AgentAnalytics, AgentManager, COLLABORATION_FAILED, ManagerAnalytics, ROUTING_FAILED,
    SystemStatus, UNKNOWN_AGENT,
};
pub use ports::{
    event_logger::{EventLogger, ExecutionEvent, NoEventLogger},
    oracle::{Oracle, OracleError, UnavailableOracle, interpret_response},
    tool::{EXPENSE_DATA_KEY, Tool, ToolError, ToolExecutorPort, ToolParams, ToolRole, required_str},
};
