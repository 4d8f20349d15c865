//! Multi-agent routing model
//!
//! Decisions about which agent(s) handle a request, and the bounded history
//! the manager keeps about how those decisions turned out.

pub mod decision;
pub mod history;

pub use decision::{ComplexityLevel, RoutingDecision};
pub use history::{
    AgentPerformance, CollaborationRecord, Participation, RoutingHistory, RoutingRecord,
    RoutingWindows,
};
