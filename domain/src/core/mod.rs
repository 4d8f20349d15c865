//! Core domain concepts shared across all subdomains.
//!
//! - [`error::OrchestrationError`] - failure taxonomy of the orchestration core
//! - [`error::PlanError`] - structural problems in a task graph

pub mod error;
