//! Domain error types

use thiserror::Error;

/// Failure taxonomy of the orchestration core.
///
/// None of these cross the `Agent::execute` / `AgentManager::route`
/// boundary as errors: they are caught at the task boundary (tool and parse
/// failures trigger adaptation), degraded to a fallback (oracle failures), or
/// folded into a failure outcome (routing, deadlock).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrchestrationError {
    #[error("Tool failure ({tool}): {message}")]
    ToolFailure { tool: String, message: String },

    #[error("Oracle failure: {0}")]
    OracleFailure(String),

    #[error("Parse failure: {0}")]
    ParseFailure(String),

    #[error("Routing failure: {0}")]
    RoutingFailure(String),

    #[error("Deadlock: {pending} task(s) pending with no ready task")]
    DeadlockFailure { pending: usize },
}

impl OrchestrationError {
    /// Stable machine-readable code used in outcome `error` fields.
    pub fn code(&self) -> &'static str {
        match self {
            OrchestrationError::ToolFailure { .. } => "tool_failure",
            OrchestrationError::OracleFailure(_) => "oracle_failure",
            OrchestrationError::ParseFailure(_) => "parse_failure",
            OrchestrationError::RoutingFailure(_) => "routing_failure",
            OrchestrationError::DeadlockFailure { .. } => "deadlock",
        }
    }

    /// Whether this failure should trigger plan adaptation.
    pub fn triggers_adaptation(&self) -> bool {
        matches!(
            self,
            OrchestrationError::ToolFailure { .. } | OrchestrationError::ParseFailure(_)
        )
    }
}

impl From<crate::agent::plan_parser::PlanParseError> for OrchestrationError {
    fn from(err: crate::agent::plan_parser::PlanParseError) -> Self {
        OrchestrationError::ParseFailure(err.to_string())
    }
}

/// Structural problems in a plan's task graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("Plan has no tasks")]
    Empty,

    #[error("Duplicate task id: {0}")]
    DuplicateTaskId(String),

    #[error("Task {task} depends on unknown task {dependency}")]
    UnknownDependency { task: String, dependency: String },

    #[error("Unknown task kind: {0}")]
    UnknownTaskKind(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(
            OrchestrationError::ToolFailure {
                tool: "save_expense".into(),
                message: "disk full".into()
            }
            .code(),
            "tool_failure"
        );
        assert_eq!(
            OrchestrationError::DeadlockFailure { pending: 2 }.code(),
            "deadlock"
        );
        assert_eq!(
            OrchestrationError::RoutingFailure("nobody".into()).code(),
            "routing_failure"
        );
    }

    #[test]
    fn test_adaptation_triggers() {
        assert!(OrchestrationError::ParseFailure("bad json".into()).triggers_adaptation());
        assert!(
            OrchestrationError::ToolFailure {
                tool: "t".into(),
                message: "m".into()
            }
            .triggers_adaptation()
        );
        assert!(!OrchestrationError::OracleFailure("down".into()).triggers_adaptation());
        assert!(!OrchestrationError::DeadlockFailure { pending: 1 }.triggers_adaptation());
    }

    #[test]
    fn test_display() {
        let err = PlanError::UnknownDependency {
            task: "save".into(),
            dependency: "extract".into(),
        };
        assert_eq!(err.to_string(), "Task save depends on unknown task extract");
    }
}
