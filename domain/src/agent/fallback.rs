//! Deterministic plans used when the oracle cannot produce one.

use super::entities::{Plan, Task, TaskKind};
use super::value_objects::{ContextMap, InputKind, PlanId};

/// Goal of every fallback plan.
pub const FALLBACK_GOAL: &str = "Process input using fallback strategy";

/// Tool names bound to each role, as resolved from the tool registry.
///
/// A role with no registered tool leaves the task unbound; executing it then
/// fails like any other unhandled task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolBindings {
    pub image_extractor: Option<String>,
    pub text_extractor: Option<String>,
    pub persistence: Option<String>,
}

impl ToolBindings {
    /// Extractor matching the payload of a request.
    pub fn extractor_for(&self, kind: InputKind) -> Option<&str> {
        match kind {
            InputKind::Image => self.image_extractor.as_deref(),
            InputKind::Text => self.text_extractor.as_deref(),
            InputKind::Unknown => None,
        }
    }
}

fn bind(task: Task, tool: Option<&str>) -> Task {
    match tool {
        Some(name) => task.with_tool(name),
        None => task,
    }
}

/// Build the fallback plan for an input kind.
///
/// Text and image inputs get `extract` followed by `save` (depending on
/// `extract`); anything else gets a single low-confidence `process` task.
pub fn fallback_plan(kind: InputKind, tools: &ToolBindings, context: &ContextMap) -> Plan {
    let plan = Plan::new(PlanId::generate("fallback_plan"), FALLBACK_GOAL).with_context(context.clone());

    let description = match kind {
        InputKind::Image => "Extract data from receipt image",
        InputKind::Text => "Extract expense data from text",
        InputKind::Unknown => {
            return plan.with_task(
                Task::new("process", TaskKind::Process, "Process input data").with_confidence(0.5),
            );
        }
    };

    let extract = bind(
        Task::new("extract", TaskKind::Extract, description).with_confidence(0.8),
        tools.extractor_for(kind),
    );
    let save = bind(
        Task::new("save", TaskKind::Save, "Save extracted expense data")
            .with_dependency("extract")
            .with_confidence(0.9),
        tools.persistence.as_deref(),
    );

    plan.with_task(extract).with_task(save)
}
