//! Plan parsing from oracle responses.
//!
//! The oracle is asked for a JSON object `{goal, tasks: [...]}` but may wrap
//! it in prose or code fences. The parser takes the span from the first `{`
//! to the last `}` and decodes it; anything that does not yield a valid task
//! graph is reported as a [`PlanParseError`] so the caller can fall back to a
//! deterministic plan.

use crate::agent::entities::{Plan, Task, TaskKind};
use crate::agent::value_objects::{ContextMap, PlanId, TaskId};
use crate::core::error::PlanError;
use crate::util::json_span;
use serde_json::Value;
use thiserror::Error;

/// Goal used when the oracle omits one.
pub const DEFAULT_GOAL: &str = "Process input intelligently";

/// Why a response could not be turned into a plan.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanParseError {
    #[error("Empty response")]
    EmptyResponse,

    #[error("Response is an error marker: {0}")]
    ErrorMarker(String),

    #[error("No JSON object found in response")]
    NoJson,

    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Response has no tasks array")]
    MissingTasks,

    #[error(transparent)]
    InvalidPlan(#[from] PlanError),
}

/// Parse a plan from oracle response text.
///
/// The returned plan gets a fresh `id` and carries `context`.
pub fn parse_plan(response: &str, id: PlanId, context: &ContextMap) -> Result<Plan, PlanParseError> {
    let trimmed = response.trim();
    if trimmed.is_empty() {
        return Err(PlanParseError::EmptyResponse);
    }
    if trimmed.starts_with("Error") {
        return Err(PlanParseError::ErrorMarker(
            crate::util::truncate_str(trimmed, 200).to_string(),
        ));
    }

    let span = json_span(trimmed).ok_or(PlanParseError::NoJson)?;
    let json: Value =
        serde_json::from_str(span).map_err(|e| PlanParseError::InvalidJson(e.to_string()))?;

    parse_plan_json(&json, id, context)
}

/// JSON scalar to an id string (numbers allowed, null/empty rejected)
fn json_value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parse a plan from a decoded JSON value.
///
/// Expected schema:
/// ```json
/// {
///   "goal": "string",
///   "tasks": [
///     {
///       "id": "string",
///       "type": "analyze|extract|process|save|validate|reason",
///       "description": "string",
///       "tool_name": "string or null",
///       "parameters": { ... },
///       "dependencies": ["task_id", ...],
///       "confidence": 0.9
///     }
///   ]
/// }
/// ```
///
/// An unknown `type` rejects the whole plan. A missing `type` means
/// `process`; a missing `id` becomes `task_<n>`.
pub fn parse_plan_json(json: &Value, id: PlanId, context: &ContextMap) -> Result<Plan, PlanParseError> {
    let goal = json
        .get("goal")
        .and_then(Value::as_str)
        .filter(|g| !g.trim().is_empty())
        .unwrap_or(DEFAULT_GOAL);

    let tasks = json
        .get("tasks")
        .and_then(Value::as_array)
        .ok_or(PlanParseError::MissingTasks)?;

    let mut plan = Plan::new(id, goal).with_context(context.clone());

    for (index, task_json) in tasks.iter().enumerate() {
        let task_id = task_json
            .get("id")
            .and_then(json_value_to_string)
            .unwrap_or_else(|| format!("task_{}", index + 1));

        let kind = match task_json.get("type").and_then(Value::as_str) {
            Some(kind) => kind.parse::<TaskKind>()?,
            None => TaskKind::Process,
        };

        let description = task_json
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("Process data");

        let mut task = Task::new(task_id, kind, description);

        if let Some(tool) = task_json.get("tool_name").and_then(Value::as_str)
            && !tool.is_empty()
            && tool != "null"
        {
            task = task.with_tool(tool);
        }

        if let Some(params) = task_json.get("parameters").and_then(Value::as_object) {
            task.parameters = params.clone();
        }

        if let Some(deps) = task_json.get("dependencies").and_then(Value::as_array) {
            task.dependencies = deps
                .iter()
                .filter_map(json_value_to_string)
                .map(TaskId::from)
                .collect();
        }

        if let Some(confidence) = task_json.get("confidence").and_then(Value::as_f64) {
            task = task.with_confidence(confidence);
        }

        plan.add_task(task);
    }

    plan.validate()?;
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ContextMap {
        let mut map = ContextMap::new();
        map.insert("input_type".into(), "text".into());
        map
    }

    const TEXT_PLAN: &str = r#"
Here's my plan:

```json
{
  "goal": "Extract text expense data and save",
  "tasks": [
    {
      "id": "extract_data",
      "type": "extract",
      "description": "Extract expense data from text",
      "tool_name": "extract_text_expense",
      "parameters": {},
      "dependencies": [],
      "confidence": 0.9
    },
    {
      "id": "save_data",
      "type": "save",
      "description": "Save extracted data",
      "tool_name": "save_expense",
      "parameters": {},
      "dependencies": ["extract_data"]
    }
  ]
}
```
"#;

    #[test]
    fn test_parse_plan_from_prose() {
        let plan = parse_plan(TEXT_PLAN, PlanId::new("p1"), &ctx()).unwrap();
        assert_eq!(plan.id.as_str(), "p1");
        assert_eq!(plan.goal, "Extract text expense data and save");
        assert_eq!(plan.tasks.len(), 2);
        assert_eq!(plan.tasks[0].kind, TaskKind::Extract);
        assert_eq!(plan.tasks[0].tool.as_deref(), Some("extract_text_expense"));
        assert!((plan.tasks[0].confidence - 0.9).abs() < f64::EPSILON);
        assert_eq!(plan.tasks[1].dependencies, vec![TaskId::new("extract_data")]);
        assert!((plan.tasks[1].confidence - 1.0).abs() < f64::EPSILON);
        assert_eq!(plan.context["input_type"], "text");
    }

    #[test]
    fn test_parse_plan_failures() {
        let id = || PlanId::new("p");
        assert_eq!(parse_plan("   ", id(), &ctx()), Err(PlanParseError::EmptyResponse));
        assert!(matches!(
            parse_plan("Error: quota exceeded", id(), &ctx()),
            Err(PlanParseError::ErrorMarker(_))
        ));
        assert_eq!(
            parse_plan("I will extract then save.", id(), &ctx()),
            Err(PlanParseError::NoJson)
        );
        assert!(matches!(
            parse_plan("{goal: unquoted}", id(), &ctx()),
            Err(PlanParseError::InvalidJson(_))
        ));
        assert_eq!(
            parse_plan(r#"{"goal": "x"}"#, id(), &ctx()),
            Err(PlanParseError::MissingTasks)
        );
    }

    #[test]
    fn test_unknown_task_kind_rejects_plan() {
        let response = r#"{"goal": "g", "tasks": [{"id": "1", "type": "summarize"}]}"#;
        assert_eq!(
            parse_plan(response, PlanId::new("p"), &ctx()),
            Err(PlanParseError::InvalidPlan(PlanError::UnknownTaskKind(
                "summarize".into()
            )))
        );
    }

    #[test]
    fn test_dangling_dependency_rejects_plan() {
        let response = r#"{"goal": "g", "tasks": [{"id": "save", "type": "save", "dependencies": ["extract"]}]}"#;
        assert!(matches!(
            parse_plan(response, PlanId::new("p"), &ctx()),
            Err(PlanParseError::InvalidPlan(PlanError::UnknownDependency { .. }))
        ));
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let json = serde_json::json!({
            "tasks": [
                {"description": "First"},
                {"id": 2, "type": "reason", "tool_name": null, "dependencies": [1]},
                {"id": 1, "type": "ANALYZE", "tool_name": "null"}
            ]
        });
        let plan = parse_plan_json(&json, PlanId::new("p"), &ctx()).unwrap();
        assert_eq!(plan.goal, DEFAULT_GOAL);
        assert_eq!(plan.tasks[0].id.as_str(), "task_1");
        assert_eq!(plan.tasks[0].kind, TaskKind::Process);
        assert_eq!(plan.tasks[1].description, "Process data");
        assert_eq!(plan.tasks[1].dependencies, vec![TaskId::new("1")]);
        assert!(plan.tasks[1].tool.is_none());
        assert_eq!(plan.tasks[2].kind, TaskKind::Analyze);
        assert!(plan.tasks[2].tool.is_none());
    }

    #[test]
    fn test_empty_tasks_parse_to_empty_plan() {
        let plan = parse_plan(r#"{"goal": "g", "tasks": []}"#, PlanId::new("p"), &ctx()).unwrap();
        assert!(plan.tasks.is_empty());
    }

    #[test]
    fn test_serialized_task_parses_back() {
        let task = Task::new("extract", TaskKind::Extract, "Extract")
            .with_tool("process_receipt")
            .with_dependency("analyze");
        let analyze = Task::new("analyze", TaskKind::Analyze, "Look first");
        let json = serde_json::json!({
            "goal": "round trip",
            "tasks": [analyze, task],
        });
        let plan = parse_plan_json(&json, PlanId::new("p"), &ctx()).unwrap();
        assert_eq!(plan.tasks[1].id.as_str(), "extract");
        assert_eq!(plan.tasks[1].kind, TaskKind::Extract);
        assert_eq!(plan.tasks[1].tool.as_deref(), Some("process_receipt"));
        assert_eq!(plan.tasks[1].dependencies, vec![TaskId::new("analyze")]);
    }
}
