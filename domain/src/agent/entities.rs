//! Agent domain entities: tasks and plans.

use super::value_objects::{ContextMap, PlanId, TaskId, TaskResult};
use crate::core::error::PlanError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;

/// Kind of work a task performs.
///
/// Closed set: a plan naming any other kind is rejected as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Analyze,
    Extract,
    Process,
    Save,
    Validate,
    Reason,
}

impl TaskKind {
    pub fn as_str(&self) -> &str {
        match self {
            TaskKind::Analyze => "analyze",
            TaskKind::Extract => "extract",
            TaskKind::Process => "process",
            TaskKind::Save => "save",
            TaskKind::Validate => "validate",
            TaskKind::Reason => "reason",
        }
    }

    /// Kinds the agent can run itself when no tool is bound.
    pub fn is_reasoning(&self) -> bool {
        matches!(
            self,
            TaskKind::Analyze | TaskKind::Reason | TaskKind::Validate
        )
    }
}

impl FromStr for TaskKind {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "analyze" => Ok(TaskKind::Analyze),
            "extract" => Ok(TaskKind::Extract),
            "process" => Ok(TaskKind::Process),
            "save" => Ok(TaskKind::Save),
            "validate" => Ok(TaskKind::Validate),
            "reason" => Ok(TaskKind::Reason),
            other => Err(PlanError::UnknownTaskKind(other.to_string())),
        }
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Task is waiting to be executed
    #[default]
    Pending,
    /// Task is currently being executed
    Running,
    /// Task completed successfully
    Completed,
    /// Task failed
    Failed,
    /// Task was skipped
    Skipped,
}

impl TaskStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::Skipped => "skipped",
        }
    }

    /// Counts toward plan completion.
    pub fn is_done(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Skipped)
    }
}

fn default_confidence() -> f64 {
    1.0
}

/// A single task within a plan.
///
/// Serializes to the same schema the oracle is asked to produce. Status and
/// result are run-time only and never serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    pub description: String,
    /// Name of the bound tool, if any
    #[serde(default, rename = "tool_name")]
    pub tool: Option<String>,
    #[serde(default)]
    pub parameters: ContextMap,
    #[serde(default)]
    pub dependencies: Vec<TaskId>,
    #[serde(skip)]
    pub status: TaskStatus,
    #[serde(skip)]
    pub result: Option<TaskResult>,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
}

impl Task {
    pub fn new(id: impl Into<TaskId>, kind: TaskKind, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            description: description.into(),
            tool: None,
            parameters: ContextMap::new(),
            dependencies: Vec::new(),
            status: TaskStatus::Pending,
            result: None,
            confidence: 1.0,
        }
    }

    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = Some(tool.into());
        self
    }

    pub fn with_parameter(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn with_dependency(mut self, task_id: impl Into<TaskId>) -> Self {
        self.dependencies.push(task_id.into());
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    pub fn is_ready(&self, completed: &HashSet<&TaskId>) -> bool {
        self.status == TaskStatus::Pending
            && self.dependencies.iter().all(|dep| completed.contains(dep))
    }

    pub fn mark_running(&mut self) {
        self.status = TaskStatus::Running;
    }

    pub fn mark_completed(&mut self, result: TaskResult) {
        self.status = TaskStatus::Completed;
        self.result = Some(result);
    }

    pub fn mark_failed(&mut self, result: TaskResult) {
        self.status = TaskStatus::Failed;
        self.result = Some(result);
    }

    pub fn mark_skipped(&mut self) {
        self.status = TaskStatus::Skipped;
    }
}

/// Lifecycle of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    #[default]
    Created,
    Executing,
    Completed,
    Failed,
}

impl PlanStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PlanStatus::Created => "created",
            PlanStatus::Executing => "executing",
            PlanStatus::Completed => "completed",
            PlanStatus::Failed => "failed",
        }
    }
}

/// An ordered task graph pursuing one goal.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub id: PlanId,
    pub goal: String,
    /// Tasks in insertion order; readiness ties are broken by this order
    pub tasks: Vec<Task>,
    pub context: ContextMap,
    pub created_at: DateTime<Utc>,
    pub status: PlanStatus,
}

impl Plan {
    pub fn new(id: PlanId, goal: impl Into<String>) -> Self {
        Self {
            id,
            goal: goal.into(),
            tasks: Vec::new(),
            context: ContextMap::new(),
            created_at: Utc::now(),
            status: PlanStatus::Created,
        }
    }

    pub fn with_task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn with_context(mut self, context: ContextMap) -> Self {
        self.context = context;
        self
    }

    pub fn add_task(&mut self, task: Task) {
        self.tasks.push(task);
    }

    /// Check the graph invariants: unique ids, dependencies inside the plan.
    pub fn validate(&self) -> Result<(), PlanError> {
        let mut seen = HashSet::new();
        for task in &self.tasks {
            if !seen.insert(&task.id) {
                return Err(PlanError::DuplicateTaskId(task.id.to_string()));
            }
        }
        for task in &self.tasks {
            if let Some(dep) = task.dependencies.iter().find(|d| !seen.contains(d)) {
                return Err(PlanError::UnknownDependency {
                    task: task.id.to_string(),
                    dependency: dep.to_string(),
                });
            }
        }
        Ok(())
    }

    fn completed_ids(&self) -> HashSet<&TaskId> {
        self.tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Completed)
            .map(|t| &t.id)
            .collect()
    }

    /// Pending tasks whose dependencies have all completed, in plan order.
    pub fn ready_tasks(&self) -> Vec<&Task> {
        let completed = self.completed_ids();
        self.tasks.iter().filter(|t| t.is_ready(&completed)).collect()
    }

    /// Ids of [`Plan::ready_tasks`], for callers that need to mutate tasks.
    pub fn ready_task_ids(&self) -> Vec<TaskId> {
        self.ready_tasks().into_iter().map(|t| t.id.clone()).collect()
    }

    /// Every task is completed or skipped.
    pub fn is_complete(&self) -> bool {
        self.tasks.iter().all(|t| t.status.is_done())
    }

    /// Some task has failed.
    pub fn has_failed(&self) -> bool {
        self.tasks.iter().any(|t| t.status == TaskStatus::Failed)
    }

    pub fn get_task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    pub fn get_task_mut(&mut self, id: &TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| &t.id == id)
    }

    /// Most recent successful textual output of a completed task.
    pub fn latest_output(&self) -> Option<&str> {
        self.tasks
            .iter()
            .rev()
            .filter(|t| t.status == TaskStatus::Completed)
            .filter_map(|t| t.result.as_ref())
            .map(|r| r.output.as_str())
            .find(|o| !o.is_empty() && !o.starts_with("Error"))
    }

    /// Like [`Plan::latest_output`], but prefers the newest output carrying
    /// a JSON object.
    pub fn latest_structured_output(&self) -> Option<&str> {
        self.tasks
            .iter()
            .rev()
            .filter(|t| t.status == TaskStatus::Completed)
            .filter_map(|t| t.result.as_ref())
            .map(|r| r.output.as_str())
            .find(|o| crate::util::extract_json_object(o).is_some())
            .or_else(|| self.latest_output())
    }

    pub fn progress(&self) -> PlanProgress {
        let count = |status: TaskStatus| self.tasks.iter().filter(|t| t.status == status).count();
        let completed = count(TaskStatus::Completed);
        let total = self.tasks.len();
        PlanProgress {
            plan_id: self.id.to_string(),
            goal: self.goal.clone(),
            status: self.status,
            total_tasks: total,
            completed_tasks: completed,
            failed_tasks: count(TaskStatus::Failed),
            progress: if total == 0 {
                0.0
            } else {
                completed as f64 / total as f64
            },
        }
    }
}

/// Read-only snapshot of a plan's execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanProgress {
    pub plan_id: String,
    pub goal: String,
    pub status: PlanStatus,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub failed_tasks: usize,
    pub progress: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan_abc() -> Plan {
        Plan::new(PlanId::new("p1"), "test")
            .with_task(Task::new("a", TaskKind::Extract, "A"))
            .with_task(Task::new("b", TaskKind::Save, "B").with_dependency("a"))
            .with_task(Task::new("c", TaskKind::Analyze, "C"))
    }

    fn ids(tasks: Vec<&Task>) -> Vec<&str> {
        tasks.into_iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn test_task_kind_parsing() {
        assert_eq!("extract".parse::<TaskKind>().unwrap(), TaskKind::Extract);
        assert_eq!(" SAVE ".parse::<TaskKind>().unwrap(), TaskKind::Save);
        assert_eq!(
            "summarize".parse::<TaskKind>(),
            Err(PlanError::UnknownTaskKind("summarize".into()))
        );
        assert!(TaskKind::Validate.is_reasoning());
        assert!(!TaskKind::Save.is_reasoning());
    }

    #[test]
    fn test_ready_tasks_in_plan_order() {
        let plan = plan_abc();
        assert_eq!(ids(plan.ready_tasks()), vec!["a", "c"]);
        // idempotent under unchanged status
        assert_eq!(ids(plan.ready_tasks()), vec!["a", "c"]);
    }

    #[test]
    fn test_ready_tasks_follow_completion() {
        let mut plan = plan_abc();
        plan.tasks[0].mark_completed(TaskResult::success("{}"));
        assert_eq!(ids(plan.ready_tasks()), vec!["b", "c"]);

        plan.tasks[1].mark_running();
        assert_eq!(ids(plan.ready_tasks()), vec!["c"]);
    }

    #[test]
    fn test_skipped_dependency_does_not_unblock() {
        let mut plan = plan_abc();
        plan.tasks[0].mark_skipped();
        assert_eq!(ids(plan.ready_tasks()), vec!["c"]);
    }

    #[test]
    fn test_complete_and_failed() {
        let mut plan = plan_abc();
        assert!(!plan.is_complete());
        assert!(!plan.has_failed());

        plan.tasks[0].mark_completed(TaskResult::success("ok"));
        plan.tasks[1].mark_skipped();
        plan.tasks[2].mark_completed(TaskResult::success("ok"));
        assert!(plan.is_complete());

        plan.tasks[2].mark_failed(TaskResult::failure("Error: x"));
        assert!(!plan.is_complete());
        assert!(plan.has_failed());
    }

    #[test]
    fn test_empty_plan_is_complete() {
        let plan = Plan::new(PlanId::new("p"), "nothing");
        assert!(plan.is_complete());
        assert!(!plan.has_failed());
        assert!(plan.ready_tasks().is_empty());
    }

    #[test]
    fn test_validate() {
        assert!(plan_abc().validate().is_ok());

        let dup = Plan::new(PlanId::new("p"), "g")
            .with_task(Task::new("a", TaskKind::Extract, "A"))
            .with_task(Task::new("a", TaskKind::Save, "A again"));
        assert_eq!(dup.validate(), Err(PlanError::DuplicateTaskId("a".into())));

        let dangling = Plan::new(PlanId::new("p"), "g")
            .with_task(Task::new("b", TaskKind::Save, "B").with_dependency("missing"));
        assert!(matches!(
            dangling.validate(),
            Err(PlanError::UnknownDependency { .. })
        ));
    }

    #[test]
    fn test_latest_output_skips_errors() {
        let mut plan = plan_abc();
        plan.tasks[0].mark_completed(TaskResult::success("{\"items\": []}"));
        plan.tasks[2].mark_completed(TaskResult::success(""));
        assert_eq!(plan.latest_output(), Some("{\"items\": []}"));
    }

    #[test]
    fn test_latest_structured_output_prefers_json() {
        let mut plan = plan_abc();
        plan.tasks[0].mark_completed(TaskResult::success("{\"items\": []}"));
        plan.tasks[2].mark_completed(TaskResult::success("Receipt looks legible"));
        assert_eq!(plan.latest_output(), Some("Receipt looks legible"));
        assert_eq!(plan.latest_structured_output(), Some("{\"items\": []}"));

        let mut prose_only = plan_abc();
        prose_only.tasks[2].mark_completed(TaskResult::success("notes"));
        assert_eq!(prose_only.latest_structured_output(), Some("notes"));
    }

    #[test]
    fn test_progress_snapshot() {
        let mut plan = plan_abc();
        plan.tasks[0].mark_completed(TaskResult::success("ok"));
        plan.tasks[2].mark_failed(TaskResult::failure("Error"));
        let progress = plan.progress();
        assert_eq!(progress.total_tasks, 3);
        assert_eq!(progress.completed_tasks, 1);
        assert_eq!(progress.failed_tasks, 1);
        assert!((progress.progress - 1.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_task_declared_fields_round_trip() {
        let mut task = Task::new("save", TaskKind::Save, "Save it")
            .with_tool("save_expense")
            .with_parameter("sheet", "groceries")
            .with_dependency("extract")
            .with_confidence(0.9);
        task.mark_completed(TaskResult::success("saved"));

        let json = serde_json::to_string(&task).unwrap();
        assert!(!json.contains("status"));
        let parsed: Task = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.id, task.id);
        assert_eq!(parsed.kind, task.kind);
        assert_eq!(parsed.description, task.description);
        assert_eq!(parsed.tool, task.tool);
        assert_eq!(parsed.parameters, task.parameters);
        assert_eq!(parsed.dependencies, task.dependencies);
        assert_eq!(parsed.status, TaskStatus::Pending);
        assert!(parsed.result.is_none());
    }
}
