//! Prompt templates for planning and executing agent work

use crate::agent::memory::Experience;
use crate::agent::value_objects::{ContextMap, InputKind};
use crate::agent::{Plan, Task};

/// Templates for generating agent prompts
pub struct AgentPromptTemplate;

/// The task schema every plan-producing prompt asks for.
const PLAN_SCHEMA: &str = r#"{
  "goal": "one sentence goal",
  "tasks": [
    {
      "id": "unique_task_id",
      "type": "analyze|extract|process|save|validate|reason",
      "description": "what this task does",
      "tool_name": "tool to use, or null for agent reasoning",
      "parameters": {},
      "dependencies": ["ids of tasks that must complete first"],
      "confidence": 0.9
    }
  ]
}"#;

fn experience_lines(similar: &[&Experience]) -> String {
    if similar.is_empty() {
        return "None".to_string();
    }
    similar
        .iter()
        .map(|e| {
            format!(
                "- goal \"{}\" with {} tasks: {}",
                e.goal,
                e.task_count,
                if e.success { "succeeded" } else { "failed" }
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

impl AgentPromptTemplate {
    /// Prompt asking the oracle for a plan.
    ///
    /// `extractor` and `persistence` are the tool names the example plan
    /// refers to; the oracle may pick any tool in `tools`.
    pub fn planning(
        agent_name: &str,
        kind: InputKind,
        tools: &[String],
        extractor: Option<&str>,
        persistence: Option<&str>,
        similar: &[&Experience],
    ) -> String {
        let tool_list = tools.join(", ");
        let experiences = experience_lines(similar);
        let extractor = extractor.unwrap_or("null");
        let persistence = persistence.unwrap_or("null");

        let (goal, steps, source) = match kind {
            InputKind::Image => (
                "Extract receipt data and save it to the ledger",
                "Create a plan with 2-3 tasks:\n1. Extract data from the receipt image\n2. Save the data to the ledger\n3. (Optional) Validate the extracted data",
                "receipt image",
            ),
            InputKind::Text => (
                "Extract text expense data and save it to the ledger",
                "Create a plan with 2 tasks:\n1. Extract data from the text\n2. Save the data to the ledger",
                "text",
            ),
            InputKind::Unknown => {
                return format!(
                    r#"## Task

Create a simple processing plan for an input of unknown type.

Agent: {agent_name}
Available Tools: {tool_list}

## Similar Past Experiences

{experiences}

Respond with JSON in this format:

{PLAN_SCHEMA}"#
                );
            }
        };

        format!(
            r#"## Task

Create a simple plan to process a {source}.

Agent: {agent_name}
Available Tools: {tool_list}

{steps}

## Similar Past Experiences

{experiences}

## Output

Respond with this exact JSON format:

{{
  "goal": "{goal}",
  "tasks": [
    {{
      "id": "extract_data",
      "type": "extract",
      "description": "Extract expense data from {source}",
      "tool_name": "{extractor}",
      "parameters": {{}},
      "dependencies": [],
      "confidence": 0.9
    }},
    {{
      "id": "save_data",
      "type": "save",
      "description": "Save extracted data to the ledger",
      "tool_name": "{persistence}",
      "parameters": {{}},
      "dependencies": ["extract_data"],
      "confidence": 0.9
    }}
  ]
}}"#
        )
    }

    /// Prompt asking the oracle to replace a plan after a task failed.
    pub fn adaptation(
        plan: &Plan,
        failed: &Task,
        error: &str,
        tools: &[String],
        capabilities: &[String],
    ) -> String {
        format!(
            r#"## Task

A task in my plan has failed. Help me adapt.

Original Goal: {goal}
Failed Task: {description} (type: {kind}, tool: {tool})
Error: {error}

Available Tools: {tools}
Agent Capabilities: {capabilities}

## Instructions

Consider:
1. Alternative tools or approaches
2. Breaking the task into smaller steps
3. Changing the order of operations
4. Adding validation or preprocessing steps

Respond with a complete replacement plan in this JSON format:

{PLAN_SCHEMA}"#,
            goal = plan.goal,
            description = failed.description,
            kind = failed.kind,
            tool = failed.tool.as_deref().unwrap_or("none"),
            tools = tools.join(", "),
            capabilities = capabilities.join(", "),
        )
    }

    /// Prompt for an analyze/reason task run by the agent itself.
    pub fn reasoning(agent_name: &str, task: &Task, preview: &ContextMap) -> String {
        let input = serde_json::to_string_pretty(preview).unwrap_or_default();
        format!(
            r#"You are {agent_name}, an expense processing agent.

## Task

{description}

## Input

{input}

Answer concisely. Describe what the input contains and anything that affects
how the expense should be extracted and recorded."#,
            description = task.description,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{PlanId, TaskKind};

    fn tools() -> Vec<String> {
        vec!["extract_text_expense".into(), "save_expense".into()]
    }

    #[test]
    fn test_planning_prompt_names_tools() {
        let prompt = AgentPromptTemplate::planning(
            "Text Expense Agent",
            InputKind::Text,
            &tools(),
            Some("extract_text_expense"),
            Some("save_expense"),
            &[],
        );
        assert!(prompt.contains("Text Expense Agent"));
        assert!(prompt.contains("\"tool_name\": \"extract_text_expense\""));
        assert!(prompt.contains("\"dependencies\": [\"extract_data\"]"));
        assert!(prompt.contains("None"));
    }

    #[test]
    fn test_generic_planning_prompt_has_schema() {
        let prompt = AgentPromptTemplate::planning("A", InputKind::Unknown, &tools(), None, None, &[]);
        assert!(prompt.contains("unknown type"));
        assert!(prompt.contains("\"tasks\""));
    }

    #[test]
    fn test_adaptation_prompt() {
        let plan = Plan::new(PlanId::new("p"), "Save groceries");
        let task = Task::new("extract", TaskKind::Extract, "Extract items").with_tool("extract_text_expense");
        let prompt = AgentPromptTemplate::adaptation(
            &plan,
            &task,
            "Error: quota",
            &tools(),
            &["text_parsing".to_string()],
        );
        assert!(prompt.contains("Original Goal: Save groceries"));
        assert!(prompt.contains("tool: extract_text_expense"));
        assert!(prompt.contains("Error: quota"));
        assert!(prompt.contains("text_parsing"));
    }
}
