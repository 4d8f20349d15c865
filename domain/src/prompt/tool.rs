//! Prompt templates for tool selection

/// Templates used by the tool registry's learning features
pub struct ToolPromptTemplate;

impl ToolPromptTemplate {
    /// Prompt asking which tool fits a task.
    ///
    /// `tools` and `performance` are pre-rendered JSON documents.
    pub fn recommendation(task: &str, context: &str, tools: &str, performance: &str) -> String {
        format!(
            r#"## Task

Recommend the best tool for this task based on context and historical performance.

Task: {task}

## Context

{context}

## Available Tools

{tools}

## Tool Performance History

{performance}

## Output

Consider task requirements against tool capabilities, historical success
rates for similar contexts, and context-specific performance patterns.

Respond with JSON only:

{{
  "recommended_tool": "tool_name",
  "confidence": 0.8,
  "reasoning": "detailed explanation",
  "expected_success_rate": 0.8,
  "alternative_tools": ["backup1"]
}}"#
        )
    }

    /// Prompt asking for insights over tool analytics.
    pub fn optimization(analytics: &str) -> String {
        format!(
            r#"## Task

Analyze these tool usage patterns and give optimization recommendations.

## Tool Analytics

{analytics}

## Instructions

Identify:
1. Underperforming tools and possible causes
2. Context-specific performance patterns
3. Opportunities for improvement
4. Tool gaps or redundancies

Keep the answer short and actionable."#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommendation_prompt() {
        let prompt = ToolPromptTemplate::recommendation("Extract items", "{}", "{\"a\": 1}", "{}");
        assert!(prompt.contains("Task: Extract items"));
        assert!(prompt.contains("\"recommended_tool\""));
    }

    #[test]
    fn test_optimization_prompt() {
        assert!(ToolPromptTemplate::optimization("{\"total_tools\": 3}").contains("total_tools"));
    }
}
