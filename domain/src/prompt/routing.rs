//! Prompt templates for the agent manager

use crate::agent::value_objects::{AgentProfile, ContextMap};

/// Templates for routing and collaborative synthesis
pub struct RoutingPromptTemplate;

impl RoutingPromptTemplate {
    /// Prompt asking which agent(s) should take a request.
    pub fn routing(preview: &ContextMap, roster: &[AgentProfile], recent: &str) -> String {
        let request = serde_json::to_string_pretty(preview).unwrap_or_default();
        let agents = roster
            .iter()
            .map(|p| {
                format!(
                    "- **{}**: {}\n  Capabilities: {}",
                    p.name,
                    p.description,
                    p.capabilities.join(", ")
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        let recent = if recent.is_empty() { "None" } else { recent };

        format!(
            r#"## Task

Decide which agent should handle this expense request.

## Request

{request}

## Available Agents

{agents}

## Recent Routing Decisions

{recent}

## Output

Respond with JSON only:

{{
  "bestAgent": "exact agent name",
  "confidence": 0.9,
  "requiresCollaboration": false,
  "collaborativeAgents": [],
  "reasoning": "why this agent fits",
  "complexityLevel": "low|medium|high",
  "alternativeAgents": [],
  "expectedSuccessRate": 0.9
}}

Only set "requiresCollaboration" when the request needs more than one agent;
"collaborativeAgents" then lists them in execution order."#
        )
    }

    /// Prompt asking for a prose summary of several agents' results.
    pub fn collaborative_synthesis(results: &[(String, String)]) -> String {
        let results = results
            .iter()
            .map(|(agent, message)| format!("### {}\n{}", agent, message))
            .collect::<Vec<_>>()
            .join("\n\n");

        format!(
            r#"## Task

Several agents processed the same expense request. Combine their results
into one short summary for the user. Mention conflicting values if any.

## Results

{results}"#
        )
    }
}
