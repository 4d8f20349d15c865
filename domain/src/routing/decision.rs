//! Routing decisions produced by the manager's analysis step.

use crate::agent::value_objects::{AgentProfile, InputKind};
use crate::util::extract_json_object;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How demanding the analyzed request looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl ComplexityLevel {
    fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "low" | "simple" => ComplexityLevel::Low,
            "high" | "complex" => ComplexityLevel::High,
            _ => ComplexityLevel::Medium,
        }
    }
}

/// Where a request should go.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingDecision {
    /// `None` means nothing on the roster can take the request
    pub best_agent: Option<String>,
    pub confidence: f64,
    pub requires_collaboration: bool,
    /// Execution order when collaborating
    pub collaborative_agents: Vec<String>,
    pub reasoning: String,
    pub complexity_level: ComplexityLevel,
    pub alternative_agents: Vec<String>,
    pub expected_success_rate: f64,
    /// Set when the decision came from the deterministic fallback
    #[serde(default)]
    pub fallback: bool,
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// First present key among camelCase and snake_case spellings.
fn field<'a>(obj: &'a serde_json::Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|n| obj.get(*n)).filter(|v| !v.is_null())
}

impl RoutingDecision {
    /// Parse the oracle's routing analysis.
    ///
    /// Returns `None` unless the response names a best agent, or asks for
    /// collaboration with at least one agent.
    pub fn parse(response: &str) -> Option<Self> {
        let obj = extract_json_object(response.trim())?;

        let best_agent = field(&obj, &["bestAgent", "best_agent"])
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let collaborative_agents =
            string_list(field(&obj, &["collaborativeAgents", "collaborative_agents"]));
        let requires_collaboration = field(&obj, &["requiresCollaboration", "requires_collaboration"])
            .and_then(Value::as_bool)
            .unwrap_or(false)
            && !collaborative_agents.is_empty();

        if best_agent.is_none() && !requires_collaboration {
            return None;
        }

        let confidence = field(&obj, &["confidence"])
            .and_then(Value::as_f64)
            .unwrap_or(0.5)
            .clamp(0.0, 1.0);

        Some(Self {
            best_agent: best_agent.or_else(|| collaborative_agents.first().cloned()),
            confidence,
            requires_collaboration,
            collaborative_agents,
            reasoning: field(&obj, &["reasoning"])
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            complexity_level: field(&obj, &["complexityLevel", "complexity_level"])
                .and_then(Value::as_str)
                .map(ComplexityLevel::parse)
                .unwrap_or_default(),
            alternative_agents: string_list(field(&obj, &["alternativeAgents", "alternative_agents"])),
            expected_success_rate: field(&obj, &["expectedSuccessRate", "expected_success_rate"])
                .and_then(Value::as_f64)
                .unwrap_or(confidence)
                .clamp(0.0, 1.0),
            fallback: false,
        })
    }

    /// Deterministic decision used when analysis fails.
    ///
    /// Picks the first agent on the roster that handles the input kind.
    pub fn fallback(kind: InputKind, roster: &[AgentProfile]) -> Self {
        let agent = match kind {
            InputKind::Unknown => None,
            kind => roster.iter().find(|p| p.handles(kind)).map(|p| p.name.clone()),
        };
        let confidence = if agent.is_some() { 0.7 } else { 0.3 };
        let reasoning = match &agent {
            Some(name) => format!("Fallback routing of {} input to {}", kind, name),
            None => format!("No agent available for {} input", kind),
        };

        Self {
            best_agent: agent,
            confidence,
            requires_collaboration: false,
            collaborative_agents: Vec::new(),
            reasoning,
            complexity_level: ComplexityLevel::Medium,
            alternative_agents: Vec::new(),
            expected_success_rate: confidence,
            fallback: true,
        }
    }

    /// Agents that take part, in execution order.
    pub fn participants(&self) -> Vec<&str> {
        if self.requires_collaboration {
            self.collaborative_agents.iter().map(String::as_str).collect()
        } else {
            self.best_agent.iter().map(String::as_str).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Vec<AgentProfile> {
        vec![
            AgentProfile::new("Receipt Processing Agent", "images").handling(InputKind::Image),
            AgentProfile::new("Text Expense Agent", "text").handling(InputKind::Text),
        ]
    }

    #[test]
    fn test_parse_single_agent_decision() {
        let response = r#"Analysis:
{"bestAgent": "Text Expense Agent", "confidence": 0.92, "requiresCollaboration": false,
 "collaborativeAgents": [], "reasoning": "plain text", "complexityLevel": "low",
 "alternativeAgents": ["Receipt Processing Agent"], "expectedSuccessRate": 0.9}"#;
        let decision = RoutingDecision::parse(response).unwrap();
        assert_eq!(decision.best_agent.as_deref(), Some("Text Expense Agent"));
        assert!(!decision.requires_collaboration);
        assert_eq!(decision.complexity_level, ComplexityLevel::Low);
        assert_eq!(decision.alternative_agents, vec!["Receipt Processing Agent"]);
        assert_eq!(decision.participants(), vec!["Text Expense Agent"]);
        assert!(!decision.fallback);
    }

    #[test]
    fn test_parse_collaborative_decision() {
        let response = r#"{"best_agent": null, "requires_collaboration": true,
            "collaborative_agents": ["Receipt Processing Agent", "Text Expense Agent"]}"#;
        let decision = RoutingDecision::parse(response).unwrap();
        assert!(decision.requires_collaboration);
        assert_eq!(decision.best_agent.as_deref(), Some("Receipt Processing Agent"));
        assert_eq!(
            decision.participants(),
            vec!["Receipt Processing Agent", "Text Expense Agent"]
        );
    }

    #[test]
    fn test_parse_rejects_unusable_responses() {
        assert!(RoutingDecision::parse("").is_none());
        assert!(RoutingDecision::parse("Error: timeout").is_none());
        assert!(RoutingDecision::parse(r#"{"confidence": 0.9}"#).is_none());
        // collaboration without agents is not a decision
        assert!(RoutingDecision::parse(r#"{"requiresCollaboration": true}"#).is_none());
    }

    #[test]
    fn test_fallback_by_input_kind() {
        let image = RoutingDecision::fallback(InputKind::Image, &roster());
        assert_eq!(image.best_agent.as_deref(), Some("Receipt Processing Agent"));
        assert!((image.confidence - 0.7).abs() < f64::EPSILON);
        assert!(image.fallback);

        let text = RoutingDecision::fallback(InputKind::Text, &roster());
        assert_eq!(text.best_agent.as_deref(), Some("Text Expense Agent"));

        let unknown = RoutingDecision::fallback(InputKind::Unknown, &roster());
        assert!(unknown.best_agent.is_none());
        assert!((unknown.confidence - 0.3).abs() < f64::EPSILON);
        assert!(unknown.participants().is_empty());
    }
}
