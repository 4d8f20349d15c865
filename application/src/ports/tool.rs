//! Tool ports
//!
//! [`Tool`] is implemented by each concrete extractor or sink;
//! [`ToolExecutorPort`] is how agents reach them by name.
//!
//! Error codes in [`ToolError`]:
//!
//! | Code | Description |
//! |------|-------------|
//! | `NOT_FOUND` | Unknown tool name |
//! | `INVALID_ARGUMENT` | Missing or malformed parameters |
//! | `EXECUTION_FAILED` | Runtime failure (oracle, I/O, validation) |
//! | `NO_HANDLER` | Task has neither a tool nor a reasoning handler |

use async_trait::async_trait;
use expense_domain::{ContextMap, InputKind, ToolBindings};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Named tool parameters.
pub type ToolParams = ContextMap;

/// Parameter carrying extracted expense JSON into a persistence tool.
pub const EXPENSE_DATA_KEY: &str = "expense_data";

/// What a tool is for; drives parameter assembly and fallback plans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolRole {
    ImageExtractor,
    TextExtractor,
    Persistence,
    Other,
}

impl ToolRole {
    pub fn as_str(&self) -> &str {
        match self {
            ToolRole::ImageExtractor => "image_extractor",
            ToolRole::TextExtractor => "text_extractor",
            ToolRole::Persistence => "persistence",
            ToolRole::Other => "other",
        }
    }

    /// Extractor role for a request's payload.
    pub fn extractor_for(kind: InputKind) -> Option<Self> {
        match kind {
            InputKind::Image => Some(ToolRole::ImageExtractor),
            InputKind::Text => Some(ToolRole::TextExtractor),
            InputKind::Unknown => None,
        }
    }
}

impl fmt::Display for ToolRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error that occurred during tool execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolError {
    /// Error code (e.g., "NOT_FOUND", "EXECUTION_FAILED")
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl ToolError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn not_found(tool: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", format!("Tool '{}' not found", tool.into()))
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new("INVALID_ARGUMENT", message)
    }

    pub fn missing_parameter(name: &str) -> Self {
        Self::invalid_argument(format!("Missing required parameter: {}", name))
    }

    pub fn execution_failed(message: impl Into<String>) -> Self {
        Self::new("EXECUTION_FAILED", message)
    }

    pub fn no_handler(kind: impl fmt::Display) -> Self {
        Self::new("NO_HANDLER", format!("No handler for {} task without a tool", kind))
    }
}

/// Renders with the `Error` marker used at textual boundaries.
impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error [{}]: {}", self.code, self.message)
    }
}

impl std::error::Error for ToolError {}

/// Fetch a required string parameter.
pub fn required_str<'a>(params: &'a ToolParams, name: &str) -> Result<&'a str, ToolError> {
    params
        .get(name)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ToolError::missing_parameter(name))
}

/// A named capability agents can invoke.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn role(&self) -> ToolRole;

    async fn execute(&self, params: &ToolParams) -> Result<String, ToolError>;
}

/// Port for tool execution
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait ToolExecutorPort: Send + Sync {
    /// Names of all registered tools, in registration order
    fn tool_names(&self) -> Vec<String>;

    fn role_of(&self, name: &str) -> Option<ToolRole>;

    /// First registered tool with the given role
    fn tool_for_role(&self, role: ToolRole) -> Option<String> {
        self.tool_names()
            .into_iter()
            .find(|name| self.role_of(name) == Some(role))
    }

    fn has_tool(&self, name: &str) -> bool {
        self.role_of(name).is_some()
    }

    /// Tool names per role, for fallback plans and prompts
    fn bindings(&self) -> ToolBindings {
        ToolBindings {
            image_extractor: self.tool_for_role(ToolRole::ImageExtractor),
            text_extractor: self.tool_for_role(ToolRole::TextExtractor),
            persistence: self.tool_for_role(ToolRole::Persistence),
        }
    }

    async fn execute(&self, name: &str, params: &ToolParams) -> Result<String, ToolError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<(&'static str, ToolRole)>);

    #[async_trait]
    impl ToolExecutorPort for Fixed {
        fn tool_names(&self) -> Vec<String> {
            self.0.iter().map(|(n, _)| n.to_string()).collect()
        }

        fn role_of(&self, name: &str) -> Option<ToolRole> {
            self.0.iter().find(|(n, _)| *n == name).map(|(_, r)| *r)
        }

        async fn execute(&self, name: &str, _params: &ToolParams) -> Result<String, ToolError> {
            Err(ToolError::not_found(name))
        }
    }

    #[test]
    fn test_error_renders_with_marker() {
        let err = ToolError::not_found("ocr");
        assert_eq!(err.to_string(), "Error [NOT_FOUND]: Tool 'ocr' not found");
        assert!(ToolError::no_handler("process").to_string().starts_with("Error"));
    }

    #[test]
    fn test_required_str() {
        let mut params = ToolParams::new();
        params.insert("text".into(), "Milk 60".into());
        params.insert("blank".into(), " ".into());
        assert_eq!(required_str(&params, "text"), Ok("Milk 60"));
        assert_eq!(
            required_str(&params, "blank"),
            Err(ToolError::missing_parameter("blank"))
        );
        assert!(required_str(&params, "image_data").is_err());
    }

    #[test]
    fn test_bindings_from_roles() {
        let tools = Fixed(vec![
            ("process_receipt", ToolRole::ImageExtractor),
            ("extract_text_expense", ToolRole::TextExtractor),
            ("save_expense", ToolRole::Persistence),
        ]);
        let bindings = tools.bindings();
        assert_eq!(bindings.image_extractor.as_deref(), Some("process_receipt"));
        assert_eq!(bindings.persistence.as_deref(), Some("save_expense"));
        assert!(tools.has_tool("save_expense"));
        assert!(!tools.has_tool("ocr"));
    }
}
