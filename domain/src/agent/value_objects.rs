//! Agent domain value objects - immutable types for the orchestration core.
//!
//! # Identifiers
//! - [`PlanId`] - Unique identifier for a plan (fresh on every adaptation)
//! - [`TaskId`] - Identifier for a task, unique within its plan
//!
//! # Requests and Outcomes
//! - [`AgentInput`] - Named inputs of a request (image, text, message date)
//! - [`InputKind`] - What kind of payload a request carries
//! - [`AgentOutcome`] - The one result every agent/manager call returns
//! - [`AgentProfile`] - Roster entry used for routing
//!
//! # Execution Data
//! - [`TaskResult`] - Outcome of a single task execution

use crate::util::truncate_str;
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Mutable key/value context shared between planning, execution and
/// collaborating agents.
pub type ContextMap = Map<String, Value>;

/// Input key carrying a base64-encoded receipt image.
pub const IMAGE_DATA_KEY: &str = "image_data";
/// Input key carrying free expense text.
pub const TEXT_KEY: &str = "text";
/// Input key carrying the ISO date the request was made.
pub const MESSAGE_DATE_KEY: &str = "message_date";

/// Unique identifier for a plan.
///
/// Every adaptation produces a new id; ids are never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlanId(String);

impl PlanId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a new id of the form `<prefix>_<YYYYmmdd_HHMMSS>_<8 hex>`.
    pub fn generate(prefix: &str) -> Self {
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        Self(format!("{}_{}_{}", prefix, stamp, &suffix[..8]))
    }

    /// Derives the id of a plan that replaces `self` after a failure.
    pub fn adapted(&self) -> Self {
        let stamp = Local::now().format("%H%M%S");
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        Self(format!("{}_adapted_{}_{}", self.0, stamp, &suffix[..4]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for a task within a plan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of a task execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    /// Whether the task succeeded
    pub success: bool,
    /// Output/result content
    pub output: String,
    /// Error message if failed
    pub error: Option<String>,
}

impl TaskResult {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: String::new(),
            error: Some(error.into()),
        }
    }

    /// Parses the output as a JSON object, if it is one.
    pub fn structured(&self) -> Option<Map<String, Value>> {
        if !self.success {
            return None;
        }
        crate::util::extract_json_object(&self.output)
    }
}

/// What kind of payload a request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Image,
    Text,
    Unknown,
}

impl InputKind {
    pub fn as_str(&self) -> &str {
        match self {
            InputKind::Image => "image",
            InputKind::Text => "text",
            InputKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Named inputs of one request.
///
/// Well-known keys are `image_data`, `text` and `message_date`; any other
/// key is carried through to the plan context untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentInput(ContextMap);

impl AgentInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request carrying free expense text.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new().with(TEXT_KEY, text.into())
    }

    /// Request carrying a base64-encoded receipt image.
    pub fn image(image_data: impl Into<String>) -> Self {
        Self::new().with(IMAGE_DATA_KEY, image_data.into())
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn with_message_date(self, date: impl Into<String>) -> Self {
        self.with(MESSAGE_DATE_KEY, date.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn image_data(&self) -> Option<&str> {
        self.get_str(IMAGE_DATA_KEY).filter(|s| !s.is_empty())
    }

    pub fn text_content(&self) -> Option<&str> {
        self.get_str(TEXT_KEY).filter(|s| !s.is_empty())
    }

    pub fn message_date(&self) -> Option<&str> {
        self.get_str(MESSAGE_DATE_KEY)
    }

    /// Image wins over text when both are present.
    pub fn kind(&self) -> InputKind {
        if self.image_data().is_some() {
            InputKind::Image
        } else if self.text_content().is_some() {
            InputKind::Text
        } else {
            InputKind::Unknown
        }
    }

    pub fn as_map(&self) -> &ContextMap {
        &self.0
    }

    /// Oracle-safe preview: text truncated to `max_text` bytes, images
    /// reduced to their encoded size.
    pub fn preview(&self, max_text: usize) -> ContextMap {
        self.0
            .iter()
            .map(|(key, value)| {
                let preview = match (key.as_str(), value) {
                    (IMAGE_DATA_KEY, Value::String(s)) => {
                        Value::String(format!("<image: {} base64 chars>", s.len()))
                    }
                    (_, Value::String(s)) => Value::String(truncate_str(s, max_text).to_string()),
                    (_, other) => other.clone(),
                };
                (key.clone(), preview)
            })
            .collect()
    }
}

impl From<ContextMap> for AgentInput {
    fn from(map: ContextMap) -> Self {
        Self(map)
    }
}

/// Result returned by every agent and manager entry point.
///
/// `message` is for humans; `error` is the technical detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentOutcome {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AgentOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            error: Some(error.into()),
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Structured payload as a JSON object, if any.
    pub fn data_object(&self) -> Option<&Map<String, Value>> {
        self.data.as_ref().and_then(Value::as_object)
    }

    /// Short text suitable for memory records and logs.
    pub fn summary(&self) -> String {
        if self.success {
            self.message.clone()
        } else {
            self.error.clone().unwrap_or_else(|| self.message.clone())
        }
    }
}

/// Roster entry describing one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentProfile {
    pub name: String,
    pub description: String,
    pub capabilities: Vec<String>,
    /// Input kinds this agent can handle on its own.
    pub input_kinds: Vec<InputKind>,
}

impl AgentProfile {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            capabilities: Vec::new(),
            input_kinds: Vec::new(),
        }
    }

    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.push(capability.into());
        self
    }

    pub fn handling(mut self, kind: InputKind) -> Self {
        self.input_kinds.push(kind);
        self
    }

    pub fn handles(&self, kind: InputKind) -> bool {
        self.input_kinds.contains(&kind)
    }
}
