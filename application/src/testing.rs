//! Scripted test doubles shared by the agent and manager tests.

use crate::ports::event_logger::{EventLogger, ExecutionEvent};
use crate::ports::oracle::{Oracle, OracleError};
use crate::ports::tool::{ToolError, ToolExecutorPort, ToolParams, ToolRole};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Oracle answering from a queue; an exhausted queue is a connection error.
pub struct ScriptedOracle {
    responses: Mutex<VecDeque<Result<String, OracleError>>>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedOracle {
    pub fn new(responses: Vec<Result<String, OracleError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn replies(replies: &[&str]) -> Self {
        Self::new(replies.iter().map(|r| Ok(r.to_string())).collect())
    }

    pub fn unreachable() -> Self {
        Self::new(Vec::new())
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn call(&self, prompt: &str) -> Result<String, OracleError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(OracleError::ConnectionError("script exhausted".into())))
    }

    async fn call_with_image(
        &self,
        prompt: &str,
        _image: &[u8],
        _mime_type: &str,
    ) -> Result<String, OracleError> {
        self.call(prompt).await
    }
}

/// Tool set with fixed roles; each tool answers from its own queue and
/// records the parameters it was called with.
pub struct MockTools {
    tools: Vec<(String, ToolRole)>,
    responses: Mutex<Vec<(String, VecDeque<Result<String, ToolError>>)>>,
    pub calls: Mutex<Vec<(String, ToolParams)>>,
}

impl MockTools {
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            responses: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// The three standard tools with no scripted answers.
    pub fn standard() -> Self {
        Self::new()
            .with_tool("process_receipt", ToolRole::ImageExtractor)
            .with_tool("extract_text_expense", ToolRole::TextExtractor)
            .with_tool("save_expense", ToolRole::Persistence)
    }

    pub fn with_tool(mut self, name: &str, role: ToolRole) -> Self {
        self.tools.push((name.to_string(), role));
        self.responses
            .get_mut()
            .unwrap()
            .push((name.to_string(), VecDeque::new()));
        self
    }

    pub fn respond(self, name: &str, response: Result<&str, ToolError>) -> Self {
        {
            let mut responses = self.responses.lock().unwrap();
            let queue = responses
                .iter_mut()
                .find(|(n, _)| n == name)
                .map(|(_, q)| q)
                .expect("tool registered before scripting");
            queue.push_back(response.map(str::to_string));
        }
        self
    }

    pub fn calls_to(&self, name: &str) -> Vec<ToolParams> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, p)| p.clone())
            .collect()
    }
}

#[async_trait]
impl ToolExecutorPort for MockTools {
    fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|(n, _)| n.clone()).collect()
    }

    fn role_of(&self, name: &str) -> Option<ToolRole> {
        self.tools.iter().find(|(n, _)| n == name).map(|(_, r)| *r)
    }

    async fn execute(&self, name: &str, params: &ToolParams) -> Result<String, ToolError> {
        self.calls
            .lock()
            .unwrap()
            .push((name.to_string(), params.clone()));
        let mut responses = self.responses.lock().unwrap();
        match responses.iter_mut().find(|(n, _)| n == name) {
            Some((_, queue)) => queue
                .pop_front()
                .unwrap_or_else(|| Err(ToolError::execution_failed("no scripted response"))),
            None => Err(ToolError::not_found(name)),
        }
    }
}

/// Event logger keeping every event type in order.
#[derive(Default)]
pub struct RecordingLogger {
    pub events: Mutex<Vec<(String, serde_json::Value)>>,
}

impl RecordingLogger {
    pub fn types(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|(t, _)| t.clone())
            .collect()
    }
}

impl EventLogger for RecordingLogger {
    fn log(&self, event: ExecutionEvent) {
        self.events
            .lock()
            .unwrap()
            .push((event.event_type.to_string(), event.payload));
    }
}

/// Extraction output for one item.
pub const MILK_JSON: &str =
    r#"{"store":"More","date":"2024-06-18","items":[{"name":"Milk","quantity":"1","unit":"pcs","total_price":60.0}],"total":60.0}"#;

/// An oracle planning reply wrapping `tasks` in prose.
pub fn plan_reply(tasks: &str) -> String {
    format!(r#"Here is the plan: {{"goal": "Record expense", "tasks": {}}}"#, tasks)
}
