//! Tool Registry
//!
//! The [`ToolRegistry`] owns the concrete tools and implements
//! [`ToolExecutorPort`]. Every execution is measured and recorded so the
//! registry can report per-tool performance, recommend a tool for a task
//! and ask the oracle for optimization insights.
//!
//! # Usage
//!
//! ```ignore
//! let registry = ToolRegistry::new()
//!     .register(TextExpenseExtractor::new(oracle.clone()))
//!     .register(LedgerWriter::new("expenses.csv"))
//!     .with_oracle(oracle);
//!
//! let output = registry.execute("extract_text_expense", &params).await?;
//! ```
//!
//! # Context types
//!
//! Executions are classified by their parameters:
//!
//! | Context | Parameters |
//! |---------|------------|
//! | `image_processing` | `image_data` present |
//! | `long_text_processing` | `text` longer than 100 characters |
//! | `short_text_processing` | other `text` |
//! | `data_saving` | `expense_data` present |
//! | `unknown` | anything else |

use async_trait::async_trait;
use chrono::{DateTime, Local};
use expense_application::ports::oracle::{Oracle, interpret_response};
use expense_application::ports::tool::{
    EXPENSE_DATA_KEY, Tool, ToolError, ToolExecutorPort, ToolParams, ToolRole,
};
use expense_domain::util::extract_json_object;
use expense_domain::{IMAGE_DATA_KEY, TEXT_KEY, ToolPromptTemplate};
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tracing::{debug, info, warn};

const HISTORY_CAP: usize = 1000;
const MAX_ERROR_PATTERNS: usize = 10;
const ERROR_PATTERN_CHARS: usize = 100;
const CONTEXT_ANALYSIS_WINDOW: usize = 100;
const LONG_TEXT_CHARS: usize = 100;

/// Kind of work an execution performed, derived from its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextType {
    ImageProcessing,
    LongTextProcessing,
    ShortTextProcessing,
    DataSaving,
    Unknown,
}

impl ContextType {
    pub fn as_str(&self) -> &str {
        match self {
            ContextType::ImageProcessing => "image_processing",
            ContextType::LongTextProcessing => "long_text_processing",
            ContextType::ShortTextProcessing => "short_text_processing",
            ContextType::DataSaving => "data_saving",
            ContextType::Unknown => "unknown",
        }
    }

    pub fn classify(params: &ToolParams) -> Self {
        if params.contains_key(IMAGE_DATA_KEY) {
            return ContextType::ImageProcessing;
        }
        if let Some(text) = params.get(TEXT_KEY) {
            let len = match text {
                Value::String(s) => s.chars().count(),
                other => other.to_string().chars().count(),
            };
            return if len > LONG_TEXT_CHARS {
                ContextType::LongTextProcessing
            } else {
                ContextType::ShortTextProcessing
            };
        }
        if params.contains_key(EXPENSE_DATA_KEY) {
            return ContextType::DataSaving;
        }
        ContextType::Unknown
    }
}

/// Running performance numbers for one tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ToolPerformance {
    pub total_executions: usize,
    pub successful_executions: usize,
    /// Mean wall time of successful executions, in seconds
    pub average_execution_secs: f64,
    /// First errors seen, truncated
    pub error_patterns: Vec<String>,
    /// Successful executions per context type
    pub context_preferences: BTreeMap<String, usize>,
}

impl ToolPerformance {
    pub fn success_rate(&self) -> f64 {
        if self.total_executions == 0 {
            0.0
        } else {
            self.successful_executions as f64 / self.total_executions as f64
        }
    }

    fn record_success(&mut self, secs: f64, context: ContextType) {
        self.total_executions += 1;
        self.successful_executions += 1;
        let n = self.successful_executions as f64;
        self.average_execution_secs = (self.average_execution_secs * (n - 1.0) + secs) / n;
        *self
            .context_preferences
            .entry(context.as_str().to_string())
            .or_default() += 1;
    }

    fn record_failure(&mut self, error: &str) {
        self.total_executions += 1;
        if self.error_patterns.len() < MAX_ERROR_PATTERNS {
            self.error_patterns
                .push(error.chars().take(ERROR_PATTERN_CHARS).collect());
        }
    }
}

/// One entry of the execution history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionRecord {
    pub timestamp: DateTime<Local>,
    pub tool_name: String,
    pub success: bool,
    pub execution_secs: f64,
    pub context_type: ContextType,
    pub parameters: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A suggested tool for a task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolRecommendation {
    pub tool_name: String,
    pub confidence: f64,
    pub reasoning: String,
    pub expected_success_rate: f64,
    pub alternative_tools: Vec<String>,
    /// Produced by heuristics rather than the oracle
    pub fallback: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolPerformanceSummary {
    pub success_rate: f64,
    pub total_executions: usize,
    pub average_execution_secs: f64,
    pub recent_errors: Vec<String>,
    pub preferred_contexts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContextStats {
    pub total_executions: usize,
    pub successes: usize,
    pub success_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExecutionTrend {
    pub executions_today: usize,
    pub successes_today: usize,
    pub most_used_tool_today: Option<String>,
}

/// Snapshot of tool usage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolAnalytics {
    pub total_tools: usize,
    pub total_executions: usize,
    pub overall_success_rate: f64,
    pub tool_performance: BTreeMap<String, ToolPerformanceSummary>,
    /// Over the most recent executions only
    pub context_analysis: BTreeMap<String, ContextStats>,
    pub execution_trends: ExecutionTrend,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationReport {
    pub analytics: ToolAnalytics,
    /// Oracle commentary, absent when the oracle could not be reached
    pub insights: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub low_performing_tools: Vec<String>,
    pub high_performing_tools: Vec<String>,
    pub priority: String,
}

#[derive(Default)]
struct LearningState {
    performance: BTreeMap<String, ToolPerformance>,
    history: Vec<ExecutionRecord>,
}

/// Tool registry with execution tracking
pub struct ToolRegistry {
    /// Registered tools, in registration order
    tools: Vec<Arc<dyn Tool>>,
    oracle: Option<Arc<dyn Oracle>>,
    state: Mutex<LearningState>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            oracle: None,
            state: Mutex::new(LearningState::default()),
        }
    }

    /// Register a tool. A later tool with the same name replaces the earlier one.
    pub fn register<T: Tool + 'static>(self, tool: T) -> Self {
        self.register_arc(Arc::new(tool))
    }

    pub fn register_arc(mut self, tool: Arc<dyn Tool>) -> Self {
        info!(tool = tool.name(), role = %tool.role(), "Registered tool");
        self.tools.retain(|t| t.name() != tool.name());
        self.lock_state()
            .performance
            .insert(tool.name().to_string(), ToolPerformance::default());
        self.tools.push(tool);
        self
    }

    /// Oracle used for recommendations and optimization insights.
    pub fn with_oracle(mut self, oracle: Arc<dyn Oracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    fn tool(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    fn lock_state(&self) -> MutexGuard<'_, LearningState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Tool name and "description | Success Rate | Executions" line.
    pub fn list_tools(&self) -> Vec<(String, String)> {
        let state = self.lock_state();
        self.tools
            .iter()
            .map(|tool| {
                let perf = state.performance.get(tool.name()).cloned().unwrap_or_default();
                (
                    tool.name().to_string(),
                    format!(
                        "{} | Success Rate: {:.2} | Executions: {}",
                        tool.description(),
                        perf.success_rate(),
                        perf.total_executions
                    ),
                )
            })
            .collect()
    }

    pub fn performance(&self, name: &str) -> Option<ToolPerformance> {
        self.lock_state().performance.get(name).cloned()
    }

    pub fn history(&self) -> Vec<ExecutionRecord> {
        self.lock_state().history.clone()
    }

    fn record(&self, record: ExecutionRecord) {
        let mut state = self.lock_state();
        if let Some(perf) = state.performance.get_mut(&record.tool_name) {
            if record.success {
                perf.record_success(record.execution_secs, record.context_type);
            } else {
                perf.record_failure(record.error.as_deref().unwrap_or(""));
            }
        }
        state.history.push(record);
        if state.history.len() > HISTORY_CAP {
            let excess = state.history.len() - HISTORY_CAP / 2;
            state.history.drain(..excess);
        }
    }

    /// Recommend a tool for a task, asking the oracle first.
    ///
    /// Returns `None` only when no tool is registered.
    pub async fn recommend_tool(&self, task: &str, context: &Value) -> Option<ToolRecommendation> {
        if self.tools.is_empty() {
            return None;
        }
        if let Some(oracle) = &self.oracle {
            let tools: BTreeMap<String, String> = self.list_tools().into_iter().collect();
            let performance: BTreeMap<String, Value> = self
                .lock_state()
                .performance
                .iter()
                .map(|(name, perf)| {
                    (
                        name.clone(),
                        json!({
                            "success_rate": perf.success_rate(),
                            "total_executions": perf.total_executions,
                        }),
                    )
                })
                .collect();
            let prompt = ToolPromptTemplate::recommendation(
                task,
                &serde_json::to_string_pretty(context).unwrap_or_default(),
                &serde_json::to_string_pretty(&tools).unwrap_or_default(),
                &serde_json::to_string_pretty(&performance).unwrap_or_default(),
            );
            match oracle.call(&prompt).await.and_then(interpret_response) {
                Ok(response) => {
                    if let Some(recommendation) = self.parse_recommendation(&response) {
                        return Some(recommendation);
                    }
                    warn!("Unusable tool recommendation, using heuristics");
                }
                Err(e) => warn!("Tool recommendation failed ({}), using heuristics", e),
            }
        }
        self.fallback_recommendation(task)
    }

    fn parse_recommendation(&self, response: &str) -> Option<ToolRecommendation> {
        let obj = extract_json_object(response)?;
        let tool_name = obj.get("recommended_tool").and_then(Value::as_str)?;
        self.tool(tool_name)?;
        let number = |key: &str| obj.get(key).and_then(Value::as_f64).unwrap_or(0.5).clamp(0.0, 1.0);
        Some(ToolRecommendation {
            tool_name: tool_name.to_string(),
            confidence: number("confidence"),
            reasoning: obj
                .get("reasoning")
                .and_then(Value::as_str)
                .unwrap_or("Oracle recommendation")
                .to_string(),
            expected_success_rate: number("expected_success_rate"),
            alternative_tools: obj
                .get("alternative_tools")
                .and_then(Value::as_array)
                .map(|a| a.iter().filter_map(Value::as_str).map(str::to_string).collect())
                .unwrap_or_default(),
            fallback: false,
        })
    }

    /// Keyword heuristics over the task description.
    fn fallback_recommendation(&self, task: &str) -> Option<ToolRecommendation> {
        let lower = task.to_lowercase();
        let mentions = |words: &[&str]| words.iter().any(|w| lower.contains(w));

        let by_role = if mentions(&["receipt", "image"]) {
            Some((ToolRole::ImageExtractor, 0.7, "receipt or image processing"))
        } else if mentions(&["text", "extract"]) {
            Some((ToolRole::TextExtractor, 0.7, "text processing"))
        } else if mentions(&["save", "sheet", "ledger"]) {
            Some((ToolRole::Persistence, 0.8, "saving data"))
        } else {
            None
        };

        if let Some((role, confidence, topic)) = by_role
            && let Some(name) = self.tool_for_role(role)
        {
            let alternatives = match role {
                ToolRole::Persistence => Vec::new(),
                _ => self
                    .tools
                    .iter()
                    .filter(|t| t.name() != name)
                    .filter(|t| matches!(t.role(), ToolRole::ImageExtractor | ToolRole::TextExtractor))
                    .map(|t| t.name().to_string())
                    .collect(),
            };
            return Some(ToolRecommendation {
                tool_name: name,
                confidence,
                reasoning: format!("Fallback: task mentions {}", topic),
                expected_success_rate: confidence,
                alternative_tools: alternatives,
                fallback: true,
            });
        }

        let state = self.lock_state();
        let (name, rate) = self
            .tools
            .iter()
            .map(|t| {
                let rate = state
                    .performance
                    .get(t.name())
                    .map(ToolPerformance::success_rate)
                    .unwrap_or(0.0);
                (t.name().to_string(), rate)
            })
            .fold(None, |best: Option<(String, f64)>, (name, rate)| match best {
                Some((_, best_rate)) if best_rate >= rate => best,
                _ => Some((name, rate)),
            })?;
        Some(ToolRecommendation {
            tool_name: name,
            confidence: 0.5,
            reasoning: format!("Fallback: highest performing tool ({:.2} success rate)", rate),
            expected_success_rate: rate,
            alternative_tools: Vec::new(),
            fallback: true,
        })
    }

    pub fn analytics(&self) -> ToolAnalytics {
        let state = self.lock_state();
        let total_executions: usize = state.performance.values().map(|p| p.total_executions).sum();
        let total_successes: usize = state
            .performance
            .values()
            .map(|p| p.successful_executions)
            .sum();

        let tool_performance = state
            .performance
            .iter()
            .map(|(name, perf)| {
                let skip = perf.error_patterns.len().saturating_sub(3);
                (
                    name.clone(),
                    ToolPerformanceSummary {
                        success_rate: perf.success_rate(),
                        total_executions: perf.total_executions,
                        average_execution_secs: perf.average_execution_secs,
                        recent_errors: perf.error_patterns[skip..].to_vec(),
                        preferred_contexts: perf.context_preferences.clone(),
                    },
                )
            })
            .collect();

        let mut context_analysis: BTreeMap<String, ContextStats> = BTreeMap::new();
        let skip = state.history.len().saturating_sub(CONTEXT_ANALYSIS_WINDOW);
        for record in &state.history[skip..] {
            let stats = context_analysis
                .entry(record.context_type.as_str().to_string())
                .or_default();
            stats.total_executions += 1;
            if record.success {
                stats.successes += 1;
            }
        }
        for stats in context_analysis.values_mut() {
            stats.success_rate = stats.successes as f64 / stats.total_executions as f64;
        }

        let today = Local::now().date_naive();
        let mut per_tool_today: BTreeMap<&str, usize> = BTreeMap::new();
        let mut trend = ExecutionTrend::default();
        for record in state.history.iter().filter(|r| r.timestamp.date_naive() == today) {
            trend.executions_today += 1;
            if record.success {
                trend.successes_today += 1;
            }
            *per_tool_today.entry(record.tool_name.as_str()).or_default() += 1;
        }
        trend.most_used_tool_today = per_tool_today
            .into_iter()
            .max_by_key(|(_, count)| *count)
            .map(|(name, _)| name.to_string());

        ToolAnalytics {
            total_tools: self.tools.len(),
            total_executions,
            overall_success_rate: if total_executions == 0 {
                0.0
            } else {
                total_successes as f64 / total_executions as f64
            },
            tool_performance,
            context_analysis,
            execution_trends: trend,
        }
    }

    /// Analytics plus oracle insights and performer lists.
    pub async fn optimize(&self) -> OptimizationReport {
        let analytics = self.analytics();
        let (low, high) = {
            let state = self.lock_state();
            let pick = |keep: fn(f64) -> bool| -> Vec<String> {
                state
                    .performance
                    .iter()
                    .filter(|(_, p)| p.total_executions > 5 && keep(p.success_rate()))
                    .map(|(name, _)| name.clone())
                    .collect()
            };
            (pick(|rate| rate < 0.7), pick(|rate| rate > 0.9))
        };
        let priority = if analytics.overall_success_rate < 0.8 {
            "high"
        } else {
            "medium"
        };

        let (insights, error) = match &self.oracle {
            Some(oracle) => {
                let prompt = ToolPromptTemplate::optimization(
                    &serde_json::to_string_pretty(&analytics).unwrap_or_default(),
                );
                match oracle.call(&prompt).await.and_then(interpret_response) {
                    Ok(text) => (Some(text), None),
                    Err(e) => {
                        warn!("Tool optimization analysis failed: {}", e);
                        (None, Some(format!("Optimization analysis failed: {}", e)))
                    }
                }
            }
            None => (None, Some("No oracle configured".to_string())),
        };

        OptimizationReport {
            analytics,
            insights,
            error,
            low_performing_tools: low,
            high_performing_tools: high,
            priority: priority.to_string(),
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolExecutorPort for ToolRegistry {
    fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }

    fn role_of(&self, name: &str) -> Option<ToolRole> {
        self.tool(name).map(|t| t.role())
    }

    async fn execute(&self, name: &str, params: &ToolParams) -> Result<String, ToolError> {
        let tool = self.tool(name).cloned().ok_or_else(|| ToolError::not_found(name))?;
        let context_type = ContextType::classify(params);
        debug!(tool = name, context = context_type.as_str(), "Executing tool");

        let started = Instant::now();
        let result = tool.execute(params).await;
        let execution_secs = started.elapsed().as_secs_f64();

        let error = match &result {
            Ok(output) if output.starts_with("Error") => Some(output.clone()),
            Ok(_) => None,
            Err(e) => Some(e.to_string()),
        };
        if let Some(e) = &error {
            warn!(tool = name, "Tool failed: {}", e);
        }
        self.record(ExecutionRecord {
            timestamp: Local::now(),
            tool_name: name.to_string(),
            success: error.is_none(),
            execution_secs,
            context_type,
            parameters: params.keys().cloned().collect(),
            error,
        });
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expense_application::ports::oracle::OracleError;
    use std::collections::VecDeque;

    struct Echo {
        name: &'static str,
        role: ToolRole,
        fail: bool,
    }

    #[async_trait]
    impl Tool for Echo {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "Echo tool"
        }

        fn role(&self) -> ToolRole {
            self.role
        }

        async fn execute(&self, _params: &ToolParams) -> Result<String, ToolError> {
            if self.fail {
                Err(ToolError::execution_failed("boom"))
            } else {
                Ok(format!("{} done", self.name))
            }
        }
    }

    struct ScriptedOracle(Mutex<VecDeque<Result<String, OracleError>>>);

    impl ScriptedOracle {
        fn new(replies: Vec<Result<String, OracleError>>) -> Arc<Self> {
            Arc::new(Self(Mutex::new(replies.into())))
        }
    }

    #[async_trait]
    impl Oracle for ScriptedOracle {
        async fn call(&self, _prompt: &str) -> Result<String, OracleError> {
            self.0
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(OracleError::Timeout))
        }

        async fn call_with_image(&self, p: &str, _: &[u8], _: &str) -> Result<String, OracleError> {
            self.call(p).await
        }
    }

    fn echo(name: &'static str, role: ToolRole) -> Echo {
        Echo { name, role, fail: false }
    }

    fn registry() -> ToolRegistry {
        ToolRegistry::new()
            .register(echo("process_receipt", ToolRole::ImageExtractor))
            .register(echo("extract_text_expense", ToolRole::TextExtractor))
            .register(echo("save_expense", ToolRole::Persistence))
    }

    fn params(key: &str, value: &str) -> ToolParams {
        let mut p = ToolParams::new();
        p.insert(key.into(), value.into());
        p
    }

    #[test]
    fn test_context_classification() {
        assert_eq!(ContextType::classify(&params("image_data", "x")), ContextType::ImageProcessing);
        assert_eq!(ContextType::classify(&params("text", "Milk 60")), ContextType::ShortTextProcessing);
        assert_eq!(
            ContextType::classify(&params("text", &"a".repeat(101))),
            ContextType::LongTextProcessing
        );
        assert_eq!(ContextType::classify(&params("expense_data", "{}")), ContextType::DataSaving);
        assert_eq!(ContextType::classify(&ToolParams::new()), ContextType::Unknown);
    }

    #[test]
    fn test_roles_and_bindings() {
        let registry = registry();
        assert_eq!(
            registry.tool_names(),
            vec!["process_receipt", "extract_text_expense", "save_expense"]
        );
        let bindings = registry.bindings();
        assert_eq!(bindings.persistence.as_deref(), Some("save_expense"));
        assert_eq!(registry.role_of("nope"), None);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_not_found() {
        let err = registry().execute("ocr", &ToolParams::new()).await.unwrap_err();
        assert_eq!(err.code, "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_executions_are_tracked() {
        let registry = registry().register(Echo {
            name: "flaky",
            role: ToolRole::Other,
            fail: true,
        });

        registry
            .execute("extract_text_expense", &params("text", "Milk 60"))
            .await
            .unwrap();
        registry.execute("flaky", &ToolParams::new()).await.unwrap_err();

        let ok = registry.performance("extract_text_expense").unwrap();
        assert_eq!(ok.total_executions, 1);
        assert_eq!(ok.success_rate(), 1.0);
        assert_eq!(ok.context_preferences["short_text_processing"], 1);

        let failed = registry.performance("flaky").unwrap();
        assert_eq!(failed.total_executions, 1);
        assert_eq!(failed.successful_executions, 0);
        assert!(failed.error_patterns[0].contains("boom"));

        let listing = registry.list_tools();
        assert_eq!(listing[1].1, "Echo tool | Success Rate: 1.00 | Executions: 1");

        let analytics = registry.analytics();
        assert_eq!(analytics.total_executions, 2);
        assert_eq!(analytics.overall_success_rate, 0.5);
        assert_eq!(analytics.execution_trends.executions_today, 2);
        assert_eq!(analytics.context_analysis["unknown"].total_executions, 1);
    }

    #[tokio::test]
    async fn test_error_patterns_are_bounded() {
        let registry = ToolRegistry::new().register(Echo {
            name: "flaky",
            role: ToolRole::Other,
            fail: true,
        });
        for _ in 0..12 {
            let _ = registry.execute("flaky", &ToolParams::new()).await;
        }
        let perf = registry.performance("flaky").unwrap();
        assert_eq!(perf.total_executions, 12);
        assert_eq!(perf.error_patterns.len(), 10);
        assert_eq!(registry.analytics().tool_performance["flaky"].recent_errors.len(), 3);
    }

    #[tokio::test]
    async fn test_recommendation_from_oracle() {
        let oracle = ScriptedOracle::new(vec![Ok(
            r#"{"recommended_tool": "save_expense", "confidence": 0.9, "reasoning": "store it"}"#.into(),
        )]);
        let registry = registry().with_oracle(oracle);

        let rec = registry.recommend_tool("Persist items", &json!({})).await.unwrap();
        assert_eq!(rec.tool_name, "save_expense");
        assert_eq!(rec.confidence, 0.9);
        assert!(!rec.fallback);
    }

    #[tokio::test]
    async fn test_recommendation_heuristics() {
        let registry = registry().with_oracle(ScriptedOracle::new(vec![Ok(
            r#"{"recommended_tool": "made_up_tool"}"#.into(),
        )]));

        let rec = registry.recommend_tool("Read the receipt", &json!({})).await.unwrap();
        assert_eq!(rec.tool_name, "process_receipt");
        assert_eq!(rec.confidence, 0.7);
        assert!(rec.fallback);

        let rec = registry.recommend_tool("Extract the items", &json!({})).await.unwrap();
        assert_eq!(rec.tool_name, "extract_text_expense");

        let rec = registry.recommend_tool("Write to the ledger", &json!({})).await.unwrap();
        assert_eq!(rec.tool_name, "save_expense");
        assert_eq!(rec.confidence, 0.8);

        let rec = registry.recommend_tool("Do something", &json!({})).await.unwrap();
        assert_eq!(rec.confidence, 0.5);

        assert!(ToolRegistry::new().recommend_tool("x", &json!({})).await.is_none());
    }

    #[tokio::test]
    async fn test_optimize_lists_performers() {
        let registry = registry()
            .register(Echo {
                name: "flaky",
                role: ToolRole::Other,
                fail: true,
            })
            .with_oracle(ScriptedOracle::new(vec![Ok("Replace flaky".into())]));
        for _ in 0..6 {
            let _ = registry.execute("flaky", &ToolParams::new()).await;
            let _ = registry.execute("save_expense", &params("expense_data", "{}")).await;
        }

        let report = registry.optimize().await;
        assert_eq!(report.low_performing_tools, vec!["flaky"]);
        assert_eq!(report.high_performing_tools, vec!["save_expense"]);
        assert_eq!(report.priority, "high");
        assert_eq!(report.insights.as_deref(), Some("Replace flaky"));
    }

    #[tokio::test]
    async fn test_optimize_without_oracle() {
        let report = registry().optimize().await;
        assert!(report.insights.is_none());
        assert!(report.error.is_some());
    }
}
