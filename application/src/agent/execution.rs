//! Plan execution for [`Agent`].

use super::{Agent, PREVIEW_CHARS};
use crate::ports::event_logger::ExecutionEvent;
use crate::ports::oracle::interpret_response;
use crate::ports::tool::{EXPENSE_DATA_KEY, ToolError, ToolParams, ToolRole};
use expense_domain::{
    AgentInput, AgentOutcome, AgentPromptTemplate, ContextMap, ExpenseData, IMAGE_DATA_KEY,
    InputKind, MESSAGE_DATE_KEY, Plan, PlanStatus, TEXT_KEY, Task, TaskId, TaskKind, TaskResult,
};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

impl Agent {
    /// Execute a plan against a request and synthesize one outcome.
    pub async fn execute_plan(
        &self,
        plan: Plan,
        input: &AgentInput,
        context: &ContextMap,
    ) -> AgentOutcome {
        self.run_plan(plan, input, context).await.0
    }

    /// Execute, adapting on failure, and hand back the final plan as well.
    pub(super) async fn run_plan(
        &self,
        mut plan: Plan,
        input: &AgentInput,
        context: &ContextMap,
    ) -> (AgentOutcome, Plan) {
        plan.status = PlanStatus::Executing;

        if plan.tasks.is_empty() {
            info!(agent = %self.name(), "Plan has no tasks, processing input directly");
            let outcome = self.process_directly(input, context).await;
            plan.status = if outcome.success {
                PlanStatus::Completed
            } else {
                PlanStatus::Failed
            };
            self.set_current_plan(plan.progress());
            return (outcome, plan);
        }

        let mut results: Vec<TaskResult> = Vec::new();
        let mut adaptations = 0;

        while !plan.is_complete() && !plan.has_failed() {
            let ready = plan.ready_task_ids();
            if ready.is_empty() {
                warn!(
                    agent = %self.name(),
                    plan_id = %plan.id,
                    "No ready tasks but plan is neither complete nor failed (deadlock)"
                );
                break;
            }

            for id in ready {
                let result = self.execute_task(&mut plan, &id, input).await;
                let failed = !result.success;
                let error = result.error.clone().unwrap_or_default();
                results.push(result);
                self.set_current_plan(plan.progress());

                if !failed {
                    continue;
                }
                if adaptations < self.config.max_adaptations {
                    adaptations += 1;
                    if let Some(mut adapted) = self.adapt_plan(&plan, &id, &error, context).await {
                        adapted.status = PlanStatus::Executing;
                        self.set_current_plan(adapted.progress());
                        plan = adapted;
                    }
                } else {
                    warn!(
                        agent = %self.name(),
                        "Adaptation limit ({}) reached",
                        self.config.max_adaptations
                    );
                }
                break;
            }
        }

        let outcome = self.specialist.synthesize(&results, &plan, context);
        plan.status = if outcome.success && plan.is_complete() {
            PlanStatus::Completed
        } else {
            PlanStatus::Failed
        };
        self.set_current_plan(plan.progress());
        debug!(
            agent = %self.name(),
            plan_id = %plan.id,
            adaptations,
            "Plan finished with status {}",
            plan.status.as_str()
        );
        (outcome, plan)
    }

    async fn execute_task(&self, plan: &mut Plan, id: &TaskId, input: &AgentInput) -> TaskResult {
        let Some(task) = plan.get_task(id).cloned() else {
            return TaskResult::failure(format!("Task '{}' is not part of the plan", id));
        };
        if let Some(t) = plan.get_task_mut(id) {
            t.mark_running();
        }
        info!(
            agent = %self.name(),
            task = %task.id,
            kind = %task.kind,
            tool = task.tool.as_deref().unwrap_or("-"),
            "Executing task: {}",
            task.description
        );

        let outcome = match task.tool.as_deref() {
            Some(tool) => {
                let params = self.assemble_parameters(&task, tool, plan, input);
                self.tools.execute(tool, &params).await
            }
            None => self.reason(&task, plan, input).await,
        };

        let result = match outcome {
            Ok(output) if output.starts_with("Error") => TaskResult::failure(output),
            Ok(output) => TaskResult::success(output),
            Err(e) => TaskResult::failure(e.to_string()),
        };

        let Some(t) = plan.get_task_mut(id) else {
            return result;
        };
        if result.success {
            t.mark_completed(result.clone());
            self.logger.log(ExecutionEvent::new(
                "task_completed",
                json!({ "agent": self.name(), "task_id": id.as_str(), "kind": task.kind }),
            ));
        } else {
            warn!(
                agent = %self.name(),
                task = %id,
                "Task failed: {}",
                result.error.as_deref().unwrap_or("")
            );
            t.mark_failed(result.clone());
            self.logger.log(ExecutionEvent::new(
                "task_failed",
                json!({
                    "agent": self.name(),
                    "task_id": id.as_str(),
                    "kind": task.kind,
                    "error": result.error,
                }),
            ));
        }
        result
    }

    /// Parameters for a tool call: role conventions first, declared task
    /// parameters on top.
    fn assemble_parameters(
        &self,
        task: &Task,
        tool: &str,
        plan: &Plan,
        input: &AgentInput,
    ) -> ToolParams {
        let mut params = ToolParams::new();
        match self.tools.role_of(tool) {
            Some(ToolRole::ImageExtractor) => {
                if let Some(image) = input.image_data() {
                    params.insert(IMAGE_DATA_KEY.into(), json!(image));
                }
            }
            Some(ToolRole::TextExtractor) => {
                if let Some(text) = input.text_content() {
                    params.insert(TEXT_KEY.into(), json!(text));
                }
            }
            Some(ToolRole::Persistence) => {
                if let Some(date) = input.message_date() {
                    params.insert(MESSAGE_DATE_KEY.into(), json!(date));
                }
                if let Some(data) = plan.latest_structured_output() {
                    params.insert(EXPENSE_DATA_KEY.into(), json!(data));
                }
            }
            Some(ToolRole::Other) | None => {}
        }
        for (key, value) in &task.parameters {
            params.insert(key.clone(), value.clone());
        }
        params
    }

    /// Built-in handlers for tasks with no bound tool.
    async fn reason(&self, task: &Task, plan: &Plan, input: &AgentInput) -> Result<String, ToolError> {
        match task.kind {
            TaskKind::Analyze | TaskKind::Reason => {
                let prompt =
                    AgentPromptTemplate::reasoning(self.name(), task, &input.preview(PREVIEW_CHARS));
                self.oracle
                    .call(&prompt)
                    .await
                    .and_then(interpret_response)
                    .map_err(|e| ToolError::execution_failed(e.to_string()))
            }
            TaskKind::Validate => {
                let latest = plan
                    .latest_structured_output()
                    .ok_or_else(|| ToolError::invalid_argument("No extracted data to validate"))?;
                let data = ExpenseData::from_text(latest)
                    .map_err(|e| ToolError::invalid_argument(e.to_string()))?;
                data.validate()
                    .map_err(|e| ToolError::invalid_argument(e.to_string()))?;
                serde_json::to_string(&data).map_err(|e| ToolError::execution_failed(e.to_string()))
            }
            kind => Err(ToolError::no_handler(kind)),
        }
    }

    /// Extract with the input's extractor tool, then persist. Used when a
    /// plan has no tasks at all.
    async fn process_directly(&self, input: &AgentInput, context: &ContextMap) -> AgentOutcome {
        let fallback_marker = json!({ "fallback_used": true });
        let kind = input.kind();
        let Some(extractor) = ToolRole::extractor_for(kind).and_then(|r| self.tools.tool_for_role(r))
        else {
            return AgentOutcome::failure(
                format!("{} cannot process {} input directly", self.name(), kind),
                ToolError::no_handler(kind).to_string(),
            )
            .with_data(fallback_marker);
        };

        let mut params = ToolParams::new();
        match kind {
            InputKind::Image => {
                params.insert(IMAGE_DATA_KEY.into(), json!(input.image_data()));
            }
            _ => {
                params.insert(TEXT_KEY.into(), json!(input.text_content()));
            }
        }

        let extracted = match self.tools.execute(&extractor, &params).await {
            Ok(output) if !output.starts_with("Error") => output,
            Ok(output) => {
                return AgentOutcome::failure("Direct processing failed", output)
                    .with_data(fallback_marker);
            }
            Err(e) => {
                return AgentOutcome::failure("Direct processing failed", e.to_string())
                    .with_data(fallback_marker);
            }
        };

        let save_status = match self.tools.tool_for_role(ToolRole::Persistence) {
            Some(sink) => {
                let mut params = ToolParams::new();
                params.insert(EXPENSE_DATA_KEY.into(), json!(extracted));
                if let Some(date) = input.message_date() {
                    params.insert(MESSAGE_DATE_KEY.into(), json!(date));
                }
                match self.tools.execute(&sink, &params).await {
                    Ok(status) if !status.starts_with("Error") => Some(status),
                    Ok(status) => {
                        return AgentOutcome::failure("Data extracted but could not be saved", status)
                            .with_data(fallback_marker);
                    }
                    Err(e) => {
                        return AgentOutcome::failure(
                            "Data extracted but could not be saved",
                            e.to_string(),
                        )
                        .with_data(fallback_marker);
                    }
                }
            }
            None => None,
        };

        match ExpenseData::from_text(&extracted) {
            Ok(expense) => {
                let mut data = serde_json::to_value(&expense).unwrap_or(Value::Null);
                if let Some(object) = data.as_object_mut() {
                    object.insert("fallback_used".into(), Value::Bool(true));
                } else {
                    data = fallback_marker;
                }
                AgentOutcome::success(self.specialist.summary_message(
                    &expense,
                    save_status.as_deref(),
                    context,
                ))
                .with_data(data)
            }
            Err(_) => AgentOutcome::success(format!(
                "Processed input directly: {}",
                save_status.as_deref().unwrap_or(&extracted)
            ))
            .with_data(fallback_marker),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::ALL_TASKS_FAILED;
    use crate::testing::{MILK_JSON, MockTools, ScriptedOracle, plan_reply};
    use expense_domain::PlanId;
    use std::sync::Arc;

    fn text_agent(oracle: ScriptedOracle, tools: &Arc<MockTools>) -> Agent {
        Agent::text_expense(Arc::new(oracle), tools.clone())
    }

    #[tokio::test]
    async fn test_failed_first_task_leaves_dependent_pending() {
        let reply = plan_reply(
            r#"[
                {"id": "a", "type": "extract", "description": "Extract", "tool_name": "extract_text_expense"},
                {"id": "b", "type": "save", "description": "Save", "tool_name": "save_expense", "dependencies": ["a"]}
            ]"#,
        );
        let oracle = Arc::new(ScriptedOracle::replies(&[&reply]));
        let tools = Arc::new(MockTools::standard().respond("extract_text_expense", Ok("Error: bad")));
        let agent = Agent::text_expense(oracle.clone(), tools.clone());

        let outcome = agent.execute(AgentInput::text("???")).await;

        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some(ALL_TASKS_FAILED));
        // planning plus one adaptation attempt
        assert_eq!(oracle.call_count(), 2);
        assert!(tools.calls_to("save_expense").is_empty());

        let progress = agent.current_plan().unwrap();
        assert_eq!(progress.status, PlanStatus::Failed);
        assert_eq!(progress.total_tasks, 2);
        assert_eq!(progress.completed_tasks, 0);
        assert_eq!(progress.failed_tasks, 1);
        assert_eq!(agent.memory_summary().failed_patterns.len(), 1);
    }

    #[tokio::test]
    async fn test_deadlock_stops_and_keeps_extracted_data() {
        let reply = plan_reply(
            r#"[
                {"id": "x", "type": "extract", "description": "Extract", "tool_name": "extract_text_expense"},
                {"id": "a", "type": "save", "description": "A", "tool_name": "save_expense", "dependencies": ["b"]},
                {"id": "b", "type": "save", "description": "B", "tool_name": "save_expense", "dependencies": ["a"]}
            ]"#,
        );
        let tools = Arc::new(MockTools::standard().respond("extract_text_expense", Ok(MILK_JSON)));
        let agent = text_agent(ScriptedOracle::replies(&[&reply]), &tools);

        let outcome = agent.execute(AgentInput::text("Milk 60")).await;

        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("deadlock"));
        assert_eq!(outcome.message, "Data extracted but processing did not finish");
        assert!(outcome.data.is_some());
        assert!(tools.calls_to("save_expense").is_empty());
    }

    #[tokio::test]
    async fn test_zero_task_plan_processes_directly() {
        let tools = Arc::new(
            MockTools::standard()
                .respond("extract_text_expense", Ok(MILK_JSON))
                .respond("save_expense", Ok("Saved 1 items to ledger.csv")),
        );
        let agent = text_agent(ScriptedOracle::unreachable(), &tools);
        let input = AgentInput::text("Milk 60");
        let context = agent.analyze_input(&input);

        let outcome = agent
            .execute_plan(Plan::new(PlanId::new("empty"), "Nothing"), &input, &context)
            .await;

        assert!(outcome.success);
        assert_eq!(outcome.data_object().unwrap()["fallback_used"], true);
        assert_eq!(tools.calls_to("save_expense").len(), 1);
    }

    #[tokio::test]
    async fn test_zero_task_plan_reports_failed_save() {
        let tools = Arc::new(
            MockTools::standard()
                .respond("extract_text_expense", Ok(MILK_JSON))
                .respond("save_expense", Err(ToolError::execution_failed("disk full"))),
        );
        let agent = text_agent(ScriptedOracle::unreachable(), &tools);
        let input = AgentInput::text("Milk 60");

        let outcome = agent
            .execute_plan(Plan::new(PlanId::new("empty"), "Nothing"), &input, &ContextMap::new())
            .await;

        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("disk full"));
    }

    #[tokio::test]
    async fn test_declared_parameters_win() {
        let reply = plan_reply(
            r#"[{"id": "a", "type": "extract", "description": "Extract", "tool_name": "extract_text_expense",
                 "parameters": {"text": "Bread 40"}}]"#,
        );
        let tools = Arc::new(MockTools::standard().respond("extract_text_expense", Ok(MILK_JSON)));
        let agent = text_agent(ScriptedOracle::replies(&[&reply]), &tools);

        agent.execute(AgentInput::text("Milk 60")).await;

        assert_eq!(tools.calls_to("extract_text_expense")[0]["text"], "Bread 40");
    }

    #[tokio::test]
    async fn test_validate_task_feeds_normalized_data_to_save() {
        let reply = plan_reply(
            r#"[
                {"id": "x", "type": "extract", "description": "Extract", "tool_name": "extract_text_expense"},
                {"id": "v", "type": "validate", "description": "Check", "dependencies": ["x"]},
                {"id": "s", "type": "save", "description": "Save", "tool_name": "save_expense", "dependencies": ["v"]}
            ]"#,
        );
        let loose = r#"Result: {"items":[{"name":"Milk","quantity":1,"total_price":"₹60"}]}"#;
        let tools = Arc::new(
            MockTools::standard()
                .respond("extract_text_expense", Ok(loose))
                .respond("save_expense", Ok("Saved 1 items to ledger.csv")),
        );
        let agent = text_agent(ScriptedOracle::replies(&[&reply]), &tools);

        let outcome = agent.execute(AgentInput::text("Milk 60")).await;

        assert!(outcome.success, "{:?}", outcome);
        let saved = tools.calls_to("save_expense");
        let data: Value = serde_json::from_str(saved[0]["expense_data"].as_str().unwrap()).unwrap();
        assert_eq!(data["items"][0]["total_price"], 60.0);
        assert_eq!(data["store"], "Unknown");
    }

    #[tokio::test]
    async fn test_save_skips_later_prose_output() {
        let reply = plan_reply(
            r#"[
                {"id": "x", "type": "extract", "description": "Extract", "tool_name": "extract_text_expense"},
                {"id": "t", "type": "reason", "description": "Comment", "dependencies": ["x"]},
                {"id": "s", "type": "save", "description": "Save", "tool_name": "save_expense", "dependencies": ["t"]}
            ]"#,
        );
        let tools = Arc::new(
            MockTools::standard()
                .respond("extract_text_expense", Ok(MILK_JSON))
                .respond("save_expense", Ok("Saved 1 items to ledger.csv")),
        );
        let agent = text_agent(ScriptedOracle::replies(&[&reply, "Looks like groceries"]), &tools);

        let outcome = agent.execute(AgentInput::text("Milk 60")).await;

        assert!(outcome.success, "{:?}", outcome);
        assert_eq!(tools.calls_to("save_expense")[0]["expense_data"], MILK_JSON);
    }

    #[tokio::test]
    async fn test_analyze_task_uses_oracle_text() {
        let reply = plan_reply(
            r#"[{"id": "think", "type": "analyze", "description": "Look at the note"}]"#,
        );
        let oracle = Arc::new(ScriptedOracle::replies(&[&reply, "Looks like groceries"]));
        let agent = Agent::text_expense(oracle.clone(), Arc::new(MockTools::standard()));

        let outcome = agent.execute(AgentInput::text("Milk 60")).await;

        assert!(outcome.success);
        assert!(outcome.message.contains("Looks like groceries"));
        assert!(oracle.prompts.lock().unwrap()[1].contains("Look at the note"));
    }

    #[tokio::test]
    async fn test_unknown_input_has_no_handler() {
        let tools = Arc::new(MockTools::standard());
        let agent = text_agent(ScriptedOracle::unreachable(), &tools);

        let outcome = agent.execute(AgentInput::new().with("audio", "...")).await;

        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some(ALL_TASKS_FAILED));
        assert!(tools.calls.lock().unwrap().is_empty());
    }
}
