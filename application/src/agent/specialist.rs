//! Agent specializations.
//!
//! A [`Specialist`] supplies what differs between agents: the roster profile,
//! input analysis and the wording of the final outcome. Planning, execution
//! and adaptation are shared by [`Agent`](super::Agent).

use expense_domain::{
    AgentInput, AgentOutcome, AgentProfile, ContextMap, ExpenseData, Plan, TaskResult,
};

/// Technical reason code when no task of a request succeeded.
pub const ALL_TASKS_FAILED: &str = "all_tasks_failed";

/// What a specialization contributes to an agent.
pub trait Specialist: Send + Sync {
    fn profile(&self) -> &AgentProfile;

    /// Input-specific facts merged into the plan context.
    fn analyze(&self, input: &AgentInput) -> ContextMap;

    /// Human-readable message for a successfully processed expense.
    fn summary_message(
        &self,
        expense: &ExpenseData,
        save_status: Option<&str>,
        context: &ContextMap,
    ) -> String;

    /// Reduce all task results of a request into one outcome.
    ///
    /// The first valid expense payload among successful results becomes the
    /// outcome data. Never fails.
    fn synthesize(&self, results: &[TaskResult], plan: &Plan, context: &ContextMap) -> AgentOutcome {
        let successes: Vec<&TaskResult> = results.iter().filter(|r| r.success).collect();
        if successes.is_empty() {
            return AgentOutcome::failure(
                format!("{} could not complete any task", self.profile().name),
                ALL_TASKS_FAILED,
            );
        }

        let expense = successes.iter().find_map(|r| {
            let data = ExpenseData::from_text(&r.output).ok()?;
            data.validate().ok()?;
            Some(data)
        });
        let payload = expense
            .as_ref()
            .and_then(|data| serde_json::to_value(data).ok());

        if plan.has_failed() || !plan.is_complete() {
            let error = if plan.has_failed() {
                results
                    .iter()
                    .rev()
                    .find_map(|r| r.error.clone())
                    .unwrap_or_else(|| "task_failed".to_string())
            } else {
                "deadlock".to_string()
            };
            let message = if expense.is_some() {
                "Data extracted but processing did not finish"
            } else {
                "Processing did not finish"
            };
            let outcome = AgentOutcome::failure(message, error);
            return match payload {
                Some(payload) => outcome.with_data(payload),
                None => outcome,
            };
        }

        let save_status = successes
            .iter()
            .rev()
            .map(|r| r.output.as_str())
            .find(|o| expense_domain::util::extract_json_object(o).is_none());

        match (expense, payload) {
            (Some(expense), Some(payload)) => {
                AgentOutcome::success(self.summary_message(&expense, save_status, context))
                    .with_data(payload)
            }
            _ => AgentOutcome::success(format!(
                "Completed {} task(s): {}",
                successes.len(),
                save_status.unwrap_or("no expense data produced")
            )),
        }
    }
}

/// Formats a money amount the way both agents report totals.
pub(crate) fn format_total(expense: &ExpenseData) -> String {
    format!("₹{:.2}", expense.total_amount())
}
