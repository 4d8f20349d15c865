//! Planning and adaptation for [`Agent`].

use super::Agent;
use crate::ports::event_logger::ExecutionEvent;
use crate::ports::oracle::interpret_response;
use expense_domain::{
    AgentPromptTemplate, ContextMap, Experience, InputKind, Plan, PlanId, TaskId, fallback_plan,
    parse_plan,
};
use serde_json::json;
use std::sync::PoisonError;
use tracing::{debug, info, warn};

impl Agent {
    /// Create a plan for a request. Never fails: any oracle or parse problem
    /// yields the deterministic fallback plan for the input kind.
    ///
    /// A parsed plan with no tasks is returned as is; execution then
    /// processes the input directly.
    pub async fn create_plan(&self, context: &ContextMap, kind: InputKind) -> Plan {
        let similar: Vec<Experience> = self
            .memory
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .similar_experiences(context, self.config.similar_experience_limit)
            .into_iter()
            .cloned()
            .collect();
        debug!(agent = %self.name(), "Recalled {} similar experiences", similar.len());

        let bindings = self.tools.bindings();
        let similar_refs: Vec<&Experience> = similar.iter().collect();
        let prompt = AgentPromptTemplate::planning(
            self.name(),
            kind,
            &self.tools.tool_names(),
            bindings.extractor_for(kind),
            bindings.persistence.as_deref(),
            &similar_refs,
        );

        let parsed = match self.oracle.call(&prompt).await.and_then(interpret_response) {
            Ok(response) => match parse_plan(&response, PlanId::generate("plan"), context) {
                Ok(plan) => Some(plan),
                Err(e) => {
                    warn!(agent = %self.name(), "Could not parse oracle plan ({}), using fallback plan", e);
                    None
                }
            },
            Err(e) => {
                warn!(agent = %self.name(), "Planning oracle call failed ({}), using fallback plan", e);
                None
            }
        };

        let fallback = parsed.is_none();
        let plan = parsed.unwrap_or_else(|| fallback_plan(kind, &bindings, context));

        info!(
            agent = %self.name(),
            plan_id = %plan.id,
            fallback,
            "Created plan with {} tasks: {}",
            plan.tasks.len(),
            plan.goal
        );
        self.logger.log(ExecutionEvent::new(
            "plan_created",
            json!({
                "agent": self.name(),
                "plan_id": plan.id.as_str(),
                "goal": plan.goal,
                "tasks": plan.tasks,
                "fallback": fallback,
            }),
        ));
        self.set_current_plan(plan.progress());
        plan
    }

    /// Ask the oracle for a replacement after `failed` failed with `error`.
    ///
    /// Returns `None` when the oracle fails or offers no usable non-empty
    /// plan; the caller then keeps the failed plan.
    pub(super) async fn adapt_plan(
        &self,
        plan: &Plan,
        failed: &TaskId,
        error: &str,
        context: &ContextMap,
    ) -> Option<Plan> {
        let failed_task = plan.get_task(failed)?;
        info!(
            agent = %self.name(),
            plan_id = %plan.id,
            task = %failed_task.id,
            "Adapting plan after failed task: {}",
            failed_task.description
        );

        let prompt = AgentPromptTemplate::adaptation(
            plan,
            failed_task,
            error,
            &self.tools.tool_names(),
            &self.profile().capabilities,
        );

        let response = match self.oracle.call(&prompt).await.and_then(interpret_response) {
            Ok(response) => response,
            Err(e) => {
                warn!(agent = %self.name(), "Adaptation oracle call failed: {}", e);
                return None;
            }
        };

        match parse_plan(&response, plan.id.adapted(), context) {
            Ok(adapted) if !adapted.tasks.is_empty() => {
                info!(
                    agent = %self.name(),
                    plan_id = %adapted.id,
                    "Plan adapted with {} tasks",
                    adapted.tasks.len()
                );
                self.logger.log(ExecutionEvent::new(
                    "plan_adapted",
                    json!({
                        "agent": self.name(),
                        "previous_plan_id": plan.id.as_str(),
                        "plan_id": adapted.id.as_str(),
                        "failed_task": failed_task.id.as_str(),
                        "error": error,
                        "tasks": adapted.tasks,
                    }),
                ));
                Some(adapted)
            }
            Ok(_) => {
                warn!(agent = %self.name(), "Adapted plan has no tasks, keeping failed plan");
                None
            }
            Err(e) => {
                warn!(agent = %self.name(), "Could not parse adapted plan: {}", e);
                None
            }
        }
    }
}
