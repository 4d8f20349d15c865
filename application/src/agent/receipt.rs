//! Receipt Processing Agent

use super::specialist::{Specialist, format_total};
use expense_domain::{
    AgentInput, AgentProfile, ContextMap, ExpenseData, InputKind, MESSAGE_DATE_KEY,
};
use serde_json::json;

pub const RECEIPT_AGENT_NAME: &str = "Receipt Processing Agent";

/// Approximate decoded size of a base64 payload.
fn decoded_len(encoded: &str) -> usize {
    let trimmed = encoded.trim_end_matches('=');
    trimmed.len() * 3 / 4
}

/// Specialization for photographed grocery receipts.
pub struct ReceiptSpecialist {
    profile: AgentProfile,
}

impl Default for ReceiptSpecialist {
    fn default() -> Self {
        Self {
            profile: AgentProfile::new(
                RECEIPT_AGENT_NAME,
                "Processes grocery receipt images and extracts expense data",
            )
            .with_capability("image_analysis")
            .with_capability("receipt_extraction")
            .with_capability("store_date_detection")
            .with_capability("data_persistence")
            .handling(InputKind::Image),
        }
    }
}

impl Specialist for ReceiptSpecialist {
    fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    fn analyze(&self, input: &AgentInput) -> ContextMap {
        let mut analysis = ContextMap::new();
        let image = input.image_data();
        analysis.insert("has_image".into(), json!(image.is_some()));
        analysis.insert(
            "image_size_bytes".into(),
            json!(image.map(decoded_len).unwrap_or(0)),
        );
        analysis
    }

    fn summary_message(
        &self,
        expense: &ExpenseData,
        save_status: Option<&str>,
        context: &ContextMap,
    ) -> String {
        let date = match expense.date.as_deref() {
            Some(d) if !d.is_empty() && d != "N/A" => d,
            _ => context
                .get(MESSAGE_DATE_KEY)
                .and_then(|v| v.as_str())
                .unwrap_or("Unknown"),
        };
        let mut message = format!(
            "Receipt processed successfully!\n\nDate: {}\nStore: {}\nItems: {}\nTotal: {}",
            date,
            expense.store,
            expense.item_count(),
            format_total(expense),
        );
        if let Some(status) = save_status {
            message.push('\n');
            message.push_str(status);
        }
        message
    }
}
