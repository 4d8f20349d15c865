//! Text Expense Agent

use super::specialist::{Specialist, format_total};
use chrono::Local;
use expense_domain::{
    AgentInput, AgentProfile, ContextMap, ExpenseData, InputKind, MESSAGE_DATE_KEY,
};
use serde_json::json;

pub const TEXT_AGENT_NAME: &str = "Text Expense Agent";

const CURRENCY_MARKERS: [&str; 6] = ["₹", "rs", "inr", "rupee", "$", "€"];

/// Specialization for free-text expense notes like "Milk ₹60, Bread ₹40".
pub struct TextSpecialist {
    profile: AgentProfile,
}

impl Default for TextSpecialist {
    fn default() -> Self {
        Self {
            profile: AgentProfile::new(TEXT_AGENT_NAME, "Processes natural language expense entries")
                .with_capability("natural_language_parsing")
                .with_capability("item_price_extraction")
                .with_capability("data_persistence")
                .handling(InputKind::Text),
        }
    }
}

impl Specialist for TextSpecialist {
    fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    fn analyze(&self, input: &AgentInput) -> ContextMap {
        let text = input.text_content().unwrap_or_default();
        let lower = text.to_lowercase();
        let mut analysis = ContextMap::new();
        analysis.insert("text_length".into(), json!(text.chars().count()));
        analysis.insert(
            "mentions_currency".into(),
            json!(CURRENCY_MARKERS.iter().any(|m| lower.contains(m))),
        );
        analysis.insert("line_count".into(), json!(text.lines().count()));
        analysis
    }

    fn summary_message(
        &self,
        expense: &ExpenseData,
        save_status: Option<&str>,
        context: &ContextMap,
    ) -> String {
        let date = context
            .get(MESSAGE_DATE_KEY)
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| Local::now().format("%Y-%m-%d").to_string());
        let mut message = format!(
            "Text expense processed successfully!\n\nDate: {}\nItems: {}\nTotal: {}",
            date,
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

#[cfg(test)]
mod tests {
    use super::*;
    use expense_domain::ExpenseItem;

    #[test]
    fn test_analysis() {
        let specialist = TextSpecialist::default();
        let analysis = specialist.analyze(&AgentInput::text("Milk ₹60\nBread Rs 40"));
        assert_eq!(analysis["text_length"], 20);
        assert_eq!(analysis["mentions_currency"], true);
        assert_eq!(analysis["line_count"], 2);

        let plain = specialist.analyze(&AgentInput::text("bought apples"));
        assert_eq!(plain["mentions_currency"], false);
    }

    #[test]
    fn test_summary_uses_item_sum_without_total() {
        let specialist = TextSpecialist::default();
        let expense = ExpenseData {
            items: vec![ExpenseItem::new("Milk", "1", 60.0), ExpenseItem::new("Bread", "1", 40.0)],
            ..Default::default()
        };
        let mut context = ContextMap::new();
        context.insert(MESSAGE_DATE_KEY.into(), "2024-06-18".into());
        let message = specialist.summary_message(&expense, None, &context);
        assert_eq!(
            message,
            "Text expense processed successfully!\n\nDate: 2024-06-18\nItems: 2\nTotal: ₹100.00"
        );
    }
}
