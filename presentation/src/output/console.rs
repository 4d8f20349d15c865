//! Console output formatter for agent results

use colored::Colorize;
use expense_application::SystemStatus;
use expense_domain::{AgentOutcome, AgentProfile, ExpenseData};
use serde_json::Value;

/// Formats agent outcomes and status for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format an outcome with its extracted items, if any
    pub fn format(outcome: &AgentOutcome) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Expense Agent"));
        output.push('\n');

        if outcome.success {
            output.push_str(&format!("{} {}\n", "✓".green().bold(), outcome.message));
        } else {
            output.push_str(&format!("{} {}\n", "✗".red().bold(), outcome.message));
        }
        if let Some(error) = &outcome.error {
            output.push_str(&format!("{} {}\n", "Error:".red().bold(), error));
        }

        if let Some(data) = &outcome.data {
            output.push_str(&Self::format_data(data));
        }

        output.push_str(&Self::footer());
        output
    }

    /// Format as JSON
    pub fn format_json<T: serde::Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_data(data: &Value) -> String {
        let mut output = String::new();

        if let Ok(expense) = ExpenseData::from_value(data.clone())
            && !expense.items.is_empty()
        {
            output.push_str(&Self::section_header("Items"));
            output.push_str(&format!(
                "{} {}   {} {}\n\n",
                "Store:".cyan().bold(),
                expense.store,
                "Date:".cyan().bold(),
                expense.date_or_unknown()
            ));
            for item in &expense.items {
                output.push_str(&format!(
                    "  {:<32} {:>6} {:<6} {:>10.2}\n",
                    item.name, item.quantity, item.unit, item.total_price
                ));
            }
            output.push_str(&format!(
                "\n  {:<46} {:>10}\n",
                "Total".bold(),
                format!("{:.2}", expense.total_amount()).yellow().bold()
            ));
        }

        if let Some(synthesis) = data.get("synthesis").and_then(Value::as_str) {
            output.push_str(&Self::section_header("Synthesis"));
            output.push_str(&format!("\n{}\n", Self::indent(synthesis, "  ")));
        }
        if let (Some(ok), Some(total)) = (
            data.get("successful_agents").and_then(Value::as_u64),
            data.get("total_agents").and_then(Value::as_u64),
        ) {
            output.push_str(&format!(
                "\n{} {}/{}\n",
                "Agents succeeded:".dimmed(),
                ok,
                total
            ));
        }

        output
    }

    /// Format the registered agents
    pub fn format_roster(agents: &[AgentProfile]) -> String {
        let mut output = Self::section_header("Agents");
        for agent in agents {
            output.push_str(&format!(
                "\n{}\n  {}\n",
                format!("── {} ──", agent.name).yellow().bold(),
                agent.description
            ));
            if !agent.capabilities.is_empty() {
                output.push_str(&format!(
                    "  {} {}\n",
                    "Capabilities:".dimmed(),
                    agent.capabilities.join(", ")
                ));
            }
        }
        output
    }

    /// Format the system status snapshot
    pub fn format_status(status: &SystemStatus) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("System Status"));
        output.push('\n');

        let oracle = if status.oracle_available {
            "available".green().bold()
        } else {
            "unavailable".red().bold()
        };
        output.push_str(&format!("{} {}\n", "Oracle:".cyan().bold(), oracle));
        if !status.oracle_available {
            output.push_str(&format!("  {}\n", status.oracle_detail.dimmed()));
        }
        output.push_str(&format!(
            "{} {}\n{} {}\n{} {}\n",
            "Registered agents:".cyan().bold(),
            status.registered_agents,
            "Requests routed:".cyan().bold(),
            status.total_routed,
            "Collaborations:".cyan().bold(),
            status.collaborations
        ));

        output.push_str(&Self::format_roster(&status.available_agents));
        output.push_str(&Self::footer());
        output
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
