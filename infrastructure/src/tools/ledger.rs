//! Expense ledger: appends processed items to a CSV file.

use crate::processing::{determine_expense_date, process_item};
use async_trait::async_trait;
use chrono::NaiveDate;
use expense_application::ports::tool::{
    EXPENSE_DATA_KEY, Tool, ToolError, ToolParams, ToolRole, required_str,
};
use expense_domain::{ExpenseData, MESSAGE_DATE_KEY, ProcessedItem};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const LEDGER_TOOL: &str = "save_expense";

/// Quote a CSV field when it contains a separator, quote or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn csv_line<S: AsRef<str>>(fields: &[S]) -> String {
    let mut line = fields
        .iter()
        .map(|f| csv_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    line.push('\n');
    line
}

/// Persistence tool writing one row per purchased item.
pub struct LedgerWriter {
    path: PathBuf,
}

impl LedgerWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, rows: &[ProcessedItem]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let needs_header = fs::metadata(&self.path).map(|m| m.len() == 0).unwrap_or(true);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut buffer = String::new();
        if needs_header {
            buffer.push_str(&csv_line(&ProcessedItem::HEADERS));
        }
        for row in rows {
            buffer.push_str(&csv_line(&row.to_row()));
        }
        file.write_all(buffer.as_bytes())?;
        file.flush()
    }
}

#[async_trait]
impl Tool for LedgerWriter {
    fn name(&self) -> &str {
        LEDGER_TOOL
    }

    fn description(&self) -> &str {
        "Save expense data to the ledger"
    }

    fn role(&self) -> ToolRole {
        ToolRole::Persistence
    }

    async fn execute(&self, params: &ToolParams) -> Result<String, ToolError> {
        let raw = required_str(params, EXPENSE_DATA_KEY)?;
        let expense = ExpenseData::from_text(raw)
            .map_err(|e| ToolError::invalid_argument(format!("Invalid JSON in expense data: {}", e)))?;
        if expense.items.is_empty() {
            return Err(ToolError::invalid_argument("No items found in expense data"));
        }

        let message_date = match params.get(MESSAGE_DATE_KEY).and_then(Value::as_str) {
            Some(text) => match NaiveDate::parse_from_str(text, "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(_) => {
                    warn!("Ignoring unparseable message date '{}'", text);
                    None
                }
            },
            None => None,
        };

        let date = determine_expense_date(&expense, message_date);
        let rows: Vec<ProcessedItem> = expense
            .items
            .iter()
            .map(|item| process_item(item, &date))
            .collect();

        self.append(&rows).map_err(|e| {
            ToolError::execution_failed(format!(
                "Failed to write ledger {}: {}",
                self.path.display(),
                e
            ))
        })?;

        info!(
            "Saved {} items dated {} to {}",
            rows.len(),
            date,
            self.path.display()
        );
        Ok(format!("Saved {} items to {}", rows.len(), self.path.display()))
    }
}
