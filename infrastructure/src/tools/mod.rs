//! Tool implementations for the expense agents
//!
//! | Tool | Role | Parameters |
//! |------|------|------------|
//! | `process_receipt` | image extractor | `image_data` (base64) |
//! | `extract_text_expense` | text extractor | `text` |
//! | `save_expense` | persistence | `expense_data` (JSON), optional `message_date` |
//!
//! All of them are reached through the [`ToolRegistry`].

mod ledger;
mod receipt_extractor;
mod registry;
mod text_extractor;

pub use ledger::{LEDGER_TOOL, LedgerWriter};
pub use receipt_extractor::{DEFAULT_MIME_TYPE, RECEIPT_TOOL, ReceiptExtractor};
pub use registry::{
    ContextStats, ContextType, ExecutionRecord, ExecutionTrend, OptimizationReport, ToolAnalytics,
    ToolPerformance, ToolPerformanceSummary, ToolRecommendation, ToolRegistry,
};
pub use text_extractor::{TEXT_TOOL, TextExpenseExtractor};

use expense_application::ports::oracle::Oracle;
use expense_application::ports::tool::ToolError;
use expense_domain::ExpenseData;
use crate::config::FileConfig;
use std::sync::Arc;

/// Registry with the three standard tools, wired to one oracle.
pub fn default_registry(oracle: Arc<dyn Oracle>, config: &FileConfig) -> ToolRegistry {
    ToolRegistry::new()
        .register(
            ReceiptExtractor::new(oracle.clone())
                .with_default_mime_type(config.oracle.image_mime_type.clone()),
        )
        .register(TextExpenseExtractor::new(oracle.clone()))
        .register(LedgerWriter::new(config.ledger.path.clone()))
        .with_oracle(oracle)
}

/// Decode, validate and re-serialize the expense JSON in an oracle answer.
fn normalized_expense(response: &str) -> Result<(ExpenseData, String), ToolError> {
    let data = ExpenseData::from_text(response)
        .map_err(|e| ToolError::execution_failed(format!("Failed to extract expense data: {}", e)))?;
    data.validate()
        .map_err(|e| ToolError::execution_failed(format!("Invalid expense data structure: {}", e)))?;
    let json = serde_json::to_string(&data).map_err(|e| ToolError::execution_failed(e.to_string()))?;
    Ok((data, json))
}
