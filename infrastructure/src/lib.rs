//! Infrastructure layer for expense-agent
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: the tool registry and concrete tools, the
//! Gemini oracle, the JSONL event log and configuration file loading.

pub mod config;
pub mod logging;
pub mod oracle;
pub mod processing;
pub mod tools;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileAgentConfig, FileConfig, FileLedgerConfig,
    FileLoggingConfig, FileOracleConfig, FileRoutingConfig,
};
pub use logging::JsonlEventLogger;
#[cfg(feature = "gemini")]
pub use oracle::GeminiOracle;
pub use tools::{
    LEDGER_TOOL, LedgerWriter, RECEIPT_TOOL, ReceiptExtractor, TEXT_TOOL, TextExpenseExtractor,
    ToolRegistry, default_registry,
};
