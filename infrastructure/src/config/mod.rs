//! Configuration file loading for expense-agent
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `EXPENSE_*` environment variables (`EXPENSE_ORACLE__API_KEY`)
//! 2. `--config <path>` specified file
//! 3. Project root: `./expense-agent.toml` or `./.expense-agent.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/expense-agent/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileAgentConfig, FileConfig, FileLedgerConfig, FileLoggingConfig,
    FileOracleConfig, FileRoutingConfig,
};
pub use loader::ConfigLoader;
