//! Ledger configuration from TOML (`[ledger]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw ledger configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLedgerConfig {
    /// CSV file receiving saved expenses
    pub path: PathBuf,
}

impl Default for FileLedgerConfig {
    fn default() -> Self {
        Self {
            path: dirs::data_dir()
                .map(|d| d.join("expense-agent").join("expenses.csv"))
                .unwrap_or_else(|| PathBuf::from("expenses.csv")),
        }
    }
}
