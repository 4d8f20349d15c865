//! CLI command definitions

use clap::{ArgGroup, Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for agent results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored summary with the extracted items
    Human,
    /// JSON output
    Json,
}

/// CLI arguments for expense-agent
#[derive(Parser, Debug)]
#[command(name = "expense-agent")]
#[command(author, version, about = "Turn receipts and expense notes into ledger entries")]
#[command(long_about = r#"
Expense Agent reads a receipt photo or a short expense note, plans how to
extract the items, and saves them to the ledger.

Requests are routed to the receipt agent or the text agent automatically;
use --agent to pick one yourself.

Configuration files are loaded from (in priority order):
1. EXPENSE_* environment variables (e.g. EXPENSE_ORACLE__API_KEY)
2. --config <path>             Explicit config file
3. ./expense-agent.toml        Project-level config
4. ~/.config/expense-agent/config.toml   Global config

Example:
  expense-agent --text "Milk ₹60, Bread ₹40"
  expense-agent --image receipt.jpg --date 2024-06-18
  expense-agent --status -o json
"#)]
#[command(group(ArgGroup::new("request").args(["text", "image", "status"])))]
pub struct Cli {
    /// Expense note to process
    #[arg(short, long, value_name = "TEXT")]
    pub text: Option<String>,

    /// Receipt image to process
    #[arg(short, long, value_name = "PATH")]
    pub image: Option<PathBuf>,

    /// Date the expense was reported (YYYY-MM-DD), used when the receipt has none
    #[arg(short, long, value_name = "DATE")]
    pub date: Option<String>,

    /// Send the request to this agent instead of routing it
    #[arg(short, long, value_name = "NAME")]
    pub agent: Option<String>,

    /// Show agents, oracle availability and routing statistics
    #[arg(long)]
    pub status: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

impl Cli {
    /// Tracing filter for the `-v` count, `None` without the flag.
    pub fn log_level(&self) -> Option<&'static str> {
        match self.verbose {
            0 => None,
            1 => Some("info"),
            2 => Some("debug"),
            _ => Some("trace"),
        }
    }
}
