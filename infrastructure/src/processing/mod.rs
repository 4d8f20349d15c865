//! Ledger preparation: receipt dates and item normalization.

pub mod date_parser;
pub mod item_processor;

pub use date_parser::{determine_expense_date, parse_receipt_date};
pub use item_processor::{clean_item_name, package_info, process_item};
