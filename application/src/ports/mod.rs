//! Port definitions (interfaces for external adapters)

pub mod event_logger;
pub mod oracle;
pub mod tool;
