//! Prompt domain
//!
//! Templates for every oracle request: planning and adaptation, routing,
//! extraction and tool selection.

pub mod agent;
pub mod extraction;
pub mod routing;
pub mod tool;

pub use agent::AgentPromptTemplate;
pub use extraction::ExtractionPromptTemplate;
pub use routing::RoutingPromptTemplate;
pub use tool::ToolPromptTemplate;
