//! Port for structured execution logging.
//!
//! Records what the orchestration core decided (plans, adaptations, task
//! results, routing) as machine-readable events. Diagnostic messages go
//! through `tracing` instead.

use serde_json::Value;

/// A structured execution event.
pub struct ExecutionEvent {
    /// Event type identifier (e.g., "plan_created", "routing_decision").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ExecutionEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging execution events.
///
/// `log` is synchronous and infallible; write failures are dropped.
pub trait EventLogger: Send + Sync {
    fn log(&self, event: ExecutionEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoEventLogger;

impl EventLogger for NoEventLogger {
    fn log(&self, _event: ExecutionEvent) {}
}
