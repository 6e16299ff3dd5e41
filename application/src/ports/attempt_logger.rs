//! Port for structured attempt logging.
//!
//! Defines the [`AttemptLogger`] trait for recording every completion
//! request, completion response and attempt verdict to a structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the full
//! generation transcript in a machine-readable format (JSONL).

use serde_json::Value;

/// A structured generation event for logging.
pub struct AttemptEvent {
    /// Event type identifier (e.g., "completion_request", "attempt_verdict").
    pub event_type: &'static str,
    pub tool_name: String,
    pub attempt: u32,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl AttemptEvent {
    pub fn new(event_type: &'static str, tool_name: impl Into<String>, attempt: u32, payload: Value) -> Self {
        Self {
            event_type,
            tool_name: tool_name.into(),
            attempt,
            payload,
        }
    }
}

/// Port for logging generation events.
///
/// The `log` method is synchronous and non-fallible: logging failures are
/// ignored and never interrupt generation.
pub trait AttemptLogger: Send + Sync {
    fn log(&self, event: AttemptEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoAttemptLogger;

impl AttemptLogger for NoAttemptLogger {
    fn log(&self, _event: AttemptEvent) {}
}
