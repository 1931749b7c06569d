//! Events consumed by the dispatcher and their ledger rows.

use serde::{Deserialize, Serialize};

/// An externally sourced event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Stable identifier; duplicates are suppressed by the processed-events ledger.
    pub event_id: String,
    pub event_type: String,
    pub source: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl Event {
    /// Create an event with a freshly generated UUID v4 id.
    pub fn new(event_type: impl Into<String>, source: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            event_type: event_type.into(),
            source: source.into(),
            payload,
        }
    }

    /// Replace the generated id with one supplied by the producer.
    ///
    /// Blank ids are ignored so every event keeps a usable key.
    pub fn with_id(mut self, event_id: impl Into<String>) -> Self {
        let event_id = event_id.into();
        if !event_id.trim().is_empty() {
            self.event_id = event_id.trim().to_string();
        }
        self
    }
}

/// One row of `processed_events`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedEvent {
    pub event_id: String,
    pub event_type: Option<String>,
    pub processed_at: Option<String>,
}
