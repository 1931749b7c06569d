//! Domain types for the runtime store.
//!
//! This module provides:
//! - `Timestamp`, the canonical text form written into time columns
//! - Row types for runtime overrides, processed events and decisions
//! - `Event`, the unit handled by the dispatcher

pub mod decision;
pub mod event;
pub mod runtime_override;
pub mod timestamp;

pub use decision::{Decision, DecisionStatus, InvalidStatus};
pub use event::{Event, ProcessedEvent};
pub use runtime_override::RuntimeOverride;
pub use timestamp::Timestamp;
