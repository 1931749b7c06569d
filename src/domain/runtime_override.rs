//! Runtime configuration overrides.

use serde::{Deserialize, Serialize};

/// One row of `runtime_overrides`.
///
/// `value` is serialized by the caller; the store never interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeOverride {
    pub key: String,
    pub value: Option<String>,
    /// Stored text, returned as written.
    pub updated_at: Option<String>,
}
