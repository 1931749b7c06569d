//! Persisted decision artifacts.

use crate::domain::Timestamp;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a decision.
///
/// The vocabulary is open: the table carries no CHECK constraint, so any
/// non-empty string round-trips. The well-known values are provided as constants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DecisionStatus(String);

impl DecisionStatus {
    pub const PENDING: &'static str = "pending";
    pub const APPLIED: &'static str = "applied";
    pub const FAILED: &'static str = "failed";

    /// Build a status from arbitrary text. Surrounding whitespace is trimmed.
    pub fn new(status: impl Into<String>) -> Result<Self, InvalidStatus> {
        let status = status.into();
        let trimmed = status.trim();
        if trimmed.is_empty() {
            return Err(InvalidStatus);
        }
        Ok(DecisionStatus(trimmed.to_string()))
    }

    /// Wrap text read back from the table verbatim.
    ///
    /// Rows written outside `new` may carry padding or an empty string; those
    /// must round-trip unchanged so reads agree with status filters in SQL.
    pub(crate) fn from_stored(status: String) -> Self {
        DecisionStatus(status)
    }

    pub fn pending() -> Self {
        DecisionStatus(Self::PENDING.to_string())
    }

    pub fn applied() -> Self {
        DecisionStatus(Self::APPLIED.to_string())
    }

    pub fn failed() -> Self {
        DecisionStatus(Self::FAILED.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DecisionStatus {
    type Error = InvalidStatus;

    fn try_from(status: String) -> Result<Self, Self::Error> {
        DecisionStatus::new(status)
    }
}

impl From<DecisionStatus> for String {
    fn from(status: DecisionStatus) -> Self {
        status.0
    }
}

impl std::fmt::Display for DecisionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error for an empty decision status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("decision status must not be empty")]
pub struct InvalidStatus;

/// One row of `processed_decisions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub decision_id: String,
    pub created_at: String,
    pub kind: String,
    pub payload_json: String,
    pub status: DecisionStatus,
}

impl Decision {
    /// Create a pending decision with a generated id and the current time.
    ///
    /// # Errors
    /// Returns an error if `payload` cannot be serialized to JSON.
    pub fn new<T: Serialize>(kind: impl Into<String>, payload: &T) -> Result<Self, serde_json::Error> {
        Ok(Self {
            decision_id: uuid::Uuid::new_v4().to_string(),
            created_at: Timestamp::now().to_iso_string(),
            kind: kind.into(),
            payload_json: serde_json::to_string(payload)?,
            status: DecisionStatus::pending(),
        })
    }

    /// Replace the generated id.
    pub fn with_id(mut self, decision_id: impl Into<String>) -> Self {
        self.decision_id = decision_id.into();
        self
    }

    /// Deserialize the stored payload.
    pub fn payload<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.payload_json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_status_rejects_empty() {
        assert_eq!(DecisionStatus::new("  "), Err(InvalidStatus));
        assert_eq!(DecisionStatus::new(" applied ").unwrap().as_str(), "applied");
    }

    #[test]
    fn test_status_accepts_application_vocabulary() {
        let status = DecisionStatus::new("awaiting_confirmation").unwrap();
        assert_eq!(status.to_string(), "awaiting_confirmation");
        assert_eq!(DecisionStatus::applied().as_str(), DecisionStatus::APPLIED);
        assert_eq!(DecisionStatus::failed().as_str(), DecisionStatus::FAILED);
    }

    #[test]
    fn test_status_serializes_as_plain_string() {
        let json = serde_json::to_string(&DecisionStatus::pending()).unwrap();
        assert_eq!(json, "\"pending\"");
    }

    #[test]
    fn test_status_deserialization_validates() {
        let status: DecisionStatus = serde_json::from_str("\" applied \"").unwrap();
        assert_eq!(status.as_str(), "applied");

        let err = serde_json::from_str::<DecisionStatus>("\"  \"").unwrap_err();
        assert!(err.to_string().contains("must not be empty"), "{}", err);
    }

    #[test]
    fn test_new_decision_is_pending_with_payload() {
        let decision = Decision::new("route", &json!({"target": "reddit"})).unwrap();
        assert_eq!(decision.status, DecisionStatus::pending());
        assert_eq!(decision.kind, "route");
        assert!(Timestamp::parse(&decision.created_at).is_ok());

        let payload: Value = decision.payload().unwrap();
        assert_eq!(payload["target"], "reddit");
    }

    #[test]
    fn test_with_id() {
        let decision = Decision::new("route", &json!({})).unwrap().with_id("d1");
        assert_eq!(decision.decision_id, "d1");
        assert_eq!(decision.payload_json, "{}");
    }
}
