//! Decision artifact operations for the repository.

use crate::domain::{Decision, DecisionStatus};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{clamp_limit, Repository};

fn decision_from_row(row: &SqliteRow) -> Decision {
    Decision {
        decision_id: row.get("decision_id"),
        created_at: row.get("created_at"),
        kind: row.get("kind"),
        payload_json: row.get("payload_json"),
        status: DecisionStatus::from_stored(row.get("status")),
    }
}

impl Repository {
    /// Insert a new decision.
    ///
    /// # Errors
    /// Fails with the database's uniqueness violation if `decision_id` exists.
    pub async fn insert_decision(&self, decision: &Decision) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO processed_decisions (decision_id, created_at, kind, payload_json, status)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(decision.decision_id.as_str())
        .bind(decision.created_at.as_str())
        .bind(decision.kind.as_str())
        .bind(decision.payload_json.as_str())
        .bind(decision.status.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get a decision by id.
    pub async fn get_decision(&self, decision_id: &str) -> Result<Option<Decision>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT decision_id, created_at, kind, payload_json, status
            FROM processed_decisions
            WHERE decision_id = ?
            "#,
        )
        .bind(decision_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(decision_from_row))
    }

    /// Move a decision to `status`. Returns false when no such decision exists.
    ///
    /// # Errors
    /// Returns an error if the update fails.
    pub async fn update_decision_status(
        &self,
        decision_id: &str,
        status: &DecisionStatus,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE processed_decisions SET status = ? WHERE decision_id = ?")
            .bind(status.as_str())
            .bind(decision_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Decisions with the given status, oldest first. `limit` is clamped to `1..=500`.
    pub async fn list_decisions_by_status(
        &self,
        status: &DecisionStatus,
        limit: i64,
    ) -> Result<Vec<Decision>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT decision_id, created_at, kind, payload_json, status
            FROM processed_decisions
            WHERE status = ?
            ORDER BY created_at ASC, decision_id ASC
            LIMIT ?
            "#,
        )
        .bind(status.as_str())
        .bind(clamp_limit(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(decision_from_row).collect())
    }
}
