//! Processed-events ledger operations for the repository.

use crate::domain::{ProcessedEvent, Timestamp};
use sqlx::Row;

use super::{clamp_limit, Repository};

impl Repository {
    /// Record an event as processed.
    ///
    /// Returns `false` when the event was already recorded; the existing row
    /// is left untouched.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub async fn mark_event_processed(
        &self,
        event_id: &str,
        event_type: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO processed_events (event_id, event_type, processed_at)
            VALUES (?, ?, ?)
            ON CONFLICT(event_id) DO NOTHING
            "#,
        )
        .bind(event_id)
        .bind(event_type)
        .bind(Timestamp::now().to_iso_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether the event has a ledger row.
    pub async fn is_event_processed(&self, event_id: &str) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM processed_events WHERE event_id = ?")
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.is_some())
    }

    /// Most recently processed events first. `limit` is clamped to `1..=500`.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn list_recent_processed_events(
        &self,
        limit: i64,
    ) -> Result<Vec<ProcessedEvent>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT event_id, event_type, processed_at
            FROM processed_events
            ORDER BY processed_at DESC, event_id DESC
            LIMIT ?
            "#,
        )
        .bind(clamp_limit(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|r| ProcessedEvent {
                event_id: r.get("event_id"),
                event_type: r.get("event_type"),
                processed_at: r.get("processed_at"),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::db::repo::test_support::setup_test_db;

    #[tokio::test]
    async fn test_mark_event_processed_once() {
        let (repo, _temp) = setup_test_db().await;

        assert!(!repo.is_event_processed("evt-1").await.unwrap());
        assert!(repo
            .mark_event_processed("evt-1", Some("order.created"))
            .await
            .unwrap());
        assert!(!repo
            .mark_event_processed("evt-1", Some("order.updated"))
            .await
            .unwrap());
        assert!(repo.is_event_processed("evt-1").await.unwrap());

        let recent = repo.list_recent_processed_events(10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].event_type.as_deref(), Some("order.created"));
    }

    #[tokio::test]
    async fn test_list_recent_respects_limit_and_order() {
        let (repo, _temp) = setup_test_db().await;

        for (id, at) in [
            ("evt-a", "2024-01-01T00:00:00.000Z"),
            ("evt-b", "2024-01-02T00:00:00.000Z"),
            ("evt-c", "2024-01-03T00:00:00.000Z"),
        ] {
            sqlx::query(
                "INSERT INTO processed_events (event_id, event_type, processed_at) VALUES (?, NULL, ?)",
            )
            .bind(id)
            .bind(at)
            .execute(repo.pool())
            .await
            .unwrap();
        }

        let recent = repo.list_recent_processed_events(2).await.unwrap();
        let ids: Vec<&str> = recent.iter().map(|e| e.event_id.as_str()).collect();
        assert_eq!(ids, vec!["evt-c", "evt-b"]);
        assert_eq!(recent[0].event_type, None);

        let clamped = repo.list_recent_processed_events(0).await.unwrap();
        assert_eq!(clamped.len(), 1);
    }
}
