//! Runtime override operations for the repository.

use crate::domain::{RuntimeOverride, Timestamp};
use sqlx::Row;
use tracing::debug;

use super::Repository;

impl Repository {
    /// Insert or replace an override, stamping `updated_at` with the current time.
    ///
    /// # Errors
    /// Returns an error if the write fails.
    pub async fn set_override(&self, key: &str, value: Option<&str>) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO runtime_overrides (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Timestamp::now().to_iso_string())
        .execute(&self.pool)
        .await?;

        debug!(key, "Runtime override stored");
        Ok(())
    }

    /// Get an override by key.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn get_override(&self, key: &str) -> Result<Option<RuntimeOverride>, sqlx::Error> {
        let row = sqlx::query("SELECT key, value, updated_at FROM runtime_overrides WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| RuntimeOverride {
            key: r.get("key"),
            value: r.get("value"),
            updated_at: r.get("updated_at"),
        }))
    }

    /// All overrides ordered by key.
    pub async fn list_overrides(&self) -> Result<Vec<RuntimeOverride>, sqlx::Error> {
        let rows = sqlx::query("SELECT key, value, updated_at FROM runtime_overrides ORDER BY key ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(|r| RuntimeOverride {
                key: r.get("key"),
                value: r.get("value"),
                updated_at: r.get("updated_at"),
            })
            .collect())
    }

    /// Remove an override. Returns true when a row was deleted.
    pub async fn clear_override(&self, key: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM runtime_overrides WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
