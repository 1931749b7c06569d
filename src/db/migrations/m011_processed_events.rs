//! 011: idempotence ledger for consumed events.
//!
//! A row means the event was durably processed and must not be re-applied.

use super::shape::{ColumnShape, TableShape};
use super::Migration;
use sqlx::sqlite::SqliteConnection;

pub const SQL: &str = r#"
CREATE TABLE IF NOT EXISTS processed_events (
    event_id TEXT PRIMARY KEY,
    event_type TEXT,
    processed_at TEXT
)
"#;

pub const SHAPE: TableShape = TableShape {
    table: "processed_events",
    columns: &[
        ColumnShape::key("event_id"),
        ColumnShape::nullable("event_type"),
        ColumnShape::nullable("processed_at"),
    ],
};

pub const MIGRATION: Migration = Migration {
    version: 11,
    name: "processed_events",
    sql: SQL,
    shape: &SHAPE,
};

/// Create `processed_events` if it does not exist.
pub async fn apply(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    MIGRATION.apply(conn).await
}
