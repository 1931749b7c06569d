//! 016: durable record of decision artifacts.
//!
//! Every column except the key is NOT NULL. `status` has no CHECK constraint;
//! its vocabulary belongs to the application.

use super::shape::{ColumnShape, TableShape};
use super::Migration;
use sqlx::sqlite::SqliteConnection;

pub const SQL: &str = r#"
CREATE TABLE IF NOT EXISTS processed_decisions (
    decision_id TEXT PRIMARY KEY,
    created_at TEXT NOT NULL,
    kind TEXT NOT NULL,
    payload_json TEXT NOT NULL,
    status TEXT NOT NULL
)
"#;

pub const SHAPE: TableShape = TableShape {
    table: "processed_decisions",
    columns: &[
        ColumnShape::key("decision_id"),
        ColumnShape::required("created_at"),
        ColumnShape::required("kind"),
        ColumnShape::required("payload_json"),
        ColumnShape::required("status"),
    ],
};

pub const MIGRATION: Migration = Migration {
    version: 16,
    name: "processed_decisions",
    sql: SQL,
    shape: &SHAPE,
};

/// Create `processed_decisions` if it does not exist.
pub async fn apply(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    MIGRATION.apply(conn).await
}
