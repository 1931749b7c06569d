//! 010: key/value store for runtime-adjustable configuration.

use super::shape::{ColumnShape, TableShape};
use super::Migration;
use sqlx::sqlite::SqliteConnection;

pub const SQL: &str = r#"
CREATE TABLE IF NOT EXISTS runtime_overrides (
    key TEXT PRIMARY KEY,
    value TEXT,
    updated_at TEXT
)
"#;

pub const SHAPE: TableShape = TableShape {
    table: "runtime_overrides",
    columns: &[
        ColumnShape::key("key"),
        ColumnShape::nullable("value"),
        ColumnShape::nullable("updated_at"),
    ],
};

pub const MIGRATION: Migration = Migration {
    version: 10,
    name: "runtime_overrides",
    sql: SQL,
    shape: &SHAPE,
};

/// Create `runtime_overrides` if it does not exist.
pub async fn apply(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    MIGRATION.apply(conn).await
}
