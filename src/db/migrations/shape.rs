//! Declared table shapes and verification against the live schema.
//!
//! `CREATE TABLE IF NOT EXISTS` silently accepts a pre-existing table with a
//! different layout. These helpers let the runner detect that case.

use super::MigrationError;
use sqlx::sqlite::SqliteConnection;
use sqlx::Row;

/// Expected layout of one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnShape {
    pub name: &'static str,
    pub decl_type: &'static str,
    pub not_null: bool,
    pub primary_key: bool,
}

impl ColumnShape {
    /// `TEXT PRIMARY KEY`. SQLite does not add an implicit NOT NULL here.
    pub const fn key(name: &'static str) -> Self {
        Self {
            name,
            decl_type: "TEXT",
            not_null: false,
            primary_key: true,
        }
    }

    /// Plain `TEXT`.
    pub const fn nullable(name: &'static str) -> Self {
        Self {
            name,
            decl_type: "TEXT",
            not_null: false,
            primary_key: false,
        }
    }

    /// `TEXT NOT NULL`.
    pub const fn required(name: &'static str) -> Self {
        Self {
            name,
            decl_type: "TEXT",
            not_null: true,
            primary_key: false,
        }
    }

    fn describe(&self) -> String {
        format!(
            "{} {}{}{}",
            self.name,
            self.decl_type,
            if self.primary_key { " PRIMARY KEY" } else { "" },
            if self.not_null { " NOT NULL" } else { "" },
        )
    }

    fn matches(&self, live: &ColumnInfo) -> bool {
        self.name == live.name
            && self.decl_type.eq_ignore_ascii_case(&live.decl_type)
            && self.not_null == live.not_null
            && self.primary_key == live.primary_key
    }
}

/// Expected layout of a table, columns in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableShape {
    pub table: &'static str,
    pub columns: &'static [ColumnShape],
}

/// Column as reported by `pragma_table_info`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub decl_type: String,
    pub not_null: bool,
    pub primary_key: bool,
}

impl ColumnInfo {
    fn describe(&self) -> String {
        format!(
            "{} {}{}{}",
            self.name,
            self.decl_type,
            if self.primary_key { " PRIMARY KEY" } else { "" },
            if self.not_null { " NOT NULL" } else { "" },
        )
    }
}

/// Read the columns of `table` in declaration order.
///
/// Returns an empty vector when the table does not exist.
pub async fn describe_table(
    conn: &mut SqliteConnection,
    table: &str,
) -> Result<Vec<ColumnInfo>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT name, type, "notnull", pk
        FROM pragma_table_info(?)
        ORDER BY cid ASC
        "#,
    )
    .bind(table)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .iter()
        .map(|row| ColumnInfo {
            name: row.get("name"),
            decl_type: row.get("type"),
            not_null: row.get::<i64, _>("notnull") != 0,
            primary_key: row.get::<i64, _>("pk") > 0,
        })
        .collect())
}

/// First difference between the declared shape and the live columns, if any.
pub fn shape_difference(shape: &TableShape, live: &[ColumnInfo]) -> Option<String> {
    if live.is_empty() {
        return Some("table does not exist".to_string());
    }

    for (idx, expected) in shape.columns.iter().enumerate() {
        match live.get(idx) {
            Some(actual) if expected.matches(actual) => {}
            Some(actual) => {
                return Some(format!(
                    "column {} is `{}`, expected `{}`",
                    idx,
                    actual.describe(),
                    expected.describe()
                ))
            }
            None => return Some(format!("missing column `{}`", expected.describe())),
        }
    }

    if live.len() > shape.columns.len() {
        let extra: Vec<&str> = live[shape.columns.len()..]
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        return Some(format!("unexpected columns: {}", extra.join(", ")));
    }

    None
}

/// Check that the live table matches `shape` exactly.
///
/// # Errors
/// `MigrationError::SchemaMismatch` when the table is missing or differs,
/// `MigrationError::Database` when the schema cannot be read.
pub async fn verify_shape(
    conn: &mut SqliteConnection,
    shape: &TableShape,
) -> Result<(), MigrationError> {
    let live = describe_table(conn, shape.table).await?;
    match shape_difference(shape, &live) {
        Some(detail) => Err(MigrationError::SchemaMismatch {
            table: shape.table.to_string(),
            detail,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHAPE: TableShape = TableShape {
        table: "kv",
        columns: &[ColumnShape::key("key"), ColumnShape::required("value")],
    };

    fn info(name: &str, not_null: bool, primary_key: bool) -> ColumnInfo {
        ColumnInfo {
            name: name.to_string(),
            decl_type: "TEXT".to_string(),
            not_null,
            primary_key,
        }
    }

    #[test]
    fn test_matching_shape_has_no_difference() {
        let live = vec![info("key", false, true), info("value", true, false)];
        assert_eq!(shape_difference(&SHAPE, &live), None);
    }

    #[test]
    fn test_type_comparison_ignores_case() {
        let mut live = vec![info("key", false, true), info("value", true, false)];
        live[1].decl_type = "text".to_string();
        assert_eq!(shape_difference(&SHAPE, &live), None);
    }

    #[test]
    fn test_missing_table() {
        assert_eq!(
            shape_difference(&SHAPE, &[]),
            Some("table does not exist".to_string())
        );
    }

    #[test]
    fn test_nullability_difference_is_reported() {
        let live = vec![info("key", false, true), info("value", false, false)];
        let detail = shape_difference(&SHAPE, &live).unwrap();
        assert!(detail.contains("value TEXT"), "{}", detail);
        assert!(detail.contains("expected `value TEXT NOT NULL`"), "{}", detail);
    }

    #[test]
    fn test_missing_and_extra_columns() {
        let live = vec![info("key", false, true)];
        assert!(shape_difference(&SHAPE, &live)
            .unwrap()
            .starts_with("missing column"));

        let live = vec![
            info("key", false, true),
            info("value", true, false),
            info("extra", false, false),
        ];
        assert_eq!(
            shape_difference(&SHAPE, &live),
            Some("unexpected columns: extra".to_string())
        );
    }
}
