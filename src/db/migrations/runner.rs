//! Migration runner.
//!
//! Tracks applied versions in `schema_version` and applies every registered
//! unit that has not been recorded yet, in ascending version order. Each unit
//! runs in its own transaction together with its ledger row.

use super::shape::verify_shape;
use super::{Migration, MigrationError, MIGRATIONS};
use crate::domain::Timestamp;
use sqlx::sqlite::SqliteConnection;
use sqlx::Connection;
use std::collections::BTreeSet;
use tracing::{debug, info};

const VERSION_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
)
"#;

/// Outcome of a runner pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    /// Versions applied during this pass, ascending.
    pub applied: Vec<i64>,
    /// Highest recorded version after the pass.
    pub current_version: i64,
}

/// Applies a registry of migration units against one connection.
#[derive(Debug, Clone, Copy)]
pub struct MigrationRunner<'a> {
    migrations: &'a [Migration],
    verify_shapes: bool,
}

impl MigrationRunner<'static> {
    /// Runner over every registered unit.
    pub fn new() -> Self {
        MigrationRunner {
            migrations: MIGRATIONS,
            verify_shapes: false,
        }
    }
}

impl Default for MigrationRunner<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> MigrationRunner<'a> {
    /// Runner over a custom registry.
    pub fn with_migrations(migrations: &'a [Migration]) -> Self {
        MigrationRunner {
            migrations,
            verify_shapes: false,
        }
    }

    /// Verify every unit's table shape after the pass.
    pub fn verify_shapes(mut self, enabled: bool) -> Self {
        self.verify_shapes = enabled;
        self
    }

    /// Apply all pending units.
    ///
    /// # Errors
    /// Stops at the first failing unit. That unit's transaction is rolled back
    /// and earlier units stay applied.
    pub async fn run(&self, conn: &mut SqliteConnection) -> Result<MigrationReport, MigrationError> {
        validate_registry(self.migrations)?;
        ensure_version_table(&mut *conn).await?;

        let recorded: BTreeSet<i64> = applied_versions(&mut *conn).await?.into_iter().collect();
        let mut applied = Vec::new();

        for migration in self.migrations {
            if recorded.contains(&migration.version) {
                debug!(
                    version = migration.version,
                    name = migration.name,
                    "Migration already applied, skipping"
                );
                continue;
            }

            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            apply_recorded(&mut *conn, migration)
                .await
                .map_err(|source| MigrationError::Unit {
                    version: migration.version,
                    name: migration.name,
                    source,
                })?;
            applied.push(migration.version);
        }

        if self.verify_shapes {
            for migration in self.migrations {
                verify_shape(&mut *conn, migration.shape).await?;
            }
            debug!(tables = self.migrations.len(), "Table shapes verified");
        }

        let current_version = current_version(&mut *conn).await?;
        info!(
            applied = applied.len(),
            current_version, "Migrations completed successfully"
        );

        Ok(MigrationReport {
            applied,
            current_version,
        })
    }
}

async fn apply_recorded(conn: &mut SqliteConnection, migration: &Migration) -> Result<(), sqlx::Error> {
    let mut tx = conn.begin().await?;

    migration.apply(&mut *tx).await?;

    sqlx::query("INSERT INTO schema_version (version, applied_at) VALUES (?, ?)")
        .bind(migration.version)
        .bind(Timestamp::now().to_iso_string())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

/// Reject registries that are not strictly ascending or carry non-positive versions.
pub fn validate_registry(migrations: &[Migration]) -> Result<(), MigrationError> {
    if let Some(bad) = migrations.iter().find(|m| m.version <= 0) {
        return Err(MigrationError::InvalidRegistry(format!(
            "version {} ({}) must be positive",
            bad.version, bad.name
        )));
    }

    for pair in migrations.windows(2) {
        if pair[1].version <= pair[0].version {
            return Err(MigrationError::InvalidRegistry(format!(
                "version {:03} ({}) must be greater than {:03} ({})",
                pair[1].version, pair[1].name, pair[0].version, pair[0].name
            )));
        }
    }

    Ok(())
}

async fn ensure_version_table(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query(VERSION_TABLE_SQL).execute(&mut *conn).await?;
    Ok(())
}

/// Highest recorded version, or 0 if none.
pub async fn current_version(conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    ensure_version_table(&mut *conn).await?;
    let (version,): (i64,) = sqlx::query_as("SELECT COALESCE(MAX(version), 0) FROM schema_version")
        .fetch_one(&mut *conn)
        .await?;
    Ok(version)
}

/// All recorded versions, ascending.
pub async fn applied_versions(conn: &mut SqliteConnection) -> Result<Vec<i64>, sqlx::Error> {
    ensure_version_table(&mut *conn).await?;
    sqlx::query_scalar::<_, i64>("SELECT version FROM schema_version ORDER BY version ASC")
        .fetch_all(&mut *conn)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::{m010_runtime_overrides, m011_processed_events, m016_processed_decisions};

    #[test]
    fn test_registered_units_are_valid() {
        assert!(validate_registry(MIGRATIONS).is_ok());
        let versions: Vec<i64> = MIGRATIONS.iter().map(|m| m.version).collect();
        assert_eq!(versions, vec![10, 11, 16]);
    }

    #[test]
    fn test_out_of_order_registry_rejected() {
        let registry = [
            m016_processed_decisions::MIGRATION,
            m010_runtime_overrides::MIGRATION,
        ];
        match validate_registry(&registry) {
            Err(MigrationError::InvalidRegistry(msg)) => {
                assert!(msg.contains("010"), "{}", msg);
            }
            other => panic!("Expected InvalidRegistry, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_version_rejected() {
        let registry = [
            m011_processed_events::MIGRATION,
            m011_processed_events::MIGRATION,
        ];
        assert!(matches!(
            validate_registry(&registry),
            Err(MigrationError::InvalidRegistry(_))
        ));
    }

    #[test]
    fn test_non_positive_version_rejected() {
        let mut unit = m010_runtime_overrides::MIGRATION;
        unit.version = 0;
        assert!(matches!(
            validate_registry(&[unit]),
            Err(MigrationError::InvalidRegistry(_))
        ));
    }
}
