//! Database migrations and initialization.
//!
//! Each numbered unit creates one table with `CREATE TABLE IF NOT EXISTS` and
//! exposes an `apply` entry point taking a lent connection. Units never open,
//! close or reconfigure the connection and never touch rows; transactions and
//! version tracking belong to the [`MigrationRunner`].

pub mod m010_runtime_overrides;
pub mod m011_processed_events;
pub mod m016_processed_decisions;
pub mod runner;
pub mod shape;

pub use runner::{applied_versions, current_version, validate_registry, MigrationReport, MigrationRunner};
pub use shape::{describe_table, verify_shape, ColumnInfo, ColumnShape, TableShape};

use crate::config::{Config, DEFAULT_BUSY_TIMEOUT_MS, DEFAULT_MAX_CONNECTIONS};
use sqlx::sqlite::{SqliteConnection, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Every known unit, ascending by version. Gaps are expected.
pub const MIGRATIONS: &[Migration] = &[
    m010_runtime_overrides::MIGRATION,
    m011_processed_events::MIGRATION,
    m016_processed_decisions::MIGRATION,
];

/// A numbered, idempotent, forward-only schema step.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: i64,
    pub name: &'static str,
    /// Single DDL statement.
    pub sql: &'static str,
    /// Shape the statement produces on an empty database.
    pub shape: &'static TableShape,
}

impl Migration {
    /// Execute the unit's DDL on the lent connection.
    ///
    /// # Errors
    /// The driver error, unchanged.
    pub async fn apply(&self, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
        sqlx::query(self.sql).execute(&mut *conn).await?;
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("migration {version:03} ({name}) failed: {source}")]
    Unit {
        version: i64,
        name: &'static str,
        #[source]
        source: sqlx::Error,
    },
    #[error("table {table} does not match its declared shape: {detail}")]
    SchemaMismatch { table: String, detail: String },
    #[error("invalid migration registry: {0}")]
    InvalidRegistry(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Apply every pending unit on `conn` without shape verification.
pub async fn run_migrations(conn: &mut SqliteConnection) -> Result<MigrationReport, MigrationError> {
    MigrationRunner::new().run(conn).await
}

/// Initialize the SQLite database with default pool settings and run migrations.
pub async fn init_db(db_path: &str) -> Result<SqlitePool, MigrationError> {
    let pool = open_pool(db_path, DEFAULT_MAX_CONNECTIONS, DEFAULT_BUSY_TIMEOUT_MS).await?;
    run_on_pool(&pool, MigrationRunner::new()).await?;

    info!("Database initialized successfully at {}", db_path);
    Ok(pool)
}

/// Open the configured database and bring its schema up to date.
pub async fn connect(config: &Config) -> Result<(SqlitePool, MigrationReport), MigrationError> {
    let pool = open_pool(
        &config.database_path,
        config.max_connections,
        config.busy_timeout_ms,
    )
    .await?;
    let runner = MigrationRunner::new().verify_shapes(config.strict_schema);
    let report = run_on_pool(&pool, runner).await?;

    info!(
        path = %config.database_path,
        strict_schema = config.strict_schema,
        "Database initialized successfully"
    );
    Ok((pool, report))
}

async fn open_pool(
    db_path: &str,
    max_connections: u32,
    busy_timeout_ms: u64,
) -> Result<SqlitePool, sqlx::Error> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!(
                    path = %parent.display(),
                    error = %e,
                    "Failed to create database directory"
                );
            }
        }
    }

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .after_connect(move |conn, _meta| {
            Box::pin(async move { configure_pragmas_conn(conn, busy_timeout_ms).await })
        })
        .connect(&format!("sqlite:{}?mode=rwc", db_path))
        .await
}

async fn run_on_pool(
    pool: &SqlitePool,
    runner: MigrationRunner<'_>,
) -> Result<MigrationReport, MigrationError> {
    let mut conn = pool.acquire().await?;
    runner.run(&mut conn).await
}

/// Configure SQLite pragmas for every pooled connection.
async fn configure_pragmas_conn(
    conn: &mut SqliteConnection,
    busy_timeout_ms: u64,
) -> Result<(), sqlx::Error> {
    use sqlx::Row;

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&mut *conn)
        .await?;

    // journal_mode returns the mode actually in effect
    let row = sqlx::query("PRAGMA journal_mode = WAL")
        .fetch_one(&mut *conn)
        .await?;
    let journal_mode: String = row.get(0);
    info!("SQLite journal_mode set to: {}", journal_mode);

    sqlx::query(&format!("PRAGMA busy_timeout = {}", busy_timeout_ms))
        .execute(&mut *conn)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&mut *conn)
        .await?;

    Ok(())
}
