//! Database module for SQLite operations.
//!
//! This module provides:
//! - Numbered migration units and the runner that applies them
//! - SQLite pragma configuration
//! - Repository layer for database operations

pub mod migrations;
pub mod repo;

pub use migrations::{connect, init_db, run_migrations, MigrationError, MigrationReport, MigrationRunner};
pub use repo::Repository;
