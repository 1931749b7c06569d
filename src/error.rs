use crate::config::ConfigError;
use crate::db::migrations::MigrationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Migration error: {0}")]
    Migration(#[from] MigrationError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Event handler failed: {0}")]
    Handler(anyhow::Error),
}

impl AppError {
    /// True when the database rejected a row because its key already exists.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            AppError::Database(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_context() {
        let err = AppError::Handler(anyhow::anyhow!("boom"));
        assert_eq!(err.to_string(), "Event handler failed: boom");

        let err: AppError =
            ConfigError::InvalidValue("STRICT_SCHEMA".to_string(), "bad".to_string()).into();
        assert_eq!(
            err.to_string(),
            "Configuration error: Invalid value for STRICT_SCHEMA: bad"
        );
    }

    #[test]
    fn test_non_database_errors_are_not_unique_violations() {
        assert!(!AppError::Handler(anyhow::anyhow!("x")).is_unique_violation());
        assert!(!AppError::Database(sqlx::Error::RowNotFound).is_unique_violation());
    }
}
