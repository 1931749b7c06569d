use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_DATA_DIR: &str = "./.treta_data";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_path: String,
    pub max_connections: u32,
    pub busy_timeout_ms: u64,
    /// Verify table shapes after migrating instead of trusting `IF NOT EXISTS`.
    pub strict_schema: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_path = resolve_database_path(&env_map)?;

        let max_connections = match env_map.get("DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    ConfigError::InvalidValue(
                        "DB_MAX_CONNECTIONS".to_string(),
                        "must be a positive integer".to_string(),
                    )
                })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let busy_timeout_ms = match env_map.get("DB_BUSY_TIMEOUT_MS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                ConfigError::InvalidValue(
                    "DB_BUSY_TIMEOUT_MS".to_string(),
                    "must be a valid u64".to_string(),
                )
            })?,
            None => DEFAULT_BUSY_TIMEOUT_MS,
        };

        let strict_schema = match env_map
            .get("STRICT_SCHEMA")
            .map(|s| s.trim().to_ascii_lowercase())
            .as_deref()
            .unwrap_or("false")
        {
            "true" | "1" => true,
            "false" | "0" => false,
            other => {
                return Err(ConfigError::InvalidValue(
                    "STRICT_SCHEMA".to_string(),
                    format!("must be true, false, 1, or 0, got {}", other),
                ))
            }
        };

        Ok(Config {
            database_path,
            max_connections,
            busy_timeout_ms,
            strict_schema,
        })
    }
}

/// `TRETA_DB_PATH` wins; otherwise the file lives under `TRETA_DATA_DIR`.
fn resolve_database_path(env_map: &HashMap<String, String>) -> Result<String, ConfigError> {
    if let Some(path) = env_map.get("TRETA_DB_PATH") {
        let path = path.trim();
        if path.is_empty() {
            return Err(ConfigError::InvalidValue(
                "TRETA_DB_PATH".to_string(),
                "must not be empty".to_string(),
            ));
        }
        return Ok(path.to_string());
    }

    let data_dir = env_map
        .get("TRETA_DATA_DIR")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_DATA_DIR);

    Ok(Path::new(data_dir)
        .join("memory")
        .join("treta.sqlite")
        .to_string_lossy()
        .to_string())
}
