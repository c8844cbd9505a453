//! Centralized configuration (environment variables + defaults).

use serde::Serialize;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_STORAGE_PATH: &str = "./data/database.sqlite";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unsupported DB_DIALECT '{0}' (supported: sqlite)")]
    UnsupportedDialect(String),
    #[error("invalid value '{value}' for {key}")]
    InvalidFlag { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    Sqlite,
}

impl FromStr for Dialect {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            other => Err(ConfigError::UnsupportedDialect(other.to_string())),
        }
    }
}

/// Where the embedded engine keeps its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageLocation {
    /// Private in-memory database, lost on close.
    Memory,
    /// Database file, created on first use.
    File(PathBuf),
    /// Full connection URL passed through to the driver.
    Url(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub dialect: Dialect,
    pub storage: StorageLocation,
    /// Statement logging from the driver.
    pub logging: bool,
    pub max_connections: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::Sqlite,
            storage: StorageLocation::File(PathBuf::from(DEFAULT_STORAGE_PATH)),
            logging: false,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl StoreConfig {
    pub fn in_memory() -> Self {
        Self {
            storage: StorageLocation::Memory,
            ..Self::default()
        }
    }

    pub fn sqlite_file(path: impl Into<PathBuf>) -> Self {
        Self {
            storage: StorageLocation::File(path.into()),
            ..Self::default()
        }
    }

    /// Loads `.env` (if present) and reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dialect) = non_empty(lookup("DB_DIALECT")) {
            config.dialect = dialect.parse()?;
        }

        if let Some(url) = non_empty(lookup("DATABASE_URL")) {
            config.storage = if is_memory_url(&url) {
                StorageLocation::Memory
            } else {
                StorageLocation::Url(url)
            };
        } else if let Some(path) = non_empty(lookup("DB_STORAGE")) {
            config.storage = if path == ":memory:" {
                StorageLocation::Memory
            } else {
                StorageLocation::File(PathBuf::from(path))
            };
        }

        if let Some(flag) = non_empty(lookup("DB_LOGGING")) {
            config.logging = parse_flag("DB_LOGGING", &flag)?;
        }

        if let Some(raw) = non_empty(lookup("DB_MAX_CONNECTIONS")) {
            config.max_connections = raw
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::InvalidFlag {
                    key: "DB_MAX_CONNECTIONS",
                    value: raw,
                })?;
        }

        Ok(config)
    }
}

/// HTTP listen address for the api_server binary.
pub fn api_bind_addr() -> String {
    non_empty(std::env::var("API_BIND_ADDR").ok()).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn is_memory_url(url: &str) -> bool {
    url == "sqlite::memory:" || url == "sqlite://:memory:" || url == ":memory:"
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            key,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_to_embedded_file_without_logging() {
        let config = StoreConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.dialect, Dialect::Sqlite);
        assert_eq!(
            config.storage,
            StorageLocation::File(PathBuf::from(DEFAULT_STORAGE_PATH))
        );
        assert!(!config.logging);
    }

    #[test]
    fn database_url_wins_over_storage_path() {
        let config = StoreConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("DB_STORAGE", "/tmp/other.sqlite"),
        ]))
        .unwrap();
        assert_eq!(config.storage, StorageLocation::Memory);

        let config = StoreConfig::from_lookup(lookup(&[(
            "DATABASE_URL",
            "sqlite:///var/lib/app.db?mode=rwc",
        )]))
        .unwrap();
        assert_eq!(
            config.storage,
            StorageLocation::Url("sqlite:///var/lib/app.db?mode=rwc".to_string())
        );
    }

    #[test]
    fn parses_flags_and_pool_size() {
        let config = StoreConfig::from_lookup(lookup(&[
            ("DB_LOGGING", "yes"),
            ("DB_MAX_CONNECTIONS", "8"),
            ("DB_DIALECT", "SQLite"),
        ]))
        .unwrap();
        assert!(config.logging);
        assert_eq!(config.max_connections, 8);
    }

    #[test]
    fn rejects_unknown_dialect_and_bad_flags() {
        assert_eq!(
            StoreConfig::from_lookup(lookup(&[("DB_DIALECT", "oracle")])),
            Err(ConfigError::UnsupportedDialect("oracle".to_string()))
        );
        assert!(matches!(
            StoreConfig::from_lookup(lookup(&[("DB_LOGGING", "maybe")])),
            Err(ConfigError::InvalidFlag { key: "DB_LOGGING", .. })
        ));
        assert!(matches!(
            StoreConfig::from_lookup(lookup(&[("DB_MAX_CONNECTIONS", "0")])),
            Err(ConfigError::InvalidFlag { .. })
        ));
    }
}
