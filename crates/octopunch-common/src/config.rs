//! Application configuration types.
//!
//! The top-level [`Config`] is deserialized from TOML. Every section defaults
//! sensibly so an empty file (or no file at all) yields a working embedded
//! SQLite setup.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::{Error, Result};

/// Default database file for the embedded store.
pub const DEFAULT_SQLITE_DB: &str = "octopunch.sqlite";

/// Connection string selecting a private in-memory database.
pub const MEMORY_CONNECTION: &str = ":memory:";

/// Root application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
}

impl Config {
    /// Deserialize a `Config` from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| Error::config(format!("config parse error: {e}")))
    }

    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None`, the file does not exist, or it fails to parse.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_toml(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.database.connection.trim().is_empty() {
            warnings.push("database.connection is empty".into());
        }
        if self.database.max_pool_size == 0 {
            warnings.push("database.max_pool_size is 0; the pool cannot hand out connections".into());
        }
        if self.database.pool_timeout_secs == 0 {
            warnings.push("database.pool_timeout_secs is 0; checkouts will fail immediately".into());
        }

        warnings
    }
}

/// Storage backend settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Which backend implementation serves the facade.
    pub backend: BackendKind,
    /// Backend connection target. For SQLite this is a file path or `:memory:`.
    pub connection: String,
    pub max_pool_size: u32,
    pub pool_timeout_secs: u64,
    /// Run blocking database calls on the worker thread pool.
    pub use_tpool: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            connection: DEFAULT_SQLITE_DB.to_string(),
            max_pool_size: 4,
            pool_timeout_secs: 30,
            use_tpool: true,
        }
    }
}

impl DatabaseConfig {
    /// Configuration for a private in-memory database.
    pub fn in_memory() -> Self {
        Self {
            connection: MEMORY_CONNECTION.to_string(),
            ..Self::default()
        }
    }

    /// Configuration for a database file at `path`.
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self {
            connection: path.as_ref().to_string_lossy().into_owned(),
            ..Self::default()
        }
    }

    pub fn is_memory(&self) -> bool {
        self.connection == MEMORY_CONNECTION
    }
}

/// Registry of available backend implementations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Relational backend on SQLite. `sqlalchemy` is accepted as a legacy name.
    #[default]
    #[serde(alias = "sqlalchemy")]
    Sqlite,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sqlite" | "sqlalchemy" => Ok(Self::Sqlite),
            other => Err(Error::invalid_input(format!("unknown database backend: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.database.backend, BackendKind::Sqlite);
        assert_eq!(config.database.connection, "octopunch.sqlite");
        assert_eq!(config.database.max_pool_size, 4);
        assert!(config.database.use_tpool);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_database_section() {
        let config = Config::from_toml(
            r#"
            [database]
            connection = "/var/lib/octopunch/db.sqlite"
            use_tpool = false
            "#,
        )
        .unwrap();
        assert_eq!(config.database.connection, "/var/lib/octopunch/db.sqlite");
        assert!(!config.database.use_tpool);
        assert_eq!(config.database.max_pool_size, 4);
    }

    #[test]
    fn test_legacy_backend_name() {
        let config = Config::from_toml("[database]\nbackend = \"sqlalchemy\"\n").unwrap();
        assert_eq!(config.database.backend, BackendKind::Sqlite);
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let err = Config::from_toml("[database]\nbackend = \"mongo\"\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = "mongo".parse::<BackendKind>().unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_backend_kind_parse() {
        assert_eq!("SQLite".parse::<BackendKind>().unwrap(), BackendKind::Sqlite);
        assert_eq!(BackendKind::Sqlite.to_string(), "sqlite");
    }

    #[test]
    fn test_validate_warnings() {
        let mut config = Config::default();
        config.database.connection = "  ".into();
        config.database.max_pool_size = 0;
        let warnings = config.validate();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("connection"));
        assert!(warnings[1].contains("max_pool_size"));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(Some(&dir.path().join("absent.toml")));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_or_default_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[database\nbroken").unwrap();
        let config = Config::load_or_default(Some(file.path()));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[database]\nmax_pool_size = 8").unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.database.max_pool_size, 8);
    }

    #[test]
    fn test_memory_and_file_helpers() {
        assert!(DatabaseConfig::in_memory().is_memory());
        let config = DatabaseConfig::file("/tmp/x.sqlite");
        assert_eq!(config.connection, "/tmp/x.sqlite");
        assert!(!config.is_memory());
    }
}
