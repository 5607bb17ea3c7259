//! # Database Configuration
//!
//! Builder-style [`DbConfig`] plus loading from environment variables.
//!
//! ## Environment
//! ```text
//! STOCKROOM_DATABASE_PATH          ./stockroom.db
//! STOCKROOM_MAX_CONNECTIONS        5
//! STOCKROOM_CONNECT_TIMEOUT_SECS   30
//! STOCKROOM_RUN_MIGRATIONS         true
//! ```

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default database file when nothing else is configured.
pub const DEFAULT_DATABASE_PATH: &str = "./stockroom.db";

/// Path that selects an in-memory database.
pub const IN_MEMORY_PATH: &str = ":memory:";

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/stockroom.db")
///     .max_connections(5)
///     .min_connections(1);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// Connection timeout duration.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// Creates a new database configuration with the given path.
    ///
    /// The file is created on first connect if it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let config = DbConfig::in_memory();
    /// let db = Database::new(config).await?;
    /// // Database is isolated, perfect for tests
    /// ```
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(IN_MEMORY_PATH),
            max_connections: 1, // In-memory requires single connection
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            run_migrations: true,
        }
    }

    /// Returns true if this config points at an in-memory database.
    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == IN_MEMORY_PATH
    }

    /// Loads configuration from `STOCKROOM_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    ///
    /// Unset keys fall back to defaults; set but unparsable keys are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = lookup("STOCKROOM_DATABASE_PATH")
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string());

        let mut config = if path == IN_MEMORY_PATH {
            DbConfig::in_memory()
        } else {
            DbConfig::new(path)
        };

        if let Some(max) = parse_var::<u32, _>(&lookup, "STOCKROOM_MAX_CONNECTIONS")? {
            if max == 0 {
                return Err(ConfigError::InvalidValue(
                    "STOCKROOM_MAX_CONNECTIONS".to_string(),
                ));
            }
            config.max_connections = max;
            config.min_connections = config.min_connections.min(max);
        }

        if let Some(secs) = parse_var::<u64, _>(&lookup, "STOCKROOM_CONNECT_TIMEOUT_SECS")? {
            config.connect_timeout = Duration::from_secs(secs);
        }

        if let Some(run) = parse_var::<bool, _>(&lookup, "STOCKROOM_RUN_MIGRATIONS")? {
            config.run_migrations = run;
        }

        Ok(config)
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        DbConfig::new(DEFAULT_DATABASE_PATH)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

// =============================================================================
// Unit Tests
// =============================================================================

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
    fn test_config_builder() {
        let config = DbConfig::new("/tmp/test.db")
            .max_connections(10)
            .min_connections(2);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert!(!config.is_in_memory());
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = DbConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.database_path, PathBuf::from(DEFAULT_DATABASE_PATH));
        assert_eq!(config.max_connections, 5);
        assert!(config.run_migrations);
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = DbConfig::from_lookup(lookup(&[
            ("STOCKROOM_DATABASE_PATH", "/var/lib/stockroom.db"),
            ("STOCKROOM_MAX_CONNECTIONS", "8"),
            ("STOCKROOM_CONNECT_TIMEOUT_SECS", "3"),
            ("STOCKROOM_RUN_MIGRATIONS", "false"),
        ]))
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/var/lib/stockroom.db"));
        assert_eq!(config.max_connections, 8);
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert!(!config.run_migrations);
    }

    #[test]
    fn test_from_lookup_in_memory() {
        let config =
            DbConfig::from_lookup(lookup(&[("STOCKROOM_DATABASE_PATH", ":memory:")])).unwrap();
        assert!(config.is_in_memory());
        assert_eq!(config.max_connections, 1);
    }

    #[test]
    fn test_from_lookup_rejects_garbage() {
        let err = DbConfig::from_lookup(lookup(&[("STOCKROOM_MAX_CONNECTIONS", "lots")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref key) if key == "STOCKROOM_MAX_CONNECTIONS"));

        assert!(DbConfig::from_lookup(lookup(&[("STOCKROOM_MAX_CONNECTIONS", "0")])).is_err());
        assert!(DbConfig::from_lookup(lookup(&[("STOCKROOM_RUN_MIGRATIONS", "yes")])).is_err());
    }
}
