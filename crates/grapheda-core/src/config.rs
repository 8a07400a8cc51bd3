//! Connection and engine configuration.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{GraphEdaError, GraphEdaResult};

pub const ENV_URI: &str = "NEO4J_URI";
pub const ENV_USERNAME: &str = "NEO4J_USERNAME";
pub const ENV_PASSWORD: &str = "NEO4J_PASSWORD";
pub const ENV_DATABASE: &str = "NEO4J_DATABASE";

/// Credentials for one graph database.
///
/// Fields may deserialize empty; [`ConnectionConfig::validate`] is what
/// decides whether the config is usable.
#[derive(Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ConnectionConfig {
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub database: Option<String>,
}

impl ConnectionConfig {
    pub fn new(
        uri: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            uri: uri.into(),
            username: username.into(),
            password: password.into(),
            database: None,
        }
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Read `NEO4J_URI`, `NEO4J_USERNAME`, `NEO4J_PASSWORD` and the optional
    /// `NEO4J_DATABASE`. Missing variables are left empty.
    pub fn from_env() -> Self {
        let var = |key: &str| std::env::var(key).unwrap_or_default();
        Self {
            uri: var(ENV_URI),
            username: var(ENV_USERNAME),
            password: var(ENV_PASSWORD),
            database: std::env::var(ENV_DATABASE).ok().filter(|db| !db.trim().is_empty()),
        }
    }

    /// Fail with `ConfigIncomplete` unless uri, username and password are all
    /// present and non-blank.
    pub fn validate(&self) -> GraphEdaResult<()> {
        let missing: Vec<String> = [
            ("uri", &self.uri),
            ("username", &self.username),
            ("password", &self.password),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field.to_string())
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(GraphEdaError::ConfigIncomplete { missing })
        }
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("uri", &self.uri)
            .field("username", &self.username)
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}

/// Tuning knobs for the engine. Every field has a default, so an empty
/// TOML document is a valid config.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Budget for a single analysis query.
    pub query_timeout_secs: u64,
    /// Upper bound on cached results across all keys.
    pub cache_max_entries: u64,
    /// Optional expiry for cached results. `None` keeps them until replaced.
    pub cache_ttl_secs: Option<u64>,
    /// Size of the driver's connection pool.
    pub max_connections: usize,
    /// Rows fetched per round trip.
    pub fetch_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            query_timeout_secs: 30,
            cache_max_entries: 1024,
            cache_ttl_secs: None,
            max_connections: 4,
            fetch_size: 200,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(raw: &str) -> GraphEdaResult<Self> {
        let config: Self = toml::from_str(raw).map_err(|e| GraphEdaError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// The cache must hold at least one entry.
    pub fn validate(&self) -> GraphEdaResult<()> {
        if self.cache_max_entries == 0 {
            return Err(GraphEdaError::Config(
                "cache_max_entries must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> GraphEdaResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| GraphEdaError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&raw)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_config_validates() {
        let config = ConnectionConfig::new("bolt://localhost:7687", "neo4j", "secret");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_incomplete_config_names_missing_fields() {
        let config = ConnectionConfig::new("bolt://localhost:7687", "", "  ");
        match config.validate() {
            Err(GraphEdaError::ConfigIncomplete { missing }) => {
                assert_eq!(missing, vec!["username".to_string(), "password".to_string()]);
            }
            other => panic!("expected ConfigIncomplete, got {:?}", other),
        }
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = ConnectionConfig::new("bolt://db:7687", "neo4j", "hunter2").with_database("movies");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("movies"));
    }

    #[test]
    fn test_engine_config_defaults_from_empty_toml() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.query_timeout(), Duration::from_secs(30));
        assert_eq!(config.cache_ttl(), None);
    }

    #[test]
    fn test_engine_config_partial_toml() {
        let config = EngineConfig::from_toml_str("query_timeout_secs = 5\ncache_ttl_secs = 600\n").unwrap();
        assert_eq!(config.query_timeout_secs, 5);
        assert_eq!(config.cache_ttl(), Some(Duration::from_secs(600)));
        assert_eq!(config.max_connections, 4);
    }

    #[test]
    fn test_engine_config_rejects_zero_cache_capacity() {
        let err = EngineConfig::from_toml_str("cache_max_entries = 0").unwrap_err();
        assert!(matches!(err, GraphEdaError::Config(_)));
        assert!(EngineConfig::from_toml_str("cache_max_entries = 1").is_ok());
    }

    #[test]
    fn test_engine_config_rejects_bad_toml() {
        let err = EngineConfig::from_toml_str("query_timeout_secs = \"soon\"").unwrap_err();
        assert!(matches!(err, GraphEdaError::Config(_)));
    }
}
