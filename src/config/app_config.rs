use serde::Deserialize;

use crate::infrastructure::member::{
    KeyStrategy, DEFAULT_ITERATIONS, DEFAULT_LANES, DEFAULT_MAX_ATTEMPTS, DEFAULT_MEMORY_KIB,
};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
    pub keys: KeysConfig,
    pub password: PasswordConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Where members are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Required for the postgres backend
    pub database_url: Option<String>,
    pub max_connections: u32,
}

/// Member ID generation; one strategy per running process
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeysConfig {
    pub strategy: KeyStrategy,
    pub max_attempts: u32,
}

/// Argon2id cost for member password hashes
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub lanes: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            database_url: None,
            max_connections: 5,
        }
    }
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            strategy: KeyStrategy::default(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: DEFAULT_MEMORY_KIB,
            iterations: DEFAULT_ITERATIONS,
            lanes: DEFAULT_LANES,
        }
    }
}

impl AppConfig {
    /// Load from `config/default`, `config/local`, then `APP__*` variables
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.keys.strategy, KeyStrategy::Verified);
        assert_eq!(config.keys.max_attempts, 3);
        assert_eq!(config.password.memory_kib, 19 * 1024);
        assert_eq!(config.password.iterations, 2);
        assert_eq!(config.password.lanes, 1);
    }

    #[test]
    fn test_partial_source_keeps_defaults() {
        let source = config::Config::builder()
            .add_source(config::File::from_str(
                r#"{ "storage": { "backend": "postgres", "database_url": "postgres://localhost/members" },
                     "keys": { "strategy": "random" } }"#,
                config::FileFormat::Json,
            ))
            .build()
            .unwrap();

        let config: AppConfig = source.try_deserialize().unwrap();

        assert_eq!(config.storage.backend, StorageBackend::Postgres);
        assert_eq!(
            config.storage.database_url.as_deref(),
            Some("postgres://localhost/members")
        );
        assert_eq!(config.storage.max_connections, 5);
        assert_eq!(config.keys.strategy, KeyStrategy::Random);
        assert_eq!(config.keys.max_attempts, 3);
        assert_eq!(config.server.port, 8080);
    }
}
