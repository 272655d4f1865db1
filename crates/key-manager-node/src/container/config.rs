//! # Node Configuration
//!
//! Unified configuration for the gateway, the key lifecycle, the outbound
//! HTTP clients, storage and logging.
//!
//! Defaults are overlaid with `PK_*` environment variables by
//! [`NodeConfig::apply_env`]. Durations are given in milliseconds.

use pk_01_key_lifecycle::LifecycleConfig;
use pk_02_api_gateway::GatewayConfig;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Complete node configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// HTTP gateway configuration.
    pub gateway: GatewayConfig,
    /// Key lifecycle configuration.
    pub lifecycle: LifecycleConfig,
    /// Central registry client.
    pub registry: HttpClientConfig,
    /// Account directory client.
    pub directory: HttpClientConfig,
    /// Local key store.
    pub storage: StorageConfig,
    /// Logging.
    pub logging: LoggingConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            lifecycle: LifecycleConfig::default(),
            registry: HttpClientConfig::new("http://localhost:8082"),
            directory: HttpClientConfig::new("http://localhost:9091"),
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Outbound HTTP client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpClientConfig {
    /// Base URL, e.g. `http://localhost:8082`.
    pub base_url: String,
    /// Connection establishment timeout.
    pub connect_timeout: Duration,
    /// Whole-request timeout enforced by the client itself.
    pub request_timeout: Duration,
}

impl HttpClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            connect_timeout: Duration::from_secs(2),
            request_timeout: Duration::from_secs(5),
        }
    }
}

/// Key store backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Volatile in-process store.
    #[default]
    Memory,
    /// RocksDB under `data_dir` (requires the `rocksdb` feature).
    RocksDb,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "rocksdb" => Ok(StorageBackend::RocksDb),
            other => Err(ConfigError::InvalidValue {
                var: "PK_STORAGE_BACKEND",
                value: other.to_string(),
            }),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backend selection.
    pub backend: StorageBackend,
    /// Data directory for durable backends.
    pub data_dir: PathBuf,
    /// fsync every write.
    pub sync_writes: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            data_dir: PathBuf::from("./data/keys"),
            sync_writes: true,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `pk_01_key_lifecycle=debug,info`.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable could not be parsed.
    #[error("invalid value {value:?} for {var}")]
    InvalidValue { var: &'static str, value: String },

    /// A client base URL is empty or not http(s).
    #[error("invalid base url for {client}: {url:?}")]
    InvalidBaseUrl { client: &'static str, url: String },

    /// The lifecycle section is inconsistent.
    #[error(transparent)]
    Lifecycle(#[from] pk_01_key_lifecycle::LifecycleConfigError),

    /// The gateway section is inconsistent.
    #[error(transparent)]
    Gateway(#[from] pk_02_api_gateway::ConfigError),
}

fn parse_var<T: FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        var,
        value: value.to_string(),
    })
}

fn parse_millis(var: &'static str, value: &str) -> Result<Duration, ConfigError> {
    parse_var::<u64>(var, value).map(Duration::from_millis)
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var,
            value: value.to_string(),
        }),
    }
}

impl NodeConfig {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Overlay variables returned by `lookup` onto this configuration.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("PK_HTTP_HOST") {
            self.gateway.host = parse_var::<IpAddr>("PK_HTTP_HOST", &v)?;
        }
        if let Some(v) = lookup("PK_HTTP_PORT") {
            self.gateway.port = parse_var("PK_HTTP_PORT", &v)?;
        }
        if let Some(v) = lookup("PK_REQUEST_TIMEOUT_MS") {
            self.gateway.request_timeout = parse_millis("PK_REQUEST_TIMEOUT_MS", &v)?;
        }

        if let Some(v) = lookup("PK_PARTICIPANT_ID") {
            self.lifecycle.participant_id = v;
        }
        if let Some(v) = lookup("PK_INSTITUTION_NAME") {
            self.lifecycle.institution_name = v;
        }

        if let Some(v) = lookup("PK_REGISTRY_URL") {
            self.registry.base_url = v;
        }
        if let Some(v) = lookup("PK_REGISTRY_TIMEOUT_MS") {
            let timeout = parse_millis("PK_REGISTRY_TIMEOUT_MS", &v)?;
            self.registry.request_timeout = timeout;
            self.lifecycle.registry_policy.timeout = timeout;
        }
        if let Some(v) = lookup("PK_REGISTRY_MAX_ATTEMPTS") {
            self.lifecycle.registry_policy.max_attempts =
                parse_var("PK_REGISTRY_MAX_ATTEMPTS", &v)?;
        }

        if let Some(v) = lookup("PK_DIRECTORY_URL") {
            self.directory.base_url = v;
        }
        if let Some(v) = lookup("PK_DIRECTORY_TIMEOUT_MS") {
            let timeout = parse_millis("PK_DIRECTORY_TIMEOUT_MS", &v)?;
            self.directory.request_timeout = timeout;
            self.lifecycle.directory_policy.timeout = timeout;
        }
        if let Some(v) = lookup("PK_DIRECTORY_MAX_ATTEMPTS") {
            self.lifecycle.directory_policy.max_attempts =
                parse_var("PK_DIRECTORY_MAX_ATTEMPTS", &v)?;
        }

        if let Some(v) = lookup("PK_STORAGE_BACKEND") {
            self.storage.backend = v.parse()?;
        }
        if let Some(v) = lookup("PK_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(v);
        }

        if let Some(v) = lookup("PK_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = lookup("PK_LOG_JSON") {
            self.logging.json = parse_bool("PK_LOG_JSON", &v)?;
        }

        Ok(())
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.gateway.validate()?;
        self.lifecycle.validate()?;
        validate_base_url("registry", &self.registry.base_url)?;
        validate_base_url("directory", &self.directory.base_url)?;
        Ok(())
    }
}

fn validate_base_url(client: &'static str, url: &str) -> Result<(), ConfigError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidBaseUrl {
            client,
            url: url.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = NodeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.lifecycle.participant_id, "60701190");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = NodeConfig::default();
        config
            .apply_env(env(&[
                ("PK_HTTP_PORT", "50051"),
                ("PK_REGISTRY_URL", "http://bcb:8082"),
                ("PK_REGISTRY_TIMEOUT_MS", "1500"),
                ("PK_DIRECTORY_MAX_ATTEMPTS", "5"),
                ("PK_STORAGE_BACKEND", "RocksDB"),
                ("PK_DATA_DIR", "/var/lib/pk"),
                ("PK_LOG_JSON", "true"),
            ]))
            .unwrap();

        assert_eq!(config.gateway.port, 50051);
        assert_eq!(config.registry.base_url, "http://bcb:8082");
        assert_eq!(config.registry.request_timeout, Duration::from_millis(1500));
        assert_eq!(
            config.lifecycle.registry_policy.timeout,
            Duration::from_millis(1500)
        );
        assert_eq!(config.lifecycle.directory_policy.max_attempts, 5);
        assert_eq!(config.storage.backend, StorageBackend::RocksDb);
        assert_eq!(config.storage.data_dir, PathBuf::from("/var/lib/pk"));
        assert!(config.logging.json);
    }

    #[test]
    fn test_unparsable_port_rejected() {
        let mut config = NodeConfig::default();
        let err = config
            .apply_env(env(&[("PK_HTTP_PORT", "http")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                var: "PK_HTTP_PORT",
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_backend_rejected() {
        assert!("postgres".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn test_base_url_must_be_http() {
        let mut config = NodeConfig::default();
        config.directory.base_url = "localhost:9091".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBaseUrl {
                client: "directory",
                ..
            })
        ));
    }

    #[test]
    fn test_zero_attempts_fail_validation() {
        let mut config = NodeConfig::default();
        config
            .apply_env(env(&[("PK_REGISTRY_MAX_ATTEMPTS", "0")]))
            .unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Lifecycle(_))));
    }
}
