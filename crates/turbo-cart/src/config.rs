//! Cart configuration.
//!
//! Loaded from TOML. Every field has a default, so an empty file (or no file
//! at all) yields a working configuration against a local catalog API.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storage key the cart snapshot lives under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "@RocketShoes:cart";

/// Errors raised while reading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartConfig {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub log: LogConfig,
}

impl CartConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from `path`, falling back to defaults if it does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}

/// Catalog and stock API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL that `/products/{id}` and `/stock/{id}` are resolved against.
    pub base_url: String,
    /// Sent as `Authorization: Bearer <token>` when set.
    pub bearer_token: Option<String>,
    /// Upper bound for a single catalog or stock request.
    pub timeout_ms: u64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3333".to_string(),
            bearer_token: None,
            timeout_ms: 5_000,
        }
    }
}

/// Snapshot storage settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Key of the cart snapshot.
    pub key: String,
    /// Directory of a file-backed store. In-memory when unset.
    pub path: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            key: DEFAULT_STORAGE_KEY.to_string(),
            path: None,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines (development).
    #[default]
    Human,
    /// One JSON object per event (log aggregation).
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "turbo_cart=info".to_string(),
            format: LogFormat::Human,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = CartConfig::from_toml_str("").unwrap();
        assert_eq!(config, CartConfig::default());
        assert_eq!(config.storage.key, DEFAULT_STORAGE_KEY);
        assert_eq!(config.api.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_partial_config_overrides() {
        let config = CartConfig::from_toml_str(
            r#"
            [api]
            base_url = "https://api.rocketshoes.dev"
            timeout_ms = 750

            [storage]
            path = "/tmp/turbo-cart"

            [log]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "https://api.rocketshoes.dev");
        assert_eq!(config.api.timeout(), Duration::from_millis(750));
        assert_eq!(config.api.bearer_token, None);
        assert_eq!(config.storage.key, DEFAULT_STORAGE_KEY);
        assert_eq!(config.storage.path, Some(PathBuf::from("/tmp/turbo-cart")));
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.log.filter, "turbo_cart=info");
    }

    #[test]
    fn test_invalid_config_is_parse_error() {
        let result = CartConfig::from_toml_str("[api]\ntimeout_ms = \"soon\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = CartConfig::load(dir.path().join("cart.toml")).unwrap();
        assert_eq!(config, CartConfig::default());
    }

    #[test]
    fn test_load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.toml");
        std::fs::write(&path, "[storage]\nkey = \"cart:session\"\n").unwrap();

        let config = CartConfig::load(&path).unwrap();
        assert_eq!(config.storage.key, "cart:session");
    }
}
