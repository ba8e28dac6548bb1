//! Store configuration.
//!
//! This module defines the configuration options for the memory record
//! store, allowing customization of the storage namespace, the query-cache
//! freshness window, and the durable backend.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Default freshness window for the per-person query cache.
const DEFAULT_CACHE_FRESHNESS: Duration = Duration::from_secs(5 * 60);

/// Memory record store configuration
///
/// All fields have serde defaults so a partial configuration document
/// deserializes into a usable value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreConfig {
    /// Logical name the durable payload is stored under
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// How long cached query results stay eligible to be served.
    /// A zero window disables the cache entirely.
    #[serde(default = "default_cache_freshness", with = "duration_ms")]
    pub cache_freshness: Duration,

    /// Durable backend selection
    #[serde(default)]
    pub backend: BackendConfig,
}

/// Supported durable backend types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum BackendConfig {
    /// Local file system, one JSON file per namespace
    Local(LocalFileSystemConfig),

    /// Process-local memory, lost on exit. Intended for tests and previews.
    InMemory,
}

/// Local file system backend configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocalFileSystemConfig {
    /// Base directory path
    pub base_dir: String,

    /// File extension for stored data
    pub file_extension: String,
}

fn default_namespace() -> String {
    "memories".to_string()
}

fn default_cache_freshness() -> Duration {
    DEFAULT_CACHE_FRESHNESS
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            cache_freshness: default_cache_freshness(),
            backend: BackendConfig::default(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::Local(LocalFileSystemConfig::default())
    }
}

impl Default for LocalFileSystemConfig {
    fn default() -> Self {
        Self {
            base_dir: std::env::temp_dir()
                .join("keepsake")
                .to_string_lossy()
                .to_string(),
            file_extension: "json".to_string(),
        }
    }
}

impl StoreConfig {
    /// Validates the configuration values
    ///
    /// # Validation Rules
    ///
    /// - `namespace` must not be empty
    /// - For the `Local` backend, `base_dir` must not be empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.namespace.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "namespace".to_string(),
                message: "Namespace cannot be empty".to_string(),
            });
        }

        if let BackendConfig::Local(ref config) = self.backend {
            if config.base_dir.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "base_dir".to_string(),
                    message: "Base directory cannot be empty".to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Errors raised by configuration validation
#[derive(Debug, Error, Clone)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

pub mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
