//! Configuration loading for Visage.
//!
//! Layered precedence: built-in defaults -> config file
//! (~/.config/visage/config.toml) -> environment variables (VISAGE_*).
//! CLI flags are applied by the caller after `Settings::load` returns.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;

/// Distance metric an index is created with.
///
/// Lower distance always means more similar; the metric decides how the
/// backend computes that number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Euclidean distance
    #[default]
    L2,
    /// 1 - cosine similarity
    Cosine,
    /// 1 - inner product
    Ip,
}

impl DistanceMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceMetric::L2 => "l2",
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::Ip => "ip",
        }
    }
}

/// Physical layout of a vector index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageLayout {
    /// Exact scan over all stored vectors
    #[default]
    Flat,
    /// Approximate nearest neighbor via HNSW (requires the `hnsw` feature
    /// of visage-vector)
    Hnsw,
}

impl StorageLayout {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageLayout::Flat => "flat",
            StorageLayout::Hnsw => "hnsw",
        }
    }
}

/// Main application settings.
///
/// Constructed once at startup and passed by reference into every component
/// that needs it; never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Path to the vector index storage directory
    #[serde(default = "default_index_path")]
    pub index_path: String,

    /// Path to the image metadata storage directory
    #[serde(default = "default_metadata_path")]
    pub metadata_path: String,

    /// Name of the vector index
    #[serde(default = "default_index_name")]
    pub index_name: String,

    /// Embedding dimension the index is created with
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Distance metric for the vector index
    #[serde(default)]
    pub metric: DistanceMetric,

    /// Storage layout for the vector index
    #[serde(default)]
    pub layout: StorageLayout,

    /// HTTP server host
    #[serde(default = "default_http_host")]
    pub http_host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_index_path() -> String {
    ProjectDirs::from("", "", "visage")
        .map(|p| p.data_local_dir().join("vector-index"))
        .unwrap_or_else(|| PathBuf::from("./vector-index"))
        .to_string_lossy()
        .to_string()
}

fn default_metadata_path() -> String {
    ProjectDirs::from("", "", "visage")
        .map(|p| p.data_local_dir().join("metadata"))
        .unwrap_or_else(|| PathBuf::from("./metadata"))
        .to_string_lossy()
        .to_string()
}

fn default_index_name() -> String {
    "image_vectors".to_string()
}

fn default_dimension() -> usize {
    512
}

fn default_http_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            index_path: default_index_path(),
            metadata_path: default_metadata_path(),
            index_name: default_index_name(),
            dimension: default_dimension(),
            metric: DistanceMetric::default(),
            layout: StorageLayout::default(),
            http_host: default_http_host(),
            http_port: default_http_port(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/visage/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (VISAGE_*)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, ConfigError> {
        let config_dir = ProjectDirs::from("", "", "visage")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("index_path", default_index_path())
            .map_err(|e| ConfigError::Load(e.to_string()))?
            .set_default("metadata_path", default_metadata_path())
            .map_err(|e| ConfigError::Load(e.to_string()))?
            .set_default("index_name", default_index_name())
            .map_err(|e| ConfigError::Load(e.to_string()))?
            .set_default("dimension", default_dimension() as i64)
            .map_err(|e| ConfigError::Load(e.to_string()))?
            .set_default("metric", "l2")
            .map_err(|e| ConfigError::Load(e.to_string()))?
            .set_default("layout", "flat")
            .map_err(|e| ConfigError::Load(e.to_string()))?
            .set_default("http_host", default_http_host())
            .map_err(|e| ConfigError::Load(e.to_string()))?
            .set_default("http_port", default_http_port() as i64)
            .map_err(|e| ConfigError::Load(e.to_string()))?
            .set_default("log_level", default_log_level())
            .map_err(|e| ConfigError::Load(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("VISAGE")
                .separator("_")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| ConfigError::Load(e.to_string()))?;

        let settings: Settings = config
            .try_deserialize()
            .map_err(|e| ConfigError::Load(e.to_string()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Validate configuration values, failing fast on anything unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dimension == 0 {
            return Err(ConfigError::Invalid("dimension must be >= 1".to_string()));
        }
        if self.index_name.is_empty() {
            return Err(ConfigError::Invalid(
                "index_name must not be empty".to_string(),
            ));
        }
        if self.http_port == 0 {
            return Err(ConfigError::Invalid("http_port must be > 0".to_string()));
        }
        Ok(())
    }

    /// Get the socket address for the HTTP server
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.http_port, 8000);
        assert_eq!(settings.dimension, 512);
        assert_eq!(settings.index_name, "image_vectors");
        assert_eq!(settings.metric, DistanceMetric::L2);
        assert_eq!(settings.layout, StorageLayout::Flat);
    }

    #[test]
    fn test_http_addr() {
        let settings = Settings::default();
        assert_eq!(settings.http_addr(), "0.0.0.0:8000");
    }

    #[test]
    fn test_validate_rejects_zero_dimension() {
        let settings = Settings {
            dimension: 0,
            ..Settings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_validate_rejects_empty_index_name() {
        let settings = Settings {
            index_name: String::new(),
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_metric_serde_names() {
        assert_eq!(
            serde_json::from_str::<DistanceMetric>("\"cosine\"").unwrap(),
            DistanceMetric::Cosine
        );
        assert_eq!(DistanceMetric::L2.as_str(), "l2");
        assert_eq!(StorageLayout::Hnsw.as_str(), "hnsw");
    }
}
