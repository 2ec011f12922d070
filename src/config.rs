//! Dashboard configuration.
//!
//! Every section is optional; a missing file section falls back to the
//! defaults below.

use crate::catalog::Catalog;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Configuration loaded from a TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// HTTP listener configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Location of the results files.
    #[serde(default)]
    pub data: DataConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Display names and control options.
    #[serde(default)]
    pub catalog: Catalog,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.catalog.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address the dashboard listens on.
    #[serde(default = "ServerConfig::default_listen")]
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: Self::default_listen(),
        }
    }
}

impl ServerConfig {
    fn default_listen() -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], 8050))
    }
}

/// Results files location.
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// Directory holding the CSV files.
    #[serde(default = "DataConfig::default_dir")]
    pub dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: Self::default_dir(),
        }
    }
}

impl DataConfig {
    fn default_dir() -> PathBuf {
        PathBuf::from("data")
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Log format: "pretty", "json", or "compact".
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            format: LogFormat::default(),
        }
    }
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// The configuration printed by `print-config`.
pub const DEFAULT_CONFIG: &str = r#"# Syrup Data Visualizer configuration

[server]
# Address the dashboard listens on
listen = "127.0.0.1:8050"

[data]
# Directory holding the results files:
#   <encoding>_<group>.csv
#   comparison_<base category>_<category>.csv
#   <setup>_<solver>.csv
dir = "data"

[logging]
# Log level (overridden by RUST_LOG)
level = "info"
# Log format: "pretty", "json", or "compact"
format = "pretty"

# Display names and options of the dashboard controls. Any list given here
# replaces the built-in one.
#
# [catalog]
# title = "Syrup Data Visualizer"
#
# [[catalog.setups]]
# label = "Best encoding"
# value = "best_encoding"
# selected = true
"#;
