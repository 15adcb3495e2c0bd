//! # Hearth Core Configuration
//!
//! The host configuration file: message size limit, default log level and the
//! ordered list of plugins to load with their settings.
//!
//! Files are read as JSON, or as YAML / TOML when the `yaml-config` /
//! `toml-config` features are enabled (both are on by default). The format is
//! picked from the file extension.
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::kernel::constants;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown or unsupported config format for path: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("Failed to parse {format:?} config: {message}")]
    Parse { format: ConfigFormat, message: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }
}

/// One plugin the host should load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginEntry {
    pub id: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Passed through to the plugin untouched
    #[serde(default)]
    pub settings: Value,
}

impl PluginEntry {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            enabled: true,
            settings: Value::Null,
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_max_message_bytes() -> usize {
    constants::DEFAULT_MAX_MESSAGE_BYTES
}

fn default_log_level() -> String {
    constants::DEFAULT_LOG_LEVEL.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostConfig {
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Load order
    #[serde(default)]
    pub plugins: Vec<PluginEntry>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            max_message_bytes: default_max_message_bytes(),
            log_level: default_log_level(),
            plugins: Vec::new(),
        }
    }
}

impl HostConfig {
    /// Read and validate a config file, choosing the format from its extension.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let format = ConfigFormat::from_path(path).ok_or_else(|| ConfigError::UnsupportedFormat {
            path: path.to_path_buf(),
        })?;
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loading {:?} config from {}", format, path.display());
        Self::parse(&data, format)
    }

    /// Parse and validate config text in the given format
    pub fn parse(data: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        let parse_err = |message: String| ConfigError::Parse { format, message };
        let config: HostConfig = match format {
            ConfigFormat::Json => serde_json::from_str(data).map_err(|e| parse_err(e.to_string()))?,
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::from_str(data).map_err(|e| parse_err(e.to_string()))?,
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(data).map_err(|e| parse_err(e.to_string()))?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_message_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_message_bytes must be greater than zero".to_string(),
            ));
        }
        if log::LevelFilter::from_str(&self.log_level).is_err() {
            return Err(ConfigError::Invalid(format!(
                "unknown log level '{}'",
                self.log_level
            )));
        }
        let mut seen = HashSet::new();
        for entry in &self.plugins {
            if entry.id.is_empty() {
                return Err(ConfigError::Invalid("plugin entry with empty id".to_string()));
            }
            if !seen.insert(entry.id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "plugin '{}' listed more than once",
                    entry.id
                )));
            }
        }
        Ok(())
    }

    /// Enabled plugin entries in load order
    pub fn enabled_plugins(&self) -> impl Iterator<Item = &PluginEntry> {
        self.plugins.iter().filter(|p| p.enabled)
    }

    pub fn plugin(&self, id: &str) -> Option<&PluginEntry> {
        self.plugins.iter().find(|p| p.id == id)
    }
}
