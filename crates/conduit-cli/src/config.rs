//! Configuration management for the CLI
//!
//! This module handles loading configuration from:
//! - Default values
//! - Configuration files (TOML/YAML/JSON)
//!
//! The `connection` table becomes the adapter's static connection options
//! and is merged into every request.

use crate::error::{Error, Result};
use conduit_core::http::TransportOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// User-Agent sent unless the request sets one
    pub user_agent: Option<String>,

    /// Static transport options applied to every request
    pub connection: TransportOptions,

    /// Logging settings
    pub logging: LoggingSettings,
}

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level used when no verbosity flag is given
    pub level: Option<String>,

    /// Log format (compact, full, json)
    pub format: Option<String>,

    /// Include thread IDs
    pub thread_ids: bool,
}

/// Supported configuration file formats, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Toml,
    Yaml,
    Json,
}

impl FileFormat {
    fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => Some(Self::Toml),
            Some("yaml") | Some("yml") => Some(Self::Yaml),
            Some("json") => Some(Self::Json),
            _ => None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let format = FileFormat::from_path(path).ok_or_else(|| Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: "TOML, YAML or JSON".to_string(),
        })?;
        let content = std::fs::read_to_string(path)?;

        let config: Config = match format {
            FileFormat::Toml => toml::from_str(&content)?,
            FileFormat::Yaml => serde_yaml::from_str(&content)?,
            FileFormat::Json => serde_json::from_str(&content)?,
        };

        tracing::debug!(path = %path.display(), "Loaded configuration file");
        Ok(config)
    }

    /// Load configuration from the first default location that exists
    pub fn load() -> Result<Self> {
        match Self::default_config_paths().into_iter().find(|p| p.exists()) {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        if let Some(path) = file {
            Self::from_file(path)
        } else {
            Self::load()
        }
    }

    /// Get default configuration file paths to check, in order
    pub fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(".conduit.toml"),
            PathBuf::from(".conduit.yaml"),
            PathBuf::from(".conduit.json"),
        ];

        if let Some(config_dir) = dirs::config_dir() {
            let conduit_dir = config_dir.join("conduit");
            paths.push(conduit_dir.join("config.toml"));
            paths.push(conduit_dir.join("config.yaml"));
            paths.push(conduit_dir.join("config.json"));
        }

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".conduit.toml"));
        }

        paths
    }
}
