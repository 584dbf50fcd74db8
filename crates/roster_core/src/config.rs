//! Configuration for Roster tools
//!
//! Everything has a default, so an empty or missing file is a valid
//! configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Result, RosterError};

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterConfig {
    /// State update feed settings
    #[serde(default)]
    pub feed: FeedConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// State update feed configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Capacity of the channel recorded updates are replayed through
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

fn default_channel_capacity() -> usize {
    64
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Level for roster crates (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON log lines instead of the compact format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Load configuration from a TOML file
pub async fn load_config(path: &Path) -> Result<RosterConfig> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| RosterError::ConfigurationError {
            config_path: path.display().to_string(),
            field: "file".to_string(),
            expected: "readable TOML file".to_string(),
            cause: Box::new(e),
        })?;

    let config: RosterConfig =
        toml::from_str(&content).map_err(|e| RosterError::ConfigurationError {
            config_path: path.display().to_string(),
            field: "content".to_string(),
            expected: "valid TOML configuration".to_string(),
            cause: Box::new(e),
        })?;

    if config.feed.channel_capacity == 0 {
        return Err(RosterError::ConfigurationError {
            config_path: path.display().to_string(),
            field: "feed.channel_capacity".to_string(),
            expected: "a capacity greater than zero".to_string(),
            cause: "channel capacity must be positive".into(),
        });
    }

    Ok(config)
}

/// Save configuration to a TOML file, creating parent directories
pub async fn save_config(config: &RosterConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| RosterError::io(parent, e))?;
    }

    let content =
        toml::to_string_pretty(config).map_err(|e| RosterError::ConfigurationError {
            config_path: path.display().to_string(),
            field: "serialization".to_string(),
            expected: "serializable configuration".to_string(),
            cause: Box::new(e),
        })?;

    tokio::fs::write(path, content)
        .await
        .map_err(|e| RosterError::io(path, e))?;

    Ok(())
}

/// Standard configuration locations, most specific first
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("roster.toml")];

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("roster").join("config.toml"));
    }

    paths
}

/// Load the first configuration found in the standard locations
pub async fn load_config_from_standard_locations() -> Result<RosterConfig> {
    for path in config_paths() {
        if path.exists() {
            return load_config(&path).await;
        }
    }

    // No config found, return default
    Ok(RosterConfig::default())
}
