//! Configuration module
//!
//! Handles loading and managing harness configuration.

mod file;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::utils::LogLevel;

pub use file::{find_config, CONFIG_LOCATIONS};

/// Harness configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Print the console report
    pub console: bool,

    /// Write the structured report to this file
    pub json: Option<PathBuf>,

    /// Log level of the binary's subscriber
    pub log_level: String,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            console: true,
            json: None,
            log_level: "warn".to_string(),
        }
    }
}

impl HarnessConfig {
    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = if file::is_yaml_file(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the first standard location, or defaults
    pub fn load_default() -> Result<Self> {
        match find_config() {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if file::is_yaml_file(path) {
            serde_yaml::to_string(self).context("Failed to serialize config")?
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize config")?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.log_level.parse::<LogLevel>()?;
        if let Some(json) = &self.json {
            if json.as_os_str().is_empty() {
                anyhow::bail!("JSON output path must not be empty");
            }
        }
        Ok(())
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level.parse().unwrap_or_default()
    }
}
