use std::path::Path;
use serde::{Deserialize, Serialize};

use crate::{
    audio::AnalysisConfig,
    error::{ConfigError, Result},
};

/// Main configuration for vibe-bpm
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tempo analysis settings
    pub analysis: AnalysisConfig,

    /// Batch processing settings
    pub batch: BatchConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.analysis.validate().map_err(|details| ConfigError::InvalidValue {
            key: "analysis".to_string(),
            value: details,
        })?;
        self.batch.validate()?;
        Ok(())
    }
}

/// Batch processing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Tracks started together before waiting for all of them to finish
    pub batch_size: usize,

    /// Upper bound on tracks decoded and analyzed at the same time
    pub max_workers: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 7,
            max_workers: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "batch.batch_size".to_string(),
                value: self.batch_size.to_string()
            }.into());
        }

        if self.max_workers == 0 {
            return Err(ConfigError::InvalidValue {
                key: "batch.max_workers".to_string(),
                value: self.max_workers.to_string()
            }.into());
        }

        Ok(())
    }
}
