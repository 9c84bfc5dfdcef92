use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::defaults::{
    clamp_sample_fraction, default_max_passes, default_min_passes, default_sample_fraction,
};
use crate::labeling::RunPolicy;

/// Errors that may occur while loading or saving session settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No config directory could be resolved.
    #[error("No suitable directory available for configuration")]
    NoConfigDir,
    /// Failed to create the config directory.
    #[error("Unable to create config directory {path}: {source}")]
    CreateDir {
        /// Directory path that failed to create.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// Failed to read a config file.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// Failed to write a config file.
    #[error("Failed to write {path}: {source}")]
    Write {
        /// Path that failed to write.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// Failed to parse TOML config.
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        /// TOML file path.
        path: PathBuf,
        /// TOML parse error.
        source: toml::de::Error,
    },
    /// Failed to serialize config to TOML.
    #[error("Failed to serialize config to TOML at {path}: {source}")]
    SerializeToml {
        /// TOML file path.
        path: PathBuf,
        /// TOML serialization error.
        source: toml::ser::Error,
    },
}

/// Defaults applied to labeling runs unless overridden on the command line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Fraction of hand-labeled rows re-checked blind.
    #[serde(default = "default_sample_fraction")]
    pub sample_fraction: f64,
    /// Passes that always run before a perfect check may stop the loop.
    #[serde(default = "default_min_passes")]
    pub min_passes: u32,
    /// Upper bound on labeling passes.
    #[serde(default = "default_max_passes")]
    pub max_passes: u32,
    /// Feature columns shown to the operator; empty means every non-label column.
    #[serde(default)]
    pub feature_columns: Vec<String>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            sample_fraction: default_sample_fraction(),
            min_passes: default_min_passes(),
            max_passes: default_max_passes(),
            feature_columns: Vec::new(),
        }
    }
}

impl SessionSettings {
    /// Clamp values into their usable ranges.
    pub fn normalized(mut self) -> Self {
        self.sample_fraction = clamp_sample_fraction(self.sample_fraction);
        let policy = self.run_policy();
        self.min_passes = policy.min_passes;
        self.max_passes = policy.max_passes;
        self.feature_columns.retain(|column| !column.trim().is_empty());
        self
    }

    pub fn run_policy(&self) -> RunPolicy {
        RunPolicy::new(self.min_passes, self.max_passes)
    }
}
