//! Sampler configuration.
//!
//! Supports loading configuration from:
//! 1. Configuration files (YAML)
//! 2. Environment variables (with QFLOW_ prefix)
//!
//! Configuration precedence (highest to lowest):
//! 1. Environment variables
//! 2. Configuration file
//! 3. Default values

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Largest statevector width accepted by validation.
const MAX_SUPPORTED_QUBITS: u32 = 30;

/// Settings for a [`DynamicSampler`](crate::DynamicSampler).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Base seed; shot `s` uses `seed + s`. Absent means non-deterministic.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Default number of shots.
    #[serde(default = "default_shots")]
    pub shots: u64,

    /// Qubit limit of the statevector simulator.
    #[serde(default = "default_max_qubits")]
    pub max_qubits: u32,
}

fn default_shots() -> u64 {
    1000
}

fn default_max_qubits() -> u32 {
    qflow_sim::DEFAULT_MAX_QUBITS
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            seed: None,
            shots: default_shots(),
            max_qubits: default_max_qubits(),
        }
    }
}

impl SamplerConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_yaml(&contents)
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: SamplerConfig = serde_yaml_ng::from_str(contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().merge_env()
    }

    /// Load from an optional file, then apply environment overrides.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.merge_env()
    }

    /// Apply `QFLOW_SEED`, `QFLOW_SHOTS` and `QFLOW_MAX_QUBITS`.
    pub fn merge_env(self) -> Result<Self, ConfigError> {
        self.merge_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides read through `lookup`.
    pub fn merge_with<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("QFLOW_SEED") {
            self.seed = Some(parse_var("QFLOW_SEED", &v)?);
        }
        if let Some(v) = lookup("QFLOW_SHOTS") {
            self.shots = parse_var("QFLOW_SHOTS", &v)?;
        }
        if let Some(v) = lookup("QFLOW_MAX_QUBITS") {
            self.max_qubits = parse_var("QFLOW_MAX_QUBITS", &v)?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shots == 0 {
            return Err(ConfigError::ValidationError(
                "shots must be at least 1".into(),
            ));
        }
        if self.max_qubits == 0 || self.max_qubits > MAX_SUPPORTED_QUBITS {
            return Err(ConfigError::ValidationError(format!(
                "max_qubits must be in 1..={MAX_SUPPORTED_QUBITS}, got {}",
                self.max_qubits
            )));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::ValidationError(format!("Invalid value for {key}: {value}")))
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
