//! Serializable backtest configuration (TOML file form).
//!
//! A run is fully described by a `[signal]` section and a `[backtest]`
//! section; both fall back to defaults field by field. The configuration
//! hashes to a deterministic run id so identical runs are identifiable
//! from their artifacts.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use insiderlab_core::config::{ConfigError, EvalConfig, SignalConfig};

/// Complete configuration for a single backtest run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    pub signal: SignalConfig,
    pub backtest: EvalConfig,
}

impl BacktestConfig {
    /// Load from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigFileError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Parse from a TOML string.
    pub fn from_toml(text: &str) -> Result<Self, ConfigFileError> {
        Ok(toml::from_str(text)?)
    }

    /// Validate both halves before any computation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.signal.validate()?;
        self.backtest.validate()
    }

    /// Deterministic content hash of this configuration.
    ///
    /// Two runs with identical configs share a run id, which makes report
    /// artifacts comparable and re-runs identifiable.
    pub fn run_id(&self) -> String {
        let json = serde_json::to_string(self).expect("BacktestConfig serialization failed");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}

/// Errors loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}
