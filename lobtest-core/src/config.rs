//! Backtest configuration — every knob in one serializable object.
//!
//! The same object parameterizes both the signal generator and the
//! execution simulator, and hashes to a deterministic run id: two runs
//! with identical configs over identical data report identical results.

use crate::signal::SignalConfig;
use crate::sim::SimConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

fn default_short_window() -> usize {
    15_000
}

fn default_long_window() -> usize {
    60_000
}

// Observed arrival of the source feed over its latency budget.
fn default_latency_offset() -> usize {
    35
}

// One basis point per trade.
fn default_fee_rate() -> f64 {
    1e-4
}

fn default_capital() -> f64 {
    100.0
}

/// Configuration for a single backtest run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BacktestConfig {
    /// Short SMA window, in observations.
    #[serde(default = "default_short_window")]
    pub short_window: usize,
    /// Long SMA window, in observations.
    #[serde(default = "default_long_window")]
    pub long_window: usize,
    /// Forward shift for reference prices, in observations.
    #[serde(default = "default_latency_offset")]
    pub latency_offset: usize,
    /// Proportional fee per trade, on traded notional.
    #[serde(default = "default_fee_rate")]
    pub fee_rate: f64,
    /// Account total at the start of the run.
    #[serde(default = "default_capital")]
    pub initial_total: f64,
    /// Base capital: return denominator and bootstrap sizing anchor.
    #[serde(default = "default_capital")]
    pub base: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            short_window: default_short_window(),
            long_window: default_long_window(),
            latency_offset: default_latency_offset(),
            fee_rate: default_fee_rate(),
            initial_total: default_capital(),
            base: default_capital(),
        }
    }
}

impl BacktestConfig {
    /// Load from a TOML file. Missing keys take their defaults.
    pub fn from_toml_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.short_window == 0 {
            return Err(ConfigError::ShortWindowZero);
        }
        if self.long_window <= self.short_window {
            return Err(ConfigError::WindowOrder {
                short: self.short_window,
                long: self.long_window,
            });
        }
        if !(0.0..1.0).contains(&self.fee_rate) {
            return Err(ConfigError::FeeRange(self.fee_rate));
        }
        if self.base <= 0.0 || !self.base.is_finite() {
            return Err(ConfigError::NonPositiveBase(self.base));
        }
        if self.initial_total <= 0.0 || !self.initial_total.is_finite() {
            return Err(ConfigError::NonPositiveTotal(self.initial_total));
        }
        Ok(())
    }

    /// Deterministic content hash of this configuration.
    ///
    /// Two runs with identical configs share a run id and can share cached
    /// results.
    pub fn run_id(&self) -> String {
        let json = serde_json::to_string(self).expect("BacktestConfig serialization failed");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }

    pub fn signal(&self) -> SignalConfig {
        SignalConfig {
            short_window: self.short_window,
            long_window: self.long_window,
            latency_offset: self.latency_offset,
        }
    }

    pub fn sim(&self) -> SimConfig {
        SimConfig {
            initial_total: self.initial_total,
            base: self.base,
            fee_rate: self.fee_rate,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid TOML in {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("short_window must be >= 1")]
    ShortWindowZero,
    #[error("long_window ({long}) must be greater than short_window ({short})")]
    WindowOrder { short: usize, long: usize },
    #[error("fee_rate ({0}) must be in [0, 1)")]
    FeeRange(f64),
    #[error("base capital ({0}) must be positive and finite")]
    NonPositiveBase(f64),
    #[error("initial_total ({0}) must be positive and finite")]
    NonPositiveTotal(f64),
}
