//! Immutable run configuration for signal building and evaluation.
//!
//! Both structs are plain values passed in at call time — there is no
//! ambient/global configuration anywhere in the engine. Validation is
//! explicit and runs before any computation is attempted.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How the builder emits signals over consecutive qualifying dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalEmission {
    /// Emit one signal per candidate date, flagged with the threshold
    /// predicate. The output is a point-in-time series; de-duplication of
    /// consecutive qualifying days is left to the consumer.
    EveryQualifyingDay,
    /// Emit only on the not-qualified -> qualified transition, judged
    /// against the same trailing window with the current date's filings
    /// excluded.
    FirstCross,
}

/// Which transaction sides feed the window aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SidePolicy {
    /// Acquisitions only; dispositions are ignored entirely.
    AcquisitionsOnly,
    /// Aggregate USD nets dispositions against acquisitions. The distinct
    /// owner count still counts acquiring owners only.
    NetOfDispositions,
}

/// Configuration for the Signal Builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Trailing window length in calendar days. The window for as-of date
    /// `d` is `[d - window_days, d]`, inclusive on both ends.
    pub window_days: u32,
    /// Minimum distinct qualifying-owner count (inclusive).
    pub min_owners: usize,
    /// Minimum aggregate qualifying USD (inclusive).
    pub min_usd: f64,
    pub emission: SignalEmission,
    pub side_policy: SidePolicy,
    /// Drop Rule 10b5-1 scheduled-plan transactions before aggregation.
    pub exclude_plan_sales: bool,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            window_days: 14,
            min_owners: 3,
            min_usd: 300_000.0,
            emission: SignalEmission::EveryQualifyingDay,
            side_policy: SidePolicy::AcquisitionsOnly,
            exclude_plan_sales: true,
        }
    }
}

impl SignalConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_days == 0 {
            return Err(ConfigError::EmptyWindow);
        }
        if self.min_usd < 0.0 || self.min_usd.is_nan() {
            return Err(ConfigError::NegativeMinUsd(self.min_usd));
        }
        Ok(())
    }
}

/// Configuration for the Backtest Evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Holding horizons in trading sessions. Duplicates are collapsed.
    pub horizons: Vec<u32>,
    /// Round-trip transaction cost in basis points, charged once per entry
    /// and once per exit.
    pub cost_bps: f64,
    /// How many calendar days past the as-of date the entry session may
    /// fall before the pair is skipped (covers weekends and holidays).
    /// Must be at least one day.
    pub entry_tolerance_days: u32,
    /// Append a pooled row aggregating all horizons.
    pub include_overall: bool,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            horizons: vec![5, 21, 63],
            cost_bps: 20.0,
            entry_tolerance_days: 5,
            include_overall: false,
        }
    }
}

impl EvalConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.horizons.is_empty() {
            return Err(ConfigError::NoHorizons);
        }
        if let Some(&h) = self.horizons.iter().find(|&&h| h == 0) {
            return Err(ConfigError::NonPositiveHorizon(h));
        }
        if self.cost_bps < 0.0 || self.cost_bps.is_nan() {
            return Err(ConfigError::NegativeCost(self.cost_bps));
        }
        if self.entry_tolerance_days == 0 {
            return Err(ConfigError::ZeroTolerance);
        }
        Ok(())
    }
}

/// A configuration that can produce no meaningful report. Fatal; surfaced
/// before any computation is attempted.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("trailing window must be at least one day")]
    EmptyWindow,

    #[error("minimum aggregate USD cannot be negative (got {0})")]
    NegativeMinUsd(f64),

    #[error("horizon list is empty")]
    NoHorizons,

    #[error("horizons must be positive (got {0})")]
    NonPositiveHorizon(u32),

    #[error("transaction cost cannot be negative (got {0} bps)")]
    NegativeCost(f64),

    #[error("entry tolerance must be at least one day")]
    ZeroTolerance,

    #[error("no signals to evaluate")]
    NoSignals,
}
