//! Backtest evaluation — price alignment, horizon returns, aggregation.
//!
//! Each (signal, horizon) pair resolves an entry session (first tradable
//! session on or after the as-of date, within a small calendar tolerance)
//! and an exit session (entry plus `horizon` tradable sessions), then
//! folds the cost-adjusted return into that horizon's bucket. Missing
//! price data degrades the single pair to a skip; it never fails the run.
//!
//! Signals are independent, so evaluation fans out with rayon and the
//! per-worker partial buckets merge exactly in a single-threaded reduce.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use insiderlab_core::config::{ConfigError, EvalConfig};
use insiderlab_core::data::{PriceProvider, PriceSeries};
use insiderlab_core::domain::Signal;

use crate::cost::CostModel;
use crate::stats::{ReportRow, RunningStats};

/// Outcome of pricing one (signal, horizon) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HorizonOutcome {
    Evaluated {
        entry_price: f64,
        exit_price: f64,
        raw_return: f64,
        net_return: f64,
    },
    /// Entry or exit session unavailable; excluded from aggregation.
    SkippedMissingPrice,
}

/// A single signal's result at one holding horizon. Recomputed each run,
/// never persisted independently of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonReturn {
    pub symbol: String,
    pub as_of: NaiveDate,
    /// Holding period in trading sessions.
    pub horizon: u32,
    pub outcome: HorizonOutcome,
}

/// Aggregated evaluation output: one row per horizon, in configuration
/// order, plus the pooled row when configured.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub rows: Vec<ReportRow>,
    pub signal_count: usize,
    /// Total evaluated (signal, horizon) pairs across all rows.
    pub evaluated: usize,
    /// Total skipped pairs across all rows.
    pub skipped: usize,
}

/// Score a signal collection against a price provider.
///
/// The caller decides which signals are actionable (typically the
/// qualifying subset). An empty collection is a configuration error —
/// the quiet-period case is handled upstream by the pipeline, which
/// produces an empty-but-valid report without invoking the evaluator.
pub fn evaluate(
    signals: &[Signal],
    provider: &dyn PriceProvider,
    config: &EvalConfig,
) -> Result<Evaluation, ConfigError> {
    config.validate()?;
    if signals.is_empty() {
        return Err(ConfigError::NoSignals);
    }

    let horizons = dedup_horizons(&config.horizons);
    let cost = CostModel::new(config.cost_bps);
    let tolerance = config.entry_tolerance_days;

    let buckets = signals
        .par_iter()
        .fold(
            || empty_buckets(&horizons),
            |mut acc, signal| {
                let series = provider.series(&signal.symbol);
                for &horizon in &horizons {
                    let result = evaluate_signal(signal, series, horizon, &cost, tolerance);
                    let bucket = acc.entry(horizon).or_default();
                    match result.outcome {
                        HorizonOutcome::Evaluated { net_return, .. } => bucket.record(net_return),
                        HorizonOutcome::SkippedMissingPrice => bucket.record_skip(),
                    }
                }
                acc
            },
        )
        .reduce(|| empty_buckets(&horizons), merge_buckets);

    Ok(finalize(buckets, &horizons, config, signals.len()))
}

/// Zero-sample rows for a configuration — the quiet-period report shape.
pub fn empty_evaluation(config: &EvalConfig) -> Evaluation {
    let horizons = dedup_horizons(&config.horizons);
    finalize(empty_buckets(&horizons), &horizons, config, 0)
}

/// Price one (signal, horizon) pair.
///
/// `series` is None when the provider has no data for the symbol at all;
/// both that and any unavailable session resolve to a skip.
pub fn evaluate_signal(
    signal: &Signal,
    series: Option<&PriceSeries>,
    horizon: u32,
    cost: &CostModel,
    entry_tolerance_days: u32,
) -> HorizonReturn {
    HorizonReturn {
        symbol: signal.symbol.clone(),
        as_of: signal.as_of,
        horizon,
        outcome: price_pair(signal, series, horizon, cost, entry_tolerance_days),
    }
}

fn price_pair(
    signal: &Signal,
    series: Option<&PriceSeries>,
    horizon: u32,
    cost: &CostModel,
    entry_tolerance_days: u32,
) -> HorizonOutcome {
    let Some(series) = series else {
        return HorizonOutcome::SkippedMissingPrice;
    };
    let Some(entry_idx) = series.index_on_or_after(signal.as_of) else {
        return HorizonOutcome::SkippedMissingPrice;
    };
    let Some(entry) = series.session(entry_idx) else {
        return HorizonOutcome::SkippedMissingPrice;
    };
    // Entry may roll forward over weekends/holidays, but only so far.
    if (entry.date - signal.as_of).num_days() > i64::from(entry_tolerance_days) {
        return HorizonOutcome::SkippedMissingPrice;
    }
    let Some(exit) = series.session(entry_idx + horizon as usize) else {
        return HorizonOutcome::SkippedMissingPrice;
    };

    let raw_return = exit.adj_close / entry.open - 1.0;
    HorizonOutcome::Evaluated {
        entry_price: entry.open,
        exit_price: exit.adj_close,
        raw_return,
        net_return: cost.net_return(raw_return),
    }
}

// ─── Bucket plumbing ────────────────────────────────────────────────

fn dedup_horizons(horizons: &[u32]) -> Vec<u32> {
    let mut seen = Vec::with_capacity(horizons.len());
    for &h in horizons {
        if !seen.contains(&h) {
            seen.push(h);
        }
    }
    seen
}

fn empty_buckets(horizons: &[u32]) -> BTreeMap<u32, RunningStats> {
    horizons.iter().map(|&h| (h, RunningStats::new())).collect()
}

fn merge_buckets(
    mut left: BTreeMap<u32, RunningStats>,
    right: BTreeMap<u32, RunningStats>,
) -> BTreeMap<u32, RunningStats> {
    for (horizon, partial) in right {
        left.entry(horizon).or_default().merge(partial);
    }
    left
}

fn finalize(
    buckets: BTreeMap<u32, RunningStats>,
    horizons: &[u32],
    config: &EvalConfig,
    signal_count: usize,
) -> Evaluation {
    let mut rows = Vec::with_capacity(horizons.len() + 1);
    let mut evaluated = 0;
    let mut skipped = 0;
    let mut pooled = RunningStats::new();

    for &horizon in horizons {
        let stats = buckets.get(&horizon).cloned().unwrap_or_default();
        evaluated += stats.count();
        skipped += stats.skipped();
        if config.include_overall {
            pooled.merge(stats.clone());
        }
        rows.push(stats.finalize(Some(horizon)));
    }
    if config.include_overall {
        rows.push(pooled.finalize(None));
    }

    Evaluation {
        rows,
        signal_count,
        evaluated,
        skipped,
    }
}
