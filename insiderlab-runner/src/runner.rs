//! Pipeline orchestration — build signals, evaluate, assemble the report.
//!
//! Two entry points:
//! - `run_backtest()`: takes a pre-ingested, sorted ledger. Used by tests
//!   and callers that already hold records in memory.
//! - `run_backtest_from_csv()`: loads the ledger from disk first. Used by
//!   the CLI.
//!
//! Signal building fans out per symbol with rayon — the per-symbol record
//! streams are disjoint, so workers share nothing and the merged output is
//! identical to a sequential scan.

use std::path::Path;

use rayon::prelude::*;
use thiserror::Error;

use insiderlab_core::config::ConfigError;
use insiderlab_core::data::{read_trades_csv, IngestError, PriceProvider};
use insiderlab_core::domain::{Signal, TradeRecord};
use insiderlab_core::signals::{build_symbol_signals, sort_signals, symbol_groups};

use crate::config::BacktestConfig;
use crate::evaluate::{empty_evaluation, evaluate, Evaluation};
use crate::report::BacktestReport;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("ingest error: {0}")]
    Ingest(#[from] IngestError),
}

/// Run the full pipeline over a pre-ingested ledger.
///
/// `records` must be sorted by (symbol, filing date) — the ingestion
/// boundary's output order. A ledger whose signals never qualify is a
/// legitimately quiet period: the report comes back valid with all counts
/// zero rather than as an error.
pub fn run_backtest(
    records: &[TradeRecord],
    provider: &dyn PriceProvider,
    config: &BacktestConfig,
) -> Result<BacktestReport, RunError> {
    config.validate()?;

    let signals = build_signals_parallel(records, config);
    let qualifying: Vec<Signal> = signals.into_iter().filter(|s| s.qualifies).collect();

    let evaluation: Evaluation = if qualifying.is_empty() {
        empty_evaluation(&config.backtest)
    } else {
        evaluate(&qualifying, provider, &config.backtest)?
    };

    Ok(BacktestReport::new(config, evaluation, qualifying))
}

/// Load the trade ledger from CSV, then run the full pipeline.
pub fn run_backtest_from_csv(
    trades_path: &Path,
    provider: &dyn PriceProvider,
    config: &BacktestConfig,
) -> Result<BacktestReport, RunError> {
    let records = read_trades_csv(trades_path)?;
    run_backtest(&records, provider, config)
}

/// Per-symbol parallel signal construction.
///
/// Produces exactly the output of `insiderlab_core::signals::build_signals`
/// — the per-symbol scans are independent and the final sort restores the
/// canonical (as_of, symbol) order.
pub fn build_signals_parallel(records: &[TradeRecord], config: &BacktestConfig) -> Vec<Signal> {
    let groups: Vec<&[TradeRecord]> = symbol_groups(records).collect();
    let mut signals: Vec<Signal> = groups
        .par_iter()
        .flat_map_iter(|group| build_symbol_signals(group, &config.signal))
        .collect();
    sort_signals(&mut signals);
    signals
}
