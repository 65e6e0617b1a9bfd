//! InsiderLab Runner — evaluation, statistics, reporting, orchestration.
//!
//! This crate builds on `insiderlab-core` to provide:
//! - The backtest evaluator (price alignment, horizon returns, cost model)
//! - Streaming per-horizon statistics with exact parallel merge
//! - Report assembly and JSON/CSV/Markdown export with schema versioning
//! - Pipeline orchestration with rayon fan-out per symbol and per signal

pub mod config;
pub mod cost;
pub mod evaluate;
pub mod report;
pub mod runner;
pub mod stats;

pub use config::{BacktestConfig, ConfigFileError};
pub use cost::CostModel;
pub use evaluate::{evaluate, evaluate_signal, Evaluation, HorizonOutcome, HorizonReturn};
pub use report::{
    export_json, export_report_csv, export_signals_csv, generate_report, import_json,
    load_artifacts, save_artifacts, BacktestReport, SCHEMA_VERSION,
};
pub use runner::{build_signals_parallel, run_backtest, run_backtest_from_csv, RunError};
pub use stats::{ReportRow, RunningStats};
