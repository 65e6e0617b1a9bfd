//! InsiderLab Core — domain types, signal builder, price series, ingestion.
//!
//! This crate contains the point-in-time half of the backtesting pipeline:
//! - Domain types (trade records, signals) with validated invariants
//! - Trailing-window signal construction with no-lookahead discipline
//! - The price-provider abstraction and CSV-backed implementations
//! - Ledger ingestion with typed, batch-rejecting validation
//!
//! Evaluation, statistics, and reporting live in `insiderlab-runner`.

pub mod config;
pub mod data;
pub mod domain;
pub mod signals;
