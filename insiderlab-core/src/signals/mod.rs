//! Signal construction from the trade ledger.

pub mod builder;

pub use builder::{build_signals, build_symbol_signals, sort_signals, symbol_groups};
