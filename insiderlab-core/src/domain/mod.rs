//! Domain types: trade records and signals.

pub mod signal;
pub mod trade;

pub use signal::Signal;
pub use trade::{MalformedRecordError, OwnershipKind, TradeRecord, TradeSide};
