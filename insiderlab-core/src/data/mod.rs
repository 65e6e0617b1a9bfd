//! Ingestion boundary and price-series abstraction.

pub mod ingest;
pub mod prices;
pub mod synthetic;

pub use ingest::{read_trades, read_trades_csv, IngestError};
pub use prices::{PriceError, PriceProvider, PriceSeries, PriceTable, SessionPrice};
pub use synthetic::synthetic_series;
