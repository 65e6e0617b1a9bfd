//! Price series and the provider abstraction.
//!
//! The PriceProvider trait abstracts over price sources (CSV import,
//! in-memory tables, synthetic series) so the evaluator can be run against
//! mocks in tests. A provider may report a whole symbol, or any individual
//! date, as unavailable — the evaluator degrades per data point rather
//! than failing the run.

use std::collections::HashMap;
use std::io;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One tradable session for a symbol.
///
/// Entry-side logic reads `open`; exit-side logic reads `adj_close`, which
/// carries split/dividend adjustments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionPrice {
    pub date: NaiveDate,
    pub open: f64,
    pub adj_close: f64,
}

impl SessionPrice {
    /// Both prices present, finite, and positive.
    pub fn is_sane(&self) -> bool {
        self.open.is_finite() && self.open > 0.0 && self.adj_close.is_finite() && self.adj_close > 0.0
    }
}

/// Sorted tradable sessions for a single symbol.
///
/// Construction sorts by date, drops insane sessions, and keeps the first
/// session per date. Dates with no session are "unavailable" — there is no
/// NaN sentinel inside a series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: String,
    sessions: Vec<SessionPrice>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, mut sessions: Vec<SessionPrice>) -> Self {
        sessions.retain(SessionPrice::is_sane);
        sessions.sort_by_key(|s| s.date);
        sessions.dedup_by_key(|s| s.date);
        Self {
            symbol: symbol.into(),
            sessions,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn session(&self, index: usize) -> Option<&SessionPrice> {
        self.sessions.get(index)
    }

    /// Index of the first session dated on or after `date`.
    pub fn index_on_or_after(&self, date: NaiveDate) -> Option<usize> {
        let idx = self.sessions.partition_point(|s| s.date < date);
        (idx < self.sessions.len()).then_some(idx)
    }
}

/// Read-only lookup of price series by symbol.
pub trait PriceProvider: Send + Sync {
    /// The series for a symbol, or None if the provider has no data for it.
    fn series(&self, symbol: &str) -> Option<&PriceSeries>;
}

/// In-memory provider backed by a symbol map.
#[derive(Debug, Default)]
pub struct PriceTable {
    by_symbol: HashMap<String, PriceSeries>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, series: PriceSeries) {
        self.by_symbol.insert(series.symbol().to_string(), series);
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.by_symbol.keys().map(String::as_str)
    }

    /// Load a price store from CSV (columns: symbol, date, open, adj_close).
    pub fn from_csv(path: &Path) -> Result<Self, PriceError> {
        Self::from_reader(csv::Reader::from_path(path)?)
    }

    pub fn from_reader<R: io::Read>(mut reader: csv::Reader<R>) -> Result<Self, PriceError> {
        #[derive(Deserialize)]
        struct Row {
            symbol: String,
            date: NaiveDate,
            open: f64,
            adj_close: f64,
        }

        let mut rows: HashMap<String, Vec<SessionPrice>> = HashMap::new();
        for result in reader.deserialize::<Row>() {
            let row = result?;
            rows.entry(row.symbol).or_default().push(SessionPrice {
                date: row.date,
                open: row.open,
                adj_close: row.adj_close,
            });
        }
        if rows.is_empty() {
            return Err(PriceError::Empty);
        }

        let mut table = Self::new();
        for (symbol, sessions) in rows {
            table.insert(PriceSeries::new(symbol, sessions));
        }
        Ok(table)
    }
}

impl PriceProvider for PriceTable {
    fn series(&self, symbol: &str) -> Option<&PriceSeries> {
        self.by_symbol.get(symbol)
    }
}

/// Errors from loading a price store.
#[derive(Debug, Error)]
pub enum PriceError {
    #[error("price store contains no sessions")]
    Empty,

    #[error(transparent)]
    Csv(#[from] csv::Error),
}
