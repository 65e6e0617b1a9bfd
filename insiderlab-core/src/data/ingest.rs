//! CSV ingestion of the normalized insider-trade ledger.
//!
//! The record store is schema-stable columnar input with one row per
//! transaction: symbol, owner, transaction_date, filing_date, side, shares,
//! price, ownership, plan_sale. Rows become typed, validated records at
//! this boundary; the first integrity violation rejects the whole batch.

use std::io;
use std::path::Path;

use thiserror::Error;

use crate::domain::{MalformedRecordError, TradeRecord};

/// Errors from ledger ingestion.
#[derive(Debug, Error)]
pub enum IngestError {
    /// An empty ledger cannot produce a meaningful run.
    #[error("trade ledger contains no records")]
    Empty,

    #[error("record {row}: {source}")]
    Malformed {
        /// 1-based data-row index (header excluded).
        row: usize,
        source: MalformedRecordError,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// Read, validate, and sort a trade ledger from any reader.
///
/// Output is sorted by (symbol, filing date) — the order the signal
/// builder consumes. The sort is stable, so same-day records keep their
/// ledger order and reruns are bit-identical.
pub fn read_trades<R: io::Read>(reader: R) -> Result<Vec<TradeRecord>, IngestError> {
    read_trades_from(csv::Reader::from_reader(reader))
}

/// Read a trade ledger from a CSV file on disk.
pub fn read_trades_csv(path: &Path) -> Result<Vec<TradeRecord>, IngestError> {
    read_trades_from(csv::Reader::from_path(path)?)
}

fn read_trades_from<R: io::Read>(
    mut csv_reader: csv::Reader<R>,
) -> Result<Vec<TradeRecord>, IngestError> {
    let mut records = Vec::new();
    for (idx, result) in csv_reader.deserialize::<TradeRecord>().enumerate() {
        let record = result?;
        record
            .validate()
            .map_err(|source| IngestError::Malformed { row: idx + 1, source })?;
        records.push(record);
    }
    if records.is_empty() {
        return Err(IngestError::Empty);
    }
    records.sort_by(|a, b| (&a.symbol, a.filing_date).cmp(&(&b.symbol, b.filing_date)));
    Ok(records)
}
