//! TradeRecord — one insider transaction from the normalized filing ledger.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Transaction side as reported on the ownership filing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeSide {
    /// Open-market purchase. The only side that counts toward qualification
    /// under the default side policy.
    Acquisition,
    /// Open-market sale.
    Disposition,
    /// Grant, award, or other compensation-driven transfer.
    Award,
    /// Anything else (exercises, gifts, trust transfers, ...).
    Other,
}

/// Whether the insider holds the shares directly or through an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnershipKind {
    Direct,
    Indirect,
}

/// A single normalized insider transaction.
///
/// Produced by the external ingestion collaborator; immutable once ingested.
/// The ledger is consumed sorted by (symbol, filing date) — the filing date
/// is when the transaction became public, and all point-in-time logic keys
/// off it rather than the transaction date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub symbol: String,
    /// Stable insider identity (person + role as reported).
    pub owner: String,
    pub transaction_date: NaiveDate,
    /// Must be >= transaction_date; a filing cannot predate its transaction.
    pub filing_date: NaiveDate,
    pub side: TradeSide,
    pub shares: f64,
    pub price: f64,
    pub ownership: OwnershipKind,
    /// True when the transaction was executed under a Rule 10b5-1 scheduled
    /// plan. Plan trades carry no discretionary information and are excluded
    /// from aggregation by default.
    pub plan_sale: bool,
}

impl TradeRecord {
    /// USD notional: shares x price per share.
    pub fn notional(&self) -> f64 {
        self.shares * self.price
    }

    /// Field-constraint check applied at the ingestion boundary.
    ///
    /// A violation rejects the whole batch — data integrity problems are
    /// never silently patched or dropped.
    pub fn validate(&self) -> Result<(), MalformedRecordError> {
        if self.filing_date < self.transaction_date {
            return Err(MalformedRecordError::FiledBeforeTransaction {
                symbol: self.symbol.clone(),
                owner: self.owner.clone(),
                filing: self.filing_date,
                transaction: self.transaction_date,
            });
        }
        if !self.shares.is_finite() || self.shares <= 0.0 {
            return Err(MalformedRecordError::NonPositiveShares {
                symbol: self.symbol.clone(),
                owner: self.owner.clone(),
                shares: self.shares,
            });
        }
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(MalformedRecordError::NonPositivePrice {
                symbol: self.symbol.clone(),
                owner: self.owner.clone(),
                price: self.price,
            });
        }
        Ok(())
    }
}

/// A record that violates the ledger's integrity constraints.
#[derive(Debug, Error)]
pub enum MalformedRecordError {
    #[error("{symbol}/{owner}: filing date {filing} precedes transaction date {transaction}")]
    FiledBeforeTransaction {
        symbol: String,
        owner: String,
        filing: NaiveDate,
        transaction: NaiveDate,
    },

    #[error("{symbol}/{owner}: share quantity must be positive (got {shares})")]
    NonPositiveShares {
        symbol: String,
        owner: String,
        shares: f64,
    },

    #[error("{symbol}/{owner}: price must be positive (got {price})")]
    NonPositivePrice {
        symbol: String,
        owner: String,
        price: f64,
    },
}
