//! Trailing-window signal construction.
//!
//! Each security's record stream is processed independently. A candidate
//! as-of date is every distinct filing date in the stream — aggregates
//! cannot change between filing events, so no other dates need evaluating.
//! The window is maintained incrementally: each record enters and leaves
//! once, so a symbol's scan is O(R) after the ingestion sort.

use std::collections::{HashMap, VecDeque};

use chrono::{Duration, NaiveDate};

use crate::config::{ConfigError, SidePolicy, SignalConfig, SignalEmission};
use crate::domain::{Signal, TradeRecord, TradeSide};

/// Build the chronologically sorted signal series for a full ledger.
///
/// `records` must be sorted by (symbol, filing date) — the order the
/// ingestion boundary produces. Output is sorted by (as_of, symbol).
pub fn build_signals(
    records: &[TradeRecord],
    config: &SignalConfig,
) -> Result<Vec<Signal>, ConfigError> {
    config.validate()?;

    let mut signals = Vec::new();
    for group in symbol_groups(records) {
        signals.extend(build_symbol_signals(group, config));
    }
    sort_signals(&mut signals);
    Ok(signals)
}

/// Split a (symbol, filing-date)-sorted ledger into per-symbol slices.
///
/// The slices are disjoint and independent, which is what makes per-symbol
/// parallel fan-out safe for callers that want it.
pub fn symbol_groups(records: &[TradeRecord]) -> impl Iterator<Item = &[TradeRecord]> {
    records.chunk_by(|a, b| a.symbol == b.symbol)
}

/// Canonical cross-symbol ordering for a signal series.
pub fn sort_signals(signals: &mut [Signal]) {
    signals.sort_by(|a, b| (a.as_of, &a.symbol).cmp(&(b.as_of, &b.symbol)));
}

/// Build the signal series for a single security.
///
/// `records` must all share one symbol and be sorted by filing date.
pub fn build_symbol_signals(records: &[TradeRecord], config: &SignalConfig) -> Vec<Signal> {
    debug_assert!(records.windows(2).all(|w| {
        w[0].symbol == w[1].symbol && w[0].filing_date <= w[1].filing_date
    }));

    let mut signals = Vec::new();
    let mut window = TrailingWindow::default();
    let window_len = Duration::days(i64::from(config.window_days));

    let mut i = 0;
    while i < records.len() {
        let as_of = records[i].filing_date;
        let window_start = as_of - window_len;

        // The pre-fold state is the same window with today's filings
        // excluded; FirstCross emission triggers off it.
        window.evict_before(window_start);
        let was_qualified = window.qualifies(config);

        while i < records.len() && records[i].filing_date == as_of {
            if let Some(entry) = WindowEntry::from_record(&records[i], config) {
                window.push(entry);
            }
            i += 1;
        }

        let owners = window.owner_count();
        let total_usd = window.total_usd();
        let qualifies = owners >= config.min_owners && total_usd >= config.min_usd;

        let emit = match config.emission {
            SignalEmission::EveryQualifyingDay => true,
            SignalEmission::FirstCross => qualifies && !was_qualified,
        };
        if emit {
            signals.push(Signal {
                symbol: records[i - 1].symbol.clone(),
                as_of,
                window_start,
                window_end: as_of,
                owners,
                total_usd,
                qualifies,
            });
        }
    }
    signals
}

/// One in-window contribution, reduced to what aggregation needs.
struct WindowEntry {
    filing_date: NaiveDate,
    owner: String,
    /// Signed USD contribution to the aggregate.
    usd: f64,
    /// Whether this entry's owner counts toward the distinct-owner tally.
    counts_owner: bool,
}

impl WindowEntry {
    /// Map a record onto its window contribution, or None if the side
    /// policy / plan-sale filter keeps it out of aggregation entirely.
    fn from_record(record: &TradeRecord, config: &SignalConfig) -> Option<Self> {
        if config.exclude_plan_sales && record.plan_sale {
            return None;
        }
        let (usd, counts_owner) = match (record.side, config.side_policy) {
            (TradeSide::Acquisition, _) => (record.notional(), true),
            (TradeSide::Disposition, SidePolicy::NetOfDispositions) => {
                (-record.notional(), false)
            }
            _ => return None,
        };
        Some(Self {
            filing_date: record.filing_date,
            owner: record.owner.clone(),
            usd,
            counts_owner,
        })
    }
}

/// Sliding window over filing dates with incrementally maintained
/// distinct-owner counts and USD total.
#[derive(Default)]
struct TrailingWindow {
    entries: VecDeque<WindowEntry>,
    owner_counts: HashMap<String, usize>,
    total_usd: f64,
}

impl TrailingWindow {
    fn push(&mut self, entry: WindowEntry) {
        debug_assert!(self
            .entries
            .back()
            .map_or(true, |last| last.filing_date <= entry.filing_date));
        self.total_usd += entry.usd;
        if entry.counts_owner {
            *self.owner_counts.entry(entry.owner.clone()).or_insert(0) += 1;
        }
        self.entries.push_back(entry);
    }

    fn evict_before(&mut self, cutoff: NaiveDate) {
        while self
            .entries
            .front()
            .is_some_and(|front| front.filing_date < cutoff)
        {
            let Some(entry) = self.entries.pop_front() else {
                break;
            };
            self.total_usd -= entry.usd;
            if entry.counts_owner {
                match self.owner_counts.get_mut(&entry.owner) {
                    Some(count) if *count > 1 => *count -= 1,
                    _ => {
                        self.owner_counts.remove(&entry.owner);
                    }
                }
            }
        }
    }

    fn owner_count(&self) -> usize {
        self.owner_counts.len()
    }

    fn total_usd(&self) -> f64 {
        self.total_usd
    }

    fn qualifies(&self, config: &SignalConfig) -> bool {
        self.owner_count() >= config.min_owners && self.total_usd() >= config.min_usd
    }
}
