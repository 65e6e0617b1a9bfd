//! Signal — a point-in-time assertion about insider-buying intensity.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One evaluation of the trailing window for a security on a candidate date.
///
/// `as_of` is the date the signal could have been acted on. Only records
/// whose filing date lies in `[window_start, window_end]` (with
/// `window_end == as_of`) contribute, so a signal is never influenced by
/// information that was not yet public on its own date.
///
/// The builder emits one Signal per candidate date with the `qualifies`
/// flag set from the threshold predicate; consumers that only care about
/// actionable dates filter on the flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub symbol: String,
    pub as_of: NaiveDate,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    /// Distinct qualifying owners inside the window.
    pub owners: usize,
    /// Aggregate qualifying USD inside the window.
    pub total_usd: f64,
    /// owners >= min_owners AND total_usd >= min_usd, both inclusive.
    pub qualifies: bool,
}

impl Signal {
    /// True if `date` falls inside this signal's trailing window.
    pub fn window_contains(&self, date: NaiveDate) -> bool {
        date >= self.window_start && date <= self.window_end
    }
}
