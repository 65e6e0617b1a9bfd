//! Streaming per-bucket statistics and report-row finalization.
//!
//! Each bucket accumulates sufficient statistics (count, sum,
//! sum-of-squares, count-positive, skip count) online, so memory use is
//! independent of sample count — with one documented exception: the median
//! requires the values themselves, so they are buffered alongside.
//!
//! Sums and sums-of-squares are associative and commutative, so partial
//! buckets from parallel workers merge exactly.

use serde::{Deserialize, Serialize};

/// Running sufficient statistics for one aggregation bucket.
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: usize,
    sum: f64,
    sum_sq: f64,
    positives: usize,
    skipped: usize,
    /// Buffered values for the median — the exception to streaming.
    values: Vec<f64>,
}

impl RunningStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in one evaluated cost-adjusted return.
    pub fn record(&mut self, net_return: f64) {
        self.count += 1;
        self.sum += net_return;
        self.sum_sq += net_return * net_return;
        if net_return > 0.0 {
            self.positives += 1;
        }
        self.values.push(net_return);
    }

    /// Fold in one unmeasurable signal/horizon pair.
    pub fn record_skip(&mut self) {
        self.skipped += 1;
    }

    /// Merge a partial bucket from another worker. Exact: the result is
    /// identical to having recorded every sample into one bucket.
    pub fn merge(&mut self, other: RunningStats) {
        self.count += other.count;
        self.sum += other.sum;
        self.sum_sq += other.sum_sq;
        self.positives += other.positives;
        self.skipped += other.skipped;
        self.values.extend(other.values);
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum / self.count as f64
    }

    /// Sample standard deviation (n - 1 denominator). 0.0 below two samples.
    pub fn std_dev(&self) -> f64 {
        if self.count < 2 {
            return 0.0;
        }
        let n = self.count as f64;
        let variance = (self.sum_sq - self.sum * self.sum / n) / (n - 1.0);
        variance.max(0.0).sqrt()
    }

    /// Median of the buffered values; midpoint of the two central values
    /// for even counts. 0.0 when empty.
    pub fn median(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let mut sorted = self.values.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 1 {
            sorted[mid]
        } else {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        }
    }

    /// Fraction of evaluated samples with positive cost-adjusted return.
    pub fn hit_rate(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.positives as f64 / self.count as f64
    }

    /// Finalize into a report row. `horizon` is None for the pooled row.
    pub fn finalize(&self, horizon: Option<u32>) -> ReportRow {
        let std_dev = self.std_dev();
        let mean = self.mean();
        let reward_risk = if std_dev < 1e-15 { 0.0 } else { mean / std_dev };
        ReportRow {
            horizon,
            samples: self.count,
            hit_rate: self.hit_rate(),
            mean,
            median: self.median(),
            std_dev,
            reward_risk,
            skipped: self.skipped,
        }
    }
}

/// One aggregation bucket of the final report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    /// Holding horizon in trading sessions; None for the pooled overall row.
    pub horizon: Option<u32>,
    pub samples: usize,
    pub hit_rate: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    /// mean / std_dev; 0.0 when the deviation is degenerate.
    pub reward_risk: f64,
    pub skipped: usize,
}

impl ReportRow {
    /// Display label for the horizon column.
    pub fn horizon_label(&self) -> String {
        match self.horizon {
            Some(h) => format!("{h}d"),
            None => "overall".into(),
        }
    }
}
