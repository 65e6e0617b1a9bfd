//! Flat round-trip transaction cost model.
//!
//! The cost is a linear drag: `cost_bps` is charged once for entry and once
//! for exit, so the round trip subtracts `2 * cost_bps / 10_000` from the
//! raw return. No market-impact or size-dependent modeling.

/// Cost model for backtest friction.
///
/// Fixed basis points today; the struct boundary allows replacing it with a
/// spread- or liquidity-scaled model without touching the evaluator.
#[derive(Debug, Clone, Copy)]
pub struct CostModel {
    /// Per-side transaction cost in basis points.
    pub cost_bps: f64,
}

impl CostModel {
    pub fn new(cost_bps: f64) -> Self {
        Self { cost_bps }
    }

    pub fn frictionless() -> Self {
        Self::new(0.0)
    }

    /// Total round-trip drag as a return fraction: `2 * cost_bps / 10_000`.
    pub fn round_trip_drag(&self) -> f64 {
        2.0 * self.cost_bps / 10_000.0
    }

    /// Cost-adjusted return for a raw holding-period return.
    pub fn net_return(&self, raw_return: f64) -> f64 {
        raw_return - self.round_trip_drag()
    }
}
