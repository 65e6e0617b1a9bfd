//! Deterministic synthetic price series for tests, benches, and demos.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::prices::{PriceSeries, SessionPrice};

/// Generate a seeded random-walk series with weekday-only sessions.
///
/// The same (symbol, start, sessions, seed) tuple always produces the same
/// series, independent of thread scheduling or call order.
pub fn synthetic_series(
    symbol: &str,
    start: NaiveDate,
    sessions: usize,
    seed: u64,
) -> PriceSeries {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = Vec::with_capacity(sessions);
    let mut date = next_weekday(start);
    let mut close = 100.0_f64;

    for _ in 0..sessions {
        let drift: f64 = rng.gen_range(-0.02..0.021);
        let open = close * (1.0 + rng.gen_range(-0.005..0.005));
        close = (close * (1.0 + drift)).max(1.0);
        out.push(SessionPrice {
            date,
            open: open.max(1.0),
            adj_close: close,
        });
        date = next_weekday(date + Duration::days(1));
    }
    PriceSeries::new(symbol, out)
}

fn next_weekday(mut date: NaiveDate) -> NaiveDate {
    while matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        date += Duration::days(1);
    }
    date
}
