//! End-to-end pipeline tests: ledger -> signals -> evaluation -> report.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use proptest::prelude::*;

use insiderlab_core::config::SignalEmission;
use insiderlab_core::data::{synthetic_series, PriceSeries, PriceTable, SessionPrice};
use insiderlab_core::domain::{OwnershipKind, TradeRecord, TradeSide};
use insiderlab_runner::{
    run_backtest, save_artifacts, load_artifacts, BacktestConfig, RunningStats,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn buy(symbol: &str, owner: &str, filing: NaiveDate, usd: f64) -> TradeRecord {
    TradeRecord {
        symbol: symbol.into(),
        owner: owner.into(),
        transaction_date: filing,
        filing_date: filing,
        side: TradeSide::Acquisition,
        shares: usd / 100.0,
        price: 100.0,
        ownership: OwnershipKind::Direct,
        plan_sale: false,
    }
}

/// Weekday sessions where open and close follow a supplied step function.
fn series_with<F: Fn(usize) -> f64>(
    symbol: &str,
    start: NaiveDate,
    sessions: usize,
    price_at: F,
) -> PriceSeries {
    let mut out = Vec::new();
    let mut d = start;
    let mut i = 0;
    while out.len() < sessions {
        if !matches!(d.weekday(), Weekday::Sat | Weekday::Sun) {
            let px = price_at(i);
            out.push(SessionPrice {
                date: d,
                open: px,
                adj_close: px,
            });
            i += 1;
        }
        d += Duration::days(1);
    }
    PriceSeries::new(symbol, out)
}

fn sorted(mut records: Vec<TradeRecord>) -> Vec<TradeRecord> {
    records.sort_by(|a, b| {
        (a.symbol.as_str(), a.filing_date).cmp(&(b.symbol.as_str(), b.filing_date))
    });
    records
}

#[test]
fn cluster_scenario_produces_the_expected_report() {
    // Two insiders cluster into ABC in early January.
    let records = sorted(vec![
        buy("ABC", "O1", date(2024, 1, 5), 200_000.0),
        buy("ABC", "O2", date(2024, 1, 8), 150_000.0),
    ]);

    let mut config = BacktestConfig::default();
    config.signal.min_owners = 2;
    config.signal.min_usd = 300_000.0;
    config.backtest.horizons = vec![5];
    config.backtest.cost_bps = 20.0;

    // Entry Monday Jan 8 at 100; five sessions later the price is 110.
    let mut provider = PriceTable::new();
    provider.insert(series_with("ABC", date(2024, 1, 8), 20, |i| {
        if i < 5 {
            100.0
        } else {
            110.0
        }
    }));

    let report = run_backtest(&records, &provider, &config).unwrap();

    assert_eq!(report.signal_count, 1);
    let signal = &report.signals[0];
    assert_eq!(signal.as_of, date(2024, 1, 8));
    assert_eq!(signal.owners, 2);
    assert!((signal.total_usd - 350_000.0).abs() < 1e-9);

    let row = &report.rows[0];
    assert_eq!(row.horizon, Some(5));
    assert_eq!(row.samples, 1);
    assert_eq!(row.skipped, 0);
    // Raw 10%, minus 2 x 20bps round trip: 9.60% net.
    assert!((row.mean - 0.09600).abs() < 1e-9);
    assert!((row.hit_rate - 1.0).abs() < 1e-12);
}

#[test]
fn missing_exit_price_degrades_one_pair_only() {
    let records = sorted(vec![
        buy("ABC", "O1", date(2024, 1, 5), 200_000.0),
        buy("ABC", "O2", date(2024, 1, 8), 200_000.0),
    ]);

    let mut config = BacktestConfig::default();
    config.signal.min_owners = 2;
    config.backtest.horizons = vec![2, 50];

    // Only 10 sessions of data: horizon 2 prices, horizon 50 cannot.
    let mut provider = PriceTable::new();
    provider.insert(series_with("ABC", date(2024, 1, 8), 10, |_| 100.0));

    let report = run_backtest(&records, &provider, &config).unwrap();
    let short = report.rows.iter().find(|r| r.horizon == Some(2)).unwrap();
    let long = report.rows.iter().find(|r| r.horizon == Some(50)).unwrap();

    assert_eq!(short.samples, 1);
    assert_eq!(short.skipped, 0);
    assert_eq!(long.samples, 0);
    assert_eq!(long.skipped, 1);
}

#[test]
fn first_cross_mode_evaluates_fewer_signals() {
    // Three consecutive qualifying days in every-day mode.
    let records = sorted(vec![
        buy("ABC", "O1", date(2024, 1, 8), 200_000.0),
        buy("ABC", "O2", date(2024, 1, 9), 200_000.0),
        buy("ABC", "O3", date(2024, 1, 10), 200_000.0),
    ]);

    let mut config = BacktestConfig::default();
    config.signal.min_owners = 2;
    config.backtest.horizons = vec![2];

    let mut provider = PriceTable::new();
    provider.insert(series_with("ABC", date(2024, 1, 8), 20, |_| 100.0));

    let every_day = run_backtest(&records, &provider, &config).unwrap();
    assert_eq!(every_day.signal_count, 2); // Jan 9 and Jan 10 qualify

    config.signal.emission = SignalEmission::FirstCross;
    let first_cross = run_backtest(&records, &provider, &config).unwrap();
    assert_eq!(first_cross.signal_count, 1);
    assert_eq!(first_cross.signals[0].as_of, date(2024, 1, 9));
}

#[test]
fn report_artifacts_roundtrip_from_pipeline_output() {
    let records = sorted(vec![
        buy("ABC", "O1", date(2024, 1, 5), 200_000.0),
        buy("ABC", "O2", date(2024, 1, 8), 200_000.0),
    ]);
    let mut config = BacktestConfig::default();
    config.signal.min_owners = 2;
    config.backtest.horizons = vec![2];

    let mut provider = PriceTable::new();
    provider.insert(series_with("ABC", date(2024, 1, 8), 10, |i| 100.0 + i as f64));

    let report = run_backtest(&records, &provider, &config).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let run_dir = save_artifacts(&report, dir.path()).unwrap();
    let loaded = load_artifacts(&run_dir).unwrap();
    assert_eq!(loaded.run_id, report.run_id);
    assert_eq!(loaded.rows, report.rows);
    assert_eq!(loaded.signals.len(), 1);
}

#[test]
fn rerun_is_deterministic_despite_parallelism() {
    // Enough symbols to actually fan out.
    let mut records = Vec::new();
    for s in 0..12 {
        for o in 0..4 {
            records.push(buy(
                &format!("S{s:02}"),
                &format!("O{o}"),
                date(2024, 1, 2) + Duration::days((s * 3 + o) as i64 % 30),
                150_000.0,
            ));
        }
    }
    let records = sorted(records);

    let mut config = BacktestConfig::default();
    config.signal.min_owners = 2;
    config.signal.min_usd = 250_000.0;
    config.backtest.horizons = vec![3, 8];

    let mut provider = PriceTable::new();
    for s in 0..12 {
        provider.insert(synthetic_series(&format!("S{s:02}"), date(2024, 1, 2), 60, s));
    }

    let a = run_backtest(&records, &provider, &config).unwrap();
    let b = run_backtest(&records, &provider, &config).unwrap();
    assert_eq!(a.signals, b.signals);
    assert_eq!(a.rows, b.rows);
    assert_eq!(a.run_id, b.run_id);
}

// ── Parallel-merge equivalence (proptest) ────────────────────────────

proptest! {
    /// Splitting a sample stream into arbitrary partial buckets and merging
    /// them yields the same statistics as one sequential pass.
    #[test]
    fn merged_partials_match_sequential(
        values in prop::collection::vec(-0.2..0.2f64, 1..80),
        split in 0usize..80,
    ) {
        let split = split.min(values.len());

        let mut single = RunningStats::new();
        for &v in &values {
            single.record(v);
        }

        let mut left = RunningStats::new();
        for &v in &values[..split] {
            left.record(v);
        }
        let mut right = RunningStats::new();
        for &v in &values[split..] {
            right.record(v);
        }
        left.merge(right);

        prop_assert_eq!(left.count(), single.count());
        prop_assert!((left.mean() - single.mean()).abs() < 1e-12);
        prop_assert!((left.std_dev() - single.std_dev()).abs() < 1e-9);
        prop_assert!((left.median() - single.median()).abs() < 1e-12);
        prop_assert!((left.hit_rate() - single.hit_rate()).abs() < 1e-12);
    }
}
