//! Signal-builder throughput benchmark over a generated multi-symbol ledger.

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use insiderlab_core::config::SignalConfig;
use insiderlab_core::domain::{OwnershipKind, TradeRecord, TradeSide};
use insiderlab_core::signals::build_signals;

fn make_ledger(records: usize, symbols: usize, seed: u64) -> Vec<TradeRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    let base = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
    let mut out = Vec::with_capacity(records);

    for _ in 0..records {
        let filing = base + Duration::days(rng.gen_range(0..730));
        out.push(TradeRecord {
            symbol: format!("S{:03}", rng.gen_range(0..symbols)),
            owner: format!("O{:02}", rng.gen_range(0..20)),
            transaction_date: filing - Duration::days(rng.gen_range(0..3)),
            filing_date: filing,
            side: TradeSide::Acquisition,
            shares: rng.gen_range(100.0..10_000.0),
            price: rng.gen_range(5.0..500.0),
            ownership: OwnershipKind::Direct,
            plan_sale: rng.gen_bool(0.1),
        });
    }
    out.sort_by(|a, b| (a.symbol.as_str(), a.filing_date).cmp(&(b.symbol.as_str(), b.filing_date)));
    out
}

fn bench_build_signals(c: &mut Criterion) {
    let ledger = make_ledger(50_000, 200, 42);
    let config = SignalConfig::default();

    c.bench_function("build_signals_50k_records", |b| {
        b.iter(|| build_signals(black_box(&ledger), black_box(&config)).unwrap())
    });
}

criterion_group!(benches, bench_build_signals);
criterion_main!(benches);
