//! InsiderLab CLI — signal-tape and evaluate commands.
//!
//! Commands:
//! - `signals` — build the dated signal tape from a trade ledger CSV
//! - `evaluate` — score qualifying signals against a price store and save
//!   the report artifact bundle

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use insiderlab_core::config::{SignalConfig, SignalEmission};
use insiderlab_core::data::{read_trades_csv, PriceTable};
use insiderlab_core::signals::build_signals;
use insiderlab_runner::{
    export_signals_csv, run_backtest, save_artifacts, BacktestConfig, BacktestReport,
};

#[derive(Parser)]
#[command(
    name = "insiderlab",
    about = "InsiderLab CLI — insider-cluster signal backtesting"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the dated signal tape from a trade ledger CSV.
    Signals {
        /// Trade ledger CSV (symbol, owner, dates, side, shares, price, ...).
        #[arg(long)]
        trades: PathBuf,

        /// Output CSV path for the signal tape.
        #[arg(long, default_value = "signals.csv")]
        out: PathBuf,

        /// Trailing window length in calendar days.
        #[arg(long, default_value_t = 14)]
        window: u32,

        /// Minimum distinct qualifying owners.
        #[arg(long, default_value_t = 3)]
        min_owners: usize,

        /// Minimum aggregate qualifying USD.
        #[arg(long, default_value_t = 300_000.0)]
        min_usd: f64,

        /// Emit only on the not-qualified -> qualified transition.
        #[arg(long, default_value_t = false)]
        first_cross: bool,

        /// Keep Rule 10b5-1 scheduled-plan transactions in aggregation.
        #[arg(long, default_value_t = false)]
        include_plan_sales: bool,
    },
    /// Score qualifying signals against a price store and save artifacts.
    Evaluate {
        /// Trade ledger CSV.
        #[arg(long)]
        trades: PathBuf,

        /// Price store CSV (symbol, date, open, adj_close).
        #[arg(long)]
        prices: PathBuf,

        /// TOML config file; mutually exclusive with the threshold,
        /// horizon, and --overall flags.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Trailing window length in calendar days.
        #[arg(long)]
        window: Option<u32>,

        /// Minimum distinct qualifying owners.
        #[arg(long)]
        min_owners: Option<usize>,

        /// Minimum aggregate qualifying USD.
        #[arg(long)]
        min_usd: Option<f64>,

        /// Holding horizons in trading sessions.
        #[arg(long, num_args = 1.., value_delimiter = ' ')]
        horizons: Option<Vec<u32>>,

        /// Round-trip transaction cost in basis points per side.
        #[arg(long)]
        cost_bps: Option<f64>,

        /// Append a pooled row aggregating all horizons.
        #[arg(long, default_value_t = false)]
        overall: bool,

        /// Output directory for the artifact bundle.
        #[arg(long, default_value = "results")]
        out_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Signals {
            trades,
            out,
            window,
            min_owners,
            min_usd,
            first_cross,
            include_plan_sales,
        } => run_signals(
            trades,
            out,
            window,
            min_owners,
            min_usd,
            first_cross,
            include_plan_sales,
        ),
        Commands::Evaluate {
            trades,
            prices,
            config,
            window,
            min_owners,
            min_usd,
            horizons,
            cost_bps,
            overall,
            out_dir,
        } => run_evaluate(
            trades, prices, config, window, min_owners, min_usd, horizons, cost_bps, overall,
            out_dir,
        ),
    }
}

fn run_signals(
    trades: PathBuf,
    out: PathBuf,
    window: u32,
    min_owners: usize,
    min_usd: f64,
    first_cross: bool,
    include_plan_sales: bool,
) -> Result<()> {
    let config = SignalConfig {
        window_days: window,
        min_owners,
        min_usd,
        emission: if first_cross {
            SignalEmission::FirstCross
        } else {
            SignalEmission::EveryQualifyingDay
        },
        exclude_plan_sales: !include_plan_sales,
        ..Default::default()
    };

    let records = read_trades_csv(&trades)
        .with_context(|| format!("failed to load trade ledger from {}", trades.display()))?;
    let signals = build_signals(&records, &config)?;
    let qualifying = signals.iter().filter(|s| s.qualifies).count();

    if signals.is_empty() {
        println!("No signals.");
        return Ok(());
    }

    std::fs::write(&out, export_signals_csv(&signals)?)
        .with_context(|| format!("failed to write {}", out.display()))?;
    println!(
        "Signals: {} ({} qualifying) -> {}",
        signals.len(),
        qualifying,
        out.display()
    );
    for signal in signals.iter().filter(|s| s.qualifies).take(10) {
        println!(
            "  {} {}  owners={}  usd={:.0}",
            signal.as_of, signal.symbol, signal.owners, signal.total_usd
        );
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_evaluate(
    trades: PathBuf,
    prices: PathBuf,
    config_path: Option<PathBuf>,
    window: Option<u32>,
    min_owners: Option<usize>,
    min_usd: Option<f64>,
    horizons: Option<Vec<u32>>,
    cost_bps: Option<f64>,
    overall: bool,
    out_dir: PathBuf,
) -> Result<()> {
    let flags_given = window.is_some()
        || min_owners.is_some()
        || min_usd.is_some()
        || horizons.is_some()
        || cost_bps.is_some()
        || overall;
    if config_path.is_some() && flags_given {
        bail!("--config and the threshold/horizon/overall flags are mutually exclusive");
    }

    let config = if let Some(path) = config_path {
        BacktestConfig::from_file(&path)?
    } else {
        let mut config = BacktestConfig::default();
        if let Some(w) = window {
            config.signal.window_days = w;
        }
        if let Some(o) = min_owners {
            config.signal.min_owners = o;
        }
        if let Some(u) = min_usd {
            config.signal.min_usd = u;
        }
        if let Some(h) = horizons {
            config.backtest.horizons = h;
        }
        if let Some(c) = cost_bps {
            config.backtest.cost_bps = c;
        }
        config.backtest.include_overall = overall;
        config
    };

    let records = read_trades_csv(&trades)
        .with_context(|| format!("failed to load trade ledger from {}", trades.display()))?;
    let provider = PriceTable::from_csv(&prices)
        .with_context(|| format!("failed to load price store from {}", prices.display()))?;
    println!(
        "Loaded {} records, prices for {} symbols",
        records.len(),
        provider.symbols().count()
    );

    let report = run_backtest(&records, &provider, &config)?;
    print_summary(&report);

    let run_dir = save_artifacts(&report, &out_dir)?;
    println!("Artifacts saved to: {}", run_dir.display());
    Ok(())
}

fn print_summary(report: &BacktestReport) {
    println!();
    println!("=== Backtest Report ===");
    println!("Run ID:    {}", &report.run_id[..16.min(report.run_id.len())]);
    println!("Signals:   {}", report.signal_count);
    println!(
        "Pairs:     {} evaluated, {} skipped",
        report.evaluated, report.skipped
    );
    println!();
    println!("--- Forward returns (net of cost) ---");
    for row in &report.rows {
        if row.samples == 0 {
            println!("{:>8}: no data (skipped={})", row.horizon_label(), row.skipped);
            continue;
        }
        println!(
            "{:>8}: avg {:.3}% | median {:.3}% | hit% {:.1}% | n={} | skipped={}",
            row.horizon_label(),
            row.mean * 100.0,
            row.median * 100.0,
            row.hit_rate * 100.0,
            row.samples,
            row.skipped,
        );
    }
    println!();
}
