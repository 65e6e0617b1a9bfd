//! Report assembly and export — JSON, CSV, and Markdown artifacts.
//!
//! Three export formats for a backtest run:
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: the per-horizon report table and the signal tape
//! - **Markdown**: human-readable single-run summary
//!
//! Persisted artifacts include a `schema_version` field; unknown versions
//! are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use insiderlab_core::domain::Signal;

use crate::config::BacktestConfig;
use crate::evaluate::Evaluation;
use crate::stats::ReportRow;

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestReport {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    /// Content hash of the configuration that produced this report.
    pub run_id: String,
    pub config: BacktestConfig,
    /// One row per horizon, plus the pooled row when configured.
    pub rows: Vec<ReportRow>,
    /// Qualifying signals that entered evaluation.
    pub signals: Vec<Signal>,
    pub signal_count: usize,
    pub evaluated: usize,
    pub skipped: usize,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl BacktestReport {
    pub fn new(config: &BacktestConfig, evaluation: Evaluation, signals: Vec<Signal>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            run_id: config.run_id(),
            config: config.clone(),
            rows: evaluation.rows,
            signal_count: signals.len(),
            evaluated: evaluation.evaluated,
            skipped: evaluation.skipped,
            signals,
        }
    }
}

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a report to pretty JSON.
pub fn export_json(report: &BacktestReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize BacktestReport to JSON")
}

/// Deserialize a report from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<BacktestReport> {
    let report: BacktestReport =
        serde_json::from_str(json).context("failed to deserialize BacktestReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export the per-horizon report table as CSV.
///
/// Columns: horizon, samples, hit_rate, mean, median, std_dev,
/// reward_risk, skipped. The pooled row is labeled `overall`.
pub fn export_report_csv(rows: &[ReportRow]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "horizon",
        "samples",
        "hit_rate",
        "mean",
        "median",
        "std_dev",
        "reward_risk",
        "skipped",
    ])?;

    for row in rows {
        wtr.write_record([
            &row.horizon_label(),
            &row.samples.to_string(),
            &format!("{:.6}", row.hit_rate),
            &format!("{:.6}", row.mean),
            &format!("{:.6}", row.median),
            &format!("{:.6}", row.std_dev),
            &format!("{:.6}", row.reward_risk),
            &row.skipped.to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export the signal tape as CSV.
///
/// Columns: symbol, as_of, window_start, window_end, owners, total_usd,
/// qualifies.
pub fn export_signals_csv(signals: &[Signal]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "symbol",
        "as_of",
        "window_start",
        "window_end",
        "owners",
        "total_usd",
        "qualifies",
    ])?;

    for s in signals {
        wtr.write_record([
            &s.symbol,
            &s.as_of.to_string(),
            &s.window_start.to_string(),
            &s.window_end.to_string(),
            &s.owners.to_string(),
            &format!("{:.2}", s.total_usd),
            &s.qualifies.to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Markdown report ────────────────────────────────────────────────

/// Generate a Markdown summary for a single run.
pub fn generate_report(report: &BacktestReport) -> String {
    let mut md = String::with_capacity(1024);

    md.push_str("# Insider Signal Backtest\n\n");

    md.push_str("## Run\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Run ID | {} |\n", report.run_id));
    md.push_str(&format!(
        "| Window | {} days |\n",
        report.config.signal.window_days
    ));
    md.push_str(&format!(
        "| Thresholds | {} owners / ${:.0} |\n",
        report.config.signal.min_owners, report.config.signal.min_usd
    ));
    md.push_str(&format!(
        "| Cost | {} bps per side |\n",
        report.config.backtest.cost_bps
    ));
    md.push_str(&format!("| Signals | {} |\n", report.signal_count));
    md.push_str(&format!(
        "| Pairs | {} evaluated, {} skipped |\n",
        report.evaluated, report.skipped
    ));
    md.push('\n');

    md.push_str("## Forward Returns (net of cost)\n\n");
    md.push_str("| Horizon | Samples | Hit Rate | Mean | Median | Std Dev | Reward/Risk | Skipped |\n");
    md.push_str("| --- | ---: | ---: | ---: | ---: | ---: | ---: | ---: |\n");
    for row in &report.rows {
        md.push_str(&format!(
            "| {} | {} | {:.1}% | {:.3}% | {:.3}% | {:.3}% | {:.3} | {} |\n",
            row.horizon_label(),
            row.samples,
            row.hit_rate * 100.0,
            row.mean * 100.0,
            row.median * 100.0,
            row.std_dev * 100.0,
            row.reward_risk,
            row.skipped,
        ));
    }
    md.push('\n');

    md
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a run.
///
/// Creates `{run_id_prefix}_{timestamp}/` under `output_dir` containing
/// `report.json`, `report.csv`, `signals.csv`, and `report.md`. Returns
/// the created directory.
pub fn save_artifacts(report: &BacktestReport, output_dir: &Path) -> Result<PathBuf> {
    let prefix: String = report.run_id.chars().take(8).collect();
    let dirname = format!(
        "{}_{}",
        prefix,
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    std::fs::write(run_dir.join("report.json"), export_json(report)?)?;
    std::fs::write(run_dir.join("report.csv"), export_report_csv(&report.rows)?)?;
    std::fs::write(run_dir.join("signals.csv"), export_signals_csv(&report.signals)?)?;
    std::fs::write(run_dir.join("report.md"), generate_report(report))?;

    Ok(run_dir)
}

/// Load a report back from an artifact directory, rejecting unknown
/// schema versions.
pub fn load_artifacts(dir: &Path) -> Result<BacktestReport> {
    let path = dir.join("report.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_row(horizon: Option<u32>) -> ReportRow {
        ReportRow {
            horizon,
            samples: 42,
            hit_rate: 0.55,
            mean: 0.012,
            median: 0.008,
            std_dev: 0.04,
            reward_risk: 0.3,
            skipped: 3,
        }
    }

    fn sample_signal() -> Signal {
        let as_of = NaiveDate::from_ymd_opt(2024, 1, 6).unwrap();
        Signal {
            symbol: "ABC".into(),
            as_of,
            window_start: as_of - chrono::Duration::days(14),
            window_end: as_of,
            owners: 2,
            total_usd: 350_000.0,
            qualifies: true,
        }
    }

    fn sample_report() -> BacktestReport {
        let config = BacktestConfig::default();
        BacktestReport {
            schema_version: SCHEMA_VERSION,
            run_id: config.run_id(),
            config,
            rows: vec![sample_row(Some(5)), sample_row(Some(21)), sample_row(None)],
            signals: vec![sample_signal()],
            signal_count: 1,
            evaluated: 84,
            skipped: 6,
        }
    }

    // ─── JSON round-trip ────────────────────────────────────────────

    #[test]
    fn json_roundtrip() {
        let original = sample_report();
        let json = export_json(&original).unwrap();
        let restored = import_json(&json).unwrap();

        assert_eq!(restored.schema_version, SCHEMA_VERSION);
        assert_eq!(restored.run_id, original.run_id);
        assert_eq!(restored.rows, original.rows);
        assert_eq!(restored.signals, original.signals);
        assert_eq!(restored.config, original.config);
    }

    #[test]
    fn json_rejects_unknown_version() {
        let mut report = sample_report();
        report.schema_version = 99;
        let json = export_json(&report).unwrap();
        let err = import_json(&json).unwrap_err();
        assert!(err.to_string().contains("unsupported schema version 99"));
    }

    // ─── CSV ────────────────────────────────────────────────────────

    #[test]
    fn report_csv_columns_and_labels() {
        let csv = export_report_csv(&[sample_row(Some(5)), sample_row(None)]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "horizon,samples,hit_rate,mean,median,std_dev,reward_risk,skipped"
        );
        assert!(lines[1].starts_with("5d,42,0.550000"));
        assert!(lines[2].starts_with("overall,42"));
    }

    #[test]
    fn signals_csv_content() {
        let csv = export_signals_csv(&[sample_signal()]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "symbol,as_of,window_start,window_end,owners,total_usd,qualifies"
        );
        assert!(lines[1].contains("ABC,2024-01-06"));
        assert!(lines[1].contains("350000.00"));
        assert!(lines[1].ends_with("true"));
    }

    #[test]
    fn empty_signal_tape_is_header_only() {
        let csv = export_signals_csv(&[]).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }

    // ─── Markdown ───────────────────────────────────────────────────

    #[test]
    fn markdown_report_has_sections() {
        let md = generate_report(&sample_report());
        assert!(md.contains("# Insider Signal Backtest"));
        assert!(md.contains("## Run"));
        assert!(md.contains("## Forward Returns"));
        assert!(md.contains("| 5d | 42 |"));
        assert!(md.contains("| overall |"));
    }

    // ─── Artifacts ──────────────────────────────────────────────────

    #[test]
    fn save_load_artifacts_roundtrip() {
        let report = sample_report();
        let dir = tempfile::tempdir().unwrap();
        let run_dir = save_artifacts(&report, dir.path()).unwrap();

        assert!(run_dir.join("report.json").exists());
        assert!(run_dir.join("report.csv").exists());
        assert!(run_dir.join("signals.csv").exists());
        assert!(run_dir.join("report.md").exists());

        let loaded = load_artifacts(&run_dir).unwrap();
        assert_eq!(loaded.run_id, report.run_id);
        assert_eq!(loaded.rows, report.rows);
    }
}
