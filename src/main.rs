mod app;
mod color;
mod config;
mod data;
mod error;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use app::EnergyDashApp;
use clap::Parser;
use eframe::egui;

use crate::config::{Settings, load_manifest};
use crate::data::loader::{LoadReport, load_sessions};
use crate::data::schema::Schema;
use crate::data::stats::{Summary, summary_table};
use crate::state::AppState;

/// Compare hardware-sensor logs from several monitoring sessions.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Session exports, as PATH or LABEL=PATH (label defaults to the file name)
    sessions: Vec<String>,

    /// TOML manifest listing sessions; its sessions load before the ones given here
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print summary statistics and exit instead of opening the dashboard
    #[arg(long)]
    summary: bool,

    /// Restrict --summary to one session label
    #[arg(long, requires = "summary")]
    source: Option<String>,

    /// Write the merged dataset (.csv or .json) and exit
    #[arg(long)]
    export: Option<PathBuf>,

    /// Debug logging for this crate
    #[arg(short, long)]
    verbose: bool,
}

/// Our own `info` lines, only warnings from eframe/wgpu and friends.
const DEFAULT_LOG_FILTER: &str = "warn,energy_dash=info";

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER));
    if verbose {
        builder.filter_module("energy_dash", log::LevelFilter::Debug);
    }
    builder.init();
}

fn print_summary(report: &LoadReport, settings: &Settings, source: Option<&str>) -> Result<()> {
    let dataset = &report.dataset;
    if let Some(src) = source {
        if !dataset.sources.iter().any(|s| s == src) {
            bail!("Unknown session '{src}' (loaded: {})", dataset.sources.join(", "));
        }
    }

    for (label, stats) in &report.stats {
        println!(
            "{label}: {} of {} rows kept ({} bad timestamp, {} missing required values)",
            stats.kept, stats.rows_read, stats.bad_timestamp, stats.missing_required
        );
    }
    println!();
    println!("--- Statistics for {} ---", source.unwrap_or("Combined"));

    let width = settings
        .summary_columns
        .iter()
        .map(|c| c.chars().count())
        .max()
        .unwrap_or(0);
    print!("{:width$}", "");
    for label in Summary::LABELS {
        print!(" {label:>10}");
    }
    println!();
    for (column, summary) in summary_table(dataset, &settings.summary_columns, source) {
        print!("{column:width$}");
        for cell in summary.cells() {
            print!(" {cell:>10}");
        }
        println!();
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let manifest = cli.config.as_deref().map(load_manifest).transpose()?;
    let settings = Settings::build(manifest.as_ref().zip(cli.config.as_deref()), &cli.sessions)?;
    let schema = Schema::hwinfo();

    let headless = cli.summary || cli.export.is_some();
    if headless && settings.sessions.is_empty() {
        bail!("No sessions given; pass log files or --config");
    }

    let report = load_sessions(&settings.sessions, &schema);

    if headless {
        for msg in report.messages() {
            eprintln!("{msg}");
        }
        if report.dataset.is_empty() {
            bail!("No rows survived normalization");
        }
        if let Some(path) = &cli.export {
            data::export::export_file(&report.dataset, path)
                .with_context(|| format!("exporting to {}", path.display()))?;
        }
        if cli.summary {
            print_summary(&report, &settings, cli.source.as_deref())?;
        }
        return Ok(());
    }

    let mut state = AppState::new(schema, settings.summary_columns);
    if !settings.sessions.is_empty() {
        state.apply_report(report);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([640.0, 420.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Energy Dash – Session Comparison",
        options,
        Box::new(move |_cc| Ok(Box::new(EnergyDashApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("dashboard failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_log_filter_keeps_crate_info_and_quiets_dependencies() {
        let filter = env_logger::filter::Builder::new().parse(DEFAULT_LOG_FILTER).build();
        let record = |target: &str, level: log::Level| {
            filter.matches(&log::Record::builder().target(target).level(level).build())
        };
        assert!(record("energy_dash::data::loader", log::Level::Info));
        assert!(!record("energy_dash::data::loader", log::Level::Debug));
        assert!(!record("eframe", log::Level::Info));
        assert!(record("eframe", log::Level::Warn));
    }

    #[test]
    fn cli_accepts_sessions_and_flags() {
        let cli = Cli::parse_from(["energy-dash", "--summary", "--source", "eco", "eco=a.csv", "b.csv"]);
        assert!(cli.summary);
        assert_eq!(cli.source.as_deref(), Some("eco"));
        assert_eq!(cli.sessions, vec!["eco=a.csv".to_string(), "b.csv".to_string()]);
    }

    #[test]
    fn source_requires_summary() {
        assert!(Cli::try_parse_from(["energy-dash", "--source", "eco", "a.csv"]).is_err());
    }
}
