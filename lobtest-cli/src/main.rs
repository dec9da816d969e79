//! LobTest CLI — run order-book crossover backtests and inspect data files.
//!
//! Commands:
//! - `run` — load snapshot CSVs, run the backtest, print the trade log
//! - `inspect` — report row count, time span, arrival rate, and the
//!   suggested latency offset for a given latency budget

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use lobtest_core::backtest::run_backtest;
use lobtest_core::config::BacktestConfig;
use lobtest_core::data::read_many;
use lobtest_core::signal::{estimate_arrival_rate, offset_for_arrival_rate};

#[derive(Parser)]
#[command(
    name = "lobtest",
    about = "LobTest CLI — order-book crossover backtesting engine"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a backtest over one or more snapshot CSV files.
    Run {
        /// Snapshot CSV files, in time order (later files continue
        /// earlier ones).
        #[arg(long, required = true, num_args = 1..)]
        data: Vec<PathBuf>,

        /// Path to a TOML config file. Flags below override it.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Short SMA window, in observations.
        #[arg(long)]
        short_window: Option<usize>,

        /// Long SMA window, in observations.
        #[arg(long)]
        long_window: Option<usize>,

        /// Forward shift for reference prices, in observations.
        #[arg(long)]
        latency_offset: Option<usize>,

        /// Proportional fee per trade (0.0001 = one basis point).
        #[arg(long)]
        fee_rate: Option<f64>,

        /// Base capital: return denominator and bootstrap sizing anchor.
        #[arg(long)]
        base: Option<f64>,

        /// Account total at the start of the run. Defaults to base.
        #[arg(long)]
        initial_total: Option<f64>,

        /// Output directory for the result JSON. No artifact when omitted.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Report row count, time span, and arrival rate for snapshot files.
    Inspect {
        /// Snapshot CSV files, in time order.
        #[arg(long, required = true, num_args = 1..)]
        data: Vec<PathBuf>,

        /// Latency budget for the suggested offset, in milliseconds.
        #[arg(long, default_value_t = 100)]
        latency_ms: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            data,
            config,
            short_window,
            long_window,
            latency_offset,
            fee_rate,
            base,
            initial_total,
            output_dir,
        } => run_command(
            &data,
            config.as_deref(),
            short_window,
            long_window,
            latency_offset,
            fee_rate,
            base,
            initial_total,
            output_dir.as_deref(),
        ),
        Commands::Inspect { data, latency_ms } => inspect_command(&data, latency_ms),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_command(
    data: &[PathBuf],
    config_path: Option<&std::path::Path>,
    short_window: Option<usize>,
    long_window: Option<usize>,
    latency_offset: Option<usize>,
    fee_rate: Option<f64>,
    base: Option<f64>,
    initial_total: Option<f64>,
    output_dir: Option<&std::path::Path>,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => BacktestConfig::from_toml_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => BacktestConfig::default(),
    };
    if let Some(v) = short_window {
        config.short_window = v;
    }
    if let Some(v) = long_window {
        config.long_window = v;
    }
    if let Some(v) = latency_offset {
        config.latency_offset = v;
    }
    if let Some(v) = fee_rate {
        config.fee_rate = v;
    }
    if let Some(v) = base {
        config.base = v;
        config.initial_total = v;
    }
    if let Some(v) = initial_total {
        config.initial_total = v;
    }
    config.validate()?;

    let snapshots = read_many(data).context("loading snapshot files")?;
    let result = run_backtest(&snapshots, &config)?;

    println!("{result}");

    if !result.trades.is_empty() {
        println!();
        println!(
            "{:<6} {:>14} {:>12} {:>14}  {}",
            "Action", "Shares", "Price", "Total", "Time"
        );
        println!("{}", "-".repeat(76));
        for trade in &result.trades {
            println!(
                "{:<6} {:>14.6} {:>12.4} {:>14.4}  {}",
                trade.action.to_string(),
                trade.shares,
                trade.price,
                trade.total_after,
                trade.timestamp.format("%Y-%m-%d %H:%M:%S%.3f")
            );
        }
    }

    if let Some(dir) = output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating output directory {}", dir.display()))?;
        let path = dir.join(format!("{}.json", result.run_id));
        let json = serde_json::to_string_pretty(&result)?;
        std::fs::write(&path, json)
            .with_context(|| format!("writing result {}", path.display()))?;
        println!();
        println!("Result saved to: {}", path.display());
    }

    Ok(())
}

fn inspect_command(data: &[PathBuf], latency_ms: u64) -> Result<()> {
    let snapshots = read_many(data).context("loading snapshot files")?;
    let (first, last) = match (snapshots.first(), snapshots.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => bail!("no snapshots in the given files"),
    };
    let span = last.received_at - first.received_at;
    let insane = snapshots.iter().filter(|s| !s.is_sane()).count();

    println!("Snapshots: {}", snapshots.len());
    println!("Symbol:    {}", first.symbol);
    println!(
        "From:      {}",
        first.received_at.format("%Y-%m-%d %H:%M:%S%.3f")
    );
    println!(
        "To:        {}",
        last.received_at.format("%Y-%m-%d %H:%M:%S%.3f")
    );
    println!(
        "Span:      {:.1}s",
        span.num_milliseconds() as f64 / 1000.0
    );

    match estimate_arrival_rate(&snapshots) {
        Some(rate) => {
            println!("Rate:      {rate:.1} snapshots/s");
            println!(
                "Offset:    {} (for a {latency_ms} ms latency budget)",
                offset_for_arrival_rate(rate, latency_ms)
            );
        }
        None => println!("Rate:      undefined (zero span)"),
    }

    if insane > 0 {
        println!("Warning:   {insane} snapshots fail book sanity checks");
    }

    Ok(())
}
