//! Backtest orchestration — wires the snapshot sequence through the signal
//! generator and the execution simulator.
//!
//! The whole run is a pure function of (snapshots, config): no shared state
//! across invocations, no I/O, no clock reads.

use crate::config::{BacktestConfig, ConfigError};
use crate::data;
use crate::domain::{Snapshot, TradeRecord};
use crate::signal;
use crate::sim;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Complete result of a single backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Content hash of the configuration.
    pub run_id: String,
    /// Content hash of the ingested snapshot sequence.
    pub dataset_hash: String,
    pub snapshot_count: usize,
    pub decision_count: usize,
    /// Decisions consumed without executing (depleted-total guard).
    pub skipped_decisions: usize,
    pub final_total: f64,
    /// Realized return versus base capital, in percent.
    pub return_pct: f64,
    pub trades: Vec<TradeRecord>,
    pub config: BacktestConfig,
}

impl fmt::Display for BacktestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Run:        {}", &self.run_id[..12.min(self.run_id.len())])?;
        writeln!(f, "Snapshots:  {}", self.snapshot_count)?;
        writeln!(
            f,
            "Decisions:  {} ({} trades, {} skipped)",
            self.decision_count,
            self.trades.len(),
            self.skipped_decisions
        )?;
        writeln!(f, "Final:      {:.4}", self.final_total)?;
        write!(f, "Return:     {:.3}%", self.return_pct)
    }
}

/// Run one backtest over an ordered snapshot sequence.
///
/// Fewer snapshots than `long_window` is not an error: the decision
/// sequence is empty and the reported return is 0% (when `initial_total`
/// equals `base`).
pub fn run_backtest(
    snapshots: &[Snapshot],
    config: &BacktestConfig,
) -> Result<BacktestResult, ConfigError> {
    config.validate()?;

    let decisions = signal::generate(snapshots, &config.signal());
    let report = sim::simulate(&decisions, &config.sim());

    Ok(BacktestResult {
        run_id: config.run_id(),
        dataset_hash: data::fingerprint(snapshots),
        snapshot_count: snapshots.len(),
        decision_count: decisions.len(),
        skipped_decisions: report.skipped,
        final_total: report.final_total,
        return_pct: report.return_pct(),
        trades: report.trades,
        config: config.clone(),
    })
}
