//! Execution simulation — sequential long-only position changes with
//! proportional fees.
//!
//! The simulator consumes the decision sequence strictly in order,
//! compounding one account total through it. Boundary conditions around the
//! start of the backtest window are tracked by named flags on the state
//! struct, not by decision positions, so a re-filtered sequence keeps its
//! semantics.

use crate::domain::{Action, Decision, TradeRecord};
use serde::{Deserialize, Serialize};

/// Parameters for the execution simulator.
#[derive(Debug, Clone, Copy)]
pub struct SimConfig {
    /// Account total at the start of the run.
    pub initial_total: f64,
    /// Base capital: the denominator of the reported return and the sizing
    /// anchor for the leading-sell bootstrap.
    pub base: f64,
    /// Proportional fee per trade, on traded notional. One basis point
    /// (0.0001) unless configured otherwise.
    pub fee_rate: f64,
}

/// Outcome of a simulated decision sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimReport {
    pub final_total: f64,
    pub base: f64,
    /// Ordered trade log. A leading sell's entry is discarded after the
    /// run; its account-state effects are not.
    pub trades: Vec<TradeRecord>,
    /// Decisions consumed without executing (depleted-total guard).
    pub skipped: usize,
}

impl SimReport {
    /// Realized return versus base capital, in percent. Callers format to
    /// three decimal places for display.
    pub fn return_pct(&self) -> f64 {
        (self.final_total / self.base - 1.0) * 100.0
    }
}

/// Sequential account-state machine: fully invested or fully flat.
#[derive(Debug)]
pub struct ExecutionSimulator {
    fee_rate: f64,
    base: f64,
    total: f64,
    shares: f64,
    processed: usize,
    /// The first processed decision was a sell: a backtest-window
    /// artifact, not a genuine opening trade. Its log entry is removed
    /// when the run finishes.
    leading_sell: bool,
    /// The next buy is the first buy after a leading sell and re-anchors
    /// `total` to `base` before computing.
    post_sell_reset_due: bool,
    skipped: usize,
    trades: Vec<TradeRecord>,
}

impl ExecutionSimulator {
    pub fn new(cfg: &SimConfig) -> Self {
        Self {
            fee_rate: cfg.fee_rate,
            base: cfg.base,
            total: cfg.initial_total,
            shares: 0.0,
            processed: 0,
            leading_sell: false,
            post_sell_reset_due: false,
            skipped: 0,
            trades: Vec::new(),
        }
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn shares(&self) -> f64 {
        self.shares
    }

    /// Consume one decision, mutating the account state.
    pub fn apply(&mut self, decision: &Decision) {
        match decision.action {
            Action::Buy => self.buy(decision),
            Action::Sell => self.sell(decision),
        }
        self.processed += 1;
    }

    fn buy(&mut self, decision: &Decision) {
        // A buy against a depleted total would manufacture a negative
        // position; skip it, mirroring the sell-side guard.
        if self.total <= 0.0 {
            self.skipped += 1;
            return;
        }
        if self.post_sell_reset_due {
            self.total = self.base;
            self.post_sell_reset_due = false;
        }
        let price = decision.ask_ref;
        let amount = self.total * (1.0 - self.fee_rate);
        self.shares = amount / price;
        // Re-mark to the trade price: post-fee capital fully redeployed.
        self.total = self.shares * price;
        self.trades.push(TradeRecord {
            action: Action::Buy,
            shares: self.shares,
            price,
            total_after: self.total,
            timestamp: decision.timestamp,
        });
    }

    fn sell(&mut self, decision: &Decision) {
        if self.total <= 0.0 {
            self.skipped += 1;
            return;
        }
        let price = decision.bid_ref;
        if self.processed == 0 {
            // No prior position to unwind: size a starting long position
            // off the base capital at the current price.
            self.shares = self.base / price;
            self.leading_sell = true;
            self.post_sell_reset_due = true;
        }
        self.total = self.shares * price;
        self.total *= 1.0 - self.fee_rate;
        self.trades.push(TradeRecord {
            action: Action::Sell,
            shares: self.shares,
            price,
            total_after: self.total,
            timestamp: decision.timestamp,
        });
    }

    /// Freeze the account state and produce the report.
    pub fn finish(mut self) -> SimReport {
        if self.leading_sell && !self.trades.is_empty() {
            // A sell cannot open a long-only run; drop the log entry, keep
            // the account-state effects.
            self.trades.remove(0);
        }
        SimReport {
            final_total: self.total,
            base: self.base,
            trades: self.trades,
            skipped: self.skipped,
        }
    }
}

/// Run the full decision sequence through a fresh simulator.
pub fn simulate(decisions: &[Decision], cfg: &SimConfig) -> SimReport {
    let mut sim = ExecutionSimulator::new(cfg);
    for decision in decisions {
        sim.apply(decision);
    }
    sim.finish()
}
