//! Crossover signal generation — an edge-triggered two-state machine.
//!
//! For every observation where both moving averages exist, the generator
//! resolves a bias (short SMA at or above long SMA = long bias, below =
//! short bias) and emits a decision only when the bias changes. Reference
//! prices are taken `latency_offset` snapshots ahead of the deciding
//! observation, so the decision is priced at the book expected to be
//! reachable once the order arrives at the market.

use crate::domain::{Action, Decision, Snapshot};
use crate::indicators::Sma;

/// Parameters for signal generation.
#[derive(Debug, Clone, Copy)]
pub struct SignalConfig {
    /// Short SMA window, in observations.
    pub short_window: usize,
    /// Long SMA window, in observations. Must exceed `short_window`.
    pub long_window: usize,
    /// Forward shift applied to reference prices, in observations.
    pub latency_offset: usize,
}

/// Bias of the crossover signal at one observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalState {
    LongBias,
    ShortBias,
}

impl SignalState {
    /// Resolve the bias from the two averages. Ties resolve long.
    pub fn from_smas(sma_short: f64, sma_long: f64) -> Self {
        if sma_short >= sma_long {
            SignalState::LongBias
        } else {
            SignalState::ShortBias
        }
    }

    pub fn action(self) -> Action {
        match self {
            SignalState::LongBias => Action::Buy,
            SignalState::ShortBias => Action::Sell,
        }
    }

    /// Edge-triggered emission: an action is produced only when the state
    /// changes. The first evaluated observation has no predecessor and
    /// always emits, seeding the machine.
    pub fn transition(prev: Option<SignalState>, next: SignalState) -> Option<Action> {
        match prev {
            Some(p) if p == next => None,
            _ => Some(next.action()),
        }
    }
}

/// Generate the decision sequence for an ordered snapshot sequence.
///
/// Returns an empty sequence when fewer than `long_window` snapshots are
/// available. Observations whose latency shift runs past the end of the
/// series produce no decision: they are dropped, not defaulted.
pub fn generate(snapshots: &[Snapshot], cfg: &SignalConfig) -> Vec<Decision> {
    let n = snapshots.len();
    if n < cfg.long_window {
        return Vec::new();
    }

    let worst_bid: Vec<f64> = snapshots.iter().map(Snapshot::worst_bid).collect();
    let worst_ask: Vec<f64> = snapshots.iter().map(Snapshot::worst_ask).collect();

    // The two windowed reductions are independent; decision emission below
    // stays strictly sequential.
    let (sma_short, sma_long) = rayon::join(
        || Sma::new(cfg.short_window).compute(&worst_bid),
        || Sma::new(cfg.long_window).compute(&worst_bid),
    );

    let mut decisions = Vec::new();
    let mut prev: Option<SignalState> = None;

    let last = n.saturating_sub(cfg.latency_offset);
    for i in (cfg.long_window - 1)..last {
        let shifted = i + cfg.latency_offset;
        let state = SignalState::from_smas(sma_short[i], sma_long[i]);
        if let Some(action) = SignalState::transition(prev, state) {
            decisions.push(Decision {
                timestamp: snapshots[i].received_at,
                bid_ref: worst_bid[shifted],
                ask_ref: worst_ask[shifted],
                sma_short: sma_short[i],
                sma_long: sma_long[i],
                action,
            });
        }
        prev = Some(state);
    }

    decisions
}

/// Estimate the snapshot arrival rate over the sequence span, in snapshots
/// per second. `None` for sequences too short to span any time.
pub fn estimate_arrival_rate(snapshots: &[Snapshot]) -> Option<f64> {
    let first = snapshots.first()?;
    let last = snapshots.last()?;
    let span_ms = (last.received_at - first.received_at).num_milliseconds();
    if span_ms <= 0 {
        return None;
    }
    Some((snapshots.len() - 1) as f64 * 1000.0 / span_ms as f64)
}

/// Number of observations expected to arrive within `latency_ms` at the
/// given rate: the forward shift that aligns a decision with the first
/// actionable book.
pub fn offset_for_arrival_rate(snaps_per_sec: f64, latency_ms: u64) -> usize {
    (snaps_per_sec * latency_ms as f64 / 1000.0).round() as usize
}
