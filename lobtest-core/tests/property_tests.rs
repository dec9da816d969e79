//! Property tests for pipeline invariants.
//!
//! Uses proptest to verify:
//! 1. Determinism — identical input and config give identical results
//! 2. Hold suppression — adjacent decisions never share an action
//! 3. Long-only bound — logged shares and totals stay positive
//! 4. Fee monotonicity — every trade ends below its pre-fee notional
//! 5. Latency bound — reference prices always come from a real snapshot

use chrono::{TimeZone, Utc};
use lobtest_core::config::BacktestConfig;
use lobtest_core::domain::{Action, BookLevel, Snapshot, DEPTH};
use lobtest_core::signal::{self, SignalConfig};
use lobtest_core::sim::{simulate, SimConfig};
use proptest::prelude::*;

fn make_snapshots(worst_bids: &[f64]) -> Vec<Snapshot> {
    worst_bids
        .iter()
        .enumerate()
        .map(|(i, &wb)| {
            let wa = wb + 2.0;
            let bids: [BookLevel; DEPTH] = std::array::from_fn(|level| BookLevel {
                price: wb + (DEPTH - 1 - level) as f64 * 0.01,
                qty: 1.0,
            });
            let asks: [BookLevel; DEPTH] = std::array::from_fn(|level| BookLevel {
                price: wa - (DEPTH - 1 - level) as f64 * 0.01,
                qty: 1.0,
            });
            let ts = Utc
                .timestamp_millis_opt(1_546_300_800_000 + i as i64 * 25)
                .unwrap();
            Snapshot {
                symbol: "BTCUSD".into(),
                matched_at: ts,
                received_at: ts,
                bids,
                asks,
            }
        })
        .collect()
}

// ── Strategies (proptest) ────────────────────────────────────────────

/// A bounded random walk of worst-bid prices.
fn arb_price_walk() -> impl Strategy<Value = Vec<f64>> {
    proptest::collection::vec(-1.0..1.0_f64, 0..180).prop_map(|steps| {
        let mut price = 100.0;
        steps
            .iter()
            .map(|step| {
                price = (price + step).clamp(50.0, 150.0);
                price
            })
            .collect()
    })
}

fn arb_signal_config() -> impl Strategy<Value = SignalConfig> {
    (2usize..5, 6usize..14, 0usize..6).prop_map(|(short, long, offset)| SignalConfig {
        short_window: short,
        long_window: long,
        latency_offset: offset,
    })
}

proptest! {
    /// Identical input sequence and parameters always produce an identical
    /// decision sequence and final total.
    #[test]
    fn determinism(prices in arb_price_walk(), cfg in arb_signal_config()) {
        let snapshots = make_snapshots(&prices);
        let sim_cfg = SimConfig { initial_total: 100.0, base: 100.0, fee_rate: 1e-4 };

        let first = simulate(&signal::generate(&snapshots, &cfg), &sim_cfg);
        let second = simulate(&signal::generate(&snapshots, &cfg), &sim_cfg);
        prop_assert_eq!(first.final_total, second.final_total);
        prop_assert_eq!(first.trades.len(), second.trades.len());
    }

    /// No two adjacent decisions share an action: holds are suppressed at
    /// the source.
    #[test]
    fn adjacent_decisions_alternate(prices in arb_price_walk(), cfg in arb_signal_config()) {
        let snapshots = make_snapshots(&prices);
        let decisions = signal::generate(&snapshots, &cfg);
        for pair in decisions.windows(2) {
            prop_assert_ne!(pair[0].action, pair[1].action);
        }
    }

    /// Every decision's reference prices come from a real snapshot: the
    /// latency shift truncates at the end of the series instead of
    /// wrapping or defaulting.
    #[test]
    fn latency_shift_is_truncated(prices in arb_price_walk(), cfg in arb_signal_config()) {
        let snapshots = make_snapshots(&prices);
        let decisions = signal::generate(&snapshots, &cfg);

        let evaluable = snapshots
            .len()
            .saturating_sub(cfg.latency_offset)
            .saturating_sub(cfg.long_window - 1);
        prop_assert!(decisions.len() <= evaluable);

        for decision in &decisions {
            prop_assert!(decision.bid_ref.is_finite() && decision.bid_ref > 0.0);
            prop_assert!(decision.ask_ref.is_finite() && decision.ask_ref > 0.0);
            prop_assert!(snapshots.iter().any(|s| s.worst_bid() == decision.bid_ref));
        }
    }

    /// Shares and totals stay positive through any decision sequence the
    /// generator can produce: the strategy is long-only.
    #[test]
    fn long_only_bound(prices in arb_price_walk(), cfg in arb_signal_config()) {
        let snapshots = make_snapshots(&prices);
        let decisions = signal::generate(&snapshots, &cfg);
        let report = simulate(
            &decisions,
            &SimConfig { initial_total: 100.0, base: 100.0, fee_rate: 1e-4 },
        );

        prop_assert!(report.final_total > 0.0);
        prop_assert_eq!(report.skipped, 0);
        for trade in &report.trades {
            prop_assert!(trade.shares > 0.0);
            prop_assert!(trade.total_after > 0.0);
        }
    }

    /// With a positive fee, every trade's resulting total sits strictly
    /// below the pre-fee notional at the same price.
    #[test]
    fn fee_monotonicity(prices in arb_price_walk(), cfg in arb_signal_config()) {
        let snapshots = make_snapshots(&prices);
        let decisions = signal::generate(&snapshots, &cfg);
        let report = simulate(
            &decisions,
            &SimConfig { initial_total: 100.0, base: 100.0, fee_rate: 1e-4 },
        );

        // A leading sell is absent from the log, but its buy successor
        // computes from a total re-anchored to base, so the running-total
        // comparison below stays valid.
        let mut prev_total = 100.0;
        for trade in &report.trades {
            match trade.action {
                Action::Buy => prop_assert!(trade.total_after < prev_total),
                Action::Sell => prop_assert!(trade.total_after < trade.shares * trade.price),
            }
            prev_total = trade.total_after;
        }
    }

    /// Full-pipeline determinism through the public entry point, including
    /// run and dataset hashes.
    #[test]
    fn run_backtest_is_deterministic(prices in arb_price_walk()) {
        let snapshots = make_snapshots(&prices);
        let config = BacktestConfig {
            short_window: 3,
            long_window: 8,
            latency_offset: 2,
            ..Default::default()
        };
        let a = lobtest_core::backtest::run_backtest(&snapshots, &config).unwrap();
        let b = lobtest_core::backtest::run_backtest(&snapshots, &config).unwrap();
        prop_assert_eq!(a.final_total, b.final_total);
        prop_assert_eq!(a.dataset_hash, b.dataset_hash);
        prop_assert_eq!(a.run_id, b.run_id);
    }
}
