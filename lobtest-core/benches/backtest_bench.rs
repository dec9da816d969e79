//! Criterion benchmarks for the backtest hot paths.
//!
//! Benchmarks:
//! 1. SMA precompute over a long price series
//! 2. Signal generation (both averages + state machine sweep)
//! 3. Full pipeline: generate + simulate

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use chrono::{TimeZone, Utc};
use lobtest_core::config::BacktestConfig;
use lobtest_core::domain::{BookLevel, Snapshot, DEPTH};
use lobtest_core::indicators::Sma;
use lobtest_core::signal::{self, SignalConfig};
use lobtest_core::sim::{simulate, SimConfig};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_snapshots(n: usize) -> Vec<Snapshot> {
    (0..n)
        .map(|i| {
            let wb = 100.0 + (i as f64 * 0.001).sin() * 5.0;
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

fn bench_sma(c: &mut Criterion) {
    let mut group = c.benchmark_group("sma");
    for &n in &[10_000usize, 100_000] {
        let series: Vec<f64> = (0..n).map(|i| 100.0 + (i as f64 * 0.001).sin()).collect();
        group.bench_with_input(BenchmarkId::new("window_1000", n), &series, |b, series| {
            b.iter(|| black_box(Sma::new(1_000).compute(series)));
        });
    }
    group.finish();
}

fn bench_generate(c: &mut Criterion) {
    let snapshots = make_snapshots(100_000);
    let cfg = SignalConfig {
        short_window: 1_500,
        long_window: 6_000,
        latency_offset: 35,
    };
    c.bench_function("generate_100k", |b| {
        b.iter(|| black_box(signal::generate(&snapshots, &cfg)));
    });
}

fn bench_full_pipeline(c: &mut Criterion) {
    let snapshots = make_snapshots(100_000);
    let cfg = SignalConfig {
        short_window: 1_500,
        long_window: 6_000,
        latency_offset: 35,
    };
    let sim_cfg = SimConfig {
        initial_total: 100.0,
        base: 100.0,
        fee_rate: 1e-4,
    };
    c.bench_function("pipeline_100k", |b| {
        b.iter(|| {
            let decisions = signal::generate(&snapshots, &cfg);
            black_box(simulate(&decisions, &sim_cfg))
        });
    });

    let config = BacktestConfig {
        short_window: 1_500,
        long_window: 6_000,
        ..Default::default()
    };
    c.bench_function("run_backtest_100k", |b| {
        b.iter(|| black_box(lobtest_core::backtest::run_backtest(&snapshots, &config)));
    });
}

criterion_group!(benches, bench_sma, bench_generate, bench_full_pipeline);
criterion_main!(benches);
