//! LobTest Core — order-book crossover backtesting engine.
//!
//! This crate contains the whole of the backtest:
//! - Domain types (snapshots, decisions, trade records)
//! - CSV snapshot ingestion with fail-fast boundary validation
//! - SMA precompute over the worst-bid series
//! - Edge-triggered crossover signal generation with latency compensation
//! - Sequential long-only execution simulation with proportional fees
//!
//! Everything downstream of ingestion is a pure function of the snapshot
//! sequence and the configuration.

pub mod backtest;
pub mod config;
pub mod data;
pub mod domain;
pub mod indicators;
pub mod signal;
pub mod sim;
