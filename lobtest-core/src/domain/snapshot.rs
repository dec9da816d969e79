//! Snapshot — one limit-order-book observation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Symbol;

/// Number of displayed price levels per book side.
pub const DEPTH: usize = 10;

/// One price level of the displayed book.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BookLevel {
    pub price: f64,
    pub qty: f64,
}

/// One order-book observation for a single instrument.
///
/// Levels are indexed from the top of book: `bids[0]`/`asks[0]` is the best
/// displayed level, `bids[DEPTH - 1]`/`asks[DEPTH - 1]` the deepest.
/// A snapshot sequence is ordered by `received_at`, non-decreasing, and is
/// immutable once ingested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub symbol: Symbol,
    /// Matching-engine timestamp.
    pub matched_at: DateTime<Utc>,
    /// Local receive timestamp, millisecond precision. Orders the sequence.
    pub received_at: DateTime<Utc>,
    pub bids: [BookLevel; DEPTH],
    pub asks: [BookLevel; DEPTH],
}

impl Snapshot {
    pub fn best_bid(&self) -> f64 {
        self.bids[0].price
    }

    pub fn best_ask(&self) -> f64 {
        self.asks[0].price
    }

    /// Lowest displayed bid, the conservative sell-side reference price.
    pub fn worst_bid(&self) -> f64 {
        self.bids[DEPTH - 1].price
    }

    /// Highest displayed ask, the conservative buy-side reference price.
    pub fn worst_ask(&self) -> f64 {
        self.asks[DEPTH - 1].price
    }

    /// Basic book sanity: finite positive prices, non-negative quantities,
    /// bids non-increasing, asks non-decreasing, book not crossed.
    pub fn is_sane(&self) -> bool {
        let levels_ok = self
            .bids
            .iter()
            .chain(self.asks.iter())
            .all(|l| l.price.is_finite() && l.price > 0.0 && l.qty.is_finite() && l.qty >= 0.0);
        if !levels_ok {
            return false;
        }
        let bids_ordered = self.bids.windows(2).all(|w| w[0].price >= w[1].price);
        let asks_ordered = self.asks.windows(2).all(|w| w[0].price <= w[1].price);
        bids_ordered && asks_ordered && self.best_ask() >= self.best_bid()
    }
}
