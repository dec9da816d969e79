//! Decision — directional intent emitted on a crossover transition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trade direction. Holds are never materialized: a run of identical
/// signals produces a single decision at its leading edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Buy,
    Sell,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Buy => write!(f, "BUY"),
            Action::Sell => write!(f, "SELL"),
        }
    }
}

/// One emitted decision, carrying the latency-shifted reference prices and
/// the moving averages that produced it.
///
/// `timestamp` is the deciding snapshot's receive time. `bid_ref` and
/// `ask_ref` come from the snapshot `latency_offset` positions ahead, the
/// price expected to be actionable once the order reaches the market.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub timestamp: DateTime<Utc>,
    pub bid_ref: f64,
    pub ask_ref: f64,
    pub sma_short: f64,
    pub sma_long: f64,
    pub action: Action,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn action_display() {
        assert_eq!(Action::Buy.to_string(), "BUY");
        assert_eq!(Action::Sell.to_string(), "SELL");
    }

    #[test]
    fn decision_serialization_roundtrip() {
        let decision = Decision {
            timestamp: Utc.timestamp_millis_opt(1_546_300_800_123).unwrap(),
            bid_ref: 99.1,
            ask_ref: 101.1,
            sma_short: 100.0,
            sma_long: 100.5,
            action: Action::Sell,
        };
        let json = serde_json::to_string(&decision).unwrap();
        let deser: Decision = serde_json::from_str(&json).unwrap();
        assert_eq!(decision.action, deser.action);
        assert_eq!(decision.bid_ref, deser.bid_ref);
        assert_eq!(decision.timestamp, deser.timestamp);
    }
}
