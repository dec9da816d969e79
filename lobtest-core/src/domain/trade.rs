//! TradeRecord — one executed position change in the simulation log.

use super::Action;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of the ordered trade log.
///
/// `total_after` is the account total immediately after the trade, fees
/// applied: the running value the next trade compounds from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    pub action: Action,
    pub shares: f64,
    pub price: f64,
    pub total_after: f64,
    pub timestamp: DateTime<Utc>,
}
