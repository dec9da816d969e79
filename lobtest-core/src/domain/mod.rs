//! Domain types for lobtest.

pub mod decision;
pub mod snapshot;
pub mod trade;

pub use decision::{Action, Decision};
pub use snapshot::{BookLevel, Snapshot, DEPTH};
pub use trade::TradeRecord;

/// Symbol type alias
pub type Symbol = String;
