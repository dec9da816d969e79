//! Data ingestion — snapshot CSV records validated at the boundary.

pub mod loader;

pub use loader::{fingerprint, read_many, read_snapshots, DataError, FIELD_COUNT};
