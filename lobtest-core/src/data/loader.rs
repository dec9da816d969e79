//! Snapshot ingestion — 43-column CSV records, fail-fast.
//!
//! Record layout: matching time, receiving time, symbol, then ten
//! (bid price, bid qty, ask price, ask qty) level groups from the top of
//! book down. A malformed row rejects the entire run; skipping rows would
//! corrupt the rolling moving-average state downstream.

use crate::domain::{BookLevel, Snapshot, DEPTH};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use std::fs::File;
use std::path::Path;
use thiserror::Error;

/// Fields per record: two timestamps, symbol, then DEPTH levels per side
/// interleaved as (bid price, bid qty, ask price, ask qty).
pub const FIELD_COUNT: usize = 3 + DEPTH * 4;

/// Tokens treated as a missing value. Any of these in a numeric or
/// timestamp field rejects the run.
const NULL_TOKENS: [&str; 3] = ["null", "NULL", "NaN"];

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },
    #[error("csv error in {path}: {source}")]
    Csv { path: String, source: csv::Error },
    #[error("{path} line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        path: String,
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("{path} line {line}, field {field}: null value")]
    NullField { path: String, line: u64, field: usize },
    #[error("{path} line {line}, field {field}: invalid number '{value}'")]
    BadNumber {
        path: String,
        line: u64,
        field: usize,
        value: String,
    },
    #[error("{path} line {line}, field {field}: non-positive price {value}")]
    NonPositivePrice {
        path: String,
        line: u64,
        field: usize,
        value: f64,
    },
    #[error("{path} line {line}, field {field}: invalid timestamp '{value}'")]
    BadTimestamp {
        path: String,
        line: u64,
        field: usize,
        value: String,
    },
    #[error("{path} line {line}: receive timestamp moves backwards")]
    OutOfOrder { path: String, line: u64 },
}

/// Read one snapshot file. A leading header row is detected (first record
/// whose first field is not a timestamp) and skipped.
pub fn read_snapshots(path: impl AsRef<Path>) -> Result<Vec<Snapshot>, DataError> {
    let mut snapshots = Vec::new();
    let mut last_received: Option<DateTime<Utc>> = None;
    read_into(path.as_ref(), &mut snapshots, &mut last_received)?;
    Ok(snapshots)
}

/// Read several files in argument order into one contiguous sequence.
///
/// Later files must continue earlier ones: the non-decreasing receive-time
/// invariant is enforced across file seams, so a mis-ordered pair of files
/// rejects the run instead of silently reordering history.
pub fn read_many<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<Snapshot>, DataError> {
    let mut snapshots = Vec::new();
    let mut last_received: Option<DateTime<Utc>> = None;
    for path in paths {
        read_into(path.as_ref(), &mut snapshots, &mut last_received)?;
    }
    Ok(snapshots)
}

fn read_into(
    path: &Path,
    out: &mut Vec<Snapshot>,
    last_received: &mut Option<DateTime<Utc>>,
) -> Result<(), DataError> {
    let display = path.display().to_string();
    let file = File::open(path).map_err(|source| DataError::Open {
        path: display.clone(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| DataError::Csv {
            path: display.clone(),
            source: e,
        })?;
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(index as u64 + 1);

        // Header detection: only the very first record may fail timestamp
        // parsing without rejecting the run.
        if index == 0 && parse_timestamp(record.get(0).unwrap_or("")).is_none() {
            continue;
        }

        if record.len() != FIELD_COUNT {
            return Err(DataError::FieldCount {
                path: display.clone(),
                line,
                expected: FIELD_COUNT,
                found: record.len(),
            });
        }

        let snapshot = parse_record(&record, &display, line)?;
        if let Some(prev) = *last_received {
            if snapshot.received_at < prev {
                return Err(DataError::OutOfOrder {
                    path: display.clone(),
                    line,
                });
            }
        }
        *last_received = Some(snapshot.received_at);
        out.push(snapshot);
    }

    Ok(())
}

fn parse_record(
    record: &csv::StringRecord,
    path: &str,
    line: u64,
) -> Result<Snapshot, DataError> {
    let matched_at = timestamp_field(record, 0, path, line)?;
    let received_at = timestamp_field(record, 1, path, line)?;
    let symbol = record.get(2).unwrap_or("").to_string();

    let mut bids = [BookLevel { price: 0.0, qty: 0.0 }; DEPTH];
    let mut asks = [BookLevel { price: 0.0, qty: 0.0 }; DEPTH];
    for level in 0..DEPTH {
        let base = 3 + level * 4;
        bids[level] = BookLevel {
            price: price_field(record, base, path, line)?,
            qty: numeric_field(record, base + 1, path, line)?,
        };
        asks[level] = BookLevel {
            price: price_field(record, base + 2, path, line)?,
            qty: numeric_field(record, base + 3, path, line)?,
        };
    }

    Ok(Snapshot {
        symbol,
        matched_at,
        received_at,
        bids,
        asks,
    })
}

fn timestamp_field(
    record: &csv::StringRecord,
    field: usize,
    path: &str,
    line: u64,
) -> Result<DateTime<Utc>, DataError> {
    let raw = record.get(field).unwrap_or("");
    if is_null(raw) {
        return Err(DataError::NullField {
            path: path.to_string(),
            line,
            field,
        });
    }
    parse_timestamp(raw).ok_or_else(|| DataError::BadTimestamp {
        path: path.to_string(),
        line,
        field,
        value: raw.to_string(),
    })
}

fn numeric_field(
    record: &csv::StringRecord,
    field: usize,
    path: &str,
    line: u64,
) -> Result<f64, DataError> {
    let raw = record.get(field).unwrap_or("");
    if is_null(raw) {
        return Err(DataError::NullField {
            path: path.to_string(),
            line,
            field,
        });
    }
    let value: f64 = raw.parse().map_err(|_| DataError::BadNumber {
        path: path.to_string(),
        line,
        field,
        value: raw.to_string(),
    })?;
    if !value.is_finite() {
        return Err(DataError::BadNumber {
            path: path.to_string(),
            line,
            field,
            value: raw.to_string(),
        });
    }
    Ok(value)
}

fn price_field(
    record: &csv::StringRecord,
    field: usize,
    path: &str,
    line: u64,
) -> Result<f64, DataError> {
    let value = numeric_field(record, field, path, line)?;
    if value <= 0.0 {
        return Err(DataError::NonPositivePrice {
            path: path.to_string(),
            line,
            field,
            value,
        });
    }
    Ok(value)
}

fn is_null(raw: &str) -> bool {
    raw.is_empty() || NULL_TOKENS.contains(&raw)
}

/// Parse a timestamp as integer epoch milliseconds or as
/// `YYYY-MM-DD HH:MM:SS[.fff]`, UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        let millis: i64 = raw.parse().ok()?;
        return Utc.timestamp_millis_opt(millis).single();
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Content hash of an ingested sequence: receive times and the worst-level
/// reference prices, in order. Recorded on results for provenance.
pub fn fingerprint(snapshots: &[Snapshot]) -> String {
    let mut hasher = blake3::Hasher::new();
    for snap in snapshots {
        hasher.update(&snap.received_at.timestamp_millis().to_le_bytes());
        hasher.update(&snap.worst_bid().to_le_bytes());
        hasher.update(&snap.worst_ask().to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}
