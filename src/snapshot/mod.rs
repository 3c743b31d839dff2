// src/snapshot/mod.rs
//! Parsing and schema validation for the two snapshot file kinds.

pub mod referrer;
pub mod scalar;

use crate::error::{Result, StatsError};
use chrono::{DateTime, Utc};
use std::path::Path;

/// Parses an RFC 3339 timestamp into UTC.
///
/// # Errors
/// Returns `TimestampParse` if the value is not a valid timezone-aware
/// timestamp.
pub fn parse_utc(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|source| StatsError::TimestampParse {
            input: value.to_string(),
            source,
        })
}

/// Order-insensitive column set comparison, as schema equality is defined
/// on the set of names rather than their file order.
fn same_column_set(a: &[String], b: &[String]) -> bool {
    use std::collections::BTreeSet;
    a.len() == b.len()
        && a.iter().collect::<BTreeSet<_>>() == b.iter().collect::<BTreeSet<_>>()
}

/// For each reference column, the index it occupies in `found`.
/// `None` when the sets differ.
fn column_mapping(reference: &[String], found: &[String]) -> Option<Vec<usize>> {
    if !same_column_set(reference, found) {
        return None;
    }
    reference
        .iter()
        .map(|col| found.iter().position(|c| c == col))
        .collect()
}

fn schema_mismatch(path: &Path, expected: &[String], found: &[String]) -> StatsError {
    StatsError::SchemaMismatch {
        path: path.to_path_buf(),
        expected: expected.to_vec(),
        found: found.to_vec(),
    }
}

fn parse_count(value: &str, path: &Path) -> Result<u64> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| StatsError::ValueParse {
            value: value.to_string(),
            path: path.to_path_buf(),
        })
}

fn csv_error(source: csv::Error, path: &Path) -> StatsError {
    StatsError::Csv {
        source,
        path: path.to_path_buf(),
    }
}
