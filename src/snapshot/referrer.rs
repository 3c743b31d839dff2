// src/snapshot/referrer.rs
//! Top-referrer snapshots.
//!
//! Unlike views/clones fragments, a referrer file has no per-row
//! timestamps: the whole file is one observation instant, encoded as a
//! `YYYY-MM-DD_HHMMSS` UTC prefix in the file name.

use super::{column_mapping, csv_error, parse_count, schema_mismatch};
use crate::error::{Result, StatsError};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// File name suffix identifying a referrer snapshot.
pub const SNAPSHOT_SUFFIX: &str = "_top_referrers_snapshot.csv";

/// Name of the referrer-name column.
pub const NAME_COLUMN: &str = "referrer";

// Early CSVs shipped the name column as "referrers". Accepted and
// normalized, same as the column rename the collector applies.
const LEGACY_NAME_COLUMN: &str = "referrers";

const SNAPSHOT_TIME_FORMAT: &str = "%Y-%m-%d_%H%M%S";

/// One referrer's row within a snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct ReferrerRow {
    pub name: String,
    /// Aligned with the owning snapshot's `columns`.
    pub values: Vec<u64>,
}

/// All rows of one snapshot file, tagged with the observation instant.
#[derive(Debug, Clone, Serialize)]
pub struct ReferrerSnapshot {
    pub source: PathBuf,
    pub taken_at: DateTime<Utc>,
    /// Value column names, name column excluded.
    pub columns: Vec<String>,
    pub rows: Vec<ReferrerRow>,
}

/// Loads every snapshot file, validates one shared column set, and returns
/// the snapshots sorted ascending by observation time (path order breaks
/// ties). That order defines the first-seen order of referrer names used
/// as the ranking tie-break in `crate::referrers`.
///
/// # Errors
/// Returns `EmptyInput` for an empty path list, `SchemaMismatch` on the
/// first file whose column set differs, and parse errors per
/// `load_snapshot`.
pub fn load_snapshots(paths: &[PathBuf]) -> Result<Vec<ReferrerSnapshot>> {
    if paths.is_empty() {
        return Err(StatsError::EmptyInput {
            kind: "referrer snapshots",
        });
    }

    let mut reference: Option<Vec<String>> = None;
    let mut snapshots: Vec<ReferrerSnapshot> = Vec::with_capacity(paths.len());
    for path in paths {
        log::info!("attempt to parse {}", path.display());
        let snapshot = load_snapshot(path)?;
        log::info!("parsed timestamp from path: {}", snapshot.taken_at);
        let snapshot = match &reference {
            Some(columns) => align_to_reference(snapshot, columns)?,
            None => {
                reference = Some(snapshot.columns.clone());
                snapshot
            }
        };
        snapshots.push(snapshot);
    }

    snapshots.sort_by(|a, b| {
        a.taken_at
            .cmp(&b.taken_at)
            .then_with(|| a.source.cmp(&b.source))
    });

    Ok(snapshots)
}

/// Parses the observation instant from a snapshot file name.
///
/// # Errors
/// Returns `TimestampParse` if the name prefix does not match
/// `YYYY-MM-DD_HHMMSS`.
pub fn parse_snapshot_time(path: &Path) -> Result<DateTime<Utc>> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let prefix = name.strip_suffix(SNAPSHOT_SUFFIX).unwrap_or(name.as_str());

    NaiveDateTime::parse_from_str(prefix, SNAPSHOT_TIME_FORMAT)
        .map(|t| t.and_utc())
        .map_err(|source| StatsError::TimestampParse {
            input: prefix.to_string(),
            source,
        })
}

/// Parses a single snapshot file.
///
/// # Errors
/// Returns `TimestampParse` for a malformed file name prefix,
/// `MissingColumn` if no name column is present, and `ValueParse` for a
/// non-numeric count cell.
pub fn load_snapshot(path: &Path) -> Result<ReferrerSnapshot> {
    let taken_at = parse_snapshot_time(path)?;

    let mut reader = csv::Reader::from_path(path).map_err(|e| csv_error(e, path))?;
    let headers = reader.headers().map_err(|e| csv_error(e, path))?.clone();

    let name_idx = headers
        .iter()
        .position(|h| h == NAME_COLUMN || h == LEGACY_NAME_COLUMN)
        .ok_or_else(|| StatsError::MissingColumn {
            column: NAME_COLUMN,
            context: path.display().to_string(),
        })?;

    let columns: Vec<String> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != name_idx)
        .map(|(_, h)| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| csv_error(e, path))?;
        let name = record.get(name_idx).unwrap_or("").to_string();
        let mut values = Vec::with_capacity(columns.len());
        for (i, field) in record.iter().enumerate() {
            if i == name_idx {
                continue;
            }
            values.push(parse_count(field, path)?);
        }
        rows.push(ReferrerRow { name, values });
    }

    Ok(ReferrerSnapshot {
        source: path.to_path_buf(),
        taken_at,
        columns,
        rows,
    })
}

fn align_to_reference(
    snapshot: ReferrerSnapshot,
    reference: &[String],
) -> Result<ReferrerSnapshot> {
    if snapshot.columns == reference {
        return Ok(snapshot);
    }
    let Some(mapping) = column_mapping(reference, &snapshot.columns) else {
        return Err(schema_mismatch(&snapshot.source, reference, &snapshot.columns));
    };
    let rows = snapshot
        .rows
        .into_iter()
        .map(|r| ReferrerRow {
            name: r.name,
            values: mapping.iter().map(|&i| r.values[i]).collect(),
        })
        .collect();
    Ok(ReferrerSnapshot {
        source: snapshot.source,
        taken_at: snapshot.taken_at,
        columns: reference.to_vec(),
        rows,
    })
}
