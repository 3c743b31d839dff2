// src/snapshot/scalar.rs
//! Views/clones time-series fragments.
//!
//! Each file is one fetch of the traffic API: a contiguous trailing window
//! of daily samples. Windows from successive fetches overlap, and samples
//! near a window boundary may undercount relative to the same day seen in
//! the interior of a later fetch. Reconciling that is `crate::reconcile`;
//! this module only materializes rows and enforces a uniform schema.

use super::{column_mapping, csv_error, parse_count, parse_utc, schema_mismatch};
use crate::error::{Result, StatsError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Substring identifying a views/clones fragment file name.
pub const FRAGMENT_MARKER: &str = "views_clones";

/// Name of the per-row timestamp column.
pub const TIME_COLUMN: &str = "time_iso8601";

/// One daily sample: a UTC timestamp plus one value per counter column.
#[derive(Debug, Clone, Serialize)]
pub struct ScalarSample {
    pub time: DateTime<Utc>,
    /// Aligned with the owning fragment's `columns`.
    pub values: Vec<u64>,
}

/// All samples from one fragment file, in file order.
#[derive(Debug, Clone, Serialize)]
pub struct ScalarFragment {
    pub source: PathBuf,
    /// Counter column names, time column excluded.
    pub columns: Vec<String>,
    pub samples: Vec<ScalarSample>,
}

/// Loads every fragment file and validates that they share one column set.
///
/// The first file fixes the canonical column order; later files with the
/// same set in a different order are realigned to it, so all returned
/// fragments index their values identically.
///
/// # Errors
/// Returns `EmptyInput` for an empty path list, `SchemaMismatch` on the
/// first file whose column set differs, and parse errors per
/// `load_fragment`.
pub fn load_fragments(paths: &[PathBuf]) -> Result<Vec<ScalarFragment>> {
    if paths.is_empty() {
        return Err(StatsError::EmptyInput {
            kind: "views/clones fragments",
        });
    }

    let mut reference: Option<Vec<String>> = None;
    let mut fragments: Vec<ScalarFragment> = Vec::with_capacity(paths.len());
    for path in paths {
        log::info!("attempt to parse {}", path.display());
        let fragment = load_fragment(path)?;
        let fragment = match &reference {
            Some(columns) => align_to_reference(fragment, columns)?,
            None => {
                reference = Some(fragment.columns.clone());
                fragment
            }
        };
        fragments.push(fragment);
    }

    log::info!(
        "total sample count across {} fragment(s): {}",
        fragments.len(),
        fragments.iter().map(|f| f.samples.len()).sum::<usize>()
    );

    Ok(fragments)
}

/// Parses a single fragment file.
///
/// # Errors
/// Returns `MissingColumn` if the timestamp column is absent,
/// `TimestampParse` for a row timestamp that is not valid RFC 3339, and
/// `ValueParse` for a non-numeric counter cell.
pub fn load_fragment(path: &Path) -> Result<ScalarFragment> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| csv_error(e, path))?;
    let headers = reader.headers().map_err(|e| csv_error(e, path))?.clone();

    let time_idx = headers
        .iter()
        .position(|h| h == TIME_COLUMN)
        .ok_or_else(|| StatsError::MissingColumn {
            column: TIME_COLUMN,
            context: path.display().to_string(),
        })?;

    let columns: Vec<String> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != time_idx)
        .map(|(_, h)| h.to_string())
        .collect();

    let mut samples = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| csv_error(e, path))?;
        let time = parse_utc(record.get(time_idx).unwrap_or(""))?;
        let mut values = Vec::with_capacity(columns.len());
        for (i, field) in record.iter().enumerate() {
            if i == time_idx {
                continue;
            }
            values.push(parse_count(field, path)?);
        }
        samples.push(ScalarSample { time, values });
    }

    Ok(ScalarFragment {
        source: path.to_path_buf(),
        columns,
        samples,
    })
}

fn align_to_reference(fragment: ScalarFragment, reference: &[String]) -> Result<ScalarFragment> {
    if fragment.columns == reference {
        return Ok(fragment);
    }
    let Some(mapping) = column_mapping(reference, &fragment.columns) else {
        return Err(schema_mismatch(&fragment.source, reference, &fragment.columns));
    };
    let samples = fragment
        .samples
        .into_iter()
        .map(|s| ScalarSample {
            time: s.time,
            values: mapping.iter().map(|&i| s.values[i]).collect(),
        })
        .collect();
    Ok(ScalarFragment {
        source: fragment.source,
        columns: reference.to_vec(),
        samples,
    })
}
