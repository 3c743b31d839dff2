// src/reconcile.rs
//! Collapses overlapping views/clones fragments into one series.
//!
//! The traffic API reports each day as a cumulative count over a trailing
//! rolling window. A day sampled near the boundary of one fetch may
//! undercount relative to the same day in the interior of a later, more
//! complete fetch; a fixed day's counter never legitimately decreases
//! across fetches. Taking the per-counter maximum over all rows sharing a
//! timestamp therefore yields the most complete resolution, and the only
//! non-decreasing one.

use crate::error::{Result, StatsError};
use crate::snapshot::scalar::ScalarFragment;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// One resolved entry of a reconciled series.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesPoint {
    pub time: DateTime<Utc>,
    /// Aligned with the owning series' `columns`.
    pub values: Vec<u64>,
}

/// The merged series: strictly increasing timestamps, each carrying the
/// conflict-resolved counter values.
#[derive(Debug, Clone, Serialize)]
pub struct ReconciledSeries {
    columns: Vec<String>,
    points: Vec<SeriesPoint>,
}

impl ReconciledSeries {
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Index of a counter column, if present.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Largest value observed in a counter column. `None` for an unknown
    /// column or an empty series.
    #[must_use]
    pub fn column_max(&self, name: &str) -> Option<u64> {
        let idx = self.column_index(name)?;
        self.points.iter().map(|p| p.values[idx]).max()
    }
}

/// Merges fragments into one series: rows are grouped by exact timestamp
/// and each counter takes its maximum across the group. A single-row group
/// passes through unchanged. Output is ascending with no duplicate
/// timestamps.
///
/// # Errors
/// Returns `EmptyInput` for an empty fragment list and `SchemaMismatch`
/// if the fragments do not share one column set. The loader already
/// rejects mixed schemas; the check here covers direct library use.
pub fn reconcile(fragments: &[ScalarFragment]) -> Result<ReconciledSeries> {
    let Some(first) = fragments.first() else {
        return Err(StatsError::EmptyInput {
            kind: "views/clones fragments",
        });
    };
    let columns = first.columns.clone();

    for fragment in &fragments[1..] {
        if fragment.columns != columns {
            return Err(StatsError::SchemaMismatch {
                path: fragment.source.clone(),
                expected: columns.clone(),
                found: fragment.columns.clone(),
            });
        }
    }

    let mut merged: BTreeMap<DateTime<Utc>, Vec<u64>> = BTreeMap::new();
    for fragment in fragments {
        for sample in &fragment.samples {
            merged
                .entry(sample.time)
                .and_modify(|acc| {
                    for (resolved, candidate) in acc.iter_mut().zip(&sample.values) {
                        *resolved = (*resolved).max(*candidate);
                    }
                })
                .or_insert_with(|| sample.values.clone());
        }
    }

    let points = merged
        .into_iter()
        .map(|(time, values)| SeriesPoint { time, values })
        .collect();

    Ok(ReconciledSeries { columns, points })
}
