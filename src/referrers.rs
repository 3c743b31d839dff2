// src/referrers.rs
//! Per-referrer series and top-N selection.
//!
//! Referrer snapshots are point-in-time observations, not rolling-window
//! cumulative counts, so no max-correction applies here: distinct snapshot
//! times stay distinct rows even when a referrer's count did not change
//! between samplings.

use crate::error::{Result, StatsError};
use crate::snapshot::referrer::ReferrerSnapshot;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Ranking statistic for the top-N selection.
pub const RANKING_COLUMN: &str = "count_unique";

/// One observation of a referrer, at one snapshot instant.
#[derive(Debug, Clone, Serialize)]
pub struct Observation {
    pub time: DateTime<Utc>,
    /// Aligned with the owning series' `columns`.
    pub values: Vec<u64>,
}

/// A referrer's full observation history, ascending by time.
#[derive(Debug, Clone, Serialize)]
pub struct ReferrerHistory {
    pub name: String,
    pub observations: Vec<Observation>,
}

/// All referrers seen across the snapshot collection.
///
/// Referrers iterate in first-seen order: snapshots ascending by
/// observation time (path order on ties), rows in file order. The first
/// row mentioning a name fixes its position. Ranking relies on this as
/// its stable tie-break.
#[derive(Debug, Clone, Serialize)]
pub struct ReferrerSeries {
    columns: Vec<String>,
    referrers: Vec<ReferrerHistory>,
}

impl ReferrerSeries {
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn referrers(&self) -> &[ReferrerHistory] {
        &self.referrers
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.referrers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.referrers.is_empty()
    }
}

/// The N referrers with the highest maximum `count_unique`, with their
/// observations aligned on the union of their snapshot times.
#[derive(Debug, Clone, Serialize)]
pub struct TopNSelection {
    /// Descending by maximum `count_unique`; first-seen order on ties.
    pub names: Vec<String>,
    /// The ranking maximum per name, same order.
    pub maxima: Vec<u64>,
    /// Union of the selected referrers' observation times, ascending.
    pub timestamps: Vec<DateTime<Utc>>,
    /// `cells[row][col]` is the `count_unique` of `names[col]` at
    /// `timestamps[row]`. `None` means no observation at that instant,
    /// never zero traffic.
    pub cells: Vec<Vec<Option<u64>>>,
}

/// Pivots the snapshot collection into per-referrer histories.
///
/// Every row is tagged with its snapshot's observation time, rows are
/// unioned and partitioned by referrer name, and each partition is sorted
/// ascending by time. Values are kept as-is; no de-duplication.
///
/// # Errors
/// Returns `EmptyInput` for an empty snapshot list.
pub fn build_series(snapshots: &[ReferrerSnapshot]) -> Result<ReferrerSeries> {
    let Some(first) = snapshots.first() else {
        return Err(StatsError::EmptyInput {
            kind: "referrer snapshots",
        });
    };
    let columns = first.columns.clone();

    let mut order: Vec<&ReferrerSnapshot> = snapshots.iter().collect();
    order.sort_by(|a, b| {
        a.taken_at
            .cmp(&b.taken_at)
            .then_with(|| a.source.cmp(&b.source))
    });

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut referrers: Vec<ReferrerHistory> = Vec::new();
    for snapshot in order {
        for row in &snapshot.rows {
            let slot = match index.get(&row.name) {
                Some(&i) => i,
                None => {
                    index.insert(row.name.clone(), referrers.len());
                    referrers.push(ReferrerHistory {
                        name: row.name.clone(),
                        observations: Vec::new(),
                    });
                    referrers.len() - 1
                }
            };
            referrers[slot].observations.push(Observation {
                time: snapshot.taken_at,
                values: row.values.clone(),
            });
        }
    }

    // Already ascending from the snapshot walk; the explicit stable sort
    // is the documented ordering contract, not an optimization target.
    for history in &mut referrers {
        history.observations.sort_by_key(|o| o.time);
    }

    log::info!("all referrers seen: {}", referrers.len());

    Ok(ReferrerSeries { columns, referrers })
}

/// Ranks referrers by their maximum `count_unique` and aligns the top `n`
/// into one joint table.
///
/// `Vec::sort_by` is stable, so equal maxima keep their first-seen order;
/// that is the whole tie-break rule.
///
/// # Errors
/// Returns `MissingColumn` if the snapshots carry no `count_unique`
/// column.
pub fn select_top(series: &ReferrerSeries, n: usize) -> Result<TopNSelection> {
    let col = series
        .columns
        .iter()
        .position(|c| c == RANKING_COLUMN)
        .ok_or_else(|| StatsError::MissingColumn {
            column: RANKING_COLUMN,
            context: "referrer snapshots".to_string(),
        })?;

    let mut ranked: Vec<(usize, u64)> = series
        .referrers
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let max = r.observations.iter().map(|o| o.values[col]).max();
            (i, max.unwrap_or(0))
        })
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(n);

    let names: Vec<String> = ranked
        .iter()
        .map(|&(i, _)| series.referrers[i].name.clone())
        .collect();
    let maxima: Vec<u64> = ranked.iter().map(|&(_, max)| max).collect();

    let mut times: BTreeSet<DateTime<Utc>> = BTreeSet::new();
    let mut lookups: Vec<BTreeMap<DateTime<Utc>, u64>> = Vec::with_capacity(ranked.len());
    for &(i, _) in &ranked {
        let mut lookup = BTreeMap::new();
        for observation in &series.referrers[i].observations {
            times.insert(observation.time);
            // First observation wins should two files share an instant.
            lookup.entry(observation.time).or_insert(observation.values[col]);
        }
        lookups.push(lookup);
    }

    let timestamps: Vec<DateTime<Utc>> = times.into_iter().collect();
    let cells: Vec<Vec<Option<u64>>> = timestamps
        .iter()
        .map(|t| lookups.iter().map(|l| l.get(t).copied()).collect())
        .collect();

    Ok(TopNSelection {
        names,
        maxima,
        timestamps,
        cells,
    })
}
