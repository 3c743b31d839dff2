// src/discovery.rs
use crate::error::Result;
use crate::snapshot::{referrer, scalar};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Snapshot files found in the input directory, one list per kind.
#[derive(Debug, Default)]
pub struct SnapshotPaths {
    pub views_clones: Vec<PathBuf>,
    pub referrers: Vec<PathBuf>,
}

/// Enumerates snapshot CSV files in the top level of `dir`.
///
/// Files are classified by name: views/clones time-series fragments carry
/// the `views_clones` substring, referrer snapshots end in
/// `_top_referrers_snapshot.csv`. Both lists come back in sorted path
/// order so downstream processing is deterministic.
///
/// # Errors
/// Returns error if the directory walk fails.
pub fn discover(dir: &Path) -> Result<SnapshotPaths> {
    let mut found = SnapshotPaths::default();

    for entry in WalkDir::new(dir).max_depth(1).follow_links(false) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if !name.ends_with(".csv") {
            continue;
        }
        if name.ends_with(referrer::SNAPSHOT_SUFFIX) {
            found.referrers.push(entry.path().to_path_buf());
        } else if name.contains(scalar::FRAGMENT_MARKER) {
            found.views_clones.push(entry.path().to_path_buf());
        }
    }

    found.views_clones.sort();
    found.referrers.sort();

    log::info!(
        "discovered {} views/clones fragment file(s), {} referrer snapshot file(s) in {}",
        found.views_clones.len(),
        found.referrers.len(),
        dir.display()
    );

    Ok(found)
}
