use crate::error::{Result, StatsError};
use std::path::PathBuf;

/// How many referrers the referrer chart compares.
pub const DEFAULT_TOP_N: usize = 5;

/// Resolved run parameters. The binary fills this from CLI arguments;
/// library callers construct it directly.
#[derive(Debug, Clone)]
pub struct Config {
    /// Repository identifier shown in the report title, e.g. `owner/name`.
    pub repospec: String,
    /// Directory holding the accumulated snapshot CSV files.
    pub csv_dir: PathBuf,
    /// Directory the report and its resources are written into.
    pub output_dir: PathBuf,
    /// Directory copied verbatim next to the report (template, css).
    pub resources_dir: PathBuf,
    /// Pandoc executable used for the Markdown-to-HTML conversion.
    pub pandoc_command: String,
    pub top_n: usize,
}

impl Config {
    #[must_use]
    pub fn new(repospec: String, csv_dir: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            repospec,
            csv_dir,
            output_dir,
            resources_dir: PathBuf::from("resources"),
            pandoc_command: "pandoc".to_string(),
            top_n: DEFAULT_TOP_N,
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot directory does not exist or `top_n`
    /// is zero.
    pub fn validate(&self) -> Result<()> {
        if !self.csv_dir.is_dir() {
            return Err(StatsError::Other(format!(
                "snapshot directory does not exist: {}",
                self.csv_dir.display()
            )));
        }
        if self.top_n == 0 {
            return Err(StatsError::Other("top_n must be at least 1".to_string()));
        }
        Ok(())
    }
}
