// src/report/output.rs
//! Output directory management, report writing, and the pandoc handoff.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use walkdir::WalkDir;

/// Removes a stale output directory and recreates it empty.
///
/// # Errors
/// Returns error if the path exists but is not a directory, or on any
/// filesystem failure.
pub fn prepare_output_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        if !dir.is_dir() {
            bail!(
                "the specified output directory path does not point to a directory: {}",
                dir.display()
            );
        }
        log::info!("remove output directory: {}", dir.display());
        fs::remove_dir_all(dir)
            .with_context(|| format!("failed to remove {}", dir.display()))?;
    }
    log::info!("create output directory: {}", dir.display());
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    Ok(())
}

/// Writes the assembled report as `<date>_report.md` and returns its path.
///
/// # Errors
/// Returns error if the write fails.
pub fn write_markdown(dir: &Path, date: &str, markdown: &str) -> Result<PathBuf> {
    let path = dir.join(format!("{date}_report.md"));
    log::info!("write generated Markdown report to: {}", path.display());
    fs::write(&path, markdown).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

/// Copies the resources directory (template, css) into the output
/// directory as `resources/`.
///
/// # Errors
/// Returns error if the walk or any copy fails.
pub fn copy_resources(resources: &Path, outdir: &Path) -> Result<()> {
    log::info!("copy resources directory into output directory");
    let target_root = outdir.join("resources");

    for entry in WalkDir::new(resources).follow_links(false) {
        let entry = entry?;
        let rel = entry
            .path()
            .strip_prefix(resources)
            .context("walked outside the resources directory")?;
        let target = target_root.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
                .with_context(|| format!("failed to create {}", target.display()))?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            fs::copy(entry.path(), &target)
                .with_context(|| format!("failed to copy {}", entry.path().display()))?;
        }
    }
    Ok(())
}

/// Runs pandoc over the Markdown report to produce standalone HTML.
/// Returns whether pandoc exited successfully; the caller decides how loud
/// to be about a failure.
///
/// # Errors
/// Returns error if the pandoc process cannot be spawned at all.
pub fn convert_with_pandoc(pandoc: &str, markdown: &Path, html: &Path) -> Result<bool> {
    let mut command = Command::new(pandoc);
    command
        // The strict reader allows raw HTML in Markdown; the title block
        // extension keeps the `%` preamble lines.
        .arg("--from=markdown_strict+pandoc_title_block")
        .arg("--standalone")
        .arg("--template=resources/template.html")
        .arg(markdown)
        .arg("-o")
        .arg(html);

    log::info!("running command: {command:?}");
    let status = command
        .status()
        .with_context(|| format!("failed to run {pandoc}"))?;
    Ok(status.success())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn prepare_replaces_an_existing_directory() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("report");
        fs::create_dir(&out).unwrap();
        fs::write(out.join("stale.md"), "old").unwrap();

        prepare_output_dir(&out).unwrap();
        assert!(out.is_dir());
        assert!(!out.join("stale.md").exists());
    }

    #[test]
    fn prepare_rejects_a_file_path() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("report");
        File::create(&out).unwrap();
        assert!(prepare_output_dir(&out).is_err());
    }

    #[test]
    fn resources_copy_preserves_nesting() {
        let dir = TempDir::new().unwrap();
        let resources = dir.path().join("resources");
        fs::create_dir_all(resources.join("css")).unwrap();
        let mut f = File::create(resources.join("template.html")).unwrap();
        write!(f, "$body$").unwrap();
        fs::write(resources.join("css").join("site.css"), "body {}").unwrap();

        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();
        copy_resources(&resources, &out).unwrap();

        assert!(out.join("resources").join("template.html").is_file());
        assert!(out.join("resources").join("css").join("site.css").is_file());
    }

    #[test]
    fn markdown_lands_under_a_dated_name() {
        let dir = TempDir::new().unwrap();
        let path = write_markdown(dir.path(), "2021-01-04", "% title\n").unwrap();
        assert!(path.ends_with("2021-01-04_report.md"));
        assert_eq!(fs::read_to_string(path).unwrap(), "% title\n");
    }
}
