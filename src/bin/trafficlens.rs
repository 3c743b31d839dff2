// src/bin/trafficlens.rs
use std::path::PathBuf;
use std::process;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use colored::Colorize;

use trafficlens_core::config::Config;
use trafficlens_core::discovery;
use trafficlens_core::error::StatsError;
use trafficlens_core::reconcile;
use trafficlens_core::referrers;
use trafficlens_core::report::{self, output, ReportSection};
use trafficlens_core::snapshot::{referrer, scalar};

#[derive(Parser)]
#[command(name = "trafficlens", version)]
#[command(about = "Reconciles repository traffic snapshots and renders a static report")]
struct Cli {
    /// Repo owner/name
    repospec: String,

    /// Path to directory containing snapshot CSV files
    #[arg(value_name = "PATH")]
    csvdir: PathBuf,

    /// Pandoc executable for the HTML conversion
    #[arg(long, default_value = "pandoc")]
    pandoc_command: String,

    /// Directory copied next to the report (template, css)
    #[arg(long, default_value = "resources")]
    resources_directory: PathBuf,

    /// Defaults to <today>_report
    #[arg(long)]
    output_directory: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("{} {e}", "error:".red().bold());
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let now = Utc::now();
    let today = now.format("%Y-%m-%d").to_string();

    let output_dir = cli
        .output_directory
        .unwrap_or_else(|| PathBuf::from(format!("{today}_report")));
    let mut config = Config::new(cli.repospec, cli.csvdir, output_dir);
    config.resources_dir = cli.resources_directory;
    config.pandoc_command = cli.pandoc_command;
    config.validate()?;

    output::prepare_output_dir(&config.output_dir)?;

    let paths = discovery::discover(&config.csv_dir)?;

    let mut sections = vec![report::preamble(&config.repospec, now)];
    if let Some(section) = traffic_section(&paths.views_clones)? {
        sections.push(section);
    }
    if let Some(section) = referrer_section(&paths.referrers, config.top_n)? {
        sections.push(section);
    }

    let markdown = report::assemble(&sections);
    let md_path = output::write_markdown(&config.output_dir, &today, &markdown)?;
    output::copy_resources(&config.resources_dir, &config.output_dir)?;

    let html_path = md_path.with_extension("html");
    log::info!("trying to run pandoc for generating HTML document");
    match output::convert_with_pandoc(&config.pandoc_command, &md_path, &html_path) {
        Ok(true) => log::info!("pandoc terminated indicating success"),
        Ok(false) => log::warn!("pandoc terminated indicating error"),
        Err(e) => log::warn!("{e}"),
    }

    println!(
        "{} report written to {}",
        "OK".green().bold(),
        md_path.display()
    );
    Ok(())
}

/// Loads and reconciles the views/clones fragments. Zero discovered files
/// drops the section with a warning instead of fabricating an empty chart.
fn traffic_section(paths: &[PathBuf]) -> Result<Option<ReportSection>> {
    match scalar::load_fragments(paths) {
        Ok(fragments) => {
            let series = reconcile::reconcile(&fragments)?;
            log::info!("aggregated sample count: {}", series.len());
            Ok(Some(report::traffic_section(&series)?))
        }
        Err(e @ StatsError::EmptyInput { .. }) => {
            log::warn!("{e}; omitting views/clones section");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Loads the referrer snapshots and selects the top referrers. Zero
/// discovered files drops the section with a warning.
fn referrer_section(paths: &[PathBuf], top_n: usize) -> Result<Option<ReportSection>> {
    match referrer::load_snapshots(paths) {
        Ok(snapshots) => {
            let series = referrers::build_series(&snapshots)?;
            let top = referrers::select_top(&series, top_n)?;
            log::info!(
                "top {} referrers by unique views: {:?}",
                top.names.len(),
                top.names
            );
            Ok(Some(report::referrer_section(&top)?))
        }
        Err(e @ StatsError::EmptyInput { .. }) => {
            log::warn!("{e}; omitting referrers section");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}
