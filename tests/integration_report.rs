// tests/integration_report.rs
//! End-to-end runs over real snapshot files on disk: discovery, loading,
//! reconciliation, ranking, and report assembly.

use std::fs;

use chrono::{TimeZone, Utc};
use tempfile::TempDir;

use trafficlens_core::discovery;
use trafficlens_core::reconcile;
use trafficlens_core::referrers;
use trafficlens_core::report;
use trafficlens_core::snapshot::{referrer, scalar};

fn write_file(dir: &TempDir, name: &str, content: &str) {
    fs::write(dir.path().join(name), content).unwrap();
}

#[test]
fn overlapping_fragments_reconcile_to_the_boundary_corrected_series() {
    let dir = TempDir::new().unwrap();
    // Fetched Dec 15: Dec 7 sits mid-window and shows the complete count.
    write_file(
        &dir,
        "2020-12-15_views_clones_snapshot.csv",
        "time_iso8601,clones_total\n\
         2020-12-01T00:00:00+00:00,10\n\
         2020-12-07T00:00:00+00:00,73\n",
    );
    // Fetched Dec 21: Dec 7 sits at the boundary and undercounts.
    write_file(
        &dir,
        "2020-12-21_views_clones_snapshot.csv",
        "time_iso8601,clones_total\n\
         2020-12-07T00:00:00+00:00,18\n\
         2020-12-10T00:00:00+00:00,25\n",
    );

    let paths = discovery::discover(dir.path()).unwrap();
    let fragments = scalar::load_fragments(&paths.views_clones).unwrap();
    let series = reconcile::reconcile(&fragments).unwrap();

    let rows: Vec<(chrono::DateTime<Utc>, u64)> = series
        .points()
        .iter()
        .map(|p| (p.time, p.values[0]))
        .collect();
    let day = |d: u32| Utc.with_ymd_and_hms(2020, 12, d, 0, 0, 0).unwrap();
    assert_eq!(rows, vec![(day(1), 10), (day(7), 73), (day(10), 25)]);
}

#[test]
fn discovery_separates_the_two_snapshot_kinds() {
    let dir = TempDir::new().unwrap();
    write_file(
        &dir,
        "2020-12-15_views_clones_snapshot.csv",
        "time_iso8601,views_total\n2020-12-01T00:00:00+00:00,10\n",
    );
    write_file(
        &dir,
        "2020-12-15_110500_top_referrers_snapshot.csv",
        "referrer,count,count_unique\ngithub.com,20,10\n",
    );
    write_file(&dir, "notes.txt", "not a snapshot");
    write_file(&dir, "other.csv", "unrelated,columns\n1,2\n");

    let paths = discovery::discover(dir.path()).unwrap();
    assert_eq!(paths.views_clones.len(), 1);
    assert_eq!(paths.referrers.len(), 1);
}

#[test]
fn report_sections_cover_both_kinds_and_share_one_footer() {
    let dir = TempDir::new().unwrap();
    write_file(
        &dir,
        "2020-12-15_views_clones_snapshot.csv",
        "time_iso8601,views_unique,views_total,clones_unique,clones_total\n\
         2020-12-01T00:00:00+00:00,2,10,1,8\n\
         2020-12-02T00:00:00+00:00,3,14,2,9\n",
    );
    write_file(
        &dir,
        "2020-12-15_110500_top_referrers_snapshot.csv",
        "referrer,count,count_unique\ngithub.com,20,10\nt.co,6,3\n",
    );

    let paths = discovery::discover(dir.path()).unwrap();

    let fragments = scalar::load_fragments(&paths.views_clones).unwrap();
    let series = reconcile::reconcile(&fragments).unwrap();
    let snapshots = referrer::load_snapshots(&paths.referrers).unwrap();
    let referrer_series = referrers::build_series(&snapshots).unwrap();
    let top = referrers::select_top(&referrer_series, 5).unwrap();

    let generated = Utc.with_ymd_and_hms(2021, 1, 4, 9, 30, 0).unwrap();
    let sections = vec![
        report::preamble("octocat/hello", generated),
        report::traffic_section(&series).unwrap(),
        report::referrer_section(&top).unwrap(),
    ];
    let markdown = report::assemble(&sections);

    assert!(markdown.starts_with("% Statistics for octocat/hello"));
    assert!(markdown.contains("## Views"));
    assert!(markdown.contains("## Clones"));
    assert!(markdown.contains("## Referrers"));
    assert!(markdown.contains("<div id=\"chart_views_unique\"></div>"));
    assert!(markdown.contains("<div id=\"chart_referrers_top_n_alltime\"></div>"));
    assert_eq!(
        markdown.matches("<script type=\"text/javascript\">").count(),
        1
    );
    // 4 counter charts + 1 referrer chart.
    assert_eq!(markdown.matches("vegaEmbed(").count(), 5);
}

#[test]
fn referrer_chart_never_fabricates_zero_observations() {
    let dir = TempDir::new().unwrap();
    // t.co is observed twice, github.com only in the later snapshot.
    write_file(
        &dir,
        "2020-12-15_110500_top_referrers_snapshot.csv",
        "referrer,count,count_unique\nt.co,6,3\n",
    );
    write_file(
        &dir,
        "2020-12-20_091337_top_referrers_snapshot.csv",
        "referrer,count,count_unique\nt.co,8,4\ngithub.com,20,10\n",
    );

    let paths = discovery::discover(dir.path()).unwrap();
    let snapshots = referrer::load_snapshots(&paths.referrers).unwrap();
    let series = referrers::build_series(&snapshots).unwrap();
    let top = referrers::select_top(&series, 5).unwrap();

    let section = report::referrer_section(&top).unwrap();
    let spec = &section.js_footer[0];

    // Three underlying rows, three data points; the absent
    // (Dec 15, github.com) pair must not appear at all.
    assert_eq!(spec.matches("\"referrer\":\"t.co\"").count(), 2);
    assert_eq!(spec.matches("\"referrer\":\"github.com\"").count(), 1);
    assert_eq!(spec.matches("\"count_unique\":0").count(), 0);
}

#[test]
fn empty_input_is_surfaced_not_papered_over() {
    let dir = TempDir::new().unwrap();
    write_file(&dir, "notes.txt", "nothing here");

    let paths = discovery::discover(dir.path()).unwrap();
    assert!(scalar::load_fragments(&paths.views_clones).is_err());
    assert!(referrer::load_snapshots(&paths.referrers).is_err());
}
