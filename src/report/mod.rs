// src/report/mod.rs
//! Markdown report assembly.
//!
//! Every section is a plain value holding its Markdown body and the
//! `vegaEmbed` calls its charts need. The caller collects sections and
//! concatenates them with `assemble`; nothing accumulates globally, so an
//! omitted section simply never exists.

pub mod charts;
pub mod output;

use crate::reconcile::ReconciledSeries;
use crate::referrers::TopNSelection;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt::Write;

/// One report section: Markdown body plus the JS lines that embed its
/// charts into the placeholder divs.
#[derive(Debug, Clone, Default)]
pub struct ReportSection {
    pub markdown: String,
    pub js_footer: Vec<String>,
}

/// Pandoc title block naming the repository and the generation time.
#[must_use]
pub fn preamble(repospec: &str, generated_at: DateTime<Utc>) -> ReportSection {
    let markdown = format!(
        "% Statistics for {repospec}\n% Generated with trafficlens at {}.\n",
        generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    ReportSection {
        markdown,
        js_footer: Vec::new(),
    }
}

/// Views/clones charts, one per counter column, grouped under a heading
/// per column-name prefix (`views_*` under "Views", `clones_*` under
/// "Clones").
///
/// # Errors
/// Returns error if formatting fails.
pub fn traffic_section(series: &ReconciledSeries) -> Result<ReportSection> {
    let mut markdown = String::new();
    let mut js_footer = Vec::new();

    writeln!(markdown)?;
    for (heading, columns) in column_groups(series.columns()) {
        writeln!(markdown)?;
        writeln!(markdown, "## {heading}")?;
        writeln!(markdown)?;
        for column in columns {
            writeln!(markdown, "<div id=\"chart_{column}\"></div>")?;
        }
    }
    writeln!(markdown)?;

    for column in series.columns() {
        let spec = counter_chart_spec(series, column);
        js_footer.push(charts::vega_embed_call(&format!("chart_{column}"), &spec));
    }

    Ok(ReportSection {
        markdown,
        js_footer,
    })
}

/// The top-N referrer comparison chart.
///
/// Only present observations become data points; an unset cell of the
/// aligned table is skipped, never rendered as zero traffic.
///
/// # Errors
/// Returns error if formatting fails.
pub fn referrer_section(top: &TopNSelection) -> Result<ReportSection> {
    let mut markdown = String::new();
    writeln!(markdown)?;
    writeln!(markdown)?;
    writeln!(markdown, "## Referrers")?;
    writeln!(markdown)?;
    writeln!(markdown)?;
    writeln!(markdown, "<div style=\"width: 100%;\">")?;
    writeln!(markdown, "    <div id=\"chart_referrers_top_n_alltime\"></div>")?;
    writeln!(markdown, "</div>")?;
    writeln!(markdown)?;

    let mut values: Vec<Value> = Vec::new();
    let mut y_max: u64 = 0;
    for (row, time) in top.timestamps.iter().enumerate() {
        for (col, name) in top.names.iter().enumerate() {
            if let Some(count) = top.cells[row][col] {
                values.push(serde_json::json!({
                    "time": time.to_rfc3339(),
                    "referrer": name,
                    "count_unique": count,
                }));
                y_max = y_max.max(count);
            }
        }
    }
    let spec = charts::referrer_chart(values, y_max);

    Ok(ReportSection {
        markdown,
        js_footer: vec![charts::vega_embed_call("chart_referrers_top_n_alltime", &spec)],
    })
}

/// Concatenates section bodies and closes with one `<script>` block
/// holding every accumulated `vegaEmbed` call.
#[must_use]
pub fn assemble(sections: &[ReportSection]) -> String {
    let mut body = String::new();
    let mut js: Vec<String> = Vec::new();
    for section in sections {
        body.push_str(&section.markdown);
        js.extend(section.js_footer.iter().cloned());
    }

    body.push_str("\n<script type=\"text/javascript\">\n");
    body.push_str(&js.join("\n"));
    body.push_str("\n</script>\n");
    body
}

fn counter_chart_spec(series: &ReconciledSeries, column: &str) -> Value {
    // Column came from the series itself, the index is always present.
    let idx = series.column_index(column).unwrap_or(0);
    let values: Vec<Value> = series
        .points()
        .iter()
        .map(|p| {
            let mut datum = serde_json::Map::new();
            datum.insert("time".to_string(), Value::String(p.time.to_rfc3339()));
            datum.insert(column.to_string(), Value::from(p.values[idx]));
            Value::Object(datum)
        })
        .collect();
    let y_max = series.column_max(column).unwrap_or(0);
    charts::counter_chart(values, column, &axis_title(column), y_max)
}

/// Groups counter columns by the text before the first underscore,
/// preserving column order within and across groups.
fn column_groups(columns: &[String]) -> Vec<(String, Vec<&str>)> {
    let mut groups: Vec<(String, Vec<&str>)> = Vec::new();
    for column in columns {
        let prefix = column.split('_').next().unwrap_or(column.as_str());
        let heading = capitalize(prefix);
        match groups.iter_mut().find(|(h, _)| *h == heading) {
            Some((_, cols)) => cols.push(column.as_str()),
            None => groups.push((heading, vec![column.as_str()])),
        }
    }
    groups
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// `views_unique` reads as "unique views per day" on the y axis.
fn axis_title(column: &str) -> String {
    match column.split_once('_') {
        Some((kind, qualifier)) => format!("{qualifier} {kind} per day"),
        None => format!("{column} per day"),
    }
}
