// src/report/charts.rs
//! Vega-Lite chart specifications.
//!
//! Specs carry their data inline and render client-side via `vegaEmbed`
//! calls emitted into the report footer.

use serde_json::{json, Value};

const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v4.json";

const PANEL_WIDTH: u32 = 360;
const PANEL_HEIGHT: u32 = 250;
const REFERRER_PANEL_HEIGHT: u32 = 400;

/// Line-with-points chart for one counter column of the traffic series.
#[must_use]
pub fn counter_chart(values: Vec<Value>, field: &str, y_title: &str, y_max: u64) -> Value {
    json!({
        "$schema": VEGA_LITE_SCHEMA,
        "config": {
            "axisY": {"labelBound": true},
            "point": {"size": 100},
        },
        "data": {"values": values},
        "mark": {"type": "line", "point": true},
        "encoding": {
            "x": {"field": "time", "type": "temporal", "title": "date"},
            "y": {
                "field": field,
                "type": "quantitative",
                "title": y_title,
                "scale": {"domain": [0.0, headroom(y_max)], "zero": true},
            },
        },
        "height": PANEL_HEIGHT,
        "width": PANEL_WIDTH,
        "padding": 10,
    })
}

/// Multi-series chart comparing the top referrers, colored by name.
#[must_use]
pub fn referrer_chart(values: Vec<Value>, y_max: u64) -> Value {
    json!({
        "$schema": VEGA_LITE_SCHEMA,
        "config": {
            "point": {"size": 100},
        },
        "data": {"values": values},
        "mark": {"type": "line", "point": true},
        "encoding": {
            "x": {"field": "time", "type": "temporal", "title": "date"},
            "y": {
                "field": "count_unique",
                "type": "quantitative",
                "title": "unique views per day",
                "scale": {"domain": [0.0, headroom(y_max)], "zero": true},
            },
            "color": {"field": "referrer", "type": "nominal"},
        },
        "height": REFERRER_PANEL_HEIGHT,
        "width": "container",
        "padding": 10,
    })
}

/// The embed call wired into the report's JS footer.
#[must_use]
pub fn vega_embed_call(div_id: &str, spec: &Value) -> String {
    format!(
        "vegaEmbed('#{div_id}', {spec}, {options}).catch(console.error);",
        options = embed_options()
    )
}

fn embed_options() -> Value {
    json!({"actions": false, "renderer": "canvas"})
}

// 10% headroom above the observed maximum keeps the top marker off the
// panel edge.
fn headroom(y_max: u64) -> f64 {
    y_max as f64 * 1.1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_chart_scales_to_observed_max() {
        let spec = counter_chart(Vec::new(), "views_total", "total views per day", 100);
        let domain = &spec["encoding"]["y"]["scale"]["domain"];
        assert_eq!(domain[0], json!(0.0));
        let upper = domain[1].as_f64().unwrap();
        assert!((upper - 110.0).abs() < 1e-9);
        assert_eq!(spec["encoding"]["y"]["field"], "views_total");
    }

    #[test]
    fn referrer_chart_colors_by_name() {
        let spec = referrer_chart(Vec::new(), 10);
        assert_eq!(spec["encoding"]["color"]["field"], "referrer");
        assert_eq!(spec["width"], "container");
    }

    #[test]
    fn embed_call_targets_the_div() {
        let call = vega_embed_call("chart_views_unique", &json!({}));
        assert!(call.starts_with("vegaEmbed('#chart_views_unique', {}"));
        assert!(call.contains("\"actions\":false"));
        assert!(call.ends_with(".catch(console.error);"));
    }
}
