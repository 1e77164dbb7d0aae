use chartspec::config::{DataLabelFormat, LegendPosition};
use chartspec::ir::{AxisSide, DataPoint, FillPolicy, RenderKind};
use chartspec::{compile, ChartInstanceConfig, ChartKind, TabularDataset};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::fs;

fn fixture(name: &str) -> Value {
    let path = format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name);
    let text = fs::read_to_string(&path).expect("Failed to read fixture");
    serde_json::from_str(&text).expect("Fixture is not valid JSON")
}

fn sales() -> TabularDataset {
    TabularDataset::from_json(&fixture("sales.json")).unwrap()
}

fn values(spec: &chartspec::RenderSpec, idx: usize) -> Vec<f64> {
    spec.datasets()[idx].values.iter().map(DataPoint::y).collect()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_combination_chart_end_to_end() {
    let config = ChartInstanceConfig::from_json(&fixture("combination.json"));
    let spec = compile(&config, &sales());

    assert_eq!(spec.kind, RenderKind::Bar);
    assert_eq!(spec.labels(), &["North", "South", "East", "West"]);

    let labels: Vec<&str> = spec.datasets().iter().map(|d| d.label.as_str()).collect();
    assert_eq!(labels, vec!["revenue", "margin", "units"]);

    // Main series is primary even though configured as secondary
    let revenue = &spec.datasets()[0];
    assert_eq!(revenue.sub_type, RenderKind::Bar);
    assert_eq!(revenue.axis_id.as_deref(), Some("y"));
    assert_eq!(values(&spec, 0), vec![1200.0, 950.0, 1480.0, 0.0]);

    let margin = &spec.datasets()[1];
    assert_eq!(margin.sub_type, RenderKind::Line);
    assert_eq!(margin.axis_id.as_deref(), Some("y1"));
    assert_eq!(margin.border_color.at(0), "rgba(187, 143, 206, 1)");
    assert_eq!(margin.background_color.at(0), "transparent");

    let units = &spec.datasets()[2];
    assert_eq!(units.fill_policy, FillPolicy::Origin);
    assert_eq!(units.border_color.at(0), "#ff6384");
    assert_eq!(units.background_color.at(0), "rgba(255, 99, 132, 0.2)");
    assert_eq!(values(&spec, 2), vec![40.0, 31.0, 52.0, 28.0]);

    let y = spec.scale("y").unwrap().range().unwrap();
    assert_eq!(y.min, 0.0);
    assert!(close(y.max, 1625.2));

    let y1 = spec.scale("y1").unwrap();
    assert_eq!(y1.position, AxisSide::Right);
    assert!(!y1.grid.draw_on_chart_area);
    assert_eq!(y1.title.text, "Margin %");
    let r = y1.range().unwrap();
    assert!(close(r.min, 8.375) && close(r.max, 15.875));

    assert_eq!(spec.scale("x").unwrap().title.text, "Region");

    let plugins = &spec.options.plugins;
    assert!(plugins.title.display);
    assert_eq!(plugins.title.text, "Revenue and margin");
    assert!(plugins.data_labels.display);
    assert_eq!(plugins.data_labels.format, DataLabelFormat::OneDecimal);
}

#[test]
fn test_combination_wire_shape() {
    let config = ChartInstanceConfig::from_json(&fixture("combination.json"));
    let json = compile(&config, &sales()).to_json();

    assert_eq!(json["kind"], "bar");
    assert_eq!(json["data"]["datasets"][0]["type"], "bar");
    assert_eq!(json["data"]["datasets"][1]["yAxisID"], "y1");
    assert_eq!(json["data"]["datasets"][1]["fill"], false);
    assert_eq!(json["data"]["datasets"][2]["fill"], "origin");
    assert_eq!(json["options"]["scales"]["y1"]["grid"]["drawOnChartArea"], false);
    assert_eq!(json["options"]["scales"]["x"]["type"], "category");
    assert_eq!(json["options"]["plugins"]["dataLabels"]["format"], "1-decimal");
    assert_eq!(json["options"]["plugins"]["legend"]["position"], "top");
}

#[test]
fn test_malformed_additional_axis_collapses_to_bar() {
    let mut raw = fixture("combination.json");
    raw["dataSeries"]["additionalYAxes"][0]["color"] = json!("not-a-color");
    let spec = compile(&ChartInstanceConfig::from_json(&raw), &sales());

    assert_eq!(spec.datasets().len(), 1);
    assert_eq!(spec.datasets()[0].label, "revenue");
    assert_eq!(spec.datasets()[0].sub_type, RenderKind::Bar);
    assert!(spec.scale("y1").is_none());
}

#[test]
fn test_pie_from_csv() {
    let path = format!("{}/tests/fixtures/sales.csv", env!("CARGO_MANIFEST_DIR"));
    let dataset = TabularDataset::from_csv(fs::File::open(path).unwrap()).unwrap();
    assert_eq!(dataset.column_types["region"], "string");
    assert_eq!(dataset.column_types["revenue"], "numeric");

    let config = ChartInstanceConfig::from_json(&json!({
        "id": "share",
        "chartKind": "pie",
        "dataSeries": {"xAxis": "region", "yAxis": "revenue"},
        "styling": {"showLegend": true, "legendPosition": "right"}
    }));
    let spec = compile(&config, &dataset);

    assert_eq!(spec.kind, RenderKind::Pie);
    assert_eq!(values(&spec, 0), vec![1200.0, 950.0, 1480.0, 0.0]);
    assert!(spec.options.scales.is_empty());
    assert!(!spec.options.plugins.legend.display);
    assert_eq!(spec.options.plugins.legend.position, LegendPosition::Right);
    assert_eq!(spec.datasets()[0].background_color.at(0), "rgba(255, 99, 132, 0.8)");
    assert_eq!(spec.datasets()[0].background_color.at(3), "rgba(75, 192, 192, 0.8)");
}

#[test]
fn test_every_config_in_a_session_compiles() {
    let dataset = sales();
    let charts = fixture("charts.json");
    let configs: Vec<ChartInstanceConfig> = charts
        .as_array()
        .unwrap()
        .iter()
        .map(ChartInstanceConfig::from_json)
        .collect();

    // Unknown kind and malformed series degrade to a default bar chart
    assert_eq!(configs[2].chart_kind, ChartKind::Bar);
    let broken = compile(&configs[2], &dataset);
    assert_eq!(broken.kind, RenderKind::Bar);
    assert_eq!(broken.datasets()[0].label, "revenue");
    assert_eq!(broken.labels()[0], "North");

    for config in &configs {
        let spec = compile(config, &dataset);
        assert!(!spec.datasets().is_empty(), "chart '{}' has no datasets", config.id);
    }
}

#[test]
fn test_missing_columns_fall_back_to_sample_and_defaults() {
    let empty = TabularDataset::from_json(&json!({"columns": [], "data": []})).unwrap();
    let config = ChartInstanceConfig::from_json(&json!({"chartKind": "line"}));
    let spec = compile(&config, &empty);

    assert_eq!(spec.kind, RenderKind::Line);
    assert_eq!(spec.labels()[0], "Jan");
    assert_eq!(spec.datasets()[0].label, "sales");
}

#[test]
fn test_scatter_string_x_uses_index() {
    let config = ChartInstanceConfig::from_json(&json!({
        "chartKind": "scatter",
        "dataSeries": {"xAxis": "region", "yAxis": "margin"}
    }));
    let spec = compile(&config, &sales());
    let points = &spec.datasets()[0].values;
    assert_eq!(points[0], DataPoint::Point { x: 0.0, y: 12.5 });
    assert_eq!(points[3], DataPoint::Point { x: 3.0, y: 11.0 });
}
