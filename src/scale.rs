use serde_json::Value;
use std::collections::BTreeMap;

use crate::config::ChartInstanceConfig;
use crate::data::TabularDataset;
use crate::ir::{
    AxisGroups, AxisRange, AxisScaleSpec, AxisSide, AxisTitle, ChartPlan, DataPoint, GridSpec,
    RenderDataset, ScaleType,
};

/// Fraction of the data span added on each side of a value axis
pub const PADDING_RATIO: f64 = 0.10;

/// Coerce a cell to a number: numbers pass through, strings are parsed,
/// anything else is dropped
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

/// Padded bounds over every numeric value of the given columns
pub fn compute_range(dataset: &TabularDataset, keys: &[String]) -> AxisRange {
    let values = keys
        .iter()
        .filter_map(|key| dataset.column(key))
        .flatten()
        .filter_map(coerce_number);
    range_of(values)
}

/// Padded bounds of a set of values; `0..100` when there are none
pub fn range_of<I>(values: I) -> AxisRange
where
    I: IntoIterator<Item = f64>,
{
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        if v < min {
            min = v;
        }
        if v > max {
            max = v;
        }
    }

    if min == f64::INFINITY {
        return AxisRange::DEFAULT;
    }
    pad_range(min, max)
}

fn pad_range(min: f64, max: f64) -> AxisRange {
    let padding = (max - min) * PADDING_RATIO;
    let lower = min - padding;
    // Non-negative data never gets a negative axis
    let lower = if min >= 0.0 { lower.max(0.0) } else { lower };
    AxisRange {
        min: lower,
        max: max + padding,
    }
}

/// Build the axis scales for a plan. Pie and doughnut charts have none.
pub fn build_scales(
    plan: &ChartPlan,
    dataset: &TabularDataset,
    config: &ChartInstanceConfig,
    datasets: &[RenderDataset],
) -> BTreeMap<String, AxisScaleSpec> {
    let grid = config.styling.show_grid_lines;
    let show_titles = config.layout.show_axis_labels;
    let layout = &config.layout;
    let mut scales = BTreeMap::new();

    match plan {
        ChartPlan::Radial(_) => {}
        ChartPlan::Cartesian(p) => {
            // Ranges cover only what is drawn; a collapsed combination keeps its main series
            let groups = AxisGroups::drawn(datasets);

            scales.insert(
                "x".to_string(),
                AxisScaleSpec {
                    scale_type: ScaleType::Category,
                    position: AxisSide::Bottom,
                    display: true,
                    min: None,
                    max: None,
                    title: axis_title(show_titles, &layout.x_axis_label, &p.x_column),
                    grid: GridSpec {
                        display: grid,
                        draw_on_chart_area: true,
                    },
                },
            );

            let primary = compute_range(dataset, &groups.primary_keys);
            scales.insert(
                "y".to_string(),
                value_axis(
                    primary,
                    AxisSide::Left,
                    axis_title(show_titles, &layout.y_axis_label, &p.main().data_key),
                    GridSpec {
                        display: grid,
                        draw_on_chart_area: true,
                    },
                ),
            );

            if let Some(first_secondary) = groups.secondary_keys.first() {
                let secondary = compute_range(dataset, &groups.secondary_keys);
                scales.insert(
                    "y1".to_string(),
                    value_axis(
                        secondary,
                        AxisSide::Right,
                        axis_title(show_titles, &layout.y_axis2_label, first_secondary),
                        // Secondary grid lines never cross the plot area
                        GridSpec {
                            display: grid,
                            draw_on_chart_area: false,
                        },
                    ),
                );
            }
        }
        ChartPlan::Scatter(p) => {
            let points: Vec<(f64, f64)> = datasets
                .first()
                .map(|d| {
                    d.values
                        .iter()
                        .filter_map(|v| match v {
                            DataPoint::Point { x, y } => Some((*x, *y)),
                            DataPoint::Value(_) => None,
                        })
                        .collect()
                })
                .unwrap_or_default();

            let x_range = range_of(points.iter().map(|(x, _)| *x));
            let y_range = range_of(points.iter().map(|(_, y)| *y));
            let grid = GridSpec {
                display: grid,
                draw_on_chart_area: true,
            };

            scales.insert(
                "x".to_string(),
                value_axis(
                    x_range,
                    AxisSide::Bottom,
                    axis_title(show_titles, &layout.x_axis_label, &p.x_column),
                    grid.clone(),
                ),
            );
            scales.insert(
                "y".to_string(),
                value_axis(
                    y_range,
                    AxisSide::Left,
                    axis_title(show_titles, &layout.y_axis_label, &p.y_column),
                    grid,
                ),
            );
        }
    }

    scales
}

fn value_axis(range: AxisRange, position: AxisSide, title: AxisTitle, grid: GridSpec) -> AxisScaleSpec {
    AxisScaleSpec {
        scale_type: ScaleType::Linear,
        position,
        display: true,
        min: Some(range.min),
        max: Some(range.max),
        title,
        grid,
    }
}

fn axis_title(display: bool, label: &str, column: &str) -> AxisTitle {
    AxisTitle {
        display,
        text: if label.is_empty() { column } else { label }.to_string(),
    }
}
