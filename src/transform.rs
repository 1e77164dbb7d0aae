use serde_json::Value;

use crate::config::{AxisPosition, SubType};
use crate::data::TabularDataset;
use crate::error::CompileError;
use crate::ir::{
    CartesianKind, CartesianPlan, ChartPlan, ColorFill, DataPoint, FillPolicy, RadialKind,
    RadialPlan, RenderDataset, RenderKind, ResolvedSeries, ScatterPlan, SeriesRole,
};
use crate::parser::{parse_color, translucent};
use crate::scale::coerce_number;
use crate::theme_resolve::{ColorPair, SchemeColors, AREA_FILL_ALPHA, PIE_PALETTE};

/// Main entry point: build one render dataset per resolved series
pub fn assemble(
    plan: &ChartPlan,
    dataset: &TabularDataset,
    colors: &SchemeColors,
) -> Result<Vec<RenderDataset>, CompileError> {
    match plan {
        ChartPlan::Radial(p) => Ok(vec![assemble_radial(p, dataset)]),
        ChartPlan::Scatter(p) => Ok(vec![assemble_scatter(p, dataset, colors)]),
        ChartPlan::Cartesian(p) if p.kind == CartesianKind::Combination => {
            Ok(assemble_combination(p, dataset, colors))
        }
        ChartPlan::Cartesian(p) => assemble_cartesian(p, dataset, colors),
    }
}

/// Multi-axis assembly that never fails: a malformed series collapses the
/// chart to a single bar series over the main column
pub fn assemble_combination(
    plan: &CartesianPlan,
    dataset: &TabularDataset,
    colors: &SchemeColors,
) -> Vec<RenderDataset> {
    match assemble_cartesian(plan, dataset, colors) {
        Ok(datasets) => datasets,
        Err(e) => {
            log::warn!("combination chart falls back to a single bar series: {}", e);
            vec![fallback_bar_dataset(&plan.main().data_key, dataset, colors)]
        }
    }
}

pub fn assemble_cartesian(
    plan: &CartesianPlan,
    dataset: &TabularDataset,
    colors: &SchemeColors,
) -> Result<Vec<RenderDataset>, CompileError> {
    let mut datasets = Vec::with_capacity(plan.series.len());

    for (idx, series) in plan.series.iter().enumerate() {
        let (background, border) = series_colors(series, idx, colors)?;
        let values = numeric_values(dataset, &series.data_key);

        let (sub_type, fill_policy, background, border_width) = match series.sub_type {
            SubType::Bar => (RenderKind::Bar, FillPolicy::None, background, 1),
            SubType::Line => (RenderKind::Line, FillPolicy::None, "transparent".to_string(), 2),
            SubType::Area => {
                let fill = translucent(&border, AREA_FILL_ALPHA).ok_or_else(|| {
                    CompileError::MalformedAxis {
                        id: series_id(series),
                        reason: format!("cannot derive a fill from color '{}'", border),
                    }
                })?;
                (RenderKind::Line, FillPolicy::Origin, fill, 2)
            }
        };

        datasets.push(RenderDataset {
            label: series.data_key.clone(),
            values,
            sub_type,
            fill_policy,
            background_color: ColorFill::Single(background),
            border_color: ColorFill::Single(border),
            axis_id: Some(axis_id(series.position).to_string()),
            border_width,
        });
    }

    Ok(datasets)
}

/// Single dataset over the value column with wedge colors cycling the palette
pub fn assemble_radial(plan: &RadialPlan, dataset: &TabularDataset) -> RenderDataset {
    let values = numeric_values(dataset, &plan.value_column);
    let (backgrounds, borders): (Vec<String>, Vec<String>) = (0..values.len())
        .map(|i| {
            let pair = PIE_PALETTE[i % PIE_PALETTE.len()];
            (pair.background.to_string(), pair.border.to_string())
        })
        .unzip();

    RenderDataset {
        label: plan.value_column.clone(),
        values,
        sub_type: match plan.kind {
            RadialKind::Pie => RenderKind::Pie,
            RadialKind::Doughnut => RenderKind::Doughnut,
        },
        fill_policy: FillPolicy::None,
        background_color: ColorFill::PerPoint(backgrounds),
        border_color: ColorFill::PerPoint(borders),
        axis_id: None,
        border_width: 1,
    }
}

pub fn assemble_scatter(
    plan: &ScatterPlan,
    dataset: &TabularDataset,
    colors: &SchemeColors,
) -> RenderDataset {
    let xs = dataset.column(&plan.x_column).unwrap_or_default();
    let ys = dataset.column(&plan.y_column).unwrap_or_default();

    RenderDataset {
        label: plan.y_column.clone(),
        values: scatter_points(&xs, &ys),
        sub_type: RenderKind::Scatter,
        fill_policy: FillPolicy::None,
        background_color: ColorFill::Single(colors.primary.background.to_string()),
        border_color: ColorFill::Single(colors.primary.border.to_string()),
        axis_id: Some("y".to_string()),
        border_width: 1,
    }
}

/// Zip x and y positionally. A non-numeric x becomes its index, a
/// non-numeric or missing y becomes 0. One point per x value.
pub fn scatter_points(xs: &[&Value], ys: &[&Value]) -> Vec<DataPoint> {
    xs.iter()
        .enumerate()
        .map(|(i, x)| DataPoint::Point {
            x: coerce_number(x).unwrap_or(i as f64),
            y: ys.get(i).and_then(|y| coerce_number(y)).unwrap_or(0.0),
        })
        .collect()
}

/// One bar series in the scheme's primary colors
pub fn fallback_bar_dataset(
    value_column: &str,
    dataset: &TabularDataset,
    colors: &SchemeColors,
) -> RenderDataset {
    RenderDataset {
        label: value_column.to_string(),
        values: numeric_values(dataset, value_column),
        sub_type: RenderKind::Bar,
        fill_policy: FillPolicy::None,
        background_color: ColorFill::Single(colors.primary.background.to_string()),
        border_color: ColorFill::Single(colors.primary.border.to_string()),
        axis_id: Some("y".to_string()),
        border_width: 1,
    }
}

/// Column values as numbers; non-numeric cells become 0
pub fn numeric_values(dataset: &TabularDataset, column: &str) -> Vec<DataPoint> {
    dataset
        .column(column)
        .unwrap_or_default()
        .into_iter()
        .map(|v| {
            let n = coerce_number(v).unwrap_or_else(|| {
                if !v.is_null() {
                    log::trace!(
                        "{}",
                        CompileError::NumericCoercion {
                            column: column.to_string(),
                            value: v.to_string(),
                        }
                    );
                }
                0.0
            });
            DataPoint::Value(n)
        })
        .collect()
}

pub fn axis_id(position: AxisPosition) -> &'static str {
    match position {
        AxisPosition::Primary => "y",
        AxisPosition::Secondary => "y1",
    }
}

fn series_colors(
    series: &ResolvedSeries,
    idx: usize,
    colors: &SchemeColors,
) -> Result<(String, String), CompileError> {
    let pair: ColorPair = match &series.role {
        SeriesRole::Main => colors.primary,
        SeriesRole::Secondary => colors.secondary,
        SeriesRole::Additional(id) => match &series.color {
            Some(color) => {
                if parse_color(color).is_none() {
                    return Err(CompileError::MalformedAxis {
                        id: id.clone(),
                        reason: format!("unrecognised color '{}'", color),
                    });
                }
                return Ok((color.clone(), color.clone()));
            }
            None => PIE_PALETTE[idx % PIE_PALETTE.len()],
        },
    };
    Ok((pair.background.to_string(), pair.border.to_string()))
}

fn series_id(series: &ResolvedSeries) -> String {
    match &series.role {
        SeriesRole::Additional(id) => id.clone(),
        _ => series.data_key.clone(),
    }
}
