use std::collections::BTreeMap;

use crate::classify::classify;
use crate::config::ChartInstanceConfig;
use crate::data::TabularDataset;
use crate::error::CompileError;
use crate::ir::{
    AxisScaleSpec, AxisSide, AxisTitle, CartesianKind, ChartData, ChartOptions, ChartPlan,
    GridSpec, RadialKind, RenderKind, RenderSpec, ScaleType,
};
use crate::resolve::{build_plan, resolve_x_column};
use crate::scale::{build_scales, compute_range};
use crate::theme_resolve::{minimal_plugins, resolve_scheme, resolve_style, DEFAULT_SCHEME};
use crate::transform::{assemble, fallback_bar_dataset};

/// Compile a chart configuration against a dataset.
///
/// Never fails. A dataset without columns is replaced by the sample dataset,
/// and any compile error yields `fallback_spec`.
pub fn compile(config: &ChartInstanceConfig, dataset: &TabularDataset) -> RenderSpec {
    let sample;
    let dataset = match dataset.check_shape() {
        Ok(()) => dataset,
        Err(e) => {
            log::debug!("{}; compiling chart '{}' against the sample dataset", e, config.id);
            sample = TabularDataset::mock();
            &sample
        }
    };

    match try_compile(config, dataset) {
        Ok(spec) => spec,
        Err(e) => {
            log::warn!("chart '{}' could not be compiled ({}); using fallback spec", config.id, e);
            fallback_spec(config, dataset)
        }
    }
}

/// The full pipeline, surfacing the first error instead of degrading
pub fn try_compile(
    config: &ChartInstanceConfig,
    dataset: &TabularDataset,
) -> Result<RenderSpec, CompileError> {
    // 1. Classify columns and narrow the config to its chart kind
    let classification = classify(dataset);
    let plan = build_plan(config, dataset, &classification)?;

    // 2. Resolve colors and plugin options
    let style = resolve_style(config);

    // 3. Build datasets, then the scales they are drawn against
    let datasets = assemble(&plan, dataset, &style.colors)?;
    let scales = build_scales(&plan, dataset, config, &datasets);

    let label_column = match &plan {
        ChartPlan::Cartesian(p) => &p.x_column,
        ChartPlan::Radial(p) => &p.label_column,
        ChartPlan::Scatter(p) => &p.x_column,
    };

    Ok(RenderSpec {
        kind: render_kind(&plan),
        data: ChartData {
            labels: dataset.column_labels(label_column),
            datasets,
        },
        options: ChartOptions {
            plugins: style.plugins,
            scales,
        },
    })
}

/// Minimal renderable spec: one bar series over the configured x/y columns
/// in the default scheme colors, with no title or data labels.
pub fn fallback_spec(config: &ChartInstanceConfig, dataset: &TabularDataset) -> RenderSpec {
    let colors = resolve_scheme(DEFAULT_SCHEME);
    let x_column = resolve_x_column(config, dataset, &classify(dataset)).unwrap_or_default();
    let y_column = config.data_series.y_axis.clone();
    let y_range = compute_range(dataset, std::slice::from_ref(&y_column));

    let mut scales = BTreeMap::new();
    scales.insert(
        "x".to_string(),
        AxisScaleSpec {
            scale_type: ScaleType::Category,
            position: AxisSide::Bottom,
            display: true,
            min: None,
            max: None,
            title: AxisTitle {
                display: false,
                text: x_column.clone(),
            },
            grid: GridSpec {
                display: true,
                draw_on_chart_area: true,
            },
        },
    );
    scales.insert(
        "y".to_string(),
        AxisScaleSpec {
            scale_type: ScaleType::Linear,
            position: AxisSide::Left,
            display: true,
            min: Some(y_range.min),
            max: Some(y_range.max),
            title: AxisTitle {
                display: false,
                text: y_column.clone(),
            },
            grid: GridSpec {
                display: true,
                draw_on_chart_area: true,
            },
        },
    );

    RenderSpec {
        kind: RenderKind::Bar,
        data: ChartData {
            labels: dataset.column_labels(&x_column),
            datasets: vec![fallback_bar_dataset(&y_column, dataset, &colors)],
        },
        options: ChartOptions {
            plugins: minimal_plugins(),
            scales,
        },
    }
}

fn render_kind(plan: &ChartPlan) -> RenderKind {
    match plan {
        ChartPlan::Cartesian(p) => match p.kind {
            CartesianKind::Line | CartesianKind::Area => RenderKind::Line,
            CartesianKind::Bar | CartesianKind::Combination => RenderKind::Bar,
        },
        ChartPlan::Radial(p) => match p.kind {
            RadialKind::Pie => RenderKind::Pie,
            RadialKind::Doughnut => RenderKind::Doughnut,
        },
        ChartPlan::Scatter(_) => RenderKind::Scatter,
    }
}
