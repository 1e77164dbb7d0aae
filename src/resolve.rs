use crate::classify::Classification;
use crate::config::{AxisPosition, ChartInstanceConfig, ChartKind, SeriesAxisConfig, SubType};
use crate::data::TabularDataset;
use crate::error::CompileError;
use crate::ir::{
    AxisGroups, CartesianKind, CartesianPlan, ChartPlan, RadialKind, RadialPlan, ResolvedSeries,
    ScatterPlan, SeriesRole,
};

/// Route the configured value series onto the primary and secondary axes
pub fn resolve_axes(config: &ChartInstanceConfig, dataset: &TabularDataset) -> AxisGroups {
    let mut groups = AxisGroups::default();
    for s in resolve_series(config, dataset) {
        match s.position {
            AxisPosition::Primary => groups.primary_keys.push(s.data_key),
            AxisPosition::Secondary => groups.secondary_keys.push(s.data_key),
        }
    }
    groups
}

/// Resolve main, secondary and additional series, in that order.
///
/// The main series is always primary. Series whose column is absent from
/// the dataset are dropped.
pub fn resolve_series(config: &ChartInstanceConfig, dataset: &TabularDataset) -> Vec<ResolvedSeries> {
    let ds = &config.data_series;
    let y_axis = ds.y_axis.as_str();
    let y_axis2 = ds.y_axis2.as_deref().unwrap_or("");
    let mut series = Vec::new();

    if !y_axis.is_empty() && column_exists(dataset, y_axis) {
        series.push(ResolvedSeries {
            role: SeriesRole::Main,
            data_key: y_axis.to_string(),
            sub_type: ds.y_axis_config.sub_type,
            position: AxisPosition::Primary,
            color: None,
        });
    }

    if !y_axis2.is_empty() && y_axis2 != y_axis && column_exists(dataset, y_axis2) {
        let axis_config = ds
            .y_axis2_config
            .clone()
            .unwrap_or_else(|| SeriesAxisConfig::new(SubType::Line, AxisPosition::Secondary));
        series.push(ResolvedSeries {
            role: SeriesRole::Secondary,
            data_key: y_axis2.to_string(),
            sub_type: axis_config.sub_type,
            position: axis_config.axis_position,
            color: None,
        });
    }

    for extra in &ds.additional_y_axes {
        let key = extra.data_key.as_str();
        if key.is_empty() || key == y_axis || key == y_axis2 {
            continue;
        }
        if !column_exists(dataset, key) {
            continue;
        }
        series.push(ResolvedSeries {
            role: SeriesRole::Additional(extra.id.clone()),
            data_key: key.to_string(),
            sub_type: extra.sub_type,
            position: extra.axis_position,
            color: Some(extra.color.clone()).filter(|c| !c.is_empty()),
        });
    }

    series
}

/// Pick the category column: configured x, else first categorical, else first column
pub fn resolve_x_column(
    config: &ChartInstanceConfig,
    dataset: &TabularDataset,
    classification: &Classification,
) -> Option<String> {
    let configured = config.data_series.x_axis.as_str();
    if !configured.is_empty() && column_exists(dataset, configured) {
        return Some(configured.to_string());
    }

    classification
        .categorical()
        .first()
        .map(|c| c.to_string())
        .or_else(|| dataset.columns.first().cloned())
}

/// Narrow a config to the plan for its chart kind
pub fn build_plan(
    config: &ChartInstanceConfig,
    dataset: &TabularDataset,
    classification: &Classification,
) -> Result<ChartPlan, CompileError> {
    dataset.check_shape()?;

    let x_column =
        resolve_x_column(config, dataset, classification).ok_or(CompileError::DataShape("columns"))?;

    let mut series = resolve_series(config, dataset);
    if !series.iter().any(|s| s.role == SeriesRole::Main) {
        let value_column = default_value_column(&x_column, &series, classification)
            .ok_or(CompileError::NoValueColumn)?;
        log::debug!(
            "main series '{}' unavailable, binding '{}' instead",
            config.data_series.y_axis,
            value_column
        );
        series.insert(
            0,
            ResolvedSeries {
                role: SeriesRole::Main,
                data_key: value_column,
                sub_type: config.data_series.y_axis_config.sub_type,
                position: AxisPosition::Primary,
                color: None,
            },
        );
    }

    let main_key = series[0].data_key.clone();

    let plan = match config.chart_kind {
        ChartKind::Pie | ChartKind::Doughnut => ChartPlan::Radial(RadialPlan {
            kind: if config.chart_kind == ChartKind::Pie {
                RadialKind::Pie
            } else {
                RadialKind::Doughnut
            },
            label_column: x_column,
            value_column: main_key,
        }),
        ChartKind::Scatter => ChartPlan::Scatter(ScatterPlan {
            x_column,
            y_column: main_key,
        }),
        ChartKind::Combination => ChartPlan::Cartesian(CartesianPlan {
            kind: CartesianKind::Combination,
            x_column,
            series,
        }),
        ChartKind::Bar | ChartKind::Line | ChartKind::Area => {
            // Only combination charts mix geometries
            let (kind, sub_type) = match config.chart_kind {
                ChartKind::Line => (CartesianKind::Line, SubType::Line),
                ChartKind::Area => (CartesianKind::Area, SubType::Area),
                _ => (CartesianKind::Bar, SubType::Bar),
            };
            let series = series
                .into_iter()
                .map(|s| ResolvedSeries { sub_type, ..s })
                .collect();
            ChartPlan::Cartesian(CartesianPlan {
                kind,
                x_column,
                series,
            })
        }
    };

    Ok(plan)
}

/// First numeric column that is neither the x column nor already bound
fn default_value_column(
    x_column: &str,
    bound: &[ResolvedSeries],
    classification: &Classification,
) -> Option<String> {
    classification
        .numeric()
        .into_iter()
        .find(|c| *c != x_column && !bound.iter().any(|s| s.data_key == *c))
        .map(|c| c.to_string())
}

fn column_exists(dataset: &TabularDataset, column: &str) -> bool {
    if dataset.has_column(column) {
        return true;
    }
    log::debug!("{}; dropping series", CompileError::MissingColumn(column.to_string()));
    false
}
