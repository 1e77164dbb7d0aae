//! Chart-type recommendation and default chart configurations.

use crate::classify::{classify, Classification};
use crate::config::{
    AxisPosition, ChartInstanceConfig, ChartKind, DataSeries, SeriesAxisConfig, SubType,
};
use crate::data::TabularDataset;

/// Recommendations shown to the user
pub const DISPLAY_LIMIT: usize = 4;
/// Recommendations pre-selected as charts
pub const DEFAULT_LIMIT: usize = 2;

const FALLBACK: [ChartKind; 2] = [ChartKind::Bar, ChartKind::Line];

/// Suggest chart kinds from column counts, best first, without duplicates.
///
/// Never empty: when no rule applies the result is `[bar, line]`.
pub fn recommend(categorical: &[&str], numeric: &[&str]) -> Vec<ChartKind> {
    let mut kinds = Vec::new();

    if !categorical.is_empty() && !numeric.is_empty() {
        kinds.extend([ChartKind::Bar, ChartKind::Line]);
        if numeric.len() == 1 {
            kinds.push(ChartKind::Pie);
        }
    }
    if numeric.len() >= 2 {
        kinds.extend([ChartKind::Scatter, ChartKind::Area]);
    }

    let mut unique: Vec<ChartKind> = Vec::with_capacity(kinds.len());
    for kind in kinds {
        if !unique.contains(&kind) {
            unique.push(kind);
        }
    }

    if unique.is_empty() {
        FALLBACK.to_vec()
    } else {
        unique
    }
}

/// Recommendations for a dataset, capped at `DISPLAY_LIMIT`
pub fn recommend_for(dataset: &TabularDataset) -> Vec<ChartKind> {
    let classification = classify(dataset);
    let mut kinds = recommend(&classification.categorical(), &classification.numeric());
    kinds.truncate(DISPLAY_LIMIT);
    kinds
}

/// The pre-selected subset of `recommend_for`
pub fn default_kinds(dataset: &TabularDataset) -> Vec<ChartKind> {
    let mut kinds = recommend_for(dataset);
    kinds.truncate(DEFAULT_LIMIT);
    kinds
}

/// One default config per pre-selected chart kind, ids `chart-1`, `chart-2`, ...
pub fn default_configs(dataset: &TabularDataset) -> Vec<ChartInstanceConfig> {
    let classification = classify(dataset);
    default_kinds(dataset)
        .into_iter()
        .enumerate()
        .map(|(idx, kind)| {
            ChartInstanceConfig::with_defaults(
                format!("chart-{}", idx + 1),
                kind,
                dataset,
                &classification,
            )
        })
        .collect()
}

impl ChartInstanceConfig {
    /// A config with column bindings chosen from the dataset.
    ///
    /// x binds the first categorical column (else the first column) and y the
    /// first numeric one. Scatter charts bind two numeric columns, and
    /// combination charts put the second numeric column on the secondary axis.
    pub fn with_defaults(
        id: impl Into<String>,
        kind: ChartKind,
        dataset: &TabularDataset,
        classification: &Classification,
    ) -> Self {
        let numeric = classification.numeric();
        let x_axis = classification
            .categorical()
            .first()
            .map(|c| c.to_string())
            .or_else(|| dataset.columns.first().cloned())
            .unwrap_or_default();

        let mut values = numeric
            .iter()
            .filter(|c| **c != x_axis)
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .into_iter();
        let mut data_series = DataSeries {
            y_axis: values.next().unwrap_or_default(),
            x_axis,
            ..Default::default()
        };

        match kind {
            ChartKind::Scatter => {
                if numeric.len() >= 2 {
                    data_series.x_axis = numeric[0].to_string();
                    data_series.y_axis = numeric[1].to_string();
                }
            }
            ChartKind::Combination => {
                data_series.y_axis_config = SeriesAxisConfig::new(SubType::Bar, AxisPosition::Primary);
                if let Some(second) = values.next() {
                    data_series.y_axis2 = Some(second);
                    data_series.y_axis2_config =
                        Some(SeriesAxisConfig::new(SubType::Line, AxisPosition::Secondary));
                }
            }
            _ => {}
        }

        Self {
            id: id.into(),
            chart_kind: kind,
            data_series,
            ..Default::default()
        }
    }
}

impl ChartKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            ChartKind::Bar => "Bar chart",
            ChartKind::Line => "Line chart",
            ChartKind::Pie => "Pie chart",
            ChartKind::Doughnut => "Doughnut chart",
            ChartKind::Area => "Area chart",
            ChartKind::Scatter => "Scatter plot",
            ChartKind::Combination => "Combination chart",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ChartKind::Bar => "Compare values across categories",
            ChartKind::Line => "Show how values change over time",
            ChartKind::Pie => "Show each part's share of the whole",
            ChartKind::Doughnut => "Show each part's share of the whole, with a center cut-out",
            ChartKind::Area => "Show the cumulative effect of change over time",
            ChartKind::Scatter => "Show the relationship between two variables",
            ChartKind::Combination => "Compare series of different scales on two axes",
        }
    }
}

/// Canvas size for a chart, growing with the number of rows.
/// Pie and doughnut charts are square.
pub fn suggest_canvas_size(row_count: usize, kind: ChartKind) -> (u32, u32) {
    let (width, height) = match row_count {
        0..=10 => (600, 400),
        11..=30 => (800, 500),
        31..=100 => (1000, 600),
        _ => (1200, 700),
    };
    if kind.is_radial() {
        (height, height)
    } else {
        (width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_one_categorical_one_numeric() {
        assert_eq!(
            recommend(&["month"], &["sales"]),
            vec![ChartKind::Bar, ChartKind::Line, ChartKind::Pie]
        );
    }

    #[test]
    fn test_one_categorical_two_numeric() {
        assert_eq!(
            recommend(&["month"], &["sales", "growth"]),
            vec![ChartKind::Bar, ChartKind::Line, ChartKind::Scatter, ChartKind::Area]
        );
    }

    #[test]
    fn test_numeric_only() {
        assert_eq!(
            recommend(&[], &["a", "b"]),
            vec![ChartKind::Scatter, ChartKind::Area]
        );
        assert_eq!(recommend(&[], &["a"]), vec![ChartKind::Bar, ChartKind::Line]);
    }

    #[test]
    fn test_empty_classification_falls_back() {
        assert_eq!(recommend(&[], &[]), vec![ChartKind::Bar, ChartKind::Line]);
        assert_eq!(recommend(&["a", "b"], &[]), vec![ChartKind::Bar, ChartKind::Line]);
    }

    #[test]
    fn test_limits() {
        let mut ds = TabularDataset::mock();
        ds.columns.push("cost".into());
        ds.column_types.insert("cost".into(), "numeric".into());
        for row in ds.rows.iter_mut() {
            row.push(serde_json::json!(1));
        }
        assert_eq!(recommend_for(&ds).len(), DISPLAY_LIMIT);
        assert_eq!(default_kinds(&ds), vec![ChartKind::Bar, ChartKind::Line]);
    }

    #[test]
    fn test_default_configs_bind_columns() {
        let configs = default_configs(&TabularDataset::mock());
        assert_eq!(configs.len(), 2);
        assert_eq!(configs[0].id, "chart-1");
        assert_eq!(configs[0].chart_kind, ChartKind::Bar);
        assert_eq!(configs[0].data_series.x_axis, "month");
        assert_eq!(configs[0].data_series.y_axis, "sales");
        assert_eq!(configs[1].chart_kind, ChartKind::Line);
    }

    #[test]
    fn test_combination_defaults_use_secondary_axis() {
        let ds = TabularDataset::mock();
        let cfg = ChartInstanceConfig::with_defaults("c", ChartKind::Combination, &ds, &classify(&ds));
        assert_eq!(cfg.data_series.y_axis2.as_deref(), Some("growth"));
        let y2 = cfg.data_series.y_axis2_config.unwrap();
        assert_eq!(y2.axis_position, AxisPosition::Secondary);
        assert_eq!(y2.sub_type, SubType::Line);
    }

    #[test]
    fn test_scatter_defaults_bind_two_numeric_columns() {
        let ds = TabularDataset::mock();
        let cfg = ChartInstanceConfig::with_defaults("s", ChartKind::Scatter, &ds, &classify(&ds));
        assert_eq!(cfg.data_series.x_axis, "sales");
        assert_eq!(cfg.data_series.y_axis, "growth");
    }

    #[test]
    fn test_defaults_without_types() {
        let mut ds = TabularDataset::mock();
        ds.column_types.clear();
        let cfg = ChartInstanceConfig::with_defaults("c", ChartKind::Bar, &ds, &classify(&ds));
        assert_eq!(cfg.data_series.x_axis, "month");
        assert_eq!(cfg.data_series.y_axis, "");
    }

    #[test]
    fn test_canvas_size_tiers() {
        assert_eq!(suggest_canvas_size(6, ChartKind::Bar), (600, 400));
        assert_eq!(suggest_canvas_size(30, ChartKind::Line), (800, 500));
        assert_eq!(suggest_canvas_size(31, ChartKind::Line), (1000, 600));
        assert_eq!(suggest_canvas_size(500, ChartKind::Area), (1200, 700));
        assert_eq!(suggest_canvas_size(6, ChartKind::Pie), (400, 400));
        assert_eq!(suggest_canvas_size(50, ChartKind::Doughnut), (600, 600));
    }

    #[test]
    fn test_catalogue_entries() {
        for kind in ChartKind::ALL {
            assert!(!kind.display_name().is_empty());
            assert!(!kind.description().is_empty());
        }
    }
}
