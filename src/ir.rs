use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

use crate::config::{AxisPosition, DataLabelFormat, LegendPosition, SubType};

// =============================================================================
// Phase 1: Resolution
// =============================================================================

/// Where a value series came from in the config
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesRole {
    Main,
    Secondary,
    Additional(String),
}

/// A value series bound to an existing dataset column
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSeries {
    pub role: SeriesRole,
    pub data_key: String,
    pub sub_type: SubType,
    pub position: AxisPosition,
    /// Explicit color (additional axes only); scheme colors otherwise
    pub color: Option<String>,
}

/// Data keys routed to each value axis
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AxisGroups {
    pub primary_keys: Vec<String>,
    pub secondary_keys: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartesianKind {
    Bar,
    Line,
    Area,
    Combination,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadialKind {
    Pie,
    Doughnut,
}

/// Category x axis with one or more value series (main series first)
#[derive(Debug, Clone, PartialEq)]
pub struct CartesianPlan {
    pub kind: CartesianKind,
    pub x_column: String,
    pub series: Vec<ResolvedSeries>,
}

impl CartesianPlan {
    pub fn main(&self) -> &ResolvedSeries {
        &self.series[0]
    }

}

/// Single value column drawn as wedges
#[derive(Debug, Clone, PartialEq)]
pub struct RadialPlan {
    pub kind: RadialKind,
    pub label_column: String,
    pub value_column: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPlan {
    pub x_column: String,
    pub y_column: String,
}

/// A chart configuration narrowed to the fields its kind actually uses.
///
/// Built by `resolve::build_plan`; every referenced column exists in the
/// dataset and a cartesian plan always has its main series.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartPlan {
    Cartesian(CartesianPlan),
    Radial(RadialPlan),
    Scatter(ScatterPlan),
}

// =============================================================================
// Phase 2: Scaling
// =============================================================================

/// Padded display bounds of one value axis; `min <= max`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    pub const DEFAULT: AxisRange = AxisRange { min: 0.0, max: 100.0 };
}

// =============================================================================
// Phase 3: Render spec (wire shape of the chart library)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderKind {
    Bar,
    Line,
    Pie,
    Doughnut,
    Scatter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillPolicy {
    None,
    Origin,
}

impl Serialize for FillPolicy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FillPolicy::None => serializer.serialize_bool(false),
            FillPolicy::Origin => serializer.serialize_str("origin"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DataPoint {
    Value(f64),
    Point { x: f64, y: f64 },
}

impl DataPoint {
    /// The value plotted against the value axis
    pub fn y(&self) -> f64 {
        match self {
            DataPoint::Value(v) => *v,
            DataPoint::Point { y, .. } => *y,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColorFill {
    Single(String),
    PerPoint(Vec<String>),
}

impl ColorFill {
    /// Color of the `idx`-th data point
    pub fn at(&self, idx: usize) -> &str {
        match self {
            ColorFill::Single(c) => c,
            ColorFill::PerPoint(cs) if !cs.is_empty() => &cs[idx % cs.len()],
            ColorFill::PerPoint(_) => "transparent",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderDataset {
    pub label: String,
    #[serde(rename = "data")]
    pub values: Vec<DataPoint>,
    #[serde(rename = "type")]
    pub sub_type: RenderKind,
    #[serde(rename = "fill")]
    pub fill_policy: FillPolicy,
    pub background_color: ColorFill,
    pub border_color: ColorFill,
    #[serde(rename = "yAxisID", skip_serializing_if = "Option::is_none")]
    pub axis_id: Option<String>,
    pub border_width: u32,
}

impl AxisGroups {
    /// Data keys of the datasets actually drawn on `y` and `y1`
    pub fn drawn(datasets: &[RenderDataset]) -> Self {
        let mut groups = AxisGroups::default();
        for d in datasets {
            match d.axis_id.as_deref() {
                Some("y") => groups.primary_keys.push(d.label.clone()),
                Some("y1") => groups.secondary_keys.push(d.label.clone()),
                _ => {}
            }
        }
        groups
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleType {
    Category,
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisSide {
    Left,
    Right,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTitle {
    pub display: bool,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridSpec {
    pub display: bool,
    pub draw_on_chart_area: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisScaleSpec {
    #[serde(rename = "type")]
    pub scale_type: ScaleType,
    pub position: AxisSide,
    pub display: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    pub title: AxisTitle,
    pub grid: GridSpec,
}

impl AxisScaleSpec {
    pub fn range(&self) -> Option<AxisRange> {
        Some(AxisRange {
            min: self.min?,
            max: self.max?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendSpec {
    pub display: bool,
    pub position: LegendPosition,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleSpec {
    pub display: bool,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataLabelsSpec {
    pub display: bool,
    pub format: DataLabelFormat,
    pub position: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginsSpec {
    pub legend: LegendSpec,
    pub title: TitleSpec,
    pub data_labels: DataLabelsSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<RenderDataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartOptions {
    pub plugins: PluginsSpec,
    /// Keyed by axis id (`x`, `y`, `y1`); empty for pie/doughnut
    pub scales: BTreeMap<String, AxisScaleSpec>,
}

/// Fully resolved description of one chart, ready for the chart library
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSpec {
    pub kind: RenderKind,
    pub data: ChartData,
    pub options: ChartOptions,
}

impl RenderSpec {
    pub fn labels(&self) -> &[String] {
        &self.data.labels
    }

    pub fn datasets(&self) -> &[RenderDataset] {
        &self.data.datasets
    }

    pub fn scale(&self, axis_id: &str) -> Option<&AxisScaleSpec> {
        self.options.scales.get(axis_id)
    }

    pub fn to_json(&self) -> serde_json::Value {
        // Every field is plain data; serialisation cannot fail
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
