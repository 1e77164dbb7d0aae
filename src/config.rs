// Chart instance configuration as edited by the wizard UI.
//
// Every field degrades to its default when absent or of the wrong shape;
// nothing here rejects a payload.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Deserialize a field, falling back to its default on any mismatch
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value.clone()).unwrap_or_else(|err| {
        log::debug!("ignoring invalid config value {}: {}", value, err);
        T::default()
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Bar,
    Line,
    Pie,
    Doughnut,
    Area,
    Scatter,
    Combination,
}

impl ChartKind {
    pub const ALL: [ChartKind; 7] = [
        ChartKind::Bar,
        ChartKind::Line,
        ChartKind::Pie,
        ChartKind::Doughnut,
        ChartKind::Area,
        ChartKind::Scatter,
        ChartKind::Combination,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Pie => "pie",
            ChartKind::Doughnut => "doughnut",
            ChartKind::Area => "area",
            ChartKind::Scatter => "scatter",
            ChartKind::Combination => "combination",
        }
    }

    pub fn is_radial(&self) -> bool {
        matches!(self, ChartKind::Pie | ChartKind::Doughnut)
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChartKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown chart kind '{}'", s))
    }
}

/// Geometry used to draw a single series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubType {
    #[default]
    Bar,
    Line,
    Area,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisPosition {
    #[default]
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendPosition {
    #[default]
    Top,
    Right,
    Bottom,
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DataLabelFormat {
    #[default]
    #[serde(rename = "integer")]
    Integer,
    #[serde(rename = "1-decimal")]
    OneDecimal,
    #[serde(rename = "2-decimal")]
    TwoDecimal,
    #[serde(rename = "percentage")]
    Percentage,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeriesAxisConfig {
    #[serde(deserialize_with = "lenient")]
    pub sub_type: SubType,
    #[serde(deserialize_with = "lenient")]
    pub axis_position: AxisPosition,
}

impl SeriesAxisConfig {
    pub fn new(sub_type: SubType, axis_position: AxisPosition) -> Self {
        Self {
            sub_type,
            axis_position,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdditionalYAxis {
    #[serde(deserialize_with = "lenient")]
    pub id: String,
    #[serde(deserialize_with = "lenient")]
    pub data_key: String,
    #[serde(deserialize_with = "lenient")]
    pub sub_type: SubType,
    #[serde(deserialize_with = "lenient")]
    pub color: String,
    #[serde(deserialize_with = "lenient")]
    pub axis_position: AxisPosition,
}

/// Column bindings for the x axis and each value series
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSeries {
    #[serde(rename = "xAxis", deserialize_with = "lenient")]
    pub x_axis: String,
    #[serde(rename = "yAxis", deserialize_with = "lenient")]
    pub y_axis: String,
    #[serde(rename = "yAxis2", deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub y_axis2: Option<String>,
    #[serde(rename = "yAxisConfig", deserialize_with = "lenient")]
    pub y_axis_config: SeriesAxisConfig,
    #[serde(rename = "yAxis2Config", deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub y_axis2_config: Option<SeriesAxisConfig>,
    #[serde(rename = "additionalYAxes", deserialize_with = "lenient")]
    pub additional_y_axes: Vec<AdditionalYAxis>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Styling {
    #[serde(deserialize_with = "lenient")]
    pub title: String,
    #[serde(deserialize_with = "lenient")]
    pub color_scheme_name: String,
    #[serde(deserialize_with = "lenient_true")]
    pub show_legend: bool,
    #[serde(deserialize_with = "lenient")]
    pub legend_position: LegendPosition,
    #[serde(deserialize_with = "lenient_true")]
    pub show_grid_lines: bool,
    #[serde(deserialize_with = "lenient")]
    pub show_data_labels: bool,
    #[serde(deserialize_with = "lenient")]
    pub data_label_format: DataLabelFormat,
    #[serde(deserialize_with = "lenient")]
    pub data_label_position: String,
    #[serde(deserialize_with = "lenient")]
    pub data_label_color: String,
}

impl Default for Styling {
    fn default() -> Self {
        Self {
            title: String::new(),
            color_scheme_name: "business_blue_gray".to_string(),
            show_legend: true,
            legend_position: LegendPosition::Top,
            show_grid_lines: true,
            show_data_labels: false,
            data_label_format: DataLabelFormat::Integer,
            data_label_position: "top".to_string(),
            data_label_color: "#333333".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Layout {
    #[serde(deserialize_with = "lenient_true")]
    pub show_axis_labels: bool,
    #[serde(deserialize_with = "lenient")]
    pub x_axis_label: String,
    #[serde(deserialize_with = "lenient")]
    pub y_axis_label: String,
    #[serde(rename = "yAxis2Label", deserialize_with = "lenient")]
    pub y_axis2_label: String,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            show_axis_labels: true,
            x_axis_label: String::new(),
            y_axis_label: String::new(),
            y_axis2_label: String::new(),
        }
    }
}

/// One configured chart within a session
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartInstanceConfig {
    #[serde(deserialize_with = "lenient")]
    pub id: String,
    #[serde(deserialize_with = "lenient")]
    pub chart_kind: ChartKind,
    #[serde(deserialize_with = "lenient")]
    pub data_series: DataSeries,
    #[serde(deserialize_with = "lenient")]
    pub styling: Styling,
    #[serde(deserialize_with = "lenient")]
    pub layout: Layout,
}

impl ChartInstanceConfig {
    /// Parse a config, never failing: unusable payloads yield the default config
    pub fn from_json(value: &Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_else(|err| {
            log::debug!("unusable chart config, using defaults: {}", err);
            Self::default()
        })
    }
}

/// Booleans that default to `true` when absent or invalid
fn lenient_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_bool().unwrap_or(true))
}
