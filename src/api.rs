//! Wire types of the image-generation endpoint
//! (`POST /api/v1/charts/previews/selected-generate`).
//!
//! Final images are produced server-side from the chart kinds and a small
//! style block; compiled render specs never cross this boundary.

use serde::{Deserialize, Serialize};

use crate::config::{ChartInstanceConfig, ChartKind};
use crate::{OutputFormat, RenderOptions};

pub const SELECTED_GENERATE_PATH: &str = "/api/v1/charts/previews/selected-generate";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewChartConfig {
    pub title: String,
    pub color_scheme: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewRequest {
    pub access_code: String,
    pub file_path: String,
    pub selected_chart_types: Vec<ChartKind>,
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_config: Option<PreviewChartConfig>,
}

impl PreviewRequest {
    /// Request final images for the configured charts.
    ///
    /// Chart kinds are sent once each, in config order; the style block comes
    /// from the first chart.
    pub fn from_configs(
        access_code: impl Into<String>,
        file_path: impl Into<String>,
        configs: &[ChartInstanceConfig],
        options: &RenderOptions,
    ) -> Self {
        let mut selected_chart_types = Vec::new();
        for config in configs {
            if !selected_chart_types.contains(&config.chart_kind) {
                selected_chart_types.push(config.chart_kind);
            }
        }

        let chart_config = configs.first().map(|c| PreviewChartConfig {
            title: c.styling.title.clone(),
            color_scheme: c.styling.color_scheme_name.clone(),
        });

        Self {
            access_code: access_code.into(),
            file_path: file_path.into(),
            selected_chart_types,
            width: options.width,
            height: options.height,
            format: options.format,
            chart_config,
        }
    }
}

/// One server-rendered image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedChart {
    /// Kind name as sent by the server; may name kinds this crate does not compile
    pub chart_type: String,
    pub chart_name: String,
    /// Base64-encoded image
    pub chart_data: String,
    pub format: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub file_size: Option<u64>,
}

impl GeneratedChart {
    pub fn kind(&self) -> Option<ChartKind> {
        self.chart_type.parse().ok()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PreviewData {
    #[serde(default)]
    pub charts: Vec<GeneratedChart>,
    #[serde(default)]
    pub remaining_usage: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<PreviewData>,
}

impl PreviewResponse {
    pub fn charts(&self) -> &[GeneratedChart] {
        self.data.as_ref().map(|d| d.charts.as_slice()).unwrap_or(&[])
    }
}
