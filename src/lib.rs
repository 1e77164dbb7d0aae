// Library exports for chartspec

pub mod api;
pub mod classify;
pub mod config;
pub mod data;
pub mod error;
pub mod graph;
pub mod parser;
pub mod recommend;
pub mod runtime;

// Compile pipeline
pub mod ir;
pub mod resolve;
pub mod transform;
pub mod scale;
pub mod compiler;
pub mod theme_resolve;

pub use compiler::compile;
pub use config::{ChartInstanceConfig, ChartKind};
pub use data::TabularDataset;
pub use ir::RenderSpec;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OutputFormat {
    #[serde(rename = "png")]
    #[default]
    Png,
    #[serde(rename = "svg")]
    Svg,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderOptions {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default, rename = "type")]
    pub format: OutputFormat,
}

fn default_width() -> u32 { 800 }
fn default_height() -> u32 { 600 }

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            format: OutputFormat::Png,
        }
    }
}

impl RenderOptions {
    /// Options sized for a chart via `recommend::suggest_canvas_size`
    pub fn for_chart(kind: ChartKind, row_count: usize, format: OutputFormat) -> Self {
        let (width, height) = recommend::suggest_canvas_size(row_count, kind);
        Self {
            width,
            height,
            format,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_options_defaults() {
        let options: RenderOptions = serde_json::from_value(json!({})).unwrap();
        assert_eq!(options, RenderOptions::default());

        let options: RenderOptions = serde_json::from_value(json!({"width": 320, "type": "svg"})).unwrap();
        assert_eq!(options.width, 320);
        assert_eq!(options.height, 600);
        assert_eq!(options.format, OutputFormat::Svg);
    }

    #[test]
    fn test_options_for_chart() {
        let options = RenderOptions::for_chart(ChartKind::Pie, 6, OutputFormat::Png);
        assert_eq!((options.width, options.height), (400, 400));
    }
}
