//! Style Resolution
//!
//! Resolves a chart's styling block into concrete colors and plugin options:
//!
//! ```text
//! colorSchemeName ──► SchemeColors { primary, secondary }
//! showLegend / legendPosition ──► legend   (off for pie/doughnut)
//! title ──► title
//! showDataLabels / dataLabelFormat ──► dataLabels
//! ```

use crate::config::{ChartInstanceConfig, DataLabelFormat, LegendPosition};
use crate::ir::{DataLabelsSpec, LegendSpec, PluginsSpec, TitleSpec};

/// Alpha used for the fill under area series
pub const AREA_FILL_ALPHA: f64 = 0.2;

pub const DEFAULT_SCHEME: &str = "business_blue_gray";

/// Background/border pair for one series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorPair {
    pub background: &'static str,
    pub border: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct ColorScheme {
    pub name: &'static str,
    pub primary: ColorPair,
    pub secondary: Option<ColorPair>,
}

pub const COLOR_SCHEMES: [ColorScheme; 5] = [
    ColorScheme {
        name: "business_blue_gray",
        primary: ColorPair {
            background: "rgba(54, 96, 146, 0.8)",
            border: "rgba(54, 96, 146, 1)",
        },
        secondary: Some(ColorPair {
            background: "rgba(127, 140, 141, 0.8)",
            border: "rgba(127, 140, 141, 1)",
        }),
    },
    ColorScheme {
        name: "professional_black_gray",
        primary: ColorPair {
            background: "rgba(44, 62, 80, 0.8)",
            border: "rgba(44, 62, 80, 1)",
        },
        secondary: Some(ColorPair {
            background: "rgba(149, 165, 166, 0.8)",
            border: "rgba(149, 165, 166, 1)",
        }),
    },
    ColorScheme {
        name: "modern_blue",
        primary: ColorPair {
            background: "rgba(41, 128, 185, 0.8)",
            border: "rgba(41, 128, 185, 1)",
        },
        secondary: None,
    },
    ColorScheme {
        name: "elegant_purple",
        primary: ColorPair {
            background: "rgba(142, 68, 173, 0.8)",
            border: "rgba(142, 68, 173, 1)",
        },
        secondary: Some(ColorPair {
            background: "rgba(187, 143, 206, 0.8)",
            border: "rgba(187, 143, 206, 1)",
        }),
    },
    ColorScheme {
        name: "vibrant_teal_green",
        primary: ColorPair {
            background: "rgba(22, 160, 133, 0.8)",
            border: "rgba(22, 160, 133, 1)",
        },
        secondary: Some(ColorPair {
            background: "rgba(46, 204, 113, 0.8)",
            border: "rgba(46, 204, 113, 1)",
        }),
    },
];

/// Wedge colors for pie and doughnut charts, cycled per data point
pub const PIE_PALETTE: [ColorPair; 6] = [
    ColorPair {
        background: "rgba(255, 99, 132, 0.8)",
        border: "rgba(255, 99, 132, 1)",
    },
    ColorPair {
        background: "rgba(54, 162, 235, 0.8)",
        border: "rgba(54, 162, 235, 1)",
    },
    ColorPair {
        background: "rgba(255, 206, 86, 0.8)",
        border: "rgba(255, 206, 86, 1)",
    },
    ColorPair {
        background: "rgba(75, 192, 192, 0.8)",
        border: "rgba(75, 192, 192, 1)",
    },
    ColorPair {
        background: "rgba(153, 102, 255, 0.8)",
        border: "rgba(153, 102, 255, 1)",
    },
    ColorPair {
        background: "rgba(255, 159, 64, 0.8)",
        border: "rgba(255, 159, 64, 1)",
    },
];

/// Fully resolved scheme colors (no missing pairs)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemeColors {
    pub primary: ColorPair,
    pub secondary: ColorPair,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
    pub colors: SchemeColors,
    pub plugins: PluginsSpec,
}

fn default_scheme() -> &'static ColorScheme {
    &COLOR_SCHEMES[0]
}

/// Look up a scheme by name; unknown names use `business_blue_gray`, and
/// a scheme without a secondary pair borrows the default one.
pub fn resolve_scheme(name: &str) -> SchemeColors {
    let scheme = COLOR_SCHEMES
        .iter()
        .find(|s| s.name == name)
        .unwrap_or_else(|| {
            if !name.is_empty() {
                log::debug!("unknown color scheme '{}', using {}", name, DEFAULT_SCHEME);
            }
            default_scheme()
        });

    let fallback_secondary = default_scheme()
        .secondary
        .unwrap_or(default_scheme().primary);

    SchemeColors {
        primary: scheme.primary,
        secondary: scheme.secondary.unwrap_or(fallback_secondary),
    }
}

/// Resolve scheme colors and plugin options for a chart
pub fn resolve_style(config: &ChartInstanceConfig) -> ResolvedStyle {
    let styling = &config.styling;

    let legend = LegendSpec {
        display: styling.show_legend
            && styling.legend_position != LegendPosition::Hidden
            && !config.chart_kind.is_radial(),
        position: styling.legend_position,
    };

    let title = TitleSpec {
        display: !styling.title.trim().is_empty(),
        text: styling.title.clone(),
    };

    let data_labels = DataLabelsSpec {
        display: styling.show_data_labels,
        format: styling.data_label_format,
        position: styling.data_label_position.clone(),
        color: styling.data_label_color.clone(),
    };

    ResolvedStyle {
        colors: resolve_scheme(&styling.color_scheme_name),
        plugins: PluginsSpec {
            legend,
            title,
            data_labels,
        },
    }
}

/// Plugin options of the fallback spec: a top legend and nothing else
pub fn minimal_plugins() -> PluginsSpec {
    PluginsSpec {
        legend: LegendSpec {
            display: true,
            position: LegendPosition::Top,
        },
        title: TitleSpec {
            display: false,
            text: String::new(),
        },
        data_labels: DataLabelsSpec {
            display: false,
            format: DataLabelFormat::Integer,
            position: "top".to_string(),
            color: "#333333".to_string(),
        },
    }
}

impl DataLabelFormat {
    /// Format a data value as label text
    pub fn format(&self, value: f64) -> String {
        match self {
            DataLabelFormat::Integer => {
                let rounded = value.round();
                // Avoid "-0"
                let rounded = if rounded == 0.0 { 0.0 } else { rounded };
                format!("{}", rounded)
            }
            DataLabelFormat::OneDecimal => format!("{:.1}", value),
            DataLabelFormat::TwoDecimal => format!("{:.2}", value),
            // Values are already percentages; no scaling
            DataLabelFormat::Percentage => format!("{}%", value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChartKind, Styling};

    fn config(kind: ChartKind, styling: Styling) -> ChartInstanceConfig {
        ChartInstanceConfig {
            chart_kind: kind,
            styling,
            ..Default::default()
        }
    }

    #[test]
    fn test_known_scheme() {
        let colors = resolve_scheme("elegant_purple");
        assert_eq!(colors.primary.border, "rgba(142, 68, 173, 1)");
        assert_eq!(colors.secondary.border, "rgba(187, 143, 206, 1)");
    }

    #[test]
    fn test_unknown_scheme_falls_back() {
        assert_eq!(resolve_scheme("neon"), resolve_scheme("business_blue_gray"));
        assert_eq!(resolve_scheme(""), resolve_scheme("business_blue_gray"));
    }

    #[test]
    fn test_missing_secondary_borrows_default() {
        let colors = resolve_scheme("modern_blue");
        assert_eq!(colors.primary.background, "rgba(41, 128, 185, 0.8)");
        assert_eq!(colors.secondary, resolve_scheme(DEFAULT_SCHEME).secondary);
    }

    #[test]
    fn test_legend_suppressed_for_radial() {
        let styling = Styling {
            show_legend: true,
            ..Default::default()
        };
        assert!(resolve_style(&config(ChartKind::Bar, styling.clone())).plugins.legend.display);
        assert!(!resolve_style(&config(ChartKind::Pie, styling.clone())).plugins.legend.display);
        assert!(!resolve_style(&config(ChartKind::Doughnut, styling)).plugins.legend.display);
    }

    #[test]
    fn test_legend_hidden_position() {
        let styling = Styling {
            legend_position: LegendPosition::Hidden,
            ..Default::default()
        };
        assert!(!resolve_style(&config(ChartKind::Line, styling)).plugins.legend.display);
    }

    #[test]
    fn test_title_plugin() {
        let styling = Styling {
            title: "Quarterly sales".into(),
            ..Default::default()
        };
        let plugins = resolve_style(&config(ChartKind::Bar, styling)).plugins;
        assert!(plugins.title.display);
        assert_eq!(plugins.title.text, "Quarterly sales");
    }

    #[test]
    fn test_data_label_formats() {
        assert_eq!(DataLabelFormat::Integer.format(12.6), "13");
        assert_eq!(DataLabelFormat::Integer.format(-0.2), "0");
        assert_eq!(DataLabelFormat::OneDecimal.format(12.345), "12.3");
        assert_eq!(DataLabelFormat::TwoDecimal.format(3.0), "3.00");
        assert_eq!(DataLabelFormat::Percentage.format(45.5), "45.5%");
        assert_eq!(DataLabelFormat::Percentage.format(12.0), "12%");
    }
}
