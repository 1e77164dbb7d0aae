use anyhow::{Context, Result};
use image::ImageEncoder;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::f64::consts::PI;
use std::ops::Range;

use crate::config::LegendPosition;
use crate::ir::{
    AxisRange, AxisScaleSpec, ColorFill, DataPoint, FillPolicy, RenderDataset, RenderKind,
    RenderSpec,
};
use crate::parser::parse_color;
use crate::{OutputFormat, RenderOptions};

const FONT: &str = "sans-serif";
const BAR_GROUP_WIDTH: f64 = 0.8;
const POINT_RADIUS: i32 = 4;
/// Inner radius of a doughnut, relative to the outer radius
const DOUGHNUT_CUTOUT: f64 = 0.5;
/// Largest canvas side accepted by `render`
pub const MAX_CANVAS_SIDE: u32 = 8192;

/// An encoded preview image
#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub format: OutputFormat,
    pub bytes: Vec<u8>,
}

/// Rasterize a render spec to PNG or SVG
pub fn render(spec: &RenderSpec, options: &RenderOptions) -> Result<RenderedImage> {
    let (width, height) = (options.width, options.height);
    if width == 0 || height == 0 {
        anyhow::bail!("Canvas size must be non-zero (got {}x{})", width, height);
    }
    if width > MAX_CANVAS_SIDE || height > MAX_CANVAS_SIDE {
        anyhow::bail!(
            "Canvas size {}x{} exceeds the {}px limit per side",
            width,
            height,
            MAX_CANVAS_SIDE
        );
    }

    let bytes = match options.format {
        OutputFormat::Png => {
            let len = (width as usize)
                .checked_mul(height as usize)
                .and_then(|n| n.checked_mul(3))
                .with_context(|| format!("Canvas size {}x{} is too large", width, height))?;
            let mut buffer = vec![0u8; len];
            {
                let root = BitMapBackend::with_buffer(&mut buffer, (width, height))
                    .into_drawing_area();
                draw(&root, spec)?;
                root.present().context("Failed to present drawing")?;
            }

            let mut png_bytes = Vec::new();
            {
                let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
                encoder
                    .write_image(&buffer, width, height, image::ColorType::Rgb8)
                    .context("Failed to encode PNG")?;
            }
            png_bytes
        }
        OutputFormat::Svg => {
            let mut svg = String::new();
            {
                let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
                draw(&root, spec)?;
                root.present().context("Failed to present drawing")?;
            }
            svg.into_bytes()
        }
    };

    Ok(RenderedImage {
        format: options.format,
        bytes,
    })
}

fn draw<DB>(root: &DrawingArea<DB, Shift>, spec: &RenderSpec) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).context("Failed to fill background")?;

    let title = &spec.options.plugins.title;
    let area = if title.display {
        root.titled(&title.text, (FONT, 20))
            .context("Failed to draw title")?
    } else {
        root.margin(10, 0, 0, 0)
    };

    match spec.kind {
        RenderKind::Pie | RenderKind::Doughnut => draw_radial(&area, spec),
        RenderKind::Scatter => draw_scatter(&area, spec),
        RenderKind::Bar | RenderKind::Line => draw_cartesian(&area, spec),
    }
}

// =============================================================================
// Cartesian (bar / line / area, optional secondary axis)
// =============================================================================

fn draw_cartesian<DB>(area: &DrawingArea<DB, Shift>, spec: &RenderSpec) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let labels = spec.labels();
    let num_categories = labels.len().max(1);
    let x_range = 0.0..(num_categories as f64);

    let y_scale = spec.scale("y");
    let y_range = span(y_scale);
    let y2_scale = spec.scale("y1");
    let y2_range = y2_scale.map(|s| span(Some(s)));

    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .right_y_label_area_size(if y2_range.is_some() { 50 } else { 0 })
        .build_cartesian_2d(x_range.clone(), y_range.clone())
        .context("Failed to build chart")?
        .set_secondary_coord(x_range, y2_range.clone().unwrap_or_else(|| y_range.clone()));

    let category_at = |x: &f64| {
        let idx = *x as usize;
        labels.get(idx).cloned().unwrap_or_default()
    };

    {
        let mut mesh = chart.configure_mesh();
        mesh.x_labels(num_categories).x_label_formatter(&category_at);
        if let Some(x) = spec.scale("x").filter(|s| s.title.display) {
            mesh.x_desc(x.title.text.as_str());
        }
        if let Some(y) = y_scale.filter(|s| s.title.display) {
            mesh.y_desc(y.title.text.as_str());
        }
        if !y_scale.map(|s| s.grid.display).unwrap_or(true) {
            mesh.disable_mesh();
        }
        mesh.draw().context("Failed to draw mesh")?;
    }

    if let Some(y2) = y2_scale {
        let mut axes = chart.configure_secondary_axes();
        if y2.title.display {
            axes.y_desc(y2.title.text.as_str());
        }
        axes.draw().context("Failed to draw secondary axis")?;
    }

    let plugins = &spec.options.plugins;
    let bar_count = spec
        .datasets()
        .iter()
        .filter(|d| d.sub_type == RenderKind::Bar)
        .count()
        .max(1);
    let bar_width = BAR_GROUP_WIDTH / bar_count as f64;
    let mut bar_idx = 0;

    for dataset in spec.datasets() {
        // Secondary values are projected onto the primary coordinates
        let from = match (dataset.axis_id.as_deref(), &y2_range) {
            (Some("y1"), Some(r)) => r.clone(),
            _ => y_range.clone(),
        };
        let to_plot = |v: f64| project(v, &from, &y_range);
        let values: Vec<f64> = dataset.values.iter().map(|p| p.y()).collect();
        let border = to_color(dataset.border_color.at(0));

        let anno = match dataset.sub_type {
            RenderKind::Bar => {
                let offset = (bar_idx as f64 - (bar_count as f64 - 1.0) / 2.0) * bar_width;
                bar_idx += 1;
                let base = to_plot(0f64.clamp(from.start, from.end));
                chart
                    .draw_series(values.iter().enumerate().map(|(i, &v)| {
                        let x_center = i as f64 + 0.5 + offset;
                        Rectangle::new(
                            [
                                (x_center - bar_width / 2.0, base),
                                (x_center + bar_width / 2.0, to_plot(v)),
                            ],
                            to_color(dataset.background_color.at(i)).filled(),
                        )
                    }))
                    .context("Failed to draw bar series")?
            }
            _ => {
                let points: Vec<(f64, f64)> = values
                    .iter()
                    .enumerate()
                    .map(|(i, &v)| (i as f64 + 0.5, to_plot(v)))
                    .collect();
                if dataset.fill_policy == FillPolicy::Origin {
                    let base = to_plot(0f64.clamp(from.start, from.end));
                    chart
                        .draw_series(AreaSeries::new(
                            points.clone(),
                            base,
                            to_color(dataset.background_color.at(0)).filled(),
                        ))
                        .context("Failed to draw area fill")?;
                }
                chart
                    .draw_series(LineSeries::new(
                        points,
                        border.stroke_width(dataset.border_width.max(1)),
                    ))
                    .context("Failed to draw line series")?
            }
        };

        if plugins.legend.display {
            anno.label(dataset.label.as_str()).legend(move |(x, y)| {
                Rectangle::new([(x, y - 5), (x + 10, y + 5)], border.filled())
            });
        }

        if plugins.data_labels.display {
            let text_color = to_color(&plugins.data_labels.color);
            let format = plugins.data_labels.format;
            chart
                .draw_series(values.iter().enumerate().map(|(i, &v)| {
                    EmptyElement::at((i as f64 + 0.5, to_plot(v)))
                        + Text::new(
                            format.format(v),
                            (-8, -16),
                            (FONT, 12).into_font().color(&text_color),
                        )
                }))
                .context("Failed to draw data labels")?;
        }
    }

    if plugins.legend.display {
        draw_legend(&mut chart, plugins.legend.position)?;
    }

    Ok(())
}

// =============================================================================
// Scatter
// =============================================================================

fn draw_scatter<DB>(area: &DrawingArea<DB, Shift>, spec: &RenderSpec) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let x_scale = spec.scale("x");
    let y_scale = spec.scale("y");

    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(span(x_scale), span(y_scale))
        .context("Failed to build chart")?;

    {
        let mut mesh = chart.configure_mesh();
        if let Some(x) = x_scale.filter(|s| s.title.display) {
            mesh.x_desc(x.title.text.as_str());
        }
        if let Some(y) = y_scale.filter(|s| s.title.display) {
            mesh.y_desc(y.title.text.as_str());
        }
        if !y_scale.map(|s| s.grid.display).unwrap_or(true) {
            mesh.disable_mesh();
        }
        mesh.draw().context("Failed to draw mesh")?;
    }

    let plugins = &spec.options.plugins;
    for dataset in spec.datasets() {
        let points = scatter_points(dataset);
        let fill = to_color(dataset.background_color.at(0));
        let border = to_color(dataset.border_color.at(0));

        let anno = chart
            .draw_series(
                points
                    .iter()
                    .map(|&(x, y)| Circle::new((x, y), POINT_RADIUS, fill.filled())),
            )
            .context("Failed to draw point series")?;
        if plugins.legend.display {
            anno.label(dataset.label.as_str()).legend(move |(x, y)| {
                Circle::new((x + 5, y), POINT_RADIUS, border.filled())
            });
        }

        if plugins.data_labels.display {
            let text_color = to_color(&plugins.data_labels.color);
            let format = plugins.data_labels.format;
            chart
                .draw_series(points.iter().map(|&(x, y)| {
                    EmptyElement::at((x, y))
                        + Text::new(format.format(y), (-8, -16), (FONT, 12).into_font().color(&text_color))
                }))
                .context("Failed to draw data labels")?;
        }
    }

    if plugins.legend.display {
        draw_legend(&mut chart, plugins.legend.position)?;
    }

    Ok(())
}

fn scatter_points(dataset: &RenderDataset) -> Vec<(f64, f64)> {
    dataset
        .values
        .iter()
        .enumerate()
        .map(|(i, p)| match p {
            DataPoint::Point { x, y } => (*x, *y),
            DataPoint::Value(v) => (i as f64, *v),
        })
        .collect()
}

// =============================================================================
// Pie / doughnut
// =============================================================================

fn draw_radial<DB>(area: &DrawingArea<DB, Shift>, spec: &RenderSpec) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let Some(dataset) = spec.datasets().first() else {
        return Ok(());
    };

    let values: Vec<f64> = dataset.values.iter().map(|p| p.y().max(0.0)).collect();
    let total: f64 = values.iter().sum();
    if total <= 0.0 {
        log::debug!("nothing to draw for '{}': all wedges are empty", dataset.label);
        return Ok(());
    }

    let (width, height) = area.dim_in_pixel();
    let center = (width as f64 / 2.0, height as f64 / 2.0);
    let radius = width.min(height) as f64 * 0.4;
    let inner = if spec.kind == RenderKind::Doughnut {
        radius * DOUGHNUT_CUTOUT
    } else {
        0.0
    };

    let plugins = &spec.options.plugins;
    let label_color = to_color(&plugins.data_labels.color);
    let mut start = -PI / 2.0;

    for (i, &value) in values.iter().enumerate() {
        let sweep = value / total * 2.0 * PI;
        if sweep <= 0.0 {
            continue;
        }
        let end = start + sweep;

        let wedge = wedge_outline(center, radius, inner, start, end);
        area.draw(&Polygon::new(wedge, fill_of(&dataset.background_color, i).filled()))
            .context("Failed to draw wedge")?;

        let mid = (start + end) / 2.0;
        if let Some(label) = spec.labels().get(i) {
            let at = polar(center, radius * 1.08, mid);
            area.draw(&Text::new(label.as_str(), at, (FONT, 12).into_font().color(&BLACK)))
                .context("Failed to draw wedge label")?;
        }
        if plugins.data_labels.display {
            let at = polar(center, (radius + inner) / 2.0, mid);
            area.draw(&Text::new(
                plugins.data_labels.format.format(value),
                at,
                (FONT, 12).into_font().color(&label_color),
            ))
            .context("Failed to draw data label")?;
        }

        start = end;
    }

    Ok(())
}

/// Outline of one wedge: the outer arc forward, then the inner arc (or the
/// center point) back
fn wedge_outline(
    center: (f64, f64),
    radius: f64,
    inner: f64,
    start: f64,
    end: f64,
) -> Vec<(i32, i32)> {
    let steps = (((end - start) / (2.0 * PI)) * 90.0).ceil().max(2.0) as usize;
    let arc = |r: f64| {
        (0..=steps).map(move |s| {
            let angle = start + (end - start) * s as f64 / steps as f64;
            polar(center, r, angle)
        })
    };

    let mut outline: Vec<(i32, i32)> = arc(radius).collect();
    if inner > 0.0 {
        let back: Vec<(i32, i32)> = arc(inner).collect();
        outline.extend(back.into_iter().rev());
    } else {
        outline.push((center.0 as i32, center.1 as i32));
    }
    outline
}

fn polar(center: (f64, f64), r: f64, angle: f64) -> (i32, i32) {
    (
        (center.0 + r * angle.cos()).round() as i32,
        (center.1 + r * angle.sin()).round() as i32,
    )
}

// =============================================================================
// Helpers
// =============================================================================

fn draw_legend<'a, DB, CT>(
    chart: &mut ChartContext<'a, DB, CT>,
    position: LegendPosition,
) -> Result<()>
where
    DB: DrawingBackend + 'a,
    DB::ErrorType: 'static,
    CT: CoordTranslate,
{
    let position = match position {
        LegendPosition::Right => SeriesLabelPosition::MiddleRight,
        LegendPosition::Bottom => SeriesLabelPosition::LowerMiddle,
        LegendPosition::Top | LegendPosition::Hidden => SeriesLabelPosition::UpperMiddle,
    };
    chart
        .configure_series_labels()
        .position(position)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font((FONT, 12))
        .draw()
        .context("Failed to draw legend")?;
    Ok(())
}

/// Drawable range of an axis; degenerate spans are widened by one unit
fn span(scale: Option<&AxisScaleSpec>) -> Range<f64> {
    let range = scale.and_then(|s| s.range()).unwrap_or(AxisRange::DEFAULT);
    if range.max > range.min {
        range.min..range.max
    } else {
        (range.min - 1.0)..(range.max + 1.0)
    }
}

/// Map `v` linearly from one axis range onto another
fn project(v: f64, from: &Range<f64>, to: &Range<f64>) -> f64 {
    let from_span = from.end - from.start;
    if from_span == 0.0 {
        return to.start;
    }
    to.start + (v - from.start) / from_span * (to.end - to.start)
}

fn fill_of(fill: &ColorFill, idx: usize) -> RGBAColor {
    to_color(fill.at(idx))
}

/// CSS color to a plotters color; unparseable colors draw black
fn to_color(css: &str) -> RGBAColor {
    match parse_color(css) {
        Some(c) => RGBAColor(c.r, c.g, c.b, c.a),
        None => {
            log::trace!("unrecognised color '{}', drawing black", css);
            RGBAColor(0, 0, 0, 1.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;
    use crate::config::{ChartInstanceConfig, ChartKind, DataSeries};
    use crate::data::TabularDataset;

    fn spec(kind: ChartKind, x: &str, y: &str) -> RenderSpec {
        let config = ChartInstanceConfig {
            id: "chart".into(),
            chart_kind: kind,
            data_series: DataSeries {
                x_axis: x.into(),
                y_axis: y.into(),
                ..Default::default()
            },
            ..Default::default()
        };
        compile(&config, &TabularDataset::mock())
    }

    #[test]
    fn test_render_png_signature() {
        let image = render(&spec(ChartKind::Bar, "month", "sales"), &RenderOptions::default()).unwrap();
        assert_eq!(&image.bytes[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn test_render_svg() {
        let options = RenderOptions {
            format: OutputFormat::Svg,
            ..Default::default()
        };
        let image = render(&spec(ChartKind::Doughnut, "month", "sales"), &options).unwrap();
        let svg = String::from_utf8(image.bytes).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("polygon"));
    }

    #[test]
    fn test_render_every_kind() {
        for kind in ChartKind::ALL {
            let s = spec(kind, "month", "sales");
            assert!(render(&s, &RenderOptions::default()).is_ok(), "{} failed", kind);
        }
    }

    #[test]
    fn test_zero_size_rejected() {
        let options = RenderOptions {
            width: 0,
            ..Default::default()
        };
        assert!(render(&spec(ChartKind::Line, "month", "sales"), &options).is_err());
    }

    #[test]
    fn test_oversized_canvas_rejected() {
        let options = RenderOptions {
            width: 40000,
            height: 40000,
            ..Default::default()
        };
        let err = render(&spec(ChartKind::Bar, "month", "sales"), &options).unwrap_err();
        assert!(format!("{:#}", err).contains("limit"));
    }

    #[test]
    fn test_project_between_axes() {
        assert_eq!(project(5.0, &(0.0..10.0), &(0.0..100.0)), 50.0);
        assert_eq!(project(3.0, &(3.0..3.0), &(0.0..100.0)), 0.0);
    }

    #[test]
    fn test_span_widens_degenerate_range() {
        assert_eq!(span(None), 0.0..100.0);
        let scale = AxisScaleSpec {
            min: Some(5.0),
            max: Some(5.0),
            ..spec(ChartKind::Bar, "month", "sales").scale("y").cloned().unwrap()
        };
        assert_eq!(span(Some(&scale)), 4.0..6.0);
    }

    #[test]
    fn test_wedge_outline_closes_on_center() {
        let outline = wedge_outline((50.0, 50.0), 10.0, 0.0, 0.0, PI / 2.0);
        assert_eq!(outline.first(), Some(&(60, 50)));
        assert_eq!(outline.last(), Some(&(50, 50)));
    }
}
