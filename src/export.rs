//! PNG rendering of recorded chart surfaces.
//!
//! Draws the traces a controller last rendered, with the same layout, using
//! plotters' bitmap backend. Dashed lines are drawn as thin solid lines and
//! legend-only traces are skipped.

use crate::figures::{self, FigureId};
use crate::params::Params;
use crate::plot::trace::{Layout, MarkerSymbol, Rgb, Trace, TraceMode};
use crate::plot::{InteractivePlot, MemoryPage, PlotUpdate, RecordingSurface};
use anyhow::{Context as _, Result, anyhow, bail};
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Parameter overrides per figure, keyed by surface id.
pub type Overrides = BTreeMap<String, Params>;

/// Figures named by a CLI selector: `all` or one surface id.
pub fn select_figures(selector: &str) -> Result<Vec<FigureId>> {
    if selector == "all" {
        return Ok(FigureId::ALL.to_vec());
    }
    FigureId::from_surface_id(selector)
        .map(|id| vec![id])
        .ok_or_else(|| {
            let known: Vec<_> = FigureId::ALL.iter().map(|id| id.surface_id()).collect();
            anyhow!(
                "unknown figure '{selector}': expected 'all' or one of {}",
                known.join(", ")
            )
        })
}

/// Parse an overrides document, rejecting unknown figure ids.
pub fn parse_overrides(json: &str) -> Result<Overrides> {
    let overrides: Overrides = serde_json::from_str(json).context("parsing overrides")?;
    for id in overrides.keys() {
        if FigureId::from_surface_id(id).is_none() {
            bail!("overrides name unknown figure '{id}'");
        }
    }
    Ok(overrides)
}

/// Image and viewport size for a headless export.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExportSize {
    pub width: u32,
    pub height: u32,
    pub viewport_width: f32,
}

/// Build one figure on a fresh page, apply overrides, and write its PNG.
pub fn export_figure(
    id: FigureId,
    overrides: Option<&Params>,
    dir: &Path,
    size: ExportSize,
) -> Result<PlotUpdate> {
    let (page, update) = simulate_figure(id, overrides, size.viewport_width)?;
    let surface = page
        .surface(id.surface_id())
        .ok_or_else(|| anyhow!("figure {} has no surface", id.surface_id()))?;
    let path = output_path(dir, id.surface_id());
    render_png(&path, surface, size.width, size.height)?;
    log::info!("{} -> {}", id.label(), path.display());
    Ok(update)
}

/// Run a figure's controller headlessly and return the rendered page.
pub fn simulate_figure(
    id: FigureId,
    overrides: Option<&Params>,
    viewport_width: f32,
) -> Result<(MemoryPage, PlotUpdate)> {
    let figure = id.figure();
    let mut page = MemoryPage::new();
    page.set_viewport_width(viewport_width);
    figures::install(&mut page, std::slice::from_ref(&figure));
    let mut plot = InteractivePlot::try_new(&mut page, figure.config)
        .with_context(|| format!("building {}", id.surface_id()))?;

    if let Some(overrides) = overrides.filter(|o| !o.is_empty()) {
        for (key, value) in overrides.iter() {
            plot.set_parameter(key, value.clone())
                .with_context(|| format!("overriding '{key}' on {}", id.surface_id()))?;
        }
        plot.recompute(&mut page);
    }
    let update = plot
        .last_update()
        .cloned()
        .ok_or_else(|| anyhow!("{} produced no update", id.surface_id()))?;
    Ok((page, update))
}

/// Output file for a surface inside `dir`.
pub fn output_path(dir: &Path, surface_id: &str) -> PathBuf {
    dir.join(format!("{surface_id}.png"))
}

/// Axis ranges: the layout's fixed ranges, or the visible data's extent
/// with 5% padding.
pub fn axis_ranges(layout: &Layout, traces: &[Trace]) -> ((f64, f64), (f64, f64)) {
    let visible = || traces.iter().filter(|t| t.is_visible());
    let x = layout
        .x_axis
        .range
        .unwrap_or_else(|| padded_extent(visible().flat_map(|t| t.x.iter().copied())));
    let y = layout
        .y_axis
        .range
        .unwrap_or_else(|| padded_extent(visible().flat_map(|t| t.y.iter().copied())));
    (x, y)
}

fn padded_extent(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if min > max {
        return (0.0, 1.0);
    }
    if (max - min).abs() < f64::EPSILON {
        return (min - 0.5, max + 0.5);
    }
    let pad = (max - min) * 0.05;
    (min - pad, max + pad)
}

fn color(rgb: Rgb) -> RGBColor {
    RGBColor(rgb.0, rgb.1, rgb.2)
}

/// Render a surface's current traces to `path`.
pub fn render_png(path: &Path, surface: &RecordingSurface, width: u32, height: u32) -> Result<()> {
    let layout = surface
        .layout()
        .ok_or_else(|| anyhow!("surface has nothing rendered"))?;
    let traces = surface.traces();
    let ((x0, x1), (y0, y1)) = axis_ranges(layout, traces);

    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut builder = ChartBuilder::on(&root);
    builder
        .margin(15)
        .x_label_area_size(35)
        .y_label_area_size(50);
    if !layout.title.is_empty() {
        builder.caption(&layout.title, ("sans-serif", 18));
    }
    let mut chart = builder
        .build_cartesian_2d(x0..x1, y0..y1)
        .context("building chart")?;

    chart
        .configure_mesh()
        .x_desc(layout.x_axis.title.as_str())
        .y_desc(layout.y_axis.title.as_str())
        .axis_desc_style(("sans-serif", 14))
        .label_style(("sans-serif", 12))
        .light_line_style(RGBColor(235, 235, 235))
        .draw()?;

    for trace in traces.iter().filter(|t| t.is_visible()) {
        draw_trace(&mut chart, trace)?;
    }

    if layout.show_legend {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(RGBColor(180, 180, 180))
            .label_font(("sans-serif", 12))
            .position(SeriesLabelPosition::UpperRight)
            .draw()?;
    }

    root.present()
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

type Chart<'a, 'b> = ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

fn draw_trace(chart: &mut Chart<'_, '_>, trace: &Trace) -> Result<()> {
    let rgb = color(trace.line.color);
    match (trace.mode, trace.marker) {
        (TraceMode::Lines, _) => {
            let style = if trace.line.dashed {
                rgb.stroke_width(1)
            } else {
                rgb.stroke_width(trace.line.width.round().max(1.0) as u32)
            };
            chart
                .draw_series(LineSeries::new(trace.points(), style))?
                .label(trace.name.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
        }
        (TraceMode::Markers, Some(marker)) => {
            let style = color(marker.color).stroke_width(2);
            let size = (marker.size / 2.0).round() as i32;
            match marker.symbol {
                MarkerSymbol::Cross => {
                    chart
                        .draw_series(trace.points().map(|p| Cross::new(p, size, style)))?
                        .label(trace.name.as_str())
                        .legend(move |(x, y)| Cross::new((x + 10, y), size, style));
                }
                MarkerSymbol::Circle => {
                    let fill = color(marker.color).filled();
                    chart
                        .draw_series(trace.points().map(|p| Circle::new(p, size, fill)))?
                        .label(trace.name.as_str())
                        .legend(move |(x, y)| Circle::new((x + 10, y), size, fill));
                }
            }
        }
        (TraceMode::Markers, None) => {
            let fill = rgb.filled();
            chart.draw_series(trace.points().map(|p| Circle::new(p, 3, fill)))?;
        }
    }
    Ok(())
}
