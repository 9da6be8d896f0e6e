//! Server-side rendering: draw [`Figure`]s to **SVG** with plotters.
//!
//! - Bar charts honor explicit `base` values and `barmode: "relative"` stacking
//! - Category order comes from `layout.xaxis.categoryarray` when present
//! - Geo scatter is drawn on an equirectangular projection with a colorbar
//! - Text is written as SVG `<text>`; nothing here needs a font file

pub mod legend;
pub mod text;
pub mod util;

use crate::figure::{Color as MarkerColor, Figure, Marker, Trace};
use ahash::AHashMap;
use anyhow::{Result, anyhow, bail};

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use plotters_svg::SVGBackend;

use legend::draw_legend_row;
use util::{colorscale_at, fmt_tick, nice_step, office_color, parse_color};

const MARGIN: u32 = 16;
const TITLE_H: u32 = 48;
const LEGEND_H: u32 = 36;
const Y_LABEL_W: u32 = 44;
const COLORBAR_W: u32 = 90;
const MIN_SIZE: u32 = 200;
/// Smallest canvas `render_bar_svg` accepts.
pub const MIN_BAR_SIZE: (u32, u32) = (MIN_SIZE, MIN_SIZE);
/// Smallest canvas `render_map_svg` accepts (room for the colorbar).
pub const MIN_MAP_SIZE: (u32, u32) = (MIN_SIZE + COLORBAR_W, MIN_SIZE);
/// Map marker sizes are specified for a canvas this wide.
const MAP_REFERENCE_W: f64 = 1420.0;

/// One resolved bar rectangle in data coordinates (x is the category index).
#[derive(Debug, Clone, PartialEq)]
pub struct BarRect {
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
    pub color: RGBAColor,
}

/// Render a bar/scatter figure (see [`crate::charts::derive_bar_chart`]).
pub fn render_bar_svg(figure: &Figure, width: u32, height: u32) -> Result<String> {
    if width < MIN_BAR_SIZE.0 || height < MIN_BAR_SIZE.1 {
        bail!("canvas {width}x{height} is too small");
    }
    let categories = categories(figure);
    if categories.is_empty() {
        bail!("figure has no categories to plot");
    }
    let bars = layout_bars(figure, &categories);
    let points = scatter_points(figure, &categories);
    let annotations = &figure.layout.annotations;

    let mut lo = 0.0f64;
    let mut hi = 0.0f64;
    for b in &bars {
        lo = lo.min(b.y0);
        hi = hi.max(b.y1);
    }
    for (_, y, _, _) in &points {
        lo = lo.min(*y);
        hi = hi.max(*y);
    }
    for a in annotations {
        lo = lo.min(a.y);
        hi = hi.max(a.y);
    }
    if (hi - lo).abs() < f64::EPSILON {
        lo -= 1.0;
        hi += 1.0;
    }
    let pad = (hi - lo) * 0.05;
    let (y_min, y_max) = (lo - pad, hi + pad);

    let x_max = categories.len() as f64 - 0.5;
    let x_min = annotations
        .iter()
        .map(|a| a.x - 2.0)
        .fold(-0.5f64, f64::min);

    let family = font_family(figure);
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
        root.fill(&paper_color(figure))
            .map_err(|e| anyhow!("{:?}", e))?;
        let (title_area, rest) = root.split_vertically(TITLE_H);
        let (plot_area, legend_area) = rest.split_vertically(height - TITLE_H - LEGEND_H);
        draw_title(&title_area, figure, &family)?;

        let mut chart = ChartBuilder::on(&plot_area)
            .margin(MARGIN)
            .margin_left(MARGIN + Y_LABEL_W)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)
            .map_err(|e| anyhow!("{:?}", e))?;

        if let Some(bg) = figure.layout.plot_bgcolor.as_deref().and_then(parse_color) {
            chart
                .draw_series(std::iter::once(Rectangle::new(
                    [(x_min, y_min), (x_max, y_max)],
                    bg.filled(),
                )))
                .map_err(|e| anyhow!("{:?}", e))?;
        }

        // Horizontal grid with labels left of the plot.
        let grid = RGBColor(204, 204, 204).stroke_width(1);
        let tick_style = TextStyle::from((FontFamily::Name(&family), 12).into_font())
            .color(&BLACK)
            .pos(Pos::new(HPos::Right, VPos::Center));
        let step = nice_step(y_max - y_min, 8);
        let ticks: Vec<f64> = {
            let mut t = (y_min / step).ceil() * step;
            let mut out = Vec::new();
            while t <= y_max {
                out.push(t);
                t += step;
            }
            out
        };
        chart
            .draw_series(
                ticks
                    .iter()
                    .map(|t| PathElement::new(vec![(x_min, *t), (x_max, *t)], grid.clone())),
            )
            .map_err(|e| anyhow!("{:?}", e))?;
        chart
            .draw_series(ticks.iter().map(|t| {
                EmptyElement::at((x_min, *t))
                    + Text::new(fmt_tick(*t), (-6, 0), tick_style.clone())
            }))
            .map_err(|e| anyhow!("{:?}", e))?;

        chart
            .draw_series(
                bars.iter()
                    .map(|b| Rectangle::new([(b.x0, b.y0), (b.x1, b.y1)], b.color.filled())),
            )
            .map_err(|e| anyhow!("{:?}", e))?;
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(x_min, 0.0), (x_max, 0.0)],
                BLACK.stroke_width(1),
            )))
            .map_err(|e| anyhow!("{:?}", e))?;
        chart
            .draw_series(
                points
                    .iter()
                    .map(|(x, y, r, c)| Circle::new((*x, *y), *r, c.filled())),
            )
            .map_err(|e| anyhow!("{:?}", e))?;
        chart
            .draw_series(annotations.iter().map(|a| {
                let px = a.font.as_ref().and_then(|f| f.size).unwrap_or(14.0);
                let style = TextStyle::from((FontFamily::Name(&family), px).into_font())
                    .color(&BLACK)
                    .pos(Pos::new(HPos::Center, VPos::Center));
                Text::new(a.text.clone(), (a.x, a.y), style)
            }))
            .map_err(|e| anyhow!("{:?}", e))?;

        let items = legend_items(figure);
        draw_legend_row(&legend_area, &items, (MARGIN + Y_LABEL_W) as i32, 14)?;

        root.present().map_err(|e| anyhow!("{:?}", e))?;
    }
    Ok(svg)
}

/// Render the geo scatter figure (see [`crate::charts::map_figure`]).
pub fn render_map_svg(figure: &Figure, width: u32, height: u32) -> Result<String> {
    if width < MIN_MAP_SIZE.0 || height < MIN_MAP_SIZE.1 {
        bail!("canvas {width}x{height} is too small");
    }
    let geo = figure
        .data
        .iter()
        .find_map(|t| match t {
            Trace::Scattergeo(g) => Some(g),
            _ => None,
        })
        .ok_or_else(|| anyhow!("figure has no geo trace"))?;

    let values: Vec<f64> = match &geo.marker.color {
        Some(MarkerColor::Values(v)) => v.clone(),
        _ => vec![0.0; geo.lon.len()],
    };
    let (mut vmin, mut vmax) = (
        values.iter().cloned().fold(f64::INFINITY, f64::min),
        values.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
    );
    if !vmin.is_finite() || !vmax.is_finite() {
        (vmin, vmax) = (0.0, 1.0);
    } else if (vmax - vmin).abs() < f64::EPSILON {
        vmin -= 1.0;
        vmax += 1.0;
    }
    let stops = colorscale(&geo.marker);
    let solid = marker_color(Some(&geo.marker)).unwrap_or_else(|| office_color(0));
    let color_of = |v: f64| colorscale_at(&stops, (v - vmin) / (vmax - vmin)).unwrap_or(solid);

    let scale = (width - COLORBAR_W) as f64 / MAP_REFERENCE_W;
    let radius = (geo.marker.size.unwrap_or(12.0) / 2.0 * scale).max(2.0).round() as i32;

    let (land, border) = match &figure.layout.geo {
        Some(g) => (
            parse_color(&g.landcolor).unwrap_or(WHITE.to_rgba()),
            parse_color(&g.countrycolor).unwrap_or(RGBColor(204, 204, 204).to_rgba()),
        ),
        None => (WHITE.to_rgba(), RGBColor(204, 204, 204).to_rgba()),
    };

    let family = font_family(figure);
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
        root.fill(&paper_color(figure))
            .map_err(|e| anyhow!("{:?}", e))?;
        let (title_area, rest) = root.split_vertically(TITLE_H);
        let (map_area, bar_area) = rest.split_horizontally(width - COLORBAR_W);
        draw_title(&title_area, figure, &family)?;

        let mut chart = ChartBuilder::on(&map_area)
            .margin(MARGIN)
            .build_cartesian_2d(-180f64..180f64, -90f64..90f64)
            .map_err(|e| anyhow!("{:?}", e))?;
        chart
            .draw_series(std::iter::once(Rectangle::new(
                [(-180.0, -90.0), (180.0, 90.0)],
                land.filled(),
            )))
            .map_err(|e| anyhow!("{:?}", e))?;

        // 30 degree graticule
        let line = border.stroke_width(1);
        let meridians = (-5..=5).map(|i| {
            let lon = i as f64 * 30.0;
            PathElement::new(vec![(lon, -90.0), (lon, 90.0)], line.clone())
        });
        let parallels = (-2..=2).map(|i| {
            let lat = i as f64 * 30.0;
            PathElement::new(vec![(-180.0, lat), (180.0, lat)], line.clone())
        });
        chart
            .draw_series(meridians.chain(parallels))
            .map_err(|e| anyhow!("{:?}", e))?;

        let markers = geo
            .lon
            .iter()
            .zip(&geo.lat)
            .zip(values.iter().chain(std::iter::repeat(&0.0)))
            .filter(|((lon, lat), _)| lon.abs() <= 180.0 && lat.abs() <= 90.0)
            .map(|((lon, lat), v)| Circle::new((*lon, *lat), radius, color_of(*v).filled()));
        chart
            .draw_series(markers)
            .map_err(|e| anyhow!("{:?}", e))?;

        draw_colorbar(&bar_area, &geo.marker, &stops, vmin, vmax, &family)?;

        root.present().map_err(|e| anyhow!("{:?}", e))?;
    }
    Ok(svg)
}

/// Category order: the pinned `categoryarray`, else first appearance across bar/scatter traces.
pub fn categories(figure: &Figure) -> Vec<String> {
    if let Some(cats) = figure
        .layout
        .xaxis
        .as_ref()
        .and_then(|a| a.categoryarray.as_ref())
    {
        return cats.clone();
    }
    let mut seen = ahash::AHashSet::new();
    let mut out = Vec::new();
    for t in &figure.data {
        let xs = match t {
            Trace::Bar(b) => &b.x,
            Trace::Scatter(s) => &s.x,
            Trace::Scattergeo(_) => continue,
        };
        for x in xs {
            if seen.insert(x.as_str()) {
                out.push(x.clone());
            }
        }
    }
    out
}

/// Resolve every bar of every bar trace into a rectangle, in drawing order.
///
/// Bars with a `base` span `base..base + y`. Bars without one stack in relative/stack
/// mode (positives upward, negatives downward, per category) and start at zero otherwise.
pub fn layout_bars(figure: &Figure, categories: &[String]) -> Vec<BarRect> {
    let pos: AHashMap<&str, usize> = categories
        .iter()
        .enumerate()
        .map(|(i, c)| (c.as_str(), i))
        .collect();
    let stacking = matches!(
        figure.layout.barmode.as_deref(),
        Some("relative") | Some("stack")
    );
    let mut up = vec![0.0f64; categories.len()];
    let mut down = vec![0.0f64; categories.len()];

    let mut out = Vec::new();
    for (ti, bar) in figure.bars().enumerate() {
        let color = marker_color(bar.marker.as_ref()).unwrap_or_else(|| office_color(ti));
        let half = bar.width.unwrap_or(0.8) / 2.0;
        for (i, (x, y)) in bar.x.iter().zip(&bar.y).enumerate() {
            let Some(&c) = pos.get(x.as_str()) else {
                continue;
            };
            let (y0, y1) = match &bar.base {
                Some(base) => {
                    let b = base.at(i);
                    (b, b + y)
                }
                None if stacking => {
                    let acc = if *y >= 0.0 { &mut up[c] } else { &mut down[c] };
                    let start = *acc;
                    *acc += y;
                    (start, *acc)
                }
                None => (0.0, *y),
            };
            out.push(BarRect {
                x0: c as f64 - half,
                x1: c as f64 + half,
                y0: y0.min(y1),
                y1: y0.max(y1),
                color,
            });
        }
    }
    out
}

fn scatter_points(figure: &Figure, categories: &[String]) -> Vec<(f64, f64, i32, RGBAColor)> {
    let pos: AHashMap<&str, usize> = categories
        .iter()
        .enumerate()
        .map(|(i, c)| (c.as_str(), i))
        .collect();
    let mut out = Vec::new();
    for (ti, t) in figure.data.iter().enumerate() {
        let Trace::Scatter(s) = t else { continue };
        let color = marker_color(s.marker.as_ref()).unwrap_or_else(|| office_color(ti));
        let r = s
            .marker
            .as_ref()
            .and_then(|m| m.size)
            .map(|sz| (sz / 2.0).round().max(1.0) as i32)
            .unwrap_or(3);
        for (x, y) in s.x.iter().zip(&s.y) {
            if let Some(&c) = pos.get(x.as_str()) {
                out.push((c as f64, *y, r, color));
            }
        }
    }
    out
}

/// Legend entries: non-empty bar traces with a name that are not hidden from the legend.
pub fn legend_items(figure: &Figure) -> Vec<(String, RGBAColor)> {
    figure
        .bars()
        .enumerate()
        .filter(|(_, b)| b.showlegend != Some(false) && !b.name.is_empty() && !b.x.is_empty())
        .map(|(i, b)| {
            let color = marker_color(b.marker.as_ref()).unwrap_or_else(|| office_color(i));
            (b.name.clone(), color)
        })
        .collect()
}

fn marker_color(marker: Option<&Marker>) -> Option<RGBAColor> {
    match marker?.color.as_ref()? {
        MarkerColor::Solid(s) => parse_color(s),
        MarkerColor::Values(_) => None,
    }
}

fn colorscale(marker: &Marker) -> Vec<(f64, RGBAColor)> {
    let mut stops: Vec<(f64, RGBAColor)> = marker
        .colorscale
        .iter()
        .flatten()
        .filter_map(|(p, c)| parse_color(c).map(|c| (*p, c)))
        .collect();
    stops.sort_by(|a, b| a.0.total_cmp(&b.0));
    if stops.is_empty() {
        stops = vec![(0.0, RED.to_rgba()), (1.0, GREEN.to_rgba())];
    }
    stops
}

fn paper_color(figure: &Figure) -> RGBAColor {
    figure
        .layout
        .paper_bgcolor
        .as_deref()
        .and_then(parse_color)
        .unwrap_or(WHITE.to_rgba())
}

fn font_family(figure: &Figure) -> String {
    figure
        .layout
        .font
        .as_ref()
        .and_then(|f| f.family.clone())
        .unwrap_or_else(|| "sans-serif".to_string())
}

fn draw_title<DB>(area: &DrawingArea<DB, Shift>, figure: &Figure, family: &str) -> Result<()>
where
    DB: DrawingBackend,
{
    let title = figure.layout.title_text();
    if title.is_empty() {
        return Ok(());
    }
    let px = figure
        .layout
        .title
        .as_ref()
        .and_then(|t| t.font.as_ref())
        .and_then(|f| f.size)
        .unwrap_or(20.0);
    let (w, h) = area.dim_in_pixel();
    let style = TextStyle::from((FontFamily::Name(family), px).into_font())
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center));
    area.draw(&Text::new(
        title.to_string(),
        (w as i32 / 2, h as i32 / 2),
        style,
    ))
    .map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

fn draw_colorbar<DB>(
    area: &DrawingArea<DB, Shift>,
    marker: &Marker,
    stops: &[(f64, RGBAColor)],
    vmin: f64,
    vmax: f64,
    family: &str,
) -> Result<()>
where
    DB: DrawingBackend,
{
    const SEGMENTS: i32 = 60;
    const BAR_W: i32 = 18;
    let (_, h) = area.dim_in_pixel();
    let top = MARGIN as i32 * 2;
    let bottom = h as i32 - MARGIN as i32 * 2;
    if bottom <= top {
        return Ok(());
    }
    let x0 = 8;
    let seg_h = (bottom - top) as f64 / SEGMENTS as f64;
    for i in 0..SEGMENTS {
        // top of the bar is the maximum
        let t = 1.0 - (i as f64 + 0.5) / SEGMENTS as f64;
        let color = colorscale_at(stops, t).unwrap_or(BLACK.to_rgba());
        let y0 = top + (i as f64 * seg_h).floor() as i32;
        let y1 = top + ((i + 1) as f64 * seg_h).ceil() as i32;
        area.draw(&Rectangle::new([(x0, y0), (x0 + BAR_W, y1)], color.filled()))
            .map_err(|e| anyhow!("{:?}", e))?;
    }

    let (suffix, precision) = match &marker.colorbar {
        Some(cb) => (cb.ticksuffix.as_str(), tick_precision(&cb.tickformat)),
        None => ("", 1),
    };
    let style = TextStyle::from((FontFamily::Name(family), 12).into_font())
        .color(&BLACK)
        .pos(Pos::new(HPos::Left, VPos::Center));
    for k in 0..=4 {
        let f = k as f64 / 4.0;
        let v = vmax - (vmax - vmin) * f;
        let y = top + ((bottom - top) as f64 * f).round() as i32;
        area.draw(&Text::new(
            format!("{:.*}{}", precision, v, suffix),
            (x0 + BAR_W + 6, y),
            style.clone(),
        ))
        .map_err(|e| anyhow!("{:?}", e))?;
    }
    Ok(())
}

/// Digits after the point for a d3-style `.Nf` format; 1 otherwise.
fn tick_precision(format: &str) -> usize {
    format
        .strip_prefix('.')
        .and_then(|f| f.strip_suffix('f'))
        .and_then(|n| n.parse().ok())
        .unwrap_or(1)
}
