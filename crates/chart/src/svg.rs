//! Draws chart snapshots as SVG, for charts that cannot be native.
//!
//! The drawing is a static approximation of the chart library's default look:
//! title, legend, value axis with gridlines, and the marks themselves.

use crate::snapshot::{ChartSnapshot, DatasetSnapshot, ScatterPoint};
use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::fmt::Write;
use vellum_types::{escape_xml, Color, Rect};

const PALETTE: [Color; 7] = [
    Color { r: 0x36, g: 0xa2, b: 0xeb, a: 1.0 },
    Color { r: 0xff, g: 0x63, b: 0x84, a: 1.0 },
    Color { r: 0x4b, g: 0xc0, b: 0xc0, a: 1.0 },
    Color { r: 0xff, g: 0x9f, b: 0x40, a: 1.0 },
    Color { r: 0x99, g: 0x66, b: 0xff, a: 1.0 },
    Color { r: 0xff, g: 0xcd, b: 0x56, a: 1.0 },
    Color { r: 0xc9, g: 0xcb, b: 0xcf, a: 1.0 },
];

const PADDING: f32 = 10.0;
const TITLE_SIZE: f32 = 14.0;
const LABEL_SIZE: f32 = 11.0;
const GRID_COLOR: &str = "#e5e5e5";
const TEXT_COLOR: &str = "#666666";
const GRID_STEPS: usize = 5;

/// A standalone SVG document of the chart at the given size.
pub fn render_document(snapshot: &ChartSnapshot, width: f32, height: f32) -> String {
    let mut svg = String::with_capacity(4096);
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    );
    render(&mut svg, snapshot, Rect::new(0.0, 0.0, width, height));
    svg.push_str("</svg>");
    svg
}

/// Appends the chart's elements, drawn inside `frame`.
pub fn render(svg: &mut String, snapshot: &ChartSnapshot, frame: Rect) {
    let mut area = frame.inset(PADDING, PADDING, PADDING, PADDING);

    if let Some(title) = &snapshot.title {
        let _ = write!(
            svg,
            "<text x=\"{}\" y=\"{}\" font-size=\"{TITLE_SIZE}\" font-weight=\"bold\" fill=\"{TEXT_COLOR}\" text-anchor=\"middle\" font-family=\"sans-serif\">{}</text>",
            area.x + area.width / 2.0,
            area.y + TITLE_SIZE,
            escape_xml(title),
        );
        area = area.inset(TITLE_SIZE + 6.0, 0.0, 0.0, 0.0);
    }

    let round = matches!(snapshot.kind.as_str(), "pie" | "doughnut" | "polarArea");
    let legend: Vec<(String, Color)> = if round {
        snapshot
            .labels
            .iter()
            .enumerate()
            .map(|(i, label)| (label.clone(), point_color(snapshot.datasets.first(), i)))
            .collect()
    } else {
        snapshot
            .datasets
            .iter()
            .enumerate()
            .filter_map(|(i, d)| d.label.clone().map(|label| (label, dataset_color(d, i))))
            .collect()
    };
    if !legend.is_empty() {
        draw_legend(svg, &legend, area);
        area = area.inset(LABEL_SIZE + 8.0, 0.0, 0.0, 0.0);
    }

    if area.is_empty() {
        return;
    }

    match snapshot.kind.as_str() {
        "bar" => draw_bars(svg, snapshot, area, snapshot.index_axis.as_deref() == Some("y")),
        "horizontalBar" => draw_bars(svg, snapshot, area, true),
        "line" => draw_lines(svg, snapshot, area),
        "pie" => draw_rings(svg, snapshot, area, 0.0),
        "doughnut" => draw_rings(svg, snapshot, area, 0.5),
        "polarArea" => draw_polar(svg, snapshot, area),
        "radar" => draw_radar(svg, snapshot, area),
        "scatter" | "bubble" => draw_points(svg, snapshot, area),
        other => {
            log::debug!("No drawing for chart type '{}', leaving the frame empty", other);
        }
    }
}

fn dataset_color(dataset: &DatasetSnapshot, index: usize) -> Color {
    dataset
        .background_colors
        .first()
        .copied()
        .or(dataset.border_color)
        .unwrap_or(PALETTE[index % PALETTE.len()])
}

fn point_color(dataset: Option<&DatasetSnapshot>, index: usize) -> Color {
    dataset
        .and_then(|d| match d.background_colors.len() {
            0 => None,
            1 => Some(d.background_colors[0]),
            n => Some(d.background_colors[index % n]),
        })
        .unwrap_or(PALETTE[index % PALETTE.len()])
}

fn paint(color: Color) -> String {
    if color.is_opaque() {
        format!("fill=\"{}\"", color.to_css_hex())
    } else {
        format!("fill=\"{}\" fill-opacity=\"{}\"", color.to_css_hex(), color.a)
    }
}

fn draw_legend(svg: &mut String, entries: &[(String, Color)], area: Rect) {
    let swatch = LABEL_SIZE;
    let widths: Vec<f32> = entries
        .iter()
        .map(|(label, _)| swatch + 4.0 + label.chars().count() as f32 * LABEL_SIZE * 0.55 + 12.0)
        .collect();
    let total: f32 = widths.iter().sum();
    let mut x = area.x + ((area.width - total) / 2.0).max(0.0);
    for ((label, color), width) in entries.iter().zip(widths) {
        let _ = write!(
            svg,
            "<rect x=\"{x}\" y=\"{}\" width=\"{swatch}\" height=\"{swatch}\" {}/>",
            area.y,
            paint(*color),
        );
        let _ = write!(
            svg,
            "<text x=\"{}\" y=\"{}\" font-size=\"{LABEL_SIZE}\" fill=\"{TEXT_COLOR}\" font-family=\"sans-serif\">{}</text>",
            x + swatch + 4.0,
            area.y + swatch - 1.0,
            escape_xml(label),
        );
        x += width;
    }
}

/// Rounds `value` up to 1, 2, 5 or 10 times a power of ten.
fn nice_ceiling(value: f64) -> f64 {
    if value <= 0.0 {
        return 1.0;
    }
    let magnitude = 10f64.powf(value.log10().floor());
    let fraction = value / magnitude;
    let nice = match fraction {
        f if f <= 1.0 => 1.0,
        f if f <= 2.0 => 2.0,
        f if f <= 5.0 => 5.0,
        _ => 10.0,
    };
    nice * magnitude
}

/// Category count: the longer of the labels and the longest dataset.
fn category_count(snapshot: &ChartSnapshot) -> usize {
    snapshot
        .datasets
        .iter()
        .map(|d| d.data.len())
        .max()
        .unwrap_or(0)
        .max(snapshot.labels.len())
}

fn value_range(snapshot: &ChartSnapshot, stacked: bool) -> (f64, f64) {
    let mut min = 0.0f64;
    let mut max = 0.0f64;
    if stacked {
        for i in 0..category_count(snapshot) {
            let (pos, neg) = snapshot.datasets.iter().filter_map(|d| d.data.get(i).copied().flatten()).fold(
                (0.0, 0.0),
                |(p, n), v| if v >= 0.0 { (p + v, n) } else { (p, n + v) },
            );
            max = max.max(pos);
            min = min.min(neg);
        }
    } else {
        for v in snapshot.datasets.iter().flat_map(|d| d.data.iter().flatten()) {
            max = max.max(*v);
            min = min.min(*v);
        }
    }
    let max = nice_ceiling(max);
    let min = if min < 0.0 { -nice_ceiling(-min) } else { 0.0 };
    (min, max)
}

/// Draws gridlines and tick labels along the value axis, returning the plot
/// area left for the marks.
fn draw_value_axis(svg: &mut String, area: Rect, range: (f64, f64), horizontal: bool) -> Rect {
    let gutter = LABEL_SIZE * 3.5;
    // Left gutter for value ticks, or category labels when horizontal.
    let plot = area.inset(0.0, 0.0, LABEL_SIZE + 4.0, gutter);
    let (min, max) = range;
    for step in 0..=GRID_STEPS {
        let value = min + (max - min) * step as f64 / GRID_STEPS as f64;
        let t = step as f32 / GRID_STEPS as f32;
        if horizontal {
            let x = plot.x + plot.width * t;
            let _ = write!(
                svg,
                "<line x1=\"{x}\" y1=\"{}\" x2=\"{x}\" y2=\"{}\" stroke=\"{GRID_COLOR}\" stroke-width=\"1\"/>",
                plot.y,
                plot.bottom(),
            );
            let _ = write!(
                svg,
                "<text x=\"{x}\" y=\"{}\" font-size=\"{LABEL_SIZE}\" fill=\"{TEXT_COLOR}\" text-anchor=\"middle\" font-family=\"sans-serif\">{}</text>",
                plot.bottom() + LABEL_SIZE + 2.0,
                format_tick(value),
            );
        } else {
            let y = plot.bottom() - plot.height * t;
            let _ = write!(
                svg,
                "<line x1=\"{}\" y1=\"{y}\" x2=\"{}\" y2=\"{y}\" stroke=\"{GRID_COLOR}\" stroke-width=\"1\"/>",
                plot.x,
                plot.right(),
            );
            let _ = write!(
                svg,
                "<text x=\"{}\" y=\"{}\" font-size=\"{LABEL_SIZE}\" fill=\"{TEXT_COLOR}\" text-anchor=\"end\" font-family=\"sans-serif\">{}</text>",
                plot.x - 4.0,
                y + LABEL_SIZE / 3.0,
                format_tick(value),
            );
        }
    }
    plot
}

fn format_tick(value: f64) -> String {
    if value.fract().abs() < 1e-9 {
        format!("{}", value as i64)
    } else {
        format!("{:.1}", value)
    }
}

fn draw_category_labels(svg: &mut String, snapshot: &ChartSnapshot, plot: Rect, horizontal: bool) {
    let n = category_count(snapshot).max(1);
    let band = if horizontal { plot.height / n as f32 } else { plot.width / n as f32 };
    for (i, label) in snapshot.labels.iter().enumerate() {
        let center = band * (i as f32 + 0.5);
        if horizontal {
            let _ = write!(
                svg,
                "<text x=\"{}\" y=\"{}\" font-size=\"{LABEL_SIZE}\" fill=\"{TEXT_COLOR}\" text-anchor=\"end\" font-family=\"sans-serif\">{}</text>",
                plot.x - 4.0,
                plot.y + center + LABEL_SIZE / 3.0,
                escape_xml(label),
            );
        } else {
            let _ = write!(
                svg,
                "<text x=\"{}\" y=\"{}\" font-size=\"{LABEL_SIZE}\" fill=\"{TEXT_COLOR}\" text-anchor=\"middle\" font-family=\"sans-serif\">{}</text>",
                plot.x + center,
                plot.bottom() + LABEL_SIZE + 2.0,
                escape_xml(label),
            );
        }
    }
}

fn draw_bars(svg: &mut String, snapshot: &ChartSnapshot, area: Rect, horizontal: bool) {
    let range = value_range(snapshot, snapshot.stacked);
    let plot = draw_value_axis(svg, area, range, horizontal);
    if !horizontal {
        draw_category_labels(svg, snapshot, plot, false);
    }
    let n = category_count(snapshot).max(1);
    let sets = snapshot.datasets.len().max(1);
    let (band_len, value_len) = if horizontal { (plot.height, plot.width) } else { (plot.width, plot.height) };
    let band = band_len / n as f32;
    let scale = |v: f64| ((v - range.0) / (range.1 - range.0)) as f32 * value_len;
    let zero = scale(0.0);

    let mut stack_pos = vec![0.0f64; n];
    let mut stack_neg = vec![0.0f64; n];
    for (d, dataset) in snapshot.datasets.iter().enumerate() {
        for (i, value) in dataset.data.iter().enumerate() {
            let Some(value) = value else { continue };
            let (start, end, thickness, offset) = if snapshot.stacked {
                let base = if *value >= 0.0 { &mut stack_pos[i] } else { &mut stack_neg[i] };
                let start = *base;
                *base += value;
                (scale(start), scale(*base), band * 0.8, band * 0.1)
            } else {
                let thickness = band * 0.8 / sets as f32;
                (zero, scale(*value), thickness, band * 0.1 + thickness * d as f32)
            };
            let low = start.min(end);
            let length = (end - start).abs();
            let along = band * i as f32 + offset;
            let color = if dataset.background_colors.len() > 1 {
                point_color(Some(dataset), i)
            } else {
                dataset_color(dataset, d)
            };
            let (x, y, w, h) = if horizontal {
                (plot.x + low, plot.y + along, length, thickness)
            } else {
                (plot.x + along, plot.bottom() - low - length, thickness, length)
            };
            let _ = write!(svg, "<rect x=\"{x}\" y=\"{y}\" width=\"{w}\" height=\"{h}\" {}/>", paint(color));
        }
    }
    if horizontal {
        draw_category_labels(svg, snapshot, plot, true);
    }
}

fn draw_lines(svg: &mut String, snapshot: &ChartSnapshot, area: Rect) {
    let range = value_range(snapshot, false);
    let plot = draw_value_axis(svg, area, range, false);
    draw_category_labels(svg, snapshot, plot, false);
    let n = category_count(snapshot).max(1);
    let band = plot.width / n as f32;
    for (d, dataset) in snapshot.datasets.iter().enumerate() {
        let color = dataset.border_color.unwrap_or_else(|| dataset_color(dataset, d)).to_css_hex();
        let points: Vec<(f32, f32)> = dataset
            .data
            .iter()
            .enumerate()
            .filter_map(|(i, v)| {
                let v = (*v)?;
                let t = ((v - range.0) / (range.1 - range.0)) as f32;
                Some((plot.x + band * (i as f32 + 0.5), plot.bottom() - plot.height * t))
            })
            .collect();
        if points.len() > 1 {
            let path: Vec<String> = points.iter().map(|(x, y)| format!("{x},{y}")).collect();
            let _ = write!(
                svg,
                "<polyline points=\"{}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"2\"/>",
                path.join(" "),
            );
        }
        for (x, y) in points {
            let _ = write!(svg, "<circle cx=\"{x}\" cy=\"{y}\" r=\"3\" fill=\"{color}\"/>");
        }
    }
}

/// One ring per dataset, outermost first. `cutout` is the inner radius as a
/// share of the outer one.
fn draw_rings(svg: &mut String, snapshot: &ChartSnapshot, area: Rect, cutout: f64) {
    let cx = f64::from(area.x + area.width / 2.0);
    let cy = f64::from(area.y + area.height / 2.0);
    let outer = f64::from(area.width.min(area.height) / 2.0);
    let inner = outer * cutout;
    let sets = snapshot.datasets.len().max(1);
    let ring = (outer - inner) / sets as f64;

    for (d, dataset) in snapshot.datasets.iter().enumerate() {
        let total: f64 = dataset.data.iter().flatten().filter(|v| **v > 0.0).sum();
        if total <= 0.0 {
            continue;
        }
        let r_out = outer - ring * d as f64;
        let r_in = r_out - ring;
        let mut angle = -FRAC_PI_2;
        for (i, value) in dataset.data.iter().enumerate() {
            let value = value.unwrap_or(0.0);
            if value <= 0.0 {
                continue;
            }
            let sweep = value / total * TAU;
            let color = point_color(Some(dataset), i);
            sector(svg, (cx, cy), r_in, r_out, angle, sweep, color);
            angle += sweep;
        }
    }
}

fn draw_polar(svg: &mut String, snapshot: &ChartSnapshot, area: Rect) {
    let Some(dataset) = snapshot.datasets.first() else { return };
    let cx = f64::from(area.x + area.width / 2.0);
    let cy = f64::from(area.y + area.height / 2.0);
    let outer = f64::from(area.width.min(area.height) / 2.0);
    let max = nice_ceiling(dataset.data.iter().flatten().copied().fold(0.0, f64::max));
    let n = dataset.data.len().max(1);
    let sweep = TAU / n as f64;
    for (i, value) in dataset.data.iter().enumerate() {
        let value = value.unwrap_or(0.0).max(0.0);
        let radius = outer * value / max;
        let start = -FRAC_PI_2 + sweep * i as f64;
        sector(svg, (cx, cy), 0.0, radius, start, sweep, point_color(Some(dataset), i).with_alpha(0.5));
    }
}

fn sector(svg: &mut String, (cx, cy): (f64, f64), r_in: f64, r_out: f64, start: f64, sweep: f64, color: Color) {
    if r_out <= 0.0 {
        return;
    }
    // Full circles cannot be drawn with a single arc.
    if sweep >= TAU - 1e-9 {
        let _ = write!(svg, "<circle cx=\"{cx}\" cy=\"{cy}\" r=\"{r_out}\" {}/>", paint(color));
        if r_in > 0.0 {
            let _ = write!(svg, "<circle cx=\"{cx}\" cy=\"{cy}\" r=\"{r_in}\" fill=\"#ffffff\"/>");
        }
        return;
    }
    let end = start + sweep;
    let large = i32::from(sweep > PI);
    let (x1, y1) = (cx + r_out * start.cos(), cy + r_out * start.sin());
    let (x2, y2) = (cx + r_out * end.cos(), cy + r_out * end.sin());
    let d = if r_in > 0.0 {
        let (x3, y3) = (cx + r_in * end.cos(), cy + r_in * end.sin());
        let (x4, y4) = (cx + r_in * start.cos(), cy + r_in * start.sin());
        format!(
            "M{x1},{y1} A{r_out},{r_out} 0 {large},1 {x2},{y2} L{x3},{y3} A{r_in},{r_in} 0 {large},0 {x4},{y4} Z"
        )
    } else {
        format!("M{cx},{cy} L{x1},{y1} A{r_out},{r_out} 0 {large},1 {x2},{y2} Z")
    };
    let _ = write!(svg, "<path d=\"{d}\" {} stroke=\"#ffffff\" stroke-width=\"1\"/>", paint(color));
}

fn draw_radar(svg: &mut String, snapshot: &ChartSnapshot, area: Rect) {
    let n = category_count(snapshot);
    if n < 3 {
        return;
    }
    let cx = area.x + area.width / 2.0;
    let cy = area.y + area.height / 2.0;
    let outer = area.width.min(area.height) / 2.0 - LABEL_SIZE;
    let (_, max) = value_range(snapshot, false);
    let vertex = |i: usize, r: f32| {
        let angle = -FRAC_PI_2 as f32 + TAU as f32 * i as f32 / n as f32;
        (cx + r * angle.cos(), cy + r * angle.sin())
    };

    for step in 1..=GRID_STEPS {
        let r = outer * step as f32 / GRID_STEPS as f32;
        let ring: Vec<String> = (0..n).map(|i| vertex(i, r)).map(|(x, y)| format!("{x},{y}")).collect();
        let _ = write!(
            svg,
            "<polygon points=\"{}\" fill=\"none\" stroke=\"{GRID_COLOR}\" stroke-width=\"1\"/>",
            ring.join(" "),
        );
    }
    for (i, label) in snapshot.labels.iter().enumerate().take(n) {
        let (x, y) = vertex(i, outer + LABEL_SIZE * 0.6);
        let _ = write!(
            svg,
            "<text x=\"{x}\" y=\"{}\" font-size=\"{LABEL_SIZE}\" fill=\"{TEXT_COLOR}\" text-anchor=\"middle\" font-family=\"sans-serif\">{}</text>",
            y + LABEL_SIZE / 3.0,
            escape_xml(label),
        );
    }
    for (d, dataset) in snapshot.datasets.iter().enumerate() {
        let color = dataset.border_color.unwrap_or_else(|| dataset_color(dataset, d));
        let shape: Vec<String> = (0..n)
            .map(|i| {
                let v = dataset.data.get(i).copied().flatten().unwrap_or(0.0).max(0.0);
                vertex(i, outer * (v / max) as f32)
            })
            .map(|(x, y)| format!("{x},{y}"))
            .collect();
        let _ = write!(
            svg,
            "<polygon points=\"{}\" fill=\"{}\" fill-opacity=\"0.2\" stroke=\"{}\" stroke-width=\"2\"/>",
            shape.join(" "),
            color.to_css_hex(),
            color.to_css_hex(),
        );
    }
}

fn draw_points(svg: &mut String, snapshot: &ChartSnapshot, area: Rect) {
    let all: Vec<&ScatterPoint> = snapshot.datasets.iter().flat_map(|d| d.points.iter()).collect();
    if all.is_empty() {
        return;
    }
    let bounds = |f: fn(&ScatterPoint) -> f64| {
        let lo = all.iter().map(|p| f(*p)).fold(f64::INFINITY, f64::min).min(0.0);
        let hi = nice_ceiling(all.iter().map(|p| f(*p)).fold(f64::NEG_INFINITY, f64::max));
        (if lo < 0.0 { -nice_ceiling(-lo) } else { 0.0 }, hi)
    };
    let (x_min, x_max) = bounds(|p| p.x);
    let y_range = bounds(|p| p.y);
    let plot = draw_value_axis(svg, area, y_range, false);
    for (d, dataset) in snapshot.datasets.iter().enumerate() {
        let color = dataset_color(dataset, d).with_alpha(0.7);
        for p in &dataset.points {
            let x = plot.x + ((p.x - x_min) / (x_max - x_min)) as f32 * plot.width;
            let y = plot.bottom() - ((p.y - y_range.0) / (y_range.1 - y_range.0)) as f32 * plot.height;
            let r = p.r.unwrap_or(3.0);
            let _ = write!(svg, "<circle cx=\"{x}\" cy=\"{y}\" r=\"{r}\" {}/>", paint(color));
        }
    }
}
