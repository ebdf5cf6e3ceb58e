//! Paints a render-context subtree as an SVG document.

use crate::encode::{encode, rasterize_svg, ImageFormat, RasterImage};
use crate::media::{data_uri, sniff_mime};
use crate::RasterError;
use std::fmt::Write;
use vellum_chart::ChartSnapshot;
use vellum_host::{canvas_chart_key, image_dimensions, is_icon, RenderContext};
use vellum_layout::{BoxContent, FontLibrary, LayoutBox, NodeKey, PlacedLine};
use vellum_resource::fetch;
use vellum_style::{
    BackgroundImage, BackgroundSize, BorderSide, BorderStyle, ColorStop, ComputedStyle, GradientKind, Visibility,
};
use vellum_types::{escape_xml, Color, Rect, Size};

const PLACEHOLDER_FILL: &str = "#e0e0e0";
const PLACEHOLDER_STROKE: &str = "#999999";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaintOptions {
    /// Device pixels per CSS pixel.
    pub scale: f32,
    /// Subtree left out of the picture.
    pub exclude: Option<NodeKey>,
    /// Paint the target's own background and border, nothing inside it.
    pub background_only: bool,
    /// Fill behind the subtree. `None` keeps PNG output transparent.
    pub backdrop: Option<Color>,
}

impl Default for PaintOptions {
    fn default() -> Self {
        Self { scale: 1.0, exclude: None, background_only: false, backdrop: None }
    }
}

/// SVG for the border box of `target`, in CSS pixels scaled by `opts.scale`.
pub fn paint_svg(ctx: &RenderContext, target: NodeKey, opts: &PaintOptions) -> Result<String, RasterError> {
    let root = ctx.find_box(target).ok_or(RasterError::MissingBox(target))?;
    let frame = ctx.rect(target).ok_or(RasterError::MissingBox(target))?;
    if frame.is_empty() {
        return Err(RasterError::EmptyArea { width: frame.width, height: frame.height });
    }

    let mut painter = Painter { ctx, opts, body: String::with_capacity(4096), defs: String::new(), next_id: 0 };
    if let Some(color) = opts.backdrop {
        let _ = write!(painter.body, "<rect {} {}/>", rect_attrs(frame, 0.0), fill(color));
    }
    painter.paint_box(root, true);

    let (width, height) = device_size(frame.size(), opts.scale);
    let mut svg = String::with_capacity(painter.body.len() + painter.defs.len() + 256);
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"{} {} {} {}\">",
        frame.x, frame.y, frame.width, frame.height,
    );
    if !painter.defs.is_empty() {
        let _ = write!(svg, "<defs>{}</defs>", painter.defs);
    }
    svg.push_str(&painter.body);
    svg.push_str("</svg>");
    Ok(svg)
}

/// Paints and encodes the subtree under `target`.
pub fn rasterize(
    ctx: &RenderContext,
    target: NodeKey,
    opts: &PaintOptions,
    format: ImageFormat,
) -> Result<RasterImage, RasterError> {
    let svg = paint_svg(ctx, target, opts)?;
    let pixmap = rasterize_svg(&svg, ctx.fonts().database())?;
    let image = encode(&pixmap, format, opts.backdrop.unwrap_or(Color::WHITE))?;
    log::debug!(
        "Rasterized node {} of slide {} to {}x{} {}",
        target,
        ctx.slide_index(),
        image.width,
        image.height,
        format.extension()
    );
    Ok(image)
}

/// Draws a chart from its snapshot alone, as a transparent PNG.
pub fn render_chart(
    snapshot: &ChartSnapshot,
    size: Size,
    scale: f32,
    fonts: &FontLibrary,
) -> Result<RasterImage, RasterError> {
    if size.width <= 0.0 || size.height <= 0.0 {
        return Err(RasterError::EmptyArea { width: size.width, height: size.height });
    }
    let (width, height) = device_size(size, scale);
    let mut svg = String::with_capacity(4096);
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {} {}\">",
        size.width, size.height,
    );
    vellum_chart::svg::render(&mut svg, snapshot, Rect::from_size(size));
    svg.push_str("</svg>");
    let pixmap = rasterize_svg(&svg, fonts.database())?;
    encode(&pixmap, ImageFormat::Png, Color::WHITE)
}

fn device_size(size: Size, scale: f32) -> (u32, u32) {
    let scale = if scale > 0.0 { scale } else { 1.0 };
    (((size.width * scale).ceil() as u32).max(1), ((size.height * scale).ceil() as u32).max(1))
}

struct Painter<'a> {
    ctx: &'a RenderContext,
    opts: &'a PaintOptions,
    body: String,
    defs: String,
    next_id: usize,
}

impl Painter<'_> {
    fn id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}{}", prefix, self.next_id)
    }

    fn paint_box(&mut self, b: &LayoutBox, is_target: bool) {
        if self.opts.exclude == Some(b.key) {
            return;
        }
        let Some(geometry) = self.ctx.layout().geometry(b.key).copied() else {
            return;
        };
        let style = b.style.clone();
        let visible = style.visibility == Visibility::Visible;
        let grouped = style.opacity < 1.0;
        if grouped {
            let _ = write!(self.body, "<g opacity=\"{}\">", style.opacity.max(0.0));
        }

        if visible {
            self.paint_background(geometry.border_box, &style);
            self.paint_border(geometry.border_box, &style);
        }
        if is_target && self.opts.background_only {
            if grouped {
                self.body.push_str("</g>");
            }
            return;
        }

        if visible {
            match &b.content {
                BoxContent::Replaced { .. } => self.paint_replaced(b.key, geometry.content_box, &style),
                BoxContent::Text(_) => self.paint_text(b.key),
                BoxContent::Container { .. } => {}
            }
            if let Some(marker) = self.ctx.element(b.key).and_then(|e| self.ctx.list_marker(e.id())) {
                self.paint_marker(b, geometry.content_box, &style, &marker);
            }
        }
        for child in &b.children {
            self.paint_box(child, false);
        }

        if grouped {
            self.body.push_str("</g>");
        }
    }

    fn paint_background(&mut self, rect: Rect, style: &ComputedStyle) {
        let radius = corner_radius(style, rect);
        if !style.background_color.is_transparent() {
            let _ = write!(self.body, "<rect {} {}/>", rect_attrs(rect, radius), fill(style.background_color));
        }
        match &style.background_image {
            Some(BackgroundImage::Gradient { kind, stops }) => {
                let id = self.id("g");
                self.gradient_def(&id, *kind, stops, rect);
                let _ = write!(self.body, "<rect {} fill=\"url(#{id})\"/>", rect_attrs(rect, radius));
            }
            Some(BackgroundImage::Url(url)) => self.paint_url_background(rect, radius, url, style.background_size),
            None => {}
        }
    }

    fn gradient_def(&mut self, id: &str, kind: GradientKind, stops: &[ColorStop], rect: Rect) {
        let (cx, cy) = (rect.x + rect.width / 2.0, rect.y + rect.height / 2.0);
        match kind {
            GradientKind::Linear { angle_deg } => {
                // The gradient line runs through the center and reaches the
                // corners perpendicular to it.
                let (sin, cos) = angle_deg.to_radians().sin_cos();
                let half = ((rect.width * sin).abs() + (rect.height * cos).abs()) / 2.0;
                let (dx, dy) = (sin * half, -cos * half);
                let _ = write!(
                    self.defs,
                    "<linearGradient id=\"{id}\" gradientUnits=\"userSpaceOnUse\" x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\">",
                    cx - dx,
                    cy - dy,
                    cx + dx,
                    cy + dy,
                );
            }
            GradientKind::Radial => {
                let r = (rect.width * rect.width + rect.height * rect.height).sqrt() / 2.0;
                let _ = write!(
                    self.defs,
                    "<radialGradient id=\"{id}\" gradientUnits=\"userSpaceOnUse\" cx=\"{cx}\" cy=\"{cy}\" r=\"{r}\">",
                );
            }
        }
        for (offset, color) in BackgroundImage::resolved_stops(stops) {
            let _ = write!(
                self.defs,
                "<stop offset=\"{offset}\" stop-color=\"{}\" stop-opacity=\"{}\"/>",
                color.to_css_hex(),
                color.a,
            );
        }
        self.defs.push_str(match kind {
            GradientKind::Linear { .. } => "</linearGradient>",
            GradientKind::Radial => "</radialGradient>",
        });
    }

    fn paint_url_background(&mut self, rect: Rect, radius: f32, url: &str, size: BackgroundSize) {
        let Some((uri, natural)) = self.load_image(url) else { return };
        let clip = self.id("c");
        let _ = write!(self.defs, "<clipPath id=\"{clip}\"><rect {}/></clipPath>", rect_attrs(rect, radius));
        let (placed, aspect) = match size {
            BackgroundSize::Cover => (rect, "xMidYMid slice"),
            BackgroundSize::Contain => (rect, "xMidYMid meet"),
            BackgroundSize::Auto => match natural {
                Some(n) if n.width > 0.0 && n.height > 0.0 => (Rect::new(rect.x, rect.y, n.width, n.height), "none"),
                _ => (rect, "xMidYMid slice"),
            },
        };
        let _ = write!(
            self.body,
            "<image {} preserveAspectRatio=\"{aspect}\" clip-path=\"url(#{clip})\" href=\"{uri}\"/>",
            rect_attrs(placed, 0.0),
        );
    }

    fn paint_border(&mut self, rect: Rect, style: &ComputedStyle) {
        let b = style.border;
        let sides = [b.top, b.right, b.bottom, b.left];
        if !sides.iter().any(BorderSide::is_visible) {
            return;
        }
        if sides.iter().all(|s| *s == b.top) {
            let w = b.top.width;
            let inner = rect.inset(w / 2.0, w / 2.0, w / 2.0, w / 2.0);
            let radius = (corner_radius(style, rect) - w / 2.0).max(0.0);
            let _ = write!(
                self.body,
                "<rect {} fill=\"none\" {}/>",
                rect_attrs(inner, radius),
                stroke(&b.top),
            );
            return;
        }
        let lines = [
            (b.top, (rect.x, rect.y + b.top.width / 2.0), (rect.right(), rect.y + b.top.width / 2.0)),
            (b.right, (rect.right() - b.right.width / 2.0, rect.y), (rect.right() - b.right.width / 2.0, rect.bottom())),
            (b.bottom, (rect.x, rect.bottom() - b.bottom.width / 2.0), (rect.right(), rect.bottom() - b.bottom.width / 2.0)),
            (b.left, (rect.x + b.left.width / 2.0, rect.y), (rect.x + b.left.width / 2.0, rect.bottom())),
        ];
        for (side, (x1, y1), (x2, y2)) in lines {
            if side.is_visible() {
                let _ = write!(self.body, "<line x1=\"{x1}\" y1=\"{y1}\" x2=\"{x2}\" y2=\"{y2}\" {}/>", stroke(&side));
            }
        }
    }

    fn paint_text(&mut self, key: NodeKey) {
        let ctx = self.ctx;
        let Some(text) = ctx.text(key) else { return };
        for fragment in text.fragments() {
            let Some(run) = text.runs.get(fragment.run) else { continue };
            if run.is_line_break() || fragment.text.trim().is_empty() {
                continue;
            }
            let style = &run.style;
            if style.visibility != Visibility::Visible || style.color.is_transparent() {
                continue;
            }
            let family = self.family(style);
            let _ = write!(
                self.body,
                "<text x=\"{}\" y=\"{}\" font-family=\"{}\" font-size=\"{}\" font-weight=\"{}\"{} {} xml:space=\"preserve\"",
                fragment.x,
                fragment.baseline,
                escape_xml(&family),
                style.font_size,
                style.font_weight.numeric_value(),
                if style.font_style.is_italic() { " font-style=\"italic\"" } else { "" },
                fill(style.color),
            );
            if style.letter_spacing != 0.0 {
                let _ = write!(self.body, " letter-spacing=\"{}\"", style.letter_spacing);
            }
            let _ = write!(self.body, ">{}</text>", escape_xml(&fragment.text));

            let thickness = (style.font_size / 16.0).max(1.0);
            let mut decorate = |offset: f32| {
                let _ = write!(
                    self.body,
                    "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{thickness}\" {}/>",
                    fragment.x,
                    fragment.baseline + offset,
                    fragment.width,
                    fill(style.color),
                );
            };
            if style.text_decoration.underline {
                decorate(style.font_size * 0.1);
            }
            if style.text_decoration.line_through {
                decorate(-style.font_size * 0.3);
            }
        }
    }

    /// Outside marker: right-aligned half an em left of the item's first line.
    fn paint_marker(&mut self, item: &LayoutBox, content: Rect, style: &ComputedStyle, marker: &str) {
        let Some(line) = first_line(self.ctx, item) else { return };
        let family = self.family(style);
        let _ = write!(
            self.body,
            "<text x=\"{}\" y=\"{}\" font-family=\"{}\" font-size=\"{}\" text-anchor=\"end\" {}>{}</text>",
            content.x - style.font_size * 0.5,
            line.baseline,
            escape_xml(&family),
            style.font_size,
            fill(style.color),
            escape_xml(marker),
        );
    }

    fn paint_replaced(&mut self, key: NodeKey, content: Rect, style: &ComputedStyle) {
        let ctx = self.ctx;
        let Some(element) = ctx.element(key) else { return };
        if content.is_empty() {
            return;
        }
        match element.name() {
            "img" => {
                let Some(src) = element.get_attr("src") else { return };
                if let Some((uri, _)) = self.load_image(src) {
                    let _ = write!(
                        self.body,
                        "<image {} preserveAspectRatio=\"none\" href=\"{uri}\"/>",
                        rect_attrs(content, 0.0),
                    );
                }
            }
            "svg" => {
                let xml = element.document().outer_xml(element.id());
                let _ = write!(
                    self.body,
                    "<image {} preserveAspectRatio=\"none\" href=\"{}\"/>",
                    rect_attrs(content, 0.0),
                    data_uri(xml.as_bytes(), "image/svg+xml"),
                );
            }
            "canvas" => {
                let chart_key = canvas_chart_key(element);
                if let Some(snapshot) = ctx.charts().get(&chart_key) {
                    vellum_chart::svg::render(&mut self.body, snapshot, content);
                }
            }
            _ if is_icon(element, style) => self.paint_icon(element.text().trim(), content, style),
            _ => {
                let _ = write!(
                    self.body,
                    "<rect {} fill=\"{PLACEHOLDER_FILL}\" stroke=\"{PLACEHOLDER_STROKE}\" stroke-width=\"1\"/>",
                    rect_attrs(content, 0.0),
                );
            }
        }
    }

    /// Ligature icons draw their text in the icon font when it is loaded.
    /// Anything else becomes a dot in the icon's color.
    fn paint_icon(&mut self, ligature: &str, content: Rect, style: &ComputedStyle) {
        let face = self
            .ctx
            .fonts()
            .resolve(&style.font_family, style.font_weight, style.font_style)
            .filter(|face| style.font_family.iter().any(|f| f.eq_ignore_ascii_case(&face.family)));
        match face {
            Some(face) if !ligature.is_empty() => {
                let _ = write!(
                    self.body,
                    "<text x=\"{}\" y=\"{}\" font-family=\"{}\" font-size=\"{}\" {}>{}</text>",
                    content.x,
                    content.y + style.font_size * 0.85,
                    escape_xml(&face.family),
                    style.font_size,
                    fill(style.color),
                    escape_xml(ligature),
                );
            }
            _ => {
                let r = content.width.min(content.height) * 0.35;
                let _ = write!(
                    self.body,
                    "<circle cx=\"{}\" cy=\"{}\" r=\"{r}\" {}/>",
                    content.x + content.width / 2.0,
                    content.y + content.height / 2.0,
                    fill(style.color),
                );
            }
        }
    }

    fn family(&self, style: &ComputedStyle) -> String {
        self.ctx
            .fonts()
            .resolve(&style.font_family, style.font_weight, style.font_style)
            .map(|face| face.family.clone())
            .or_else(|| style.font_family.first().cloned())
            .unwrap_or_else(|| "sans-serif".to_string())
    }

    /// Data URI and natural size of an image asset.
    fn load_image(&self, url: &str) -> Option<(String, Option<Size>)> {
        let data = match fetch(self.ctx.resources(), url) {
            Ok(data) => data,
            Err(e) => {
                log::warn!("Skipping image: {}", e);
                return None;
            }
        };
        let Some(mime) = sniff_mime(&data) else {
            log::warn!("Skipping image with unknown format ({} bytes)", data.len());
            return None;
        };
        Some((data_uri(&data, mime), image_dimensions(&data)))
    }
}

fn first_line<'a>(ctx: &'a RenderContext, b: &LayoutBox) -> Option<&'a PlacedLine> {
    if let Some(line) = ctx.text(b.key).and_then(|t| t.lines.first()) {
        return Some(line);
    }
    b.children.iter().find_map(|c| first_line(ctx, c))
}

fn corner_radius(style: &ComputedStyle, rect: Rect) -> f32 {
    style
        .border_radius
        .resolve(rect.width)
        .unwrap_or(0.0)
        .clamp(0.0, rect.width.min(rect.height) / 2.0)
}

fn rect_attrs(r: Rect, radius: f32) -> String {
    let mut out = format!("x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"", r.x, r.y, r.width.max(0.0), r.height.max(0.0));
    if radius > 0.0 {
        let _ = write!(out, " rx=\"{radius}\"");
    }
    out
}

fn fill(color: Color) -> String {
    if color.is_opaque() {
        format!("fill=\"{}\"", color.to_css_hex())
    } else {
        format!("fill=\"{}\" fill-opacity=\"{}\"", color.to_css_hex(), color.a)
    }
}

fn stroke(side: &BorderSide) -> String {
    let mut out = format!("stroke=\"{}\" stroke-width=\"{}\"", side.color.to_css_hex(), side.width);
    if !side.color.is_opaque() {
        let _ = write!(out, " stroke-opacity=\"{}\"", side.color.a);
    }
    match side.style {
        BorderStyle::Dashed => {
            let _ = write!(out, " stroke-dasharray=\"{} {}\"", side.width * 3.0, side.width * 3.0);
        }
        BorderStyle::Dotted => {
            let _ = write!(out, " stroke-dasharray=\"{} {}\"", side.width, side.width);
        }
        BorderStyle::Solid | BorderStyle::Double | BorderStyle::None => {}
    }
    out
}
