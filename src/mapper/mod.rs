//! Walks a render context and classifies its boxes into primitives.
//!
//! The walk is pre-order from the captured root. Per box, the first match
//! wins: canvas, icon glyph, image or inline svg, text container, decorated
//! block, then plain pass-through. Frames come out relative to the captured
//! container's border box.

mod background;
mod primitive;
mod text;

pub use background::SlideBackground;
pub use primitive::{
    ChartPrimitive, ImagePrimitive, Primitive, PrimitiveKind, ShapeBorder, ShapePrimitive, TextParagraph,
    TextPrimitive, TextRunSpec,
};
pub use text::concrete_family;

use crate::config::ExportOptions;
use crate::error::ExportError;
use std::collections::BTreeSet;
use vellum_chart::{choose_rendition, RasterSource, Rendition};
use vellum_host::{canvas_chart_key, is_icon, ElementRef, NodeId, RenderContext};
use vellum_layout::{BoxContent, LayoutBox, NodeKey};
use vellum_raster::{rasterize, render_chart, ImageFormat, PaintOptions, RasterImage};
use vellum_style::{BorderSide, ComputedStyle, Visibility};
use vellum_types::{Color, Rect};

/// Background as carried into the document.
#[derive(Debug, Clone, PartialEq)]
pub enum MappedBackground {
    Solid(Color),
    Picture(RasterImage),
    None,
}

/// One slide's mapping result.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedSlide {
    pub background: MappedBackground,
    pub primitives: Vec<Primitive>,
}

impl MappedSlide {
    pub fn kinds(&self) -> Vec<PrimitiveKind> {
        self.primitives.iter().map(Primitive::kind).collect()
    }
}

/// The captured slide root: the first element with `class`, else `<body>`,
/// else the root box.
pub fn find_container(ctx: &RenderContext, class: &str) -> NodeKey {
    ctx.find_by_class(class)
        .filter(|&key| ctx.find_box(key).is_some())
        .or_else(|| ctx.body().filter(|&key| ctx.find_box(key).is_some()))
        .unwrap_or(ctx.root_box().key)
}

/// Maps a whole slide: background first, then the primitives of either the
/// container or, for a complex background, its content wrapper.
pub fn map_slide(ctx: &RenderContext, options: &ExportOptions) -> Result<MappedSlide, ExportError> {
    let container = find_container(ctx, &options.container_class);
    let origin = ctx
        .rect(container)
        .ok_or(ExportError::MissingElement { slide: ctx.slide_index(), class: options.container_class.clone() })?;
    let plan = ctx.find_box(container).map(|b| SlideBackground::classify(&b.style)).unwrap_or(SlideBackground::None);
    let mapper = Mapper::new(ctx, origin, options.raster_scale());

    let mapped = match plan {
        SlideBackground::Rasterized => {
            let content = ctx.find_by_class(&options.content_class).filter(|&key| ctx.find_box(key).is_some()).ok_or(
                ExportError::MissingElement { slide: ctx.slide_index(), class: options.content_class.clone() },
            )?;
            let paint = PaintOptions { scale: options.raster_scale(), exclude: Some(content), ..Default::default() };
            let picture = rasterize(ctx, container, &paint, ImageFormat::Png)?;
            MappedSlide { background: MappedBackground::Picture(picture), primitives: mapper.map_box(content) }
        }
        SlideBackground::Solid(color) => {
            MappedSlide { background: MappedBackground::Solid(color), primitives: mapper.map_root(container) }
        }
        SlideBackground::None => MappedSlide { background: MappedBackground::None, primitives: mapper.map_root(container) },
    };
    log::debug!("Slide {} mapped to {} primitives", ctx.slide_index(), mapped.primitives.len());
    Ok(mapped)
}

pub struct Mapper<'a> {
    ctx: &'a RenderContext,
    origin: Rect,
    scale: f32,
    primitives: Vec<Primitive>,
    /// List items whose marker was already given to a paragraph.
    marked: BTreeSet<NodeId>,
}

impl<'a> Mapper<'a> {
    pub fn new(ctx: &'a RenderContext, origin: Rect, scale: f32) -> Self {
        Self { ctx, origin, scale, primitives: Vec::new(), marked: BTreeSet::new() }
    }

    /// Maps `key` and its subtree.
    pub fn map_box(mut self, key: NodeKey) -> Vec<Primitive> {
        if let Some(b) = self.ctx.find_box(key) {
            self.visit(b);
        }
        self.primitives
    }

    /// Maps the slide root: its border but not its fill, then its children,
    /// or its own runs when the root holds only inline content.
    pub fn map_root(mut self, key: NodeKey) -> Vec<Primitive> {
        if let Some(b) = self.ctx.find_box(key) {
            if !self.skipped(b) {
                self.decorations(b, false);
                if let BoxContent::Text(_) = &b.content {
                    self.text_runs(b);
                } else {
                    for child in &b.children {
                        self.visit(child);
                    }
                }
            }
        }
        self.primitives
    }

    fn visit(&mut self, b: &LayoutBox) {
        if self.skipped(b) {
            return;
        }
        let element = self.ctx.element(b.key);
        if let Some(el) = element {
            if el.name() == "canvas" {
                self.map_canvas(b, el);
                return;
            }
            // Before text, so ligature icon names never become runs.
            if is_icon(el, &b.style) {
                self.map_raster(b, description(el));
                return;
            }
            if matches!(el.name(), "img" | "svg") {
                self.map_raster(b, description(el));
                return;
            }
        }

        match &b.content {
            BoxContent::Text(_) => self.map_text(b),
            BoxContent::Replaced { .. } => {
                let label = element.map(description).unwrap_or_default();
                self.map_raster(b, label);
            }
            BoxContent::Container { .. } => {
                self.decorations(b, true);
                for child in &b.children {
                    self.visit(child);
                }
            }
        }
    }

    fn skipped(&self, b: &LayoutBox) -> bool {
        if b.style.visibility != Visibility::Visible {
            return true;
        }
        let Some(rect) = self.ctx.rect(b.key) else { return true };
        if rect.width <= 0.0 || rect.height <= 0.0 {
            return true;
        }
        self.ctx
            .element(b.key)
            .and_then(|el| el.get_attr("data-decorative"))
            .is_some_and(|v| !v.eq_ignore_ascii_case("false"))
    }

    fn frame(&self, key: NodeKey) -> Option<Rect> {
        self.ctx.rect(key).map(|r| r.relative_to(&self.origin))
    }

    fn map_text(&mut self, b: &LayoutBox) {
        if !self.ctx.is_anonymous(b.key) {
            self.decorations(b, true);
        }
        self.text_runs(b);
    }

    fn text_runs(&mut self, b: &LayoutBox) {
        let (Some(layout), Some(geometry), Some(frame)) =
            (self.ctx.text(b.key), self.ctx.layout().geometry(b.key), self.frame(b.key))
        else {
            return;
        };
        let owner = self.ctx.owner(b.key);
        let bullet = if self.marked.contains(&owner) {
            None
        } else {
            self.ctx.list_marker(owner)
        };
        if let Some(text) =
            text::text_primitive(&b.style, layout, frame, geometry.content_box, geometry.border_box, bullet.clone())
        {
            if bullet.is_some() {
                self.marked.insert(owner);
            }
            self.primitives.push(Primitive::Text(text));
        }
    }

    /// Background and border of a box. A gradient or image background is
    /// rasterized on its own; a fill and uniform border become one shape;
    /// uneven borders become one strip per visible side.
    fn decorations(&mut self, b: &LayoutBox, with_fill: bool) {
        let Some(frame) = self.frame(b.key) else { return };
        let style = &b.style;

        if with_fill && style.background_image.is_some() {
            let paint = PaintOptions { scale: self.scale, background_only: true, ..Default::default() };
            match rasterize(self.ctx, b.key, &paint, ImageFormat::Png) {
                Ok(image) => {
                    self.primitives.push(Primitive::Image(ImagePrimitive {
                        frame,
                        image,
                        description: "background".to_string(),
                    }));
                }
                Err(e) => log::warn!("Skipped background of node {}: {}", b.key, e),
            }
            self.border_strips(style, frame);
            return;
        }

        let fill = with_fill.then(|| faded(style.background_color, style.opacity)).flatten();
        let uniform = uniform_border(style);
        let radius = style.border_radius.resolve(frame.width.min(frame.height)).unwrap_or(0.0).max(0.0);
        if fill.is_some() || uniform.is_some() {
            self.primitives.push(Primitive::Shape(ShapePrimitive {
                frame,
                fill,
                border: uniform.map(|side| ShapeBorder {
                    color: side.color,
                    width_px: side.width,
                    style: side.style,
                }),
                radius_px: radius,
            }));
        }
        if uniform.is_none() {
            self.border_strips(style, frame);
        }
    }

    fn border_strips(&mut self, style: &ComputedStyle, frame: Rect) {
        let b = &style.border;
        let strips = [
            (b.top, Rect::new(frame.x, frame.y, frame.width, b.top.width)),
            (b.right, Rect::new(frame.right() - b.right.width, frame.y, b.right.width, frame.height)),
            (b.bottom, Rect::new(frame.x, frame.bottom() - b.bottom.width, frame.width, b.bottom.width)),
            (b.left, Rect::new(frame.x, frame.y, b.left.width, frame.height)),
        ];
        for (side, rect) in strips {
            if side.is_visible() {
                self.primitives.push(Primitive::Shape(ShapePrimitive {
                    frame: rect,
                    fill: faded(side.color, style.opacity),
                    border: None,
                    radius_px: 0.0,
                }));
            }
        }
    }

    fn map_canvas(&mut self, b: &LayoutBox, el: ElementRef<'_>) {
        let Some(frame) = self.frame(b.key) else { return };
        let chart_key = canvas_chart_key(el);
        match choose_rendition(self.ctx.charts().get(&chart_key)) {
            Rendition::Native(chart) => {
                self.primitives.push(Primitive::Chart(ChartPrimitive { frame, chart }));
            }
            Rendition::Rasterized(RasterSource::Snapshot(snapshot)) => {
                match render_chart(snapshot, frame.size(), self.scale, self.ctx.fonts()) {
                    Ok(image) => self.primitives.push(Primitive::Image(ImagePrimitive {
                        frame,
                        image,
                        description: format!("{} chart", snapshot.kind),
                    })),
                    Err(e) => log::warn!("Skipped chart '{}': {}", chart_key, e),
                }
            }
            Rendition::Rasterized(RasterSource::CanvasBox) => self.map_raster(b, description(el)),
        }
    }

    fn map_raster(&mut self, b: &LayoutBox, description: String) {
        let Some(frame) = self.frame(b.key) else { return };
        let paint = PaintOptions { scale: self.scale, ..Default::default() };
        match rasterize(self.ctx, b.key, &paint, ImageFormat::Png) {
            Ok(image) => self.primitives.push(Primitive::Image(ImagePrimitive { frame, image, description })),
            Err(e) => log::warn!("Skipped node {} of slide {}: {}", b.key, self.ctx.slide_index(), e),
        }
    }
}

fn description(el: ElementRef<'_>) -> String {
    el.get_attr("alt")
        .or_else(|| el.get_attr("aria-label"))
        .or_else(|| el.get_attr("title"))
        .map(str::to_string)
        .unwrap_or_else(|| el.name().to_string())
}

/// The border when all four sides match and are visible.
fn uniform_border(style: &ComputedStyle) -> Option<BorderSide> {
    let b = &style.border;
    let sides = [b.top, b.right, b.bottom, b.left];
    (sides.iter().all(BorderSide::is_visible) && sides.iter().all(|s| *s == b.top)).then_some(b.top)
}

fn faded(color: Color, opacity: f32) -> Option<Color> {
    let color = color.with_alpha(color.a * opacity.clamp(0.0, 1.0));
    (!color.is_transparent()).then_some(color)
}
