//! Box generation: turns the styled DOM into the layout engine's box tree.
//!
//! Element boxes use the element's node id as their key. Runs of inline
//! content that sit next to block-level siblings are wrapped in anonymous
//! boxes whose keys start after the last node id.

use crate::cascade::StyleMap;
use crate::dom::{Document, ElementRef, NodeData, NodeId};
use std::collections::BTreeMap;
use std::io::Cursor;
use std::sync::Arc;
use vellum_layout::{InlineRun, LayoutBox, NodeKey};
use vellum_resource::{fetch, ResourceProvider};
use vellum_style::{ComputedStyle, Display, WhiteSpace};
use vellum_types::Size;

/// Default size of canvases, videos and unsized SVG.
const DEFAULT_OBJECT_SIZE: Size = Size { width: 300.0, height: 150.0 };

const ICON_FONT_FAMILIES: [&str; 5] =
    ["font awesome", "fontawesome", "material icons", "material symbols", "bootstrap-icons"];

#[derive(Debug, Clone)]
pub struct BoxTree {
    pub root: LayoutBox,
    /// Anonymous box key to the element that holds its content.
    pub anonymous: BTreeMap<NodeKey, NodeId>,
}

/// Icon-font glyph: an `<i>` or `<span>` carrying an icon class or set in an
/// icon font.
pub fn is_icon(element: ElementRef<'_>, style: &ComputedStyle) -> bool {
    if !matches!(element.name(), "i" | "span") {
        return false;
    }
    let icon_class = element.classes().any(|c| {
        matches!(c, "fa" | "fas" | "far" | "fab" | "fal" | "fad" | "bi")
            || c.starts_with("fa-")
            || c.starts_with("bi-")
            || c.starts_with("material-")
            || c == "icon"
            || c.starts_with("icon-")
    });
    icon_class
        || style.font_family.first().is_some_and(|family| {
            let family = family.to_ascii_lowercase();
            ICON_FONT_FAMILIES.iter().any(|icon| family.contains(icon))
        })
}

pub fn is_replaced(element: ElementRef<'_>) -> bool {
    matches!(element.name(), "img" | "canvas" | "svg" | "video" | "iframe" | "object" | "embed")
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Item {
    Text(NodeId),
    /// An inline element holding only text and other such elements.
    Inline(NodeId),
    /// Inline-level but laid out as one box.
    Atomic(NodeId),
    Block(NodeId),
}

impl Item {
    fn is_inline_content(&self) -> bool {
        matches!(self, Item::Text(_) | Item::Inline(_))
    }
}

pub struct BoxBuilder<'a> {
    doc: &'a Document,
    styles: &'a StyleMap,
    resources: &'a dyn ResourceProvider,
    next_anonymous: NodeKey,
    anonymous: BTreeMap<NodeKey, NodeId>,
}

impl<'a> BoxBuilder<'a> {
    pub fn new(doc: &'a Document, styles: &'a StyleMap, resources: &'a dyn ResourceProvider) -> Self {
        Self { doc, styles, resources, next_anonymous: doc.len(), anonymous: BTreeMap::new() }
    }

    /// Builds the tree from the root element. Returns `None` when the
    /// document has no element or the root is not rendered.
    pub fn build(mut self) -> Option<BoxTree> {
        let root = self.doc.elements().next()?;
        let root = self.element_box(root)?;
        log::debug!("Generated {} boxes ({} anonymous)", root.count(), self.anonymous.len());
        Some(BoxTree { root, anonymous: self.anonymous })
    }

    fn style(&self, id: NodeId) -> Option<&'a Arc<ComputedStyle>> {
        self.styles.get(id).and_then(Option::as_ref)
    }

    fn element_box(&mut self, element: ElementRef<'a>) -> Option<LayoutBox> {
        let id = element.id();
        let style = self.style(id)?.clone();
        if style.display == Display::None {
            return None;
        }

        if is_replaced(element) {
            let intrinsic = self.intrinsic_size(element);
            return Some(LayoutBox::replaced(id, style, intrinsic));
        }
        if is_icon(element, &style) {
            let side = style.font_size;
            return Some(LayoutBox::replaced(id, style, Size::new(side, side)));
        }

        let items = self.items(id);
        let flex = style.display.is_flex_container();

        if !flex && items.iter().all(Item::is_inline_content) {
            let runs = self.runs(&items);
            return Some(if runs.is_empty() {
                LayoutBox::container(id, style, Vec::new())
            } else {
                LayoutBox::text(id, style, runs)
            });
        }

        let has_block = items.iter().any(|i| matches!(i, Item::Block(_)));
        let mut children = Vec::new();
        let mut inline_flow = false;
        let mut segment: Vec<Item> = Vec::new();

        for item in items {
            match item {
                Item::Block(child) => {
                    self.flush_segment(id, &style, &mut segment, has_block || flex, &mut children);
                    if let Some(b) = self.doc.element(child).and_then(|e| self.element_box(e)) {
                        children.push(b);
                    }
                }
                // Flex items are blockified one by one; text between them
                // still gets an anonymous box.
                Item::Inline(child) | Item::Atomic(child) if flex => {
                    self.flush_segment(id, &style, &mut segment, true, &mut children);
                    if let Some(b) = self.doc.element(child).and_then(|e| self.element_box(e)) {
                        children.push(b);
                    }
                }
                other => segment.push(other),
            }
        }
        if !has_block && !flex && !segment.is_empty() {
            // Only inline-level content with atomic boxes among it.
            inline_flow = true;
            let segment = std::mem::take(&mut segment);
            self.inline_row(id, &style, &segment, &mut children);
        } else {
            self.flush_segment(id, &style, &mut segment, true, &mut children);
        }

        let container = LayoutBox::container(id, style, children);
        Some(if inline_flow { container.with_inline_flow() } else { container })
    }

    /// Emits the pending inline segment. Inside a block-level sequence a
    /// segment with atomic boxes gets its own anonymous inline-flow wrapper.
    fn flush_segment(
        &mut self,
        owner: NodeId,
        style: &Arc<ComputedStyle>,
        segment: &mut Vec<Item>,
        wrap: bool,
        out: &mut Vec<LayoutBox>,
    ) {
        if segment.is_empty() {
            return;
        }
        let segment = std::mem::take(segment);
        if segment.iter().all(Item::is_inline_content) {
            if let Some(b) = self.anonymous_text(owner, style, &segment) {
                out.push(b);
            }
        } else if wrap {
            let mut row = Vec::new();
            self.inline_row(owner, style, &segment, &mut row);
            let key = self.anonymous_key(owner);
            out.push(LayoutBox::container(key, anonymous_style(style), row).with_inline_flow());
        } else {
            self.inline_row(owner, style, &segment, out);
        }
    }

    /// Children of an inline-flow row: atomic boxes, with the text between
    /// them in anonymous boxes.
    fn inline_row(&mut self, owner: NodeId, style: &Arc<ComputedStyle>, segment: &[Item], out: &mut Vec<LayoutBox>) {
        let mut text: Vec<Item> = Vec::new();
        for &item in segment {
            match item {
                Item::Atomic(child) | Item::Block(child) => {
                    if let Some(b) = self.anonymous_text(owner, style, &text) {
                        out.push(b);
                    }
                    text.clear();
                    if let Some(b) = self.doc.element(child).and_then(|e| self.element_box(e)) {
                        out.push(b);
                    }
                }
                other => text.push(other),
            }
        }
        if let Some(b) = self.anonymous_text(owner, style, &text) {
            out.push(b);
        }
    }

    fn anonymous_text(&mut self, owner: NodeId, style: &Arc<ComputedStyle>, items: &[Item]) -> Option<LayoutBox> {
        let runs = self.runs(items);
        if runs.is_empty() {
            return None;
        }
        let key = self.anonymous_key(owner);
        Some(LayoutBox::text(key, anonymous_style(style), runs))
    }

    fn anonymous_key(&mut self, owner: NodeId) -> NodeKey {
        let key = self.next_anonymous;
        self.next_anonymous += 1;
        self.anonymous.insert(key, owner);
        key
    }

    /// Classifies the rendered children of `id`, looking through `display: contents`.
    fn items(&self, id: NodeId) -> Vec<Item> {
        let mut items = Vec::new();
        self.collect_items(id, &mut items);
        items
    }

    fn collect_items(&self, id: NodeId, items: &mut Vec<Item>) {
        for &child in self.doc.children(id) {
            match self.doc.node(child).map(|n| &n.data) {
                Some(NodeData::Text(_)) => items.push(Item::Text(child)),
                Some(NodeData::Element(_)) => {
                    let (Some(element), Some(style)) = (self.doc.element(child), self.style(child)) else {
                        continue;
                    };
                    match style.display {
                        Display::None => {}
                        Display::Contents => self.collect_items(child, items),
                        _ if style.position.is_out_of_flow() => items.push(Item::Block(child)),
                        Display::Inline if is_replaced(element) || is_icon(element, style) => {
                            items.push(Item::Atomic(child))
                        }
                        Display::Inline if self.is_pure_inline(child) => items.push(Item::Inline(child)),
                        Display::Inline | Display::InlineBlock | Display::InlineFlex => {
                            items.push(Item::Atomic(child))
                        }
                        _ => items.push(Item::Block(child)),
                    }
                }
                _ => {}
            }
        }
    }

    fn is_pure_inline(&self, id: NodeId) -> bool {
        self.items(id).iter().all(Item::is_inline_content)
    }

    fn runs(&self, items: &[Item]) -> Vec<InlineRun> {
        let mut runs = Vec::new();
        for item in items {
            self.collect_runs(*item, &mut runs);
        }
        finish_runs(runs)
    }

    fn collect_runs(&self, item: Item, runs: &mut Vec<InlineRun>) {
        match item {
            Item::Text(id) => {
                let Some(node) = self.doc.node(id) else { return };
                let (NodeData::Text(text), Some(parent)) = (&node.data, node.parent) else {
                    return;
                };
                let Some(style) = self.style(parent) else { return };
                let text = style.text_transform.apply(&process_white_space(text, style.white_space));
                if !text.is_empty() {
                    runs.push(InlineRun::new(text, style.clone()));
                }
            }
            Item::Inline(id) => {
                let Some(style) = self.style(id) else { return };
                if self.doc.element(id).is_some_and(|e| e.name() == "br") {
                    runs.push(InlineRun::new("\n", style.clone()));
                    return;
                }
                for child in self.items(id) {
                    self.collect_runs(child, runs);
                }
            }
            Item::Atomic(_) | Item::Block(_) => {}
        }
    }

    fn intrinsic_size(&self, element: ElementRef<'_>) -> Size {
        let attr_px = |name: &str| {
            element
                .get_attr(name)
                .and_then(|v| v.trim().trim_end_matches("px").parse::<f32>().ok())
                .filter(|v| *v >= 0.0)
        };
        let declared = (attr_px("width"), attr_px("height"));
        let natural = match element.name() {
            "img" => element
                .get_attr("src")
                .and_then(|src| self.image_size(src))
                .unwrap_or_else(Size::zero),
            "svg" => svg_size(element).unwrap_or(DEFAULT_OBJECT_SIZE),
            _ => DEFAULT_OBJECT_SIZE,
        };
        match declared {
            (Some(w), Some(h)) => Size::new(w, h),
            (Some(w), None) if natural.height > 0.0 => Size::new(w, w / natural.aspect_ratio()),
            (None, Some(h)) if natural.height > 0.0 => Size::new(h * natural.aspect_ratio(), h),
            (Some(w), None) => Size::new(w, natural.height),
            (None, Some(h)) => Size::new(natural.width, h),
            (None, None) => natural,
        }
    }

    fn image_size(&self, src: &str) -> Option<Size> {
        let data = match fetch(self.resources, src) {
            Ok(data) => data,
            Err(e) => {
                log::warn!("Image '{}' unavailable: {}", abbreviate(src), e);
                return None;
            }
        };
        image_dimensions(&data)
    }
}

/// Natural size of encoded image data. SVG sources are read from their root
/// element's attributes.
pub fn image_dimensions(data: &[u8]) -> Option<Size> {
    if let Ok(text) = std::str::from_utf8(data)
        && text.contains("<svg")
    {
        let doc = Document::parse(text);
        let svg = doc.elements().find(|e| e.name() == "svg")?;
        return svg_size(svg);
    }
    let reader = image::ImageReader::new(Cursor::new(data)).with_guessed_format().ok()?;
    let (w, h) = reader.into_dimensions().ok()?;
    Some(Size::new(w as f32, h as f32))
}

fn svg_size(svg: ElementRef<'_>) -> Option<Size> {
    let px = |name: &str| {
        svg.get_attr(name)
            .and_then(|v| v.trim().trim_end_matches("px").parse::<f32>().ok())
    };
    let view_box: Option<Vec<f32>> = svg.get_attr("viewBox").or_else(|| svg.get_attr("viewbox")).map(|v| {
        v.split(|c: char| c == ',' || c.is_whitespace())
            .filter_map(|p| p.parse().ok())
            .collect()
    });
    let view_size = view_box.filter(|v| v.len() == 4).map(|v| Size::new(v[2], v[3]));
    match (px("width"), px("height"), view_size) {
        (Some(w), Some(h), _) => Some(Size::new(w, h)),
        (Some(w), None, Some(v)) if v.width > 0.0 => Some(Size::new(w, w * v.height / v.width)),
        (None, Some(h), Some(v)) if v.height > 0.0 => Some(Size::new(h * v.width / v.height, h)),
        (None, None, Some(v)) => Some(v),
        _ => None,
    }
}

fn anonymous_style(parent: &ComputedStyle) -> Arc<ComputedStyle> {
    Arc::new(ComputedStyle { display: Display::Block, ..ComputedStyle::inherit_from(parent) })
}

/// Applies `white-space` to one text node.
fn process_white_space(text: &str, white_space: WhiteSpace) -> String {
    if !white_space.collapses_spaces() {
        return text.replace("\r\n", "\n").replace('\t', "    ");
    }
    let keep_newlines = white_space.preserves_newlines();
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for c in text.chars() {
        if c == '\n' && keep_newlines {
            // Spaces around a preserved newline collapse away.
            pending_space = false;
            out.push('\n');
        } else if c.is_ascii_whitespace() {
            pending_space = true;
        } else {
            if pending_space && !out.ends_with('\n') {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        }
    }
    if pending_space && !out.ends_with('\n') {
        out.push(' ');
    }
    out
}

/// Collapses spaces across run boundaries and trims the block's edges.
fn finish_runs(runs: Vec<InlineRun>) -> Vec<InlineRun> {
    let mut out: Vec<InlineRun> = Vec::with_capacity(runs.len());
    // True at the start of the block and after a space or a hard break.
    let mut at_space = true;
    for mut run in runs {
        let collapsible = run.style.white_space.collapses_spaces();
        if run.is_line_break() {
            trim_trailing_space(&mut out);
            at_space = true;
            out.push(run);
            continue;
        }
        if collapsible && at_space {
            run.text = run.text.trim_start_matches(' ').to_string();
        }
        if run.text.is_empty() {
            continue;
        }
        at_space = collapsible && (run.text.ends_with(' ') || run.text.ends_with('\n'));
        out.push(run);
    }
    trim_trailing_space(&mut out);
    while out.last().is_some_and(InlineRun::is_line_break) {
        // A trailing <br> adds no line.
        out.pop();
    }
    out
}

fn trim_trailing_space(runs: &mut Vec<InlineRun>) {
    while let Some(last) = runs.last_mut() {
        if !last.style.white_space.collapses_spaces() || last.is_line_break() {
            return;
        }
        let trimmed = last.text.trim_end_matches(' ').len();
        last.text.truncate(trimmed);
        if !last.text.is_empty() {
            return;
        }
        runs.pop();
    }
}

pub(crate) fn abbreviate(url: &str) -> String {
    if url.len() > 64 {
        format!("{}...", url.chars().take(60).collect::<String>())
    } else {
        url.to_string()
    }
}
