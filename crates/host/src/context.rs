//! The render context: everything one slide's capture needs, owned by that
//! slide alone.

use crate::boxes::BoxTree;
use crate::cascade::StyleMap;
use crate::dom::{Document, ElementRef, NodeId};
use std::collections::BTreeMap;
use std::sync::Arc;
use vellum_chart::ChartRegistry;
use vellum_layout::{FontLibrary, LayoutBox, LayoutOutput, NodeKey, TextLayout};
use vellum_resource::ResourceProvider;
use vellum_style::{ComputedStyle, Display};
use vellum_types::{Rect, Size};

pub struct RenderContext {
    slide_index: usize,
    canvas: Size,
    document: Document,
    styles: StyleMap,
    root: LayoutBox,
    anonymous: BTreeMap<NodeKey, NodeId>,
    layout: LayoutOutput,
    charts: ChartRegistry,
    fonts: FontLibrary,
    resources: Arc<dyn ResourceProvider>,
    closed: bool,
}

impl std::fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderContext")
            .field("slide_index", &self.slide_index)
            .field("canvas", &self.canvas)
            .field("nodes", &self.document.len())
            .field("boxes", &self.layout.len())
            .field("charts", &self.charts.len())
            .finish()
    }
}

impl RenderContext {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        slide_index: usize,
        canvas: Size,
        document: Document,
        styles: StyleMap,
        tree: BoxTree,
        layout: LayoutOutput,
        charts: ChartRegistry,
        fonts: FontLibrary,
        resources: Arc<dyn ResourceProvider>,
    ) -> Self {
        log::debug!(
            "Opened render context for slide {} ({} nodes, {} boxes)",
            slide_index,
            document.len(),
            layout.len()
        );
        Self {
            slide_index,
            canvas,
            document,
            styles,
            root: tree.root,
            anonymous: tree.anonymous,
            layout,
            charts,
            fonts,
            resources,
            closed: false,
        }
    }

    pub fn slide_index(&self) -> usize {
        self.slide_index
    }

    pub fn canvas(&self) -> Size {
        self.canvas
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn root_box(&self) -> &LayoutBox {
        &self.root
    }

    pub fn charts(&self) -> &ChartRegistry {
        &self.charts
    }

    pub fn fonts(&self) -> &FontLibrary {
        &self.fonts
    }

    pub fn resources(&self) -> &dyn ResourceProvider {
        self.resources.as_ref()
    }

    pub fn layout(&self) -> &LayoutOutput {
        &self.layout
    }

    /// The element a box was generated for; `None` for anonymous boxes.
    pub fn element(&self, key: NodeKey) -> Option<ElementRef<'_>> {
        if self.anonymous.contains_key(&key) {
            return None;
        }
        self.document.element(key)
    }

    /// The element owning a box's content: the element itself, or the
    /// parent of an anonymous box.
    pub fn owner(&self, key: NodeKey) -> NodeId {
        self.anonymous.get(&key).copied().unwrap_or(key)
    }

    pub fn is_anonymous(&self, key: NodeKey) -> bool {
        self.anonymous.contains_key(&key)
    }

    pub fn style(&self, node: NodeId) -> Option<&Arc<ComputedStyle>> {
        self.styles.get(node).and_then(Option::as_ref)
    }

    /// Border box in document space (CSS px).
    pub fn rect(&self, key: NodeKey) -> Option<Rect> {
        self.layout.rect(key)
    }

    pub fn text(&self, key: NodeKey) -> Option<&TextLayout> {
        self.layout.text(key)
    }

    /// The box generated for `key`, searched depth first.
    pub fn find_box(&self, key: NodeKey) -> Option<&LayoutBox> {
        fn search(b: &LayoutBox, key: NodeKey) -> Option<&LayoutBox> {
            if b.key == key {
                return Some(b);
            }
            b.children.iter().find_map(|c| search(c, key))
        }
        search(&self.root, key)
    }

    /// Marker text for a list item, numbered among its sibling items and
    /// honoring `<ol start>`. `None` for non-items and `list-style: none`.
    pub fn list_marker(&self, node: NodeId) -> Option<String> {
        let style = self.style(node)?;
        if style.display != Display::ListItem {
            return None;
        }
        let parent = self.document.node(node)?.parent?;
        let start = self
            .document
            .element(parent)
            .and_then(|list| list.get_attr("start"))
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(1);
        let preceding = self
            .document
            .children(parent)
            .iter()
            .take_while(|&&c| c != node)
            .filter(|&&c| self.document.element(c).is_some_and(|e| e.name() == "li"))
            .count();
        style.list_style_type.marker(start + preceding)
    }

    pub fn find_by_class(&self, class: &str) -> Option<NodeId> {
        self.document.find_by_class(class)
    }

    pub fn body(&self) -> Option<NodeId> {
        self.document.body()
    }

    /// Tears the context down. Dropping without closing also releases it,
    /// but is logged as such.
    pub fn close(mut self) {
        self.closed = true;
    }
}

impl Drop for RenderContext {
    fn drop(&mut self) {
        if self.closed {
            log::debug!("Closed render context for slide {}", self.slide_index);
        } else {
            log::debug!("Render context for slide {} dropped without close()", self.slide_index);
        }
    }
}
