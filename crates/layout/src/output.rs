//! Layout results in document space (CSS pixels, origin at the viewport's top left).

use crate::text::InlineRun;
use crate::tree::NodeKey;
use std::collections::HashMap;
use vellum_types::Rect;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxGeometry {
    pub border_box: Rect,
    pub content_box: Rect,
}

/// A fragment of one inline run placed on a line.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedFragment {
    pub run: usize,
    pub text: String,
    pub x: f32,
    pub baseline: f32,
    pub width: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub rect: Rect,
    pub baseline: f32,
    pub fragments: Vec<PlacedFragment>,
}

#[derive(Debug, Clone)]
pub struct TextLayout {
    pub runs: Vec<InlineRun>,
    pub lines: Vec<PlacedLine>,
}

impl TextLayout {
    pub fn fragments(&self) -> impl Iterator<Item = &PlacedFragment> {
        self.lines.iter().flat_map(|l| l.fragments.iter())
    }
}

#[derive(Debug, Clone, Default)]
pub struct LayoutOutput {
    boxes: HashMap<NodeKey, BoxGeometry>,
    text: HashMap<NodeKey, TextLayout>,
    order: Vec<NodeKey>,
}

impl LayoutOutput {
    pub(crate) fn insert_box(&mut self, key: NodeKey, geometry: BoxGeometry) {
        if self.boxes.insert(key, geometry).is_none() {
            self.order.push(key);
        }
    }

    pub(crate) fn insert_text(&mut self, key: NodeKey, text: TextLayout) {
        self.text.insert(key, text);
    }

    /// Border box of the node, if it generated one.
    pub fn rect(&self, key: NodeKey) -> Option<Rect> {
        self.boxes.get(&key).map(|g| g.border_box)
    }

    pub fn geometry(&self, key: NodeKey) -> Option<&BoxGeometry> {
        self.boxes.get(&key)
    }

    pub fn text(&self, key: NodeKey) -> Option<&TextLayout> {
        self.text.get(&key)
    }

    /// Keys in tree order.
    pub fn keys(&self) -> &[NodeKey] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
