//! The box tree handed to the layout engine.

use crate::text::InlineRun;
use std::sync::Arc;
use vellum_style::ComputedStyle;
use vellum_types::Size;

/// Identifies the document node a box was generated for.
pub type NodeKey = usize;

#[derive(Debug, Clone)]
pub enum BoxContent {
    /// Block or flex container. `inline_flow` marks a container whose
    /// children are atomic inlines and text, laid out as a wrapping row.
    Container { inline_flow: bool },
    /// An inline formatting context.
    Text(Vec<InlineRun>),
    /// Image, canvas, svg or icon glyph with its natural size.
    Replaced { intrinsic: Size },
}

#[derive(Debug, Clone)]
pub struct LayoutBox {
    pub key: NodeKey,
    pub style: Arc<ComputedStyle>,
    pub content: BoxContent,
    pub children: Vec<LayoutBox>,
}

impl LayoutBox {
    pub fn container(key: NodeKey, style: Arc<ComputedStyle>, children: Vec<LayoutBox>) -> Self {
        Self { key, style, content: BoxContent::Container { inline_flow: false }, children }
    }

    pub fn text(key: NodeKey, style: Arc<ComputedStyle>, runs: Vec<InlineRun>) -> Self {
        Self { key, style, content: BoxContent::Text(runs), children: Vec::new() }
    }

    pub fn replaced(key: NodeKey, style: Arc<ComputedStyle>, intrinsic: Size) -> Self {
        Self { key, style, content: BoxContent::Replaced { intrinsic }, children: Vec::new() }
    }

    pub fn with_inline_flow(mut self) -> Self {
        self.content = BoxContent::Container { inline_flow: true };
        self
    }

    /// Number of boxes in this subtree, itself included.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(LayoutBox::count).sum::<usize>()
    }
}
