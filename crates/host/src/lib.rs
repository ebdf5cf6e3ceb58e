//! Headless render contexts for HTML slides.
//!
//! A [`RenderHost`] turns a slide record into a [`RenderContext`]: the parsed
//! document, computed styles, web fonts, the chart registry and the laid-out
//! box tree, all owned by that one slide.

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HostError {
    #[error("Slide {slide} did not finish loading within {after:?}")]
    Timeout { slide: usize, after: Duration },
    #[error("Slide {0} has no renderable content")]
    EmptyDocument(usize),
    #[error("Layout failed: {0}")]
    Layout(#[from] vellum_layout::LayoutError),
    #[error("Render task failed: {0}")]
    Join(String),
    #[error("{0}")]
    Other(String),
}

pub mod boxes;
pub mod cascade;
pub mod charts;
pub mod context;
pub mod dom;
pub mod fonts;
pub mod host;

pub use boxes::{image_dimensions, is_icon, is_replaced, BoxTree};
pub use charts::canvas_chart_key;
pub use context::RenderContext;
pub use dom::{Document, ElementData, ElementRef, NodeData, NodeId};
pub use host::{build_context, HeadlessHost, HostConfig, RenderHost};
