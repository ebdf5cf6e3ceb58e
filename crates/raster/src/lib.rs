//! Rasterization of render-context subtrees.
//!
//! A subtree is first painted as an SVG document in CSS pixel coordinates,
//! then rendered with resvg against the context's own font database.

use thiserror::Error;
use vellum_layout::NodeKey;

#[derive(Error, Debug)]
pub enum RasterError {
    #[error("Node {0} has no layout box")]
    MissingBox(NodeKey),
    #[error("Nothing to rasterize: {width}x{height}")]
    EmptyArea { width: f32, height: f32 },
    #[error("SVG parsing failed: {0}")]
    Svg(String),
    #[error("Failed to create a {0}x{1} pixmap")]
    Pixmap(u32, u32),
    #[error("{format} encoding failed: {message}")]
    Encode { format: &'static str, message: String },
}

pub mod encode;
pub mod media;
pub mod painter;

pub use encode::{encode, rasterize_svg, ImageFormat, RasterImage};
pub use media::{data_uri, sniff_mime};
pub use painter::{paint_svg, rasterize, render_chart, PaintOptions};
