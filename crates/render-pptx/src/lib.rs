//! Presentation package writer.
//!
//! Builds a `.pptx` from a [`Presentation`] model whose geometry is already
//! in EMU. Text boxes, rectangles, pictures and charts are written as native
//! DrawingML so they stay editable.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PptxError {
    #[error("XML formatting failed: {0}")]
    Xml(#[from] std::fmt::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Presentation has no slides")]
    Empty,
}

pub type Result<T> = std::result::Result<T, PptxError>;

pub mod chart;
pub mod model;
pub mod package;
pub mod shapes;
mod template;

pub use model::{
    Bullet, ChartFrame, Frame, LineDash, LineStyle, Paragraph, Picture, PictureFormat, Presentation, RectShape, Shape,
    SlideBackground, SlideModel, TextAlign, TextBox, TextRun,
};
pub use package::write_package;
