use thiserror::Error;
use vellum_host::HostError;
use vellum_raster::RasterError;
use vellum_render_pdf::PdfError;
use vellum_render_pptx::PptxError;

use crate::sink::SinkError;

/// Everything that can end an export.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Render context failed: {0}")]
    Host(#[from] HostError),

    #[error("Slide {slide}: no element with class '{class}'")]
    MissingElement { slide: usize, class: String },

    #[error("Rasterization failed: {0}")]
    Raster(#[from] RasterError),

    #[error("Presentation assembly failed: {0}")]
    Pptx(#[from] PptxError),

    #[error("PDF assembly failed: {0}")]
    Pdf(#[from] PdfError),

    #[error("Saving the document failed: {0}")]
    Sink(#[from] SinkError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No slides to export")]
    NoSlides,
}
