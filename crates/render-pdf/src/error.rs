use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Failed to serialize PDF: {0}")]
    Save(String),

    #[error("Page {page} has an empty image ({width}x{height})")]
    EmptyImage { page: usize, width: u32, height: u32 },

    #[error("Margins leave no room on a {width}x{height}pt page")]
    NoPrintableArea { width: f32, height: f32 },

    #[error("Document has no pages")]
    Empty,
}
