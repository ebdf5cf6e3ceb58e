//! PDF assembly for rasterized slides.
//!
//! Every page holds one JPEG, fitted inside the page margins, plus an optional
//! `i / N` header and title footer set in Helvetica.

mod error;
mod page;
mod writer;

pub use error::PdfError;
pub use page::{Orientation, PageFormat, PageSetup};
pub use writer::{PdfPage, SlidePdfWriter};
