//! Exports HTML slide decks to editable presentations and flat PDFs.
//!
//! ```ignore
//! use std::sync::Arc;
//! use vellum::{ExportOptions, Exporter, FileSink, SlideRecord};
//!
//! let exporter = Exporter::builder()
//!     .with_resource_dir("assets")
//!     .with_sink(Arc::new(FileSink::new("out")))
//!     .build()?;
//!
//! let slides = vec![SlideRecord::new(0, "<div class='slide-container'><h1>Q3</h1></div>")];
//! let outcome = exporter.export_pptx(&slides, &ExportOptions::default()).await;
//! assert!(outcome.success);
//! ```

pub mod config;
pub mod error;
pub mod mapper;
pub mod pipeline;
pub mod sink;

pub use config::{CanvasSize, ExportOptions, PdfOptions};
pub use error::ExportError;
pub use pipeline::{ExportOutcome, Exporter, ExporterBuilder};
pub use sink::{FileSink, MemorySink, OutputSink, SinkError};

pub use vellum_host::{HeadlessHost, HostConfig, HostError, RenderContext, RenderHost};
pub use vellum_render_pdf::{Orientation, PageFormat};
pub use vellum_types::SlideRecord;
