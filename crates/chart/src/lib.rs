//! Chart configurations captured per render context, and their translation
//! into native presentation charts.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Invalid chart configuration: {0}")]
    InvalidConfig(String),
    #[error("Chart type '{0}' has no native equivalent")]
    Unsupported(String),
    #[error("Chart has no data")]
    NoData,
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub mod native;
pub mod registry;
pub mod rendition;
pub mod snapshot;
pub mod svg;

pub use native::{translate, NativeChart, NativeChartKind, NativeSeries};
pub use registry::ChartRegistry;
pub use rendition::{choose_rendition, RasterSource, Rendition};
pub use snapshot::{ChartSnapshot, DatasetSnapshot, ScatterPoint};
