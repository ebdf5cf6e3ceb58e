//! Inline text: runs, shaping and line breaking.

pub mod shaper;
pub mod wrapper;

pub use shaper::{measure_runs, MeasuredText, Piece, PieceKind, RunMetrics};
pub use wrapper::{break_lines, Fragment, Line};

use std::sync::Arc;
use vellum_style::ComputedStyle;

/// Contiguous text sharing one computed style. White space is already
/// collapsed and `text-transform` applied; `'\n'` marks a hard break.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineRun {
    pub text: String,
    pub style: Arc<ComputedStyle>,
}

impl InlineRun {
    pub fn new(text: impl Into<String>, style: Arc<ComputedStyle>) -> Self {
        Self { text: text.into(), style }
    }

    pub fn is_line_break(&self) -> bool {
        self.text == "\n"
    }
}
