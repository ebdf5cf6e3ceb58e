use serde::{Deserialize, Serialize};
use vellum_types::Color;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
#[derive(Default)]
pub enum BorderStyle {
    #[default]
    None,
    Solid,
    Dashed,
    Dotted,
    Double,
}

/// One side of a border. Width is in CSS pixels.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct BorderSide {
    pub width: f32,
    pub style: BorderStyle,
    pub color: Color,
}

impl Default for BorderSide {
    fn default() -> Self {
        Self { width: 0.0, style: BorderStyle::None, color: Color::BLACK }
    }
}

impl BorderSide {
    /// Painted at all: has a style, a width and a non-transparent color.
    pub fn is_visible(&self) -> bool {
        self.style != BorderStyle::None && self.width > 0.0 && !self.color.is_transparent()
    }

    /// Width that takes part in layout. `border-style: none` removes it.
    pub fn used_width(&self) -> f32 {
        if self.style == BorderStyle::None { 0.0 } else { self.width }
    }
}
