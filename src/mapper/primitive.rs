//! Primitives: what one mapping pass extracts from a render context.
//!
//! Frames are CSS pixels relative to the captured container.

use vellum_chart::NativeChart;
use vellum_raster::RasterImage;
use vellum_style::{BorderStyle, TextAlign};
use vellum_types::{Color, Rect};

#[derive(Debug, Clone, PartialEq)]
pub struct TextRunSpec {
    pub text: String,
    /// First family, generic names replaced by a concrete font.
    pub font: Option<String>,
    pub size_pt: f32,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strike: bool,
    /// `None` for transparent text.
    pub color: Option<Color>,
}

impl TextRunSpec {
    pub(crate) fn same_format(&self, other: &TextRunSpec) -> bool {
        self.font == other.font
            && self.size_pt == other.size_pt
            && self.bold == other.bold
            && self.italic == other.italic
            && self.underline == other.underline
            && self.strike == other.strike
            && self.color == other.color
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextParagraph {
    pub runs: Vec<TextRunSpec>,
    /// List marker text, e.g. `•` or `3.`.
    pub bullet: Option<String>,
}

impl TextParagraph {
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextPrimitive {
    pub frame: Rect,
    pub paragraphs: Vec<TextParagraph>,
    pub align: TextAlign,
    /// Multiple of single spacing; `None` for `line-height: normal`.
    pub line_spacing: Option<f32>,
    /// Left, top, right, bottom in CSS pixels.
    pub insets: [f32; 4],
    pub wrap: bool,
}

impl TextPrimitive {
    /// Paragraph texts joined with newlines.
    pub fn text(&self) -> String {
        self.paragraphs.iter().map(TextParagraph::text).collect::<Vec<_>>().join("\n")
    }

    pub fn runs(&self) -> impl Iterator<Item = &TextRunSpec> {
        self.paragraphs.iter().flat_map(|p| p.runs.iter())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeBorder {
    pub color: Color,
    pub width_px: f32,
    pub style: BorderStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapePrimitive {
    pub frame: Rect,
    /// Fill with alpha folded in from `opacity`.
    pub fill: Option<Color>,
    pub border: Option<ShapeBorder>,
    pub radius_px: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImagePrimitive {
    pub frame: Rect,
    pub image: RasterImage,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPrimitive {
    pub frame: Rect,
    pub chart: NativeChart,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Text(TextPrimitive),
    Shape(ShapePrimitive),
    Image(ImagePrimitive),
    Chart(ChartPrimitive),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Text,
    Shape,
    Image,
    Chart,
}

impl Primitive {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Primitive::Text(_) => PrimitiveKind::Text,
            Primitive::Shape(_) => PrimitiveKind::Shape,
            Primitive::Image(_) => PrimitiveKind::Image,
            Primitive::Chart(_) => PrimitiveKind::Chart,
        }
    }

    pub fn frame(&self) -> Rect {
        match self {
            Primitive::Text(p) => p.frame,
            Primitive::Shape(p) => p.frame,
            Primitive::Image(p) => p.frame,
            Primitive::Chart(p) => p.frame,
        }
    }
}
