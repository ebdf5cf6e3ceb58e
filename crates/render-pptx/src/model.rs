//! The presentation model, in EMU.

use chrono::{DateTime, Utc};
use vellum_chart::NativeChart;
use vellum_types::Color;

/// Position and size in EMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Frame {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

impl Frame {
    pub fn new(x: i64, y: i64, cx: i64, cy: i64) -> Self {
        Self { x, y, cx: cx.max(0), cy: cy.max(0) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl TextAlign {
    pub(crate) fn xml_value(&self) -> &'static str {
        match self {
            TextAlign::Left => "l",
            TextAlign::Center => "ctr",
            TextAlign::Right => "r",
            TextAlign::Justify => "just",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub font: Option<String>,
    pub size_pt: f32,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strike: bool,
    /// `None` leaves the color to the theme.
    pub color: Option<Color>,
}

impl TextRun {
    pub fn new(text: impl Into<String>, size_pt: f32) -> Self {
        Self {
            text: text.into(),
            font: None,
            size_pt,
            bold: false,
            italic: false,
            underline: false,
            strike: false,
            color: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bullet {
    Char(String),
    /// `scheme` is a DrawingML auto-number type such as `arabicPeriod`.
    AutoNumber { scheme: &'static str, start: usize },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Paragraph {
    pub runs: Vec<TextRun>,
    pub align: TextAlign,
    /// Line spacing as a multiple of single spacing.
    pub line_spacing: Option<f32>,
    pub bullet: Option<Bullet>,
}

impl Paragraph {
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextBox {
    pub frame: Frame,
    pub paragraphs: Vec<Paragraph>,
    /// Left, top, right, bottom insets in EMU.
    pub insets: [i64; 4],
    pub wrap: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineDash {
    Solid,
    Dash,
    Dot,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub color: Color,
    pub width: i64,
    pub dash: LineDash,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RectShape {
    pub frame: Frame,
    pub fill: Option<Color>,
    pub line: Option<LineStyle>,
    /// Corner radius in EMU; zero draws a plain rectangle.
    pub corner_radius: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PictureFormat {
    Png,
    Jpeg,
}

impl PictureFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            PictureFormat::Png => "png",
            PictureFormat::Jpeg => "jpeg",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            PictureFormat::Png => "image/png",
            PictureFormat::Jpeg => "image/jpeg",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Picture {
    pub frame: Frame,
    pub data: Vec<u8>,
    pub format: PictureFormat,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartFrame {
    pub frame: Frame,
    pub chart: NativeChart,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Text(TextBox),
    Rect(RectShape),
    Picture(Picture),
    Chart(ChartFrame),
}

impl Shape {
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Text(_) => "text",
            Shape::Rect(_) => "rect",
            Shape::Picture(_) => "picture",
            Shape::Chart(_) => "chart",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SlideBackground {
    #[default]
    None,
    Solid(Color),
    /// Full-bleed picture, stretched to the slide.
    Picture { data: Vec<u8>, format: PictureFormat },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SlideModel {
    pub background: SlideBackground,
    pub shapes: Vec<Shape>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Presentation {
    /// Slide width and height in EMU.
    pub slide_size: (i64, i64),
    pub title: Option<String>,
    pub created: DateTime<Utc>,
    pub slides: Vec<SlideModel>,
}

impl Presentation {
    pub fn new(slide_size: (i64, i64)) -> Self {
        Self { slide_size, title: None, created: Utc::now(), slides: Vec::new() }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn add_slide(&mut self, slide: SlideModel) {
        self.slides.push(slide);
    }
}
