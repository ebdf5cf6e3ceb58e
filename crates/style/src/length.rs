//! Lengths and per-side values.
use serde::{Deserialize, Serialize};

/// A CSS length as it leaves the parser.
///
/// The cascade resolves `Em`, `Rem`, `Vw` and `Vh` to `Px` when it computes
/// an element's style, so layout only ever sees `Px`, `Percent` and `Auto`.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
#[derive(Default)]
pub enum Length {
    Px(f32),
    Em(f32),
    Rem(f32),
    Vw(f32),
    Vh(f32),
    Percent(f32),
    #[default]
    Auto,
}

/// Font and viewport metrics needed to resolve relative lengths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LengthContext {
    pub font_size: f32,
    pub root_font_size: f32,
    pub viewport_width: f32,
    pub viewport_height: f32,
}

impl Length {
    pub fn zero() -> Self {
        Length::Px(0.0)
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, Length::Auto)
    }

    /// Replaces font- and viewport-relative units with pixels.
    pub fn absolutize(self, ctx: &LengthContext) -> Length {
        match self {
            Length::Em(v) => Length::Px(v * ctx.font_size),
            Length::Rem(v) => Length::Px(v * ctx.root_font_size),
            Length::Vw(v) => Length::Px(v * ctx.viewport_width / 100.0),
            Length::Vh(v) => Length::Px(v * ctx.viewport_height / 100.0),
            other => other,
        }
    }

    /// Pixel value against a containing-block size; `Auto` yields `None`.
    pub fn resolve(&self, basis: f32) -> Option<f32> {
        match self {
            Length::Px(v) => Some(*v),
            Length::Percent(p) => Some(basis * p / 100.0),
            Length::Auto => None,
            Length::Em(_) | Length::Rem(_) | Length::Vw(_) | Length::Vh(_) => None,
        }
    }

    /// Pixel value when no containing block is known.
    pub fn px_or_zero(&self) -> f32 {
        match self {
            Length::Px(v) => *v,
            _ => 0.0,
        }
    }
}

/// Per-side values in CSS order: top, right, bottom, left.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges<T> {
    pub top: T,
    pub right: T,
    pub bottom: T,
    pub left: T,
}

impl<T: Copy> Edges<T> {
    pub fn all(value: T) -> Self {
        Self { top: value, right: value, bottom: value, left: value }
    }

    /// Expands a 1-4 value shorthand.
    pub fn from_shorthand(parts: &[T]) -> Option<Self> {
        match *parts {
            [a] => Some(Self::all(a)),
            [v, h] => Some(Self { top: v, right: h, bottom: v, left: h }),
            [t, h, b] => Some(Self { top: t, right: h, bottom: b, left: h }),
            [t, r, b, l] => Some(Self { top: t, right: r, bottom: b, left: l }),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl Fn(T) -> U) -> Edges<U> {
        Edges { top: f(self.top), right: f(self.right), bottom: f(self.bottom), left: f(self.left) }
    }
}

impl Edges<f32> {
    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

/// `line-height`: `normal` renders at 1.2 times the font size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[derive(Default)]
pub enum LineHeight {
    #[default]
    Normal,
    Multiple(f32),
    Px(f32),
}

impl LineHeight {
    pub const NORMAL_FACTOR: f32 = 1.2;

    pub fn to_px(&self, font_size: f32) -> f32 {
        match self {
            LineHeight::Normal => font_size * Self::NORMAL_FACTOR,
            LineHeight::Multiple(m) => font_size * m,
            LineHeight::Px(px) => *px,
        }
    }

    /// Line spacing as a multiple of the font size, the form presentation
    /// paragraphs carry.
    pub fn as_multiple(&self, font_size: f32) -> f32 {
        match self {
            LineHeight::Normal => Self::NORMAL_FACTOR,
            LineHeight::Multiple(m) => *m,
            LineHeight::Px(px) if font_size > 0.0 => px / font_size,
            LineHeight::Px(_) => Self::NORMAL_FACTOR,
        }
    }
}
