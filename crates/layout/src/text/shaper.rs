use super::InlineRun;
use crate::fonts::{FontData, FontLibrary};
use rustybuzz::{Feature, UnicodeBuffer};
use std::cell::RefCell;
use std::sync::OnceLock;
use ttf_parser::Tag;
use vellum_style::{ComputedStyle, TextAlign};

// Reuse buffer to avoid allocations in the tight loop
thread_local! {
    static SCRATCH_BUFFER: RefCell<Option<UnicodeBuffer>> = RefCell::new(Some(UnicodeBuffer::new()));
}

/// Advance per character, in em, when no face matches.
const FALLBACK_ADVANCE_EM: f32 = 0.5;
const FALLBACK_ASCENT_EM: f32 = 0.8;
const FALLBACK_DESCENT_EM: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceKind {
    Word,
    Space,
    Break,
}

/// The smallest unit the line breaker moves around.
#[derive(Debug, Clone)]
pub struct Piece {
    pub run: usize,
    pub text: String,
    pub width: f32,
    pub kind: PieceKind,
}

#[derive(Debug, Clone)]
pub struct RunMetrics {
    pub ascent: f32,
    pub descent: f32,
    pub line_height: f32,
    pub font: Option<FontData>,
}

impl RunMetrics {
    /// Distance from the top of the line box to the baseline, with the
    /// leading split evenly above and below the glyphs.
    pub fn baseline_offset(&self) -> f32 {
        (self.line_height - (self.ascent + self.descent)) / 2.0 + self.ascent
    }

    fn for_style(style: &ComputedStyle, fonts: &FontLibrary) -> Self {
        let font = fonts.resolve(&style.font_family, style.font_weight, style.font_style);
        let size = style.font_size;
        let (ascent, descent) = font
            .as_ref()
            .and_then(|f| {
                let face = f.as_face()?;
                let scale = size / face.units_per_em() as f32;
                Some((face.ascender() as f32 * scale, -(face.descender() as f32) * scale))
            })
            .unwrap_or((size * FALLBACK_ASCENT_EM, size * FALLBACK_DESCENT_EM));
        Self { ascent, descent, line_height: style.line_height_px(), font }
    }
}

/// Runs split into measured pieces, ready for line breaking at any width.
#[derive(Debug, Clone)]
pub struct MeasuredText {
    pub pieces: Vec<Piece>,
    pub runs: Vec<RunMetrics>,
    /// Metrics of the block itself, used for lines without any run.
    pub strut: RunMetrics,
    pub align: TextAlign,
    pub wrap: bool,
}

impl MeasuredText {
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Widest unbreakable sequence.
    pub fn min_content_width(&self) -> f32 {
        let mut widest = 0.0f32;
        let mut current = 0.0;
        for piece in &self.pieces {
            match piece.kind {
                PieceKind::Word => current += piece.width,
                _ => {
                    widest = widest.max(current);
                    current = 0.0;
                }
            }
        }
        widest.max(current)
    }
}

pub fn measure_runs(runs: &[InlineRun], block: &ComputedStyle, fonts: &FontLibrary) -> MeasuredText {
    let mut pieces = Vec::new();
    let mut metrics = Vec::with_capacity(runs.len());

    for (index, run) in runs.iter().enumerate() {
        let run_metrics = RunMetrics::for_style(&run.style, fonts);
        for (kind, text) in split_pieces(&run.text) {
            let width = match kind {
                PieceKind::Break => 0.0,
                _ => text_width(text, &run.style, run_metrics.font.as_ref()),
            };
            pieces.push(Piece { run: index, text: text.to_string(), width, kind });
        }
        metrics.push(run_metrics);
    }

    MeasuredText {
        pieces,
        runs: metrics,
        strut: RunMetrics::for_style(block, fonts),
        align: block.text_align,
        wrap: block.white_space.wraps(),
    }
}

fn split_pieces(text: &str) -> Vec<(PieceKind, &str)> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut current: Option<PieceKind> = None;
    for (i, c) in text.char_indices() {
        let kind = match c {
            '\n' => PieceKind::Break,
            c if c.is_whitespace() && c != '\u{a0}' => PieceKind::Space,
            _ => PieceKind::Word,
        };
        // Breaks never merge with their neighbours.
        if current != Some(kind) || kind == PieceKind::Break {
            if let Some(prev) = current
                && i > start
            {
                out.push((prev, &text[start..i]));
            }
            start = i;
            current = Some(kind);
        }
    }
    if let Some(kind) = current
        && start < text.len()
    {
        out.push((kind, &text[start..]));
    }
    out
}

/// Advance width of `text` in pixels, including letter spacing.
pub fn text_width(text: &str, style: &ComputedStyle, font: Option<&FontData>) -> f32 {
    let chars = text.chars().count() as f32;
    let spacing = style.letter_spacing * chars;
    let shaped = font.and_then(|f| shape_width(f, text, style.font_size));
    match shaped {
        Some(w) => w + spacing,
        None => chars * style.font_size * FALLBACK_ADVANCE_EM + spacing,
    }
}

fn shape_width(font: &FontData, text: &str, font_size: f32) -> Option<f32> {
    static FEATURES: OnceLock<Vec<Feature>> = OnceLock::new();
    let features = FEATURES.get_or_init(|| {
        vec![
            Feature::new(Tag::from_bytes(b"liga"), 1, ..),
            Feature::new(Tag::from_bytes(b"kern"), 1, ..),
        ]
    });

    let face = font.as_face()?;
    let scale = font_size / face.units_per_em() as f32;

    let mut buffer = SCRATCH_BUFFER.with(|b| b.borrow_mut().take().unwrap_or_else(UnicodeBuffer::new));
    buffer.push_str(text);
    buffer.guess_segment_properties();

    let glyph_buffer = rustybuzz::shape(&face, features, buffer);
    let width: f32 = glyph_buffer
        .glyph_positions()
        .iter()
        .map(|p| p.x_advance as f32 * scale)
        .sum();

    let recycled = glyph_buffer.clear();
    SCRATCH_BUFFER.with(|b| *b.borrow_mut() = Some(recycled));
    Some(width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn style(size: f32) -> Arc<ComputedStyle> {
        Arc::new(ComputedStyle { font_size: size, ..ComputedStyle::default() })
    }

    #[test]
    fn splits_words_spaces_and_breaks() {
        let pieces = split_pieces("Hello  big\n\nworld");
        let kinds: Vec<PieceKind> = pieces.iter().map(|p| p.0).collect();
        assert_eq!(
            kinds,
            vec![
                PieceKind::Word,
                PieceKind::Space,
                PieceKind::Word,
                PieceKind::Break,
                PieceKind::Break,
                PieceKind::Word
            ]
        );
        assert_eq!(pieces[1].1, "  ");
    }

    #[test]
    fn fallback_metrics_without_fonts() {
        let fonts = FontLibrary::new();
        let runs = vec![InlineRun::new("abcd", style(20.0))];
        let measured = measure_runs(&runs, &style(20.0), &fonts);
        assert_eq!(measured.pieces.len(), 1);
        assert_eq!(measured.pieces[0].width, 40.0);
        assert_eq!(measured.runs[0].line_height, 24.0);
        assert!((measured.runs[0].baseline_offset() - 18.0).abs() < 1e-4);
    }

    #[test]
    fn min_content_is_the_widest_word() {
        let fonts = FontLibrary::new();
        let runs = vec![
            InlineRun::new("ab abcdef", style(10.0)),
            InlineRun::new("gh", style(10.0)),
        ];
        let measured = measure_runs(&runs, &style(10.0), &fonts);
        // "abcdef" and "gh" touch, so they break as one word.
        assert_eq!(measured.min_content_width(), 40.0);
    }

    #[test]
    fn letter_spacing_adds_per_character() {
        let s = ComputedStyle { font_size: 10.0, letter_spacing: 2.0, ..ComputedStyle::default() };
        assert_eq!(text_width("abc", &s, None), 21.0);
    }
}
