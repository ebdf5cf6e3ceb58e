//! Text primitives from laid-out inline runs.

use super::primitive::{TextParagraph, TextPrimitive, TextRunSpec};
use vellum_layout::{InlineRun, TextLayout};
use vellum_style::{ComputedStyle, FontStyle, LineHeight, WhiteSpace};
use vellum_types::units::px_to_pt;
use vellum_types::Rect;

/// Concrete font for a CSS family name. Generic families map onto fonts every
/// presentation viewer has.
pub fn concrete_family(family: &str) -> String {
    match family.trim().to_ascii_lowercase().as_str() {
        "sans-serif" | "system-ui" | "-apple-system" | "blinkmacsystemfont" | "ui-sans-serif" => "Arial".to_string(),
        "serif" | "ui-serif" => "Times New Roman".to_string(),
        "monospace" | "ui-monospace" => "Courier New".to_string(),
        _ => family.trim().to_string(),
    }
}

pub fn run_spec(run: &InlineRun) -> TextRunSpec {
    let style = &run.style;
    TextRunSpec {
        text: run.text.clone(),
        font: style.font_family.first().map(|f| concrete_family(f)).filter(|f| !f.is_empty()),
        size_pt: px_to_pt(style.font_size),
        bold: style.font_weight.is_bold(),
        italic: matches!(style.font_style, FontStyle::Italic | FontStyle::Oblique),
        underline: style.text_decoration.underline,
        strike: style.text_decoration.line_through,
        color: (!style.color.is_transparent()).then_some(style.color),
    }
}

/// Splits runs into paragraphs at hard breaks and merges neighbours that
/// share a format. Whitespace-only paragraphs are dropped.
pub fn paragraphs(runs: &[InlineRun]) -> Vec<TextParagraph> {
    let mut out = Vec::new();
    let mut current = TextParagraph::default();
    for run in runs {
        if run.is_line_break() {
            out.push(std::mem::take(&mut current));
            continue;
        }
        let spec = run_spec(run);
        match current.runs.last_mut() {
            Some(last) if last.same_format(&spec) => last.text.push_str(&spec.text),
            _ => current.runs.push(spec),
        }
    }
    out.push(current);
    out.retain(|p| !p.text().trim().is_empty());
    out
}

/// Line spacing as a multiple of single spacing (1.2 em).
pub fn line_spacing(style: &ComputedStyle) -> Option<f32> {
    match style.line_height {
        LineHeight::Normal => None,
        LineHeight::Multiple(m) => Some(m / LineHeight::NORMAL_FACTOR),
        LineHeight::Px(px) if style.font_size > 0.0 => Some(px / (style.font_size * LineHeight::NORMAL_FACTOR)),
        LineHeight::Px(_) => None,
    }
}

/// Builds the text primitive for one text box. `None` when it holds no
/// visible text.
pub fn text_primitive(
    style: &ComputedStyle,
    layout: &TextLayout,
    frame: Rect,
    content_box: Rect,
    border_box: Rect,
    bullet: Option<String>,
) -> Option<TextPrimitive> {
    let mut paragraphs = paragraphs(&layout.runs);
    if paragraphs.is_empty() {
        return None;
    }
    if let Some(first) = paragraphs.first_mut() {
        first.bullet = bullet;
    }
    let insets = [
        (content_box.x - border_box.x).max(0.0),
        (content_box.y - border_box.y).max(0.0),
        (border_box.right() - content_box.right()).max(0.0),
        (border_box.bottom() - content_box.bottom()).max(0.0),
    ];
    Some(TextPrimitive {
        frame,
        paragraphs,
        align: style.text_align,
        line_spacing: line_spacing(style),
        insets,
        wrap: !matches!(style.white_space, WhiteSpace::NoWrap | WhiteSpace::Pre),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use vellum_style::{FontWeight, TextDecoration};
    use vellum_types::Color;

    fn style(f: impl FnOnce(&mut ComputedStyle)) -> Arc<ComputedStyle> {
        let mut s = ComputedStyle::default();
        f(&mut s);
        Arc::new(s)
    }

    #[test]
    fn generic_families_are_mapped() {
        assert_eq!(concrete_family("sans-serif"), "Arial");
        assert_eq!(concrete_family("serif"), "Times New Roman");
        assert_eq!(concrete_family("monospace"), "Courier New");
        assert_eq!(concrete_family("Inter"), "Inter");
    }

    #[test]
    fn runs_carry_computed_formatting() {
        let s = style(|s| {
            s.font_size = 24.0;
            s.font_weight = FontWeight::Numeric(650);
            s.font_style = FontStyle::Italic;
            s.text_decoration = TextDecoration { underline: true, line_through: false };
            s.color = Color::rgb(0x12, 0x34, 0x56);
            s.font_family = vec!["serif".into()];
        });
        let spec = run_spec(&InlineRun::new("x", s));
        assert_eq!(spec.size_pt, 18.0);
        assert!(spec.bold && spec.italic && spec.underline && !spec.strike);
        assert_eq!(spec.font.as_deref(), Some("Times New Roman"));
        assert_eq!(spec.color.unwrap().to_hex(), "123456");

        let clear = run_spec(&InlineRun::new("x", style(|s| s.color = Color::TRANSPARENT)));
        assert_eq!(clear.color, None);
    }

    #[test]
    fn breaks_split_and_same_formats_merge() {
        let plain = style(|_| {});
        let bold = style(|s| s.font_weight = FontWeight::Bold);
        let runs = vec![
            InlineRun::new("Hello ", plain.clone()),
            InlineRun::new("big ", plain.clone()),
            InlineRun::new("bold", bold),
            InlineRun::new("\n", plain.clone()),
            InlineRun::new("  ", plain.clone()),
            InlineRun::new("\n", plain.clone()),
            InlineRun::new("next", plain),
        ];
        let paras = paragraphs(&runs);
        assert_eq!(paras.len(), 2);
        assert_eq!(paras[0].runs.len(), 2);
        assert_eq!(paras[0].runs[0].text, "Hello big ");
        assert!(paras[0].runs[1].bold);
        assert_eq!(paras[1].text(), "next");
    }

    #[test]
    fn line_height_becomes_a_multiple() {
        assert_eq!(line_spacing(&style(|_| {})), None);
        let doubled = style(|s| s.line_height = LineHeight::Multiple(2.4));
        assert!((line_spacing(&doubled).unwrap() - 2.0).abs() < 1e-5);
        let px = style(|s| {
            s.font_size = 20.0;
            s.line_height = LineHeight::Px(36.0);
        });
        assert!((line_spacing(&px).unwrap() - 1.5).abs() < 1e-5);
    }
}
