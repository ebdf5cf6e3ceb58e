use super::shaper::{MeasuredText, PieceKind, RunMetrics};
use vellum_style::TextAlign;

/// A piece of one run placed on a line. `x` is relative to the content box.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub run: usize,
    pub text: String,
    pub x: f32,
    pub width: f32,
}

/// One line box. `top` and `baseline` are relative to the content box top.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub top: f32,
    pub height: f32,
    pub baseline: f32,
    /// Width of the placed text, trailing spaces excluded.
    pub width: f32,
    pub fragments: Vec<Fragment>,
}

/// Greedy line breaking. Words that touch across runs stay together; a word
/// wider than the line overflows instead of splitting.
pub fn break_lines(text: &MeasuredText, max_width: f32) -> Vec<Line> {
    let limit = if text.wrap { max_width } else { f32::INFINITY };
    let pieces = &text.pieces;

    let mut line_pieces: Vec<Vec<usize>> = Vec::new();
    let mut current: Vec<usize> = Vec::new();
    let mut current_width = 0.0f32;
    let mut has_word = false;

    let mut i = 0;
    while i < pieces.len() {
        match pieces[i].kind {
            PieceKind::Break => {
                line_pieces.push(std::mem::take(&mut current));
                current_width = 0.0;
                has_word = false;
                i += 1;
            }
            PieceKind::Space => {
                if has_word {
                    current.push(i);
                    current_width += pieces[i].width;
                }
                i += 1;
            }
            PieceKind::Word => {
                let end = pieces[i..]
                    .iter()
                    .position(|p| p.kind != PieceKind::Word)
                    .map_or(pieces.len(), |off| i + off);
                let group_width: f32 = pieces[i..end].iter().map(|p| p.width).sum();
                let committed = current_width - trailing_space_width(text, &current);
                if has_word && committed + group_width > limit {
                    line_pieces.push(std::mem::take(&mut current));
                    current_width = 0.0;
                }
                current.extend(i..end);
                current_width += group_width;
                has_word = true;
                i = end;
            }
        }
    }
    if !current.is_empty() {
        line_pieces.push(current);
    }

    let mut lines = Vec::with_capacity(line_pieces.len());
    let mut top = 0.0;
    for mut indices in line_pieces {
        while let Some(&last) = indices.last() {
            if pieces[last].kind == PieceKind::Space {
                indices.pop();
            } else {
                break;
            }
        }
        let line = finalize_line(text, &indices, top, limit);
        top += line.height;
        lines.push(line);
    }
    lines
}

fn trailing_space_width(text: &MeasuredText, indices: &[usize]) -> f32 {
    indices
        .iter()
        .rev()
        .take_while(|&&i| text.pieces[i].kind == PieceKind::Space)
        .map(|&i| text.pieces[i].width)
        .sum()
}

fn finalize_line(text: &MeasuredText, indices: &[usize], top: f32, limit: f32) -> Line {
    // Align every inline's baseline, the block's strut included.
    let mut metrics: Vec<&RunMetrics> = vec![&text.strut];
    for &i in indices {
        metrics.push(&text.runs[text.pieces[i].run]);
    }
    let baseline = metrics.iter().map(|m| m.baseline_offset()).fold(0.0f32, f32::max);
    let height = metrics
        .iter()
        .map(|m| baseline - m.baseline_offset() + m.line_height)
        .fold(0.0f32, f32::max);

    let mut fragments: Vec<Fragment> = Vec::new();
    let mut x = 0.0;
    for &i in indices {
        let piece = &text.pieces[i];
        match fragments.last_mut() {
            Some(last) if last.run == piece.run => {
                last.text.push_str(&piece.text);
                last.width += piece.width;
            }
            _ => fragments.push(Fragment { run: piece.run, text: piece.text.clone(), x, width: piece.width }),
        }
        x += piece.width;
    }
    let width = x;

    if limit.is_finite() {
        let free = (limit - width).max(0.0);
        let offset = match text.align {
            TextAlign::Center => free / 2.0,
            TextAlign::Right => free,
            _ => 0.0,
        };
        if offset > 0.0 {
            for f in &mut fragments {
                f.x += offset;
            }
        }
    }

    Line { top, height, baseline: top + baseline, width, fragments }
}

/// Size of the text when broken at `max_width`: the widest line and the
/// summed line heights.
pub fn content_size(text: &MeasuredText, max_width: f32) -> (f32, f32) {
    let lines = break_lines(text, max_width);
    let width = lines.iter().map(|l| l.width).fold(0.0f32, f32::max);
    let height = lines.last().map_or(0.0, |l| l.top + l.height);
    (width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::FontLibrary;
    use crate::text::{measure_runs, InlineRun};
    use std::sync::Arc;
    use vellum_style::ComputedStyle;

    // Without fonts every character is 5px wide at 10px.
    fn measured(runs: &[(&str, bool)], align: TextAlign) -> MeasuredText {
        let base = ComputedStyle { font_size: 10.0, text_align: align, ..ComputedStyle::default() };
        let bold = Arc::new(ComputedStyle { font_weight: vellum_style::FontWeight::Bold, ..base.clone() });
        let plain = Arc::new(base.clone());
        let runs: Vec<InlineRun> = runs
            .iter()
            .map(|(t, b)| InlineRun::new(*t, if *b { bold.clone() } else { plain.clone() }))
            .collect();
        measure_runs(&runs, &base, &FontLibrary::new())
    }

    #[test]
    fn wraps_at_word_boundaries() {
        let text = measured(&[("aaaa bbbb cccc", false)], TextAlign::Left);
        let lines = break_lines(&text, 50.0);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].fragments[0].text, "aaaa bbbb");
        assert_eq!(lines[0].width, 45.0);
        assert_eq!(lines[1].fragments[0].text, "cccc");
        assert_eq!(lines[1].top, 12.0);
    }

    #[test]
    fn hard_breaks_make_lines_even_when_empty() {
        let text = measured(&[("one", false), ("\n", false), ("\n", false), ("two", false)], TextAlign::Left);
        let lines = break_lines(&text, 500.0);
        assert_eq!(lines.len(), 3);
        assert!(lines[1].fragments.is_empty());
        assert_eq!(lines[2].fragments[0].text, "two");
    }

    #[test]
    fn runs_become_separate_fragments() {
        let text = measured(&[("Hello ", false), ("bold", true), (" world", false)], TextAlign::Left);
        let lines = break_lines(&text, 1000.0);
        assert_eq!(lines.len(), 1);
        let joined: String = lines[0].fragments.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(joined, "Hello bold world");
        assert_eq!(lines[0].fragments[1].run, 1);
        assert_eq!(lines[0].fragments[1].x, 30.0);
    }

    #[test]
    fn alignment_offsets_fragments() {
        let text = measured(&[("abcd", false)], TextAlign::Center);
        let lines = break_lines(&text, 100.0);
        assert_eq!(lines[0].fragments[0].x, 40.0);
        let text = measured(&[("abcd", false)], TextAlign::Right);
        assert_eq!(break_lines(&text, 100.0)[0].fragments[0].x, 80.0);
        let text = measured(&[("abcd", false)], TextAlign::Justify);
        assert_eq!(break_lines(&text, 100.0)[0].fragments[0].x, 0.0);
    }

    #[test]
    fn overlong_word_overflows_on_its_own_line() {
        let text = measured(&[("a verylongword b", false)], TextAlign::Left);
        let lines = break_lines(&text, 30.0);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].fragments[0].text, "verylongword");
        let (w, h) = content_size(&text, 30.0);
        assert_eq!(w, 60.0);
        assert_eq!(h, 36.0);
    }

    #[test]
    fn nowrap_ignores_the_limit() {
        let mut text = measured(&[("aaaa bbbb cccc", false)], TextAlign::Left);
        text.wrap = false;
        assert_eq!(break_lines(&text, 10.0).len(), 1);
    }
}
