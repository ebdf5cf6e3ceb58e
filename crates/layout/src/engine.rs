//! Runs taffy over a box tree and places text lines.

use crate::LayoutError;
use crate::fonts::FontLibrary;
use crate::output::{BoxGeometry, LayoutOutput, PlacedFragment, PlacedLine, TextLayout};
use crate::solver::computed_style_to_taffy;
use crate::text::{break_lines, measure_runs, wrapper::content_size, MeasuredText};
use crate::tree::{BoxContent, LayoutBox};
use taffy::prelude::*;
use vellum_types::{Rect, Size as ViewportSize};

/// Slack added to a text box's width before breaking its lines, so float
/// rounding inside taffy never pushes the last word of a line down.
const LINE_FIT_EPSILON: f32 = 0.5;

enum Measure {
    Text(MeasuredText),
    Replaced(ViewportSize),
}

struct Built<'a> {
    node: NodeId,
    source: &'a LayoutBox,
    measure: Option<usize>,
    children: Vec<Built<'a>>,
}

/// Lays out `root` inside a viewport of the given size.
pub fn compute_layout(
    root: &LayoutBox,
    viewport: ViewportSize,
    fonts: &FontLibrary,
) -> Result<LayoutOutput, LayoutError> {
    let mut taffy = TaffyTree::<usize>::new();
    let mut measures = Vec::new();

    let built = build(&mut taffy, root, &mut measures, fonts)?;

    // Initial containing block: percentages on the root resolve against it.
    let icb_style = Style {
        display: Display::Block,
        size: Size {
            width: Dimension::length(viewport.width),
            height: Dimension::length(viewport.height),
        },
        ..Default::default()
    };
    let icb = taffy
        .new_with_children(icb_style, &[built.node])
        .map_err(|e| LayoutError::Taffy(format!("{:?}", e)))?;

    let available_space = Size {
        width: AvailableSpace::Definite(viewport.width),
        height: AvailableSpace::Definite(viewport.height),
    };

    taffy
        .compute_layout_with_measure(
            icb,
            available_space,
            |known_dimensions, available_space, _node_id, node_context, _style| {
                let Some(index) = node_context.map(|c| *c) else {
                    return Size::ZERO;
                };
                match measures.get(index) {
                    Some(Measure::Text(text)) => {
                        let limit = known_dimensions.width.unwrap_or(match available_space.width {
                            AvailableSpace::Definite(w) => w,
                            AvailableSpace::MaxContent => f32::INFINITY,
                            AvailableSpace::MinContent => 0.0,
                        });
                        let (width, height) = content_size(text, limit);
                        Size {
                            width: known_dimensions.width.unwrap_or(width),
                            height: known_dimensions.height.unwrap_or(height),
                        }
                    }
                    Some(Measure::Replaced(natural)) => {
                        let ratio = natural.aspect_ratio();
                        match (known_dimensions.width, known_dimensions.height) {
                            (Some(w), Some(h)) => Size { width: w, height: h },
                            (Some(w), None) if ratio > 0.0 => Size { width: w, height: w / ratio },
                            (None, Some(h)) => Size { width: h * ratio, height: h },
                            _ => Size { width: natural.width, height: natural.height },
                        }
                    }
                    None => Size::ZERO,
                }
            },
        )
        .map_err(|e| LayoutError::Taffy(format!("{:?}", e)))?;

    let mut output = LayoutOutput::default();
    collect(&taffy, &built, (0.0, 0.0), &measures, &mut output)?;
    log::debug!("Laid out {} boxes in {}x{}", output.len(), viewport.width, viewport.height);
    Ok(output)
}

fn build<'a>(
    taffy: &mut TaffyTree<usize>,
    source: &'a LayoutBox,
    measures: &mut Vec<Measure>,
    fonts: &FontLibrary,
) -> Result<Built<'a>, LayoutError> {
    let style = computed_style_to_taffy(&source.style, &source.content);
    let err = |e: taffy::TaffyError| LayoutError::Taffy(format!("{:?}", e));

    match &source.content {
        BoxContent::Container { .. } => {
            let children = source
                .children
                .iter()
                .map(|child| build(taffy, child, measures, fonts))
                .collect::<Result<Vec<_>, _>>()?;
            let ids: Vec<NodeId> = children.iter().map(|c| c.node).collect();
            let node = taffy.new_with_children(style, &ids).map_err(err)?;
            Ok(Built { node, source, measure: None, children })
        }
        BoxContent::Text(runs) => {
            let index = measures.len();
            measures.push(Measure::Text(measure_runs(runs, &source.style, fonts)));
            let node = taffy.new_leaf_with_context(style, index).map_err(err)?;
            Ok(Built { node, source, measure: Some(index), children: Vec::new() })
        }
        BoxContent::Replaced { intrinsic } => {
            let index = measures.len();
            measures.push(Measure::Replaced(*intrinsic));
            let node = taffy.new_leaf_with_context(style, index).map_err(err)?;
            Ok(Built { node, source, measure: Some(index), children: Vec::new() })
        }
    }
}

fn collect(
    taffy: &TaffyTree<usize>,
    built: &Built<'_>,
    origin: (f32, f32),
    measures: &[Measure],
    output: &mut LayoutOutput,
) -> Result<(), LayoutError> {
    let layout = taffy
        .layout(built.node)
        .map_err(|_| LayoutError::MissingLayout(built.source.key))?;
    let x = origin.0 + layout.location.x;
    let y = origin.1 + layout.location.y;
    let border_box = Rect::new(x, y, layout.size.width, layout.size.height);
    let content_box = border_box.inset(
        layout.border.top + layout.padding.top,
        layout.border.right + layout.padding.right,
        layout.border.bottom + layout.padding.bottom,
        layout.border.left + layout.padding.left,
    );
    output.insert_box(built.source.key, BoxGeometry { border_box, content_box });

    if let (Some(Measure::Text(text)), BoxContent::Text(runs)) =
        (built.measure.and_then(|i| measures.get(i)), &built.source.content)
    {
        output.insert_text(built.source.key, place_text(text, runs.clone(), content_box));
    }

    for child in &built.children {
        collect(taffy, child, (x, y), measures, output)?;
    }
    Ok(())
}

fn place_text(text: &MeasuredText, runs: Vec<crate::text::InlineRun>, content_box: Rect) -> TextLayout {
    let lines = break_lines(text, content_box.width + LINE_FIT_EPSILON)
        .into_iter()
        .map(|line| PlacedLine {
            rect: Rect::new(content_box.x, content_box.y + line.top, content_box.width, line.height),
            baseline: content_box.y + line.baseline,
            fragments: line
                .fragments
                .into_iter()
                .map(|f| PlacedFragment {
                    run: f.run,
                    text: f.text,
                    x: content_box.x + f.x,
                    baseline: content_box.y + line.baseline,
                    width: f.width,
                })
                .collect(),
        })
        .collect();
    TextLayout { runs, lines }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::InlineRun;
    use std::sync::Arc;
    use vellum_style::{ComputedStyle, Display as CssDisplay, Edges, FlexDirection, Length};

    fn block(extra: impl FnOnce(&mut ComputedStyle)) -> Arc<ComputedStyle> {
        let mut style = ComputedStyle { display: CssDisplay::Block, font_size: 10.0, ..ComputedStyle::default() };
        extra(&mut style);
        Arc::new(style)
    }

    #[test]
    fn stacks_blocks_and_places_text() {
        let para = block(|s| s.margin = Edges { top: Length::Px(10.0), bottom: Length::Px(10.0), ..Edges::all(Length::zero()) });
        let root = LayoutBox::container(
            0,
            block(|s| s.padding = Edges::all(Length::Px(20.0))),
            vec![
                LayoutBox::text(1, para.clone(), vec![InlineRun::new("Hello world", para.clone())]),
                LayoutBox::text(2, para.clone(), vec![InlineRun::new("Second", para.clone())]),
            ],
        );
        let out = compute_layout(&root, ViewportSize::new(400.0, 300.0), &FontLibrary::new()).unwrap();

        let root_rect = out.rect(0).unwrap();
        assert_eq!(root_rect.width, 400.0);

        let first = out.rect(1).unwrap();
        assert_eq!((first.x, first.y), (20.0, 30.0));
        assert_eq!(first.width, 360.0);
        assert_eq!(first.height, 12.0);

        // Adjacent vertical margins collapse.
        let second = out.rect(2).unwrap();
        assert_eq!(second.y, 52.0);

        let text = out.text(1).unwrap();
        let frag = text.fragments().next().unwrap();
        assert_eq!(frag.text, "Hello world");
        assert_eq!(frag.x, 20.0);
        assert!(frag.baseline > first.y && frag.baseline < first.bottom());
        assert_eq!(out.keys(), &[0, 1, 2]);
    }

    #[test]
    fn flex_row_distributes_width() {
        let item = block(|s| {
            s.flex_grow = 1.0;
            s.flex_basis = Length::Px(0.0);
        });
        let root = LayoutBox::container(
            0,
            block(|s| {
                s.display = CssDisplay::Flex;
                s.flex_direction = FlexDirection::Row;
                s.width = Length::Px(300.0);
                s.height = Length::Px(100.0);
            }),
            vec![
                LayoutBox::container(1, item.clone(), Vec::new()),
                LayoutBox::container(2, item.clone(), Vec::new()),
            ],
        );
        let out = compute_layout(&root, ViewportSize::new(1280.0, 720.0), &FontLibrary::new()).unwrap();
        assert_eq!(out.rect(1).unwrap().width, 150.0);
        assert_eq!(out.rect(2).unwrap().x, 150.0);
        assert_eq!(out.rect(2).unwrap().height, 100.0);
    }

    #[test]
    fn replaced_boxes_use_their_natural_size() {
        let root = LayoutBox::container(
            0,
            block(|_| {}),
            vec![LayoutBox::replaced(1, block(|_| {}), ViewportSize::new(300.0, 150.0))],
        );
        let out = compute_layout(&root, ViewportSize::new(1280.0, 720.0), &FontLibrary::new()).unwrap();
        let canvas = out.rect(1).unwrap();
        assert_eq!((canvas.width, canvas.height), (300.0, 150.0));
    }

    #[test]
    fn text_wraps_inside_narrow_boxes() {
        let narrow = block(|s| s.width = Length::Px(50.0));
        let root = LayoutBox::container(
            0,
            block(|_| {}),
            vec![LayoutBox::text(1, narrow.clone(), vec![InlineRun::new("aaaa bbbb cccc", narrow.clone())])],
        );
        let out = compute_layout(&root, ViewportSize::new(1280.0, 720.0), &FontLibrary::new()).unwrap();
        let text = out.text(1).unwrap();
        assert_eq!(text.lines.len(), 2);
        assert_eq!(out.rect(1).unwrap().height, 24.0);
    }
}
