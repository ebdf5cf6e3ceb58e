//! The style cascade: user-agent sheet, author `<style>` sheets, then inline
//! `style` attributes.

use crate::dom::{Document, ElementRef, NodeId};
use std::cmp::Ordering;
use std::sync::Arc;
use vellum_style::stylesheet::parse_declarations;
use vellum_style::user_agent::user_agent_stylesheet;
use vellum_style::{CascadeContext, ComputedStyle, Declaration, Specificity, Stylesheet};

/// Computed styles indexed by node id; `None` for non-element nodes.
pub type StyleMap = Vec<Option<Arc<ComputedStyle>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Origin {
    UserAgent,
    Author,
    Inline,
}

/// Sort key of one matched declaration. Later keys win.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Priority {
    important: bool,
    origin: Origin,
    specificity: Specificity,
    order: usize,
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> Ordering {
        self.important
            .cmp(&other.important)
            .then(self.origin.cmp(&other.origin))
            .then(self.specificity.cmp(&other.specificity))
            .then(self.order.cmp(&other.order))
    }
}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Author sheets from every `<style>` element, in document order.
pub fn author_stylesheet(doc: &Document) -> Stylesheet {
    let mut sheet = Stylesheet::default();
    for style in doc.elements().filter(|e| e.name() == "style") {
        let media_ok = style
            .get_attr("media")
            .is_none_or(|m| matches!(m.trim().to_ascii_lowercase().as_str(), "" | "all" | "screen"));
        if media_ok {
            sheet.append(Stylesheet::parse(&style.text()));
        }
    }
    sheet
}

/// Computes every element's style.
pub fn cascade(doc: &Document, author: &Stylesheet, ctx: &CascadeContext) -> StyleMap {
    let mut styles: StyleMap = vec![None; doc.len()];
    let ua = user_agent_stylesheet();
    let inline_decls: Vec<Option<Vec<Declaration>>> = (0..doc.len())
        .map(|id| doc.element(id).and_then(|e| e.get_attr("style")).map(parse_declarations))
        .collect();

    // Ids are in document order, so parents are always computed first.
    for element in doc.elements() {
        let id = element.id();
        let mut matched: Vec<(Priority, &Declaration)> = Vec::new();
        let mut order = 0usize;
        for (origin, sheet) in [(Origin::UserAgent, ua), (Origin::Author, author)] {
            for rule in &sheet.rules {
                order += 1;
                if !rule.media.iter().all(|m| m.matches(ctx.viewport.width, ctx.viewport.height)) {
                    continue;
                }
                let Some(specificity) = rule.selectors.match_specificity(&element) else {
                    continue;
                };
                for decl in &rule.declarations {
                    matched.push((Priority { important: decl.important, origin, specificity, order }, decl));
                }
            }
        }
        if let Some(decls) = &inline_decls[id] {
            order += 1;
            for decl in decls {
                let priority = Priority {
                    important: decl.important,
                    origin: Origin::Inline,
                    specificity: Specificity::default(),
                    order,
                };
                matched.push((priority, decl));
            }
        }
        // Stable: declarations within one rule keep their written order.
        matched.sort_by(|a, b| a.0.cmp(&b.0));
        let declarations: Vec<&Declaration> = matched.into_iter().map(|(_, d)| d).collect();

        let parent = parent_style(doc, &styles, element);
        styles[id] = Some(Arc::new(ComputedStyle::compute(parent.as_deref(), &declarations, ctx)));
    }
    log::debug!("Cascaded {} elements", styles.iter().filter(|s| s.is_some()).count());
    styles
}

fn parent_style(doc: &Document, styles: &StyleMap, element: ElementRef<'_>) -> Option<Arc<ComputedStyle>> {
    let parent: NodeId = doc.node(element.id())?.parent?;
    styles.get(parent).cloned().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_style::{Display, FontWeight};
    use vellum_types::Color;

    fn styled(html: &str) -> (Document, StyleMap) {
        let doc = Document::parse(html);
        let sheet = author_stylesheet(&doc);
        let styles = cascade(&doc, &sheet, &CascadeContext::default());
        (doc, styles)
    }

    fn style_of<'a>(doc: &Document, styles: &'a StyleMap, id_attr: &str) -> &'a ComputedStyle {
        let id = doc.find_by_id(id_attr).unwrap();
        styles[id].as_deref().unwrap()
    }

    #[test]
    fn specificity_then_order_decides() {
        let (doc, styles) = styled(
            "<style>#a { color: red } p.x { color: blue } p { color: green }</style>\
             <p id=a class=x>t</p><p id=b class=x>t</p>",
        );
        assert_eq!(style_of(&doc, &styles, "a").color, Color::rgb(255, 0, 0));
        assert_eq!(style_of(&doc, &styles, "b").color, Color::rgb(0, 0, 255));
    }

    #[test]
    fn inline_beats_sheet_but_not_important() {
        let (doc, styles) = styled(
            "<style>p { color: blue !important; font-size: 10px }</style>\
             <p id=a style='color: red; font-size: 20px'>t</p>",
        );
        let p = style_of(&doc, &styles, "a");
        assert_eq!(p.color, Color::rgb(0, 0, 255));
        assert_eq!(p.font_size, 20.0);
    }

    #[test]
    fn user_agent_defaults_apply_and_inherit() {
        let (doc, styles) = styled("<div style='color: #333'><h1 id=h>Title <span id=s>x</span></h1></div>");
        let h1 = style_of(&doc, &styles, "h");
        assert_eq!(h1.display, Display::Block);
        assert_eq!(h1.font_size, 32.0);
        assert!(h1.font_weight.is_bold());
        let span = style_of(&doc, &styles, "s");
        assert_eq!(span.color, Color::rgb(0x33, 0x33, 0x33));
        assert_eq!(span.font_weight, FontWeight::Bold);
        assert_eq!(span.display, Display::Inline);
    }

    #[test]
    fn media_queries_use_the_canvas() {
        let (doc, styles) = styled(
            "<style>@media (max-width: 600px) { p { color: red } } @media print { p { color: blue } }</style>\
             <p id=a>t</p>",
        );
        assert_eq!(style_of(&doc, &styles, "a").color, Color::BLACK);

        let (doc, styles) = styled("<style>@media (min-width: 1000px) { p { color: red } }</style><p id=a>t</p>");
        assert_eq!(style_of(&doc, &styles, "a").color, Color::rgb(255, 0, 0));
    }

    #[test]
    fn print_only_style_elements_are_skipped() {
        let (doc, styles) = styled("<style media=print>p { color: red }</style><p id=a>t</p>");
        assert_eq!(style_of(&doc, &styles, "a").color, Color::BLACK);
    }
}
