//! Arena DOM built from html5ever's reference-counted tree.
//!
//! Nodes are stored in document order, so a node's id is also its pre-order
//! position and `nodes[id + 1..]` holds its descendants first.

use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{parse_document, ParseOpts};
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};
use vellum_style::SelectorElement;
use vellum_types::escape_xml;

pub type NodeId = usize;

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

#[derive(Debug, Clone, PartialEq)]
pub struct ElementData {
    /// Lowercased local name.
    pub name: String,
    /// True for elements in the SVG namespace.
    pub svg: bool,
    pub attrs: Vec<(String, String)>,
}

impl ElementData {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or_default().split_ascii_whitespace()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Document,
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub data: NodeData,
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    /// Parses an HTML document or fragment. Scripts are never run, and
    /// `<noscript>` content is parsed as markup.
    pub fn parse(html: &str) -> Self {
        let opts = ParseOpts {
            tree_builder: TreeBuilderOpts { scripting_enabled: false, ..Default::default() },
            ..Default::default()
        };
        let dom = parse_document(RcDom::default(), opts).one(html);
        let mut doc = Document { nodes: Vec::new() };
        doc.convert(&dom.document, None);
        doc
    }

    fn convert(&mut self, handle: &Handle, parent: Option<NodeId>) {
        let data = match &handle.data {
            RcNodeData::Document => NodeData::Document,
            RcNodeData::Element { name, attrs, .. } => NodeData::Element(ElementData {
                name: name.local.to_string().to_ascii_lowercase(),
                svg: name.ns.as_ref() == SVG_NAMESPACE,
                attrs: attrs
                    .borrow()
                    .iter()
                    .map(|a| (a.name.local.to_string(), a.value.to_string()))
                    .collect(),
            }),
            RcNodeData::Text { contents } => NodeData::Text(contents.borrow().to_string()),
            _ => return,
        };
        let id = self.nodes.len();
        self.nodes.push(Node { parent, children: Vec::new(), data });
        if let Some(parent) = parent {
            self.nodes[parent].children.push(id);
        }
        for child in handle.children.borrow().iter() {
            self.convert(child, Some(id));
        }
    }

    pub fn root(&self) -> NodeId {
        0
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn element(&self, id: NodeId) -> Option<ElementRef<'_>> {
        match &self.nodes.get(id)?.data {
            NodeData::Element(data) => Some(ElementRef { doc: self, id, data }),
            _ => None,
        }
    }

    /// Every element, in document order.
    pub fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> {
        (0..self.nodes.len()).filter_map(|id| self.element(id))
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map(|n| n.children.as_slice()).unwrap_or_default()
    }

    pub fn body(&self) -> Option<NodeId> {
        self.elements().find(|e| e.name() == "body").map(|e| e.id())
    }

    pub fn find_by_class(&self, class: &str) -> Option<NodeId> {
        self.elements().find(|e| e.has_class(class)).map(|e| e.id())
    }

    pub fn find_by_id(&self, id_attr: &str) -> Option<NodeId> {
        self.elements().find(|e| e.id_attr() == Some(id_attr)).map(|e| e.id())
    }

    /// Concatenated text of the subtree.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.nodes.get(id).map(|n| &n.data) {
            Some(NodeData::Text(text)) => out.push_str(text),
            Some(_) => {
                for &child in self.children(id) {
                    self.collect_text(child, out);
                }
            }
            None => {}
        }
    }

    /// Serializes an element subtree as XML, for handing inline `<svg>` to an
    /// SVG renderer.
    pub fn outer_xml(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_xml(id, &mut out, true);
        out
    }

    fn write_xml(&self, id: NodeId, out: &mut String, root: bool) {
        let Some(node) = self.nodes.get(id) else { return };
        match &node.data {
            NodeData::Text(text) => out.push_str(&escape_xml(text)),
            NodeData::Document => {
                for &child in &node.children {
                    self.write_xml(child, out, false);
                }
            }
            NodeData::Element(el) => {
                // html5ever lowercases names; SVG needs a few back in camel case.
                let name = svg_element_name(&el.name);
                out.push('<');
                out.push_str(name);
                if root && el.svg && el.attr("xmlns").is_none() {
                    out.push_str(" xmlns=\"http://www.w3.org/2000/svg\"");
                }
                for (key, value) in &el.attrs {
                    out.push(' ');
                    out.push_str(key);
                    out.push_str("=\"");
                    out.push_str(&escape_xml(value));
                    out.push('"');
                }
                if node.children.is_empty() {
                    out.push_str("/>");
                } else {
                    out.push('>');
                    for &child in &node.children {
                        self.write_xml(child, out, false);
                    }
                    out.push_str("</");
                    out.push_str(name);
                    out.push('>');
                }
            }
        }
    }
}

fn svg_element_name(name: &str) -> &str {
    match name {
        "lineargradient" => "linearGradient",
        "radialgradient" => "radialGradient",
        "clippath" => "clipPath",
        "textpath" => "textPath",
        "foreignobject" => "foreignObject",
        other => other,
    }
}

/// A borrowed element handle; cheap to copy.
#[derive(Debug, Clone, Copy)]
pub struct ElementRef<'a> {
    doc: &'a Document,
    id: NodeId,
    data: &'a ElementData,
}

impl<'a> ElementRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn document(&self) -> &'a Document {
        self.doc
    }

    pub fn data(&self) -> &'a ElementData {
        self.data
    }

    pub fn name(&self) -> &'a str {
        &self.data().name
    }

    pub fn get_attr(&self, name: &str) -> Option<&'a str> {
        self.data().attr(name)
    }

    pub fn classes(&self) -> impl Iterator<Item = &'a str> {
        self.data().classes()
    }

    pub fn children(&self) -> &'a [NodeId] {
        self.doc.children(self.id)
    }

    pub fn text(&self) -> String {
        self.doc.text_content(self.id)
    }
}

impl SelectorElement for ElementRef<'_> {
    fn local_name(&self) -> &str {
        self.name()
    }

    fn id_attr(&self) -> Option<&str> {
        self.get_attr("id")
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.get_attr(name)
    }

    fn parent_element(&self) -> Option<Self> {
        let parent = self.doc.nodes[self.id].parent?;
        self.doc.element(parent)
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        let parent = self.doc.nodes[self.id].parent?;
        let siblings = self.doc.children(parent);
        let pos = siblings.iter().position(|&s| s == self.id)?;
        siblings[..pos].iter().rev().find_map(|&s| self.doc.element(s))
    }

    fn next_sibling_element(&self) -> Option<Self> {
        let parent = self.doc.nodes[self.id].parent?;
        let siblings = self.doc.children(parent);
        let pos = siblings.iter().position(|&s| s == self.id)?;
        siblings[pos + 1..].iter().find_map(|&s| self.doc.element(s))
    }

    fn is_empty(&self) -> bool {
        self.children().iter().all(|&c| match &self.doc.nodes[c].data {
            NodeData::Text(t) => t.trim().is_empty(),
            _ => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fragments_into_a_full_document() {
        let doc = Document::parse("<div class='slide-container a'><p id=x>Hi <b>there</b></p></div>");
        let body = doc.body().unwrap();
        let container = doc.find_by_class("slide-container").unwrap();
        assert_eq!(doc.node(container).unwrap().parent, Some(body));
        let p = doc.find_by_id("x").unwrap();
        assert_eq!(doc.text_content(p), "Hi there");
        assert!(doc.element(container).unwrap().has_class("a"));
    }

    #[test]
    fn ids_follow_document_order() {
        let doc = Document::parse("<p>a</p><p>b</p>");
        let names: Vec<&str> = doc.elements().map(|e| e.name()).collect();
        assert_eq!(names, vec!["html", "head", "body", "p", "p"]);
        let ids: Vec<NodeId> = doc.elements().map(|e| e.id()).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn sibling_navigation_skips_text() {
        let doc = Document::parse("<ul><li>1</li> <li>2</li> <li>3</li></ul>");
        let items: Vec<ElementRef> = doc.elements().filter(|e| e.name() == "li").collect();
        assert_eq!(items[1].prev_sibling_element().unwrap().id(), items[0].id());
        assert_eq!(items[1].next_sibling_element().unwrap().id(), items[2].id());
        assert!(items[0].prev_sibling_element().is_none());
        assert!(!items[0].is_empty());
    }

    #[test]
    fn inline_svg_round_trips_as_xml() {
        let doc = Document::parse(
            "<svg viewBox='0 0 10 10'><linearGradient id='g'/><rect width='10' height='10' fill='url(#g)'/></svg>",
        );
        let svg = doc.elements().find(|e| e.name() == "svg").unwrap();
        assert!(svg.data().svg);
        let xml = doc.outer_xml(svg.id());
        assert!(xml.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 10 10\">"));
        assert!(xml.contains("<linearGradient id=\"g\"/>"));
        assert!(xml.ends_with("</svg>"));
    }

    #[test]
    fn scripts_are_kept_as_text() {
        let doc = Document::parse("<script type='application/json'>{\"a\": 1}</script>");
        let script = doc.elements().find(|e| e.name() == "script").unwrap();
        assert_eq!(script.text(), "{\"a\": 1}");
    }
}
