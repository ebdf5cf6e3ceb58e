//! CSS selectors: parsing, specificity and matching.
//!
//! Supports type, universal, class, id and attribute selectors, the
//! structural pseudo-classes, `:not()` and all four combinators. Dynamic
//! pseudo-classes (`:hover`) and pseudo-elements never match in a static
//! render.

use crate::parsers::{ident, split_top_level, ws, StyleParseError};
use nom::branch::alt;
use nom::bytes::complete::{tag, take_while};
use nom::character::complete::{char, multispace1};
use nom::combinator::{map, opt, value};
use nom::multi::{many0, many1};
use nom::sequence::{delimited, preceded};
use nom::{IResult, Parser};

/// The element view a selector needs. Implemented by the host's DOM handle.
pub trait SelectorElement: Clone {
    fn local_name(&self) -> &str;
    fn id_attr(&self) -> Option<&str>;
    fn has_class(&self, class: &str) -> bool;
    fn attr(&self, name: &str) -> Option<&str>;
    fn parent_element(&self) -> Option<Self>;
    fn prev_sibling_element(&self) -> Option<Self>;
    fn next_sibling_element(&self) -> Option<Self>;
    /// No element children and no non-whitespace text.
    fn is_empty(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Specificity(pub u32, pub u32, pub u32);

impl std::ops::Add for Specificity {
    type Output = Specificity;
    fn add(self, o: Specificity) -> Specificity {
        Specificity(self.0 + o.0, self.1 + o.1, self.2 + o.2)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttrOp {
    Exists,
    Equals(String),
    Includes(String),
    DashMatch(String),
    Prefix(String),
    Suffix(String),
    Substring(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttrSelector {
    pub name: String,
    pub op: AttrOp,
}

impl AttrSelector {
    fn matches<E: SelectorElement>(&self, el: &E) -> bool {
        let Some(actual) = el.attr(&self.name) else {
            return false;
        };
        match &self.op {
            AttrOp::Exists => true,
            AttrOp::Equals(v) => actual == v,
            AttrOp::Includes(v) => actual.split_whitespace().any(|w| w == v),
            AttrOp::DashMatch(v) => actual == v || actual.starts_with(&format!("{}-", v)),
            AttrOp::Prefix(v) => !v.is_empty() && actual.starts_with(v.as_str()),
            AttrOp::Suffix(v) => !v.is_empty() && actual.ends_with(v.as_str()),
            AttrOp::Substring(v) => !v.is_empty() && actual.contains(v.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PseudoClass {
    Root,
    FirstChild,
    LastChild,
    OnlyChild,
    Empty,
    /// `an+b`
    NthChild(i32, i32),
    NthLastChild(i32, i32),
    Not(Box<Compound>),
    /// Dynamic pseudo-classes and pseudo-elements.
    Never,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Compound {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: Vec<AttrSelector>,
    pub pseudos: Vec<PseudoClass>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
    NextSibling,
    SubsequentSibling,
}

/// A complex selector. `combinators[i]` sits between `compounds[i]` and
/// `compounds[i + 1]`; the subject is the last compound.
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    pub compounds: Vec<Compound>,
    pub combinators: Vec<Combinator>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList(pub Vec<Selector>);

#[derive(Clone)]
enum Simple {
    Universal,
    Tag(String),
    Id(String),
    Class(String),
    Attr(AttrSelector),
    Pseudo(PseudoClass),
}

// --- Parsers ---

fn quoted(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('"'), take_while(|c| c != '"'), char('"')),
        delimited(char('\''), take_while(|c| c != '\''), char('\'')),
    ))
    .parse(input)
}

fn attr_selector(input: &str) -> IResult<&str, AttrSelector> {
    let op = alt((tag("~="), tag("|="), tag("^="), tag("$="), tag("*="), tag("=")));
    map(
        delimited(
            char('['),
            (ws(ident), opt((op, ws(alt((quoted, ident)))))),
            (opt(ws(alt((char('i'), char('s'))))), char(']')),
        ),
        |(name, op): (&str, Option<(&str, &str)>)| {
            let op = match op {
                None => AttrOp::Exists,
                Some((kind, v)) => {
                    let v = v.to_string();
                    match kind {
                        "~=" => AttrOp::Includes(v),
                        "|=" => AttrOp::DashMatch(v),
                        "^=" => AttrOp::Prefix(v),
                        "$=" => AttrOp::Suffix(v),
                        "*=" => AttrOp::Substring(v),
                        _ => AttrOp::Equals(v),
                    }
                }
            };
            AttrSelector { name: name.to_ascii_lowercase(), op }
        },
    )
    .parse(input)
}

/// Parses `an+b`, `odd`, `even` or a plain integer.
fn parse_nth(arg: &str) -> Option<(i32, i32)> {
    let arg: String = arg.chars().filter(|c| !c.is_whitespace()).collect::<String>().to_ascii_lowercase();
    match arg.as_str() {
        "odd" => return Some((2, 1)),
        "even" => return Some((2, 0)),
        _ => {}
    }
    match arg.split_once('n') {
        None => arg.parse().ok().map(|b| (0, b)),
        Some((a, b)) => {
            let a = match a {
                "" | "+" => 1,
                "-" => -1,
                a => a.parse().ok()?,
            };
            let b = if b.is_empty() { 0 } else { b.parse().ok()? };
            Some((a, b))
        }
    }
}

fn nth_matches(a: i32, b: i32, position: i32) -> bool {
    if a == 0 {
        return position == b;
    }
    let diff = position - b;
    diff % a == 0 && diff / a >= 0
}

fn pseudo(input: &str) -> IResult<&str, PseudoClass> {
    preceded(
        char(':'),
        alt((
            value(PseudoClass::Never, preceded(char(':'), ident)),
            map(
                (ident, opt(delimited(char('('), take_while(|c| c != ')'), char(')')))),
                |(name, arg): (&str, Option<&str>)| {
                    match (name.to_ascii_lowercase().as_str(), arg) {
                        ("root", None) => PseudoClass::Root,
                        ("first-child", None) => PseudoClass::FirstChild,
                        ("last-child", None) => PseudoClass::LastChild,
                        ("only-child", None) => PseudoClass::OnlyChild,
                        ("empty", None) => PseudoClass::Empty,
                        ("nth-child", Some(arg)) => parse_nth(arg)
                            .map(|(a, b)| PseudoClass::NthChild(a, b))
                            .unwrap_or(PseudoClass::Never),
                        ("nth-last-child", Some(arg)) => parse_nth(arg)
                            .map(|(a, b)| PseudoClass::NthLastChild(a, b))
                            .unwrap_or(PseudoClass::Never),
                        ("not", Some(arg)) => match compound(arg.trim()) {
                            Ok(("", inner)) => PseudoClass::Not(Box::new(inner)),
                            _ => PseudoClass::Never,
                        },
                        _ => PseudoClass::Never,
                    }
                },
            ),
        )),
    )
    .parse(input)
}

fn simple(input: &str) -> IResult<&str, Simple> {
    alt((
        value(Simple::Universal, char('*')),
        map(ident, |t: &str| Simple::Tag(t.to_ascii_lowercase())),
        map(preceded(char('#'), ident), |id: &str| Simple::Id(id.to_string())),
        map(preceded(char('.'), ident), |c: &str| Simple::Class(c.to_string())),
        map(attr_selector, Simple::Attr),
        map(pseudo, Simple::Pseudo),
    ))
    .parse(input)
}

fn compound(input: &str) -> IResult<&str, Compound> {
    map(many1(simple), |parts| {
        let mut c = Compound::default();
        for part in parts {
            match part {
                Simple::Universal => {}
                Simple::Tag(t) => c.tag = Some(t),
                Simple::Id(id) => c.id = Some(id),
                Simple::Class(cl) => c.classes.push(cl),
                Simple::Attr(a) => c.attrs.push(a),
                Simple::Pseudo(p) => c.pseudos.push(p),
            }
        }
        c
    })
    .parse(input)
}

fn combinator(input: &str) -> IResult<&str, Combinator> {
    alt((
        value(Combinator::Child, ws(char('>'))),
        value(Combinator::NextSibling, ws(char('+'))),
        value(Combinator::SubsequentSibling, ws(char('~'))),
        value(Combinator::Descendant, multispace1),
    ))
    .parse(input)
}

fn complex(input: &str) -> IResult<&str, Selector> {
    map((compound, many0((combinator, compound))), |(first, rest)| {
        let mut compounds = vec![first];
        let mut combinators = Vec::with_capacity(rest.len());
        for (comb, comp) in rest {
            combinators.push(comb);
            compounds.push(comp);
        }
        Selector { compounds, combinators }
    })
    .parse(input)
}

// --- Matching ---

impl Compound {
    fn specificity(&self) -> Specificity {
        let pseudo_weight: Specificity = self
            .pseudos
            .iter()
            .map(|p| match p {
                PseudoClass::Not(inner) => inner.specificity(),
                _ => Specificity(0, 1, 0),
            })
            .fold(Specificity::default(), |a, b| a + b);
        Specificity(
            self.id.is_some() as u32,
            (self.classes.len() + self.attrs.len()) as u32,
            self.tag.is_some() as u32,
        ) + pseudo_weight
    }

    pub fn matches<E: SelectorElement>(&self, el: &E) -> bool {
        if let Some(tag) = &self.tag
            && !el.local_name().eq_ignore_ascii_case(tag)
        {
            return false;
        }
        if let Some(id) = &self.id
            && el.id_attr() != Some(id.as_str())
        {
            return false;
        }
        self.classes.iter().all(|c| el.has_class(c))
            && self.attrs.iter().all(|a| a.matches(el))
            && self.pseudos.iter().all(|p| pseudo_matches(p, el))
    }
}

fn position_from_start<E: SelectorElement>(el: &E) -> i32 {
    let mut n = 1;
    let mut cur = el.prev_sibling_element();
    while let Some(prev) = cur {
        n += 1;
        cur = prev.prev_sibling_element();
    }
    n
}

fn position_from_end<E: SelectorElement>(el: &E) -> i32 {
    let mut n = 1;
    let mut cur = el.next_sibling_element();
    while let Some(next) = cur {
        n += 1;
        cur = next.next_sibling_element();
    }
    n
}

fn pseudo_matches<E: SelectorElement>(pseudo: &PseudoClass, el: &E) -> bool {
    match pseudo {
        PseudoClass::Root => el.parent_element().is_none(),
        PseudoClass::FirstChild => el.prev_sibling_element().is_none(),
        PseudoClass::LastChild => el.next_sibling_element().is_none(),
        PseudoClass::OnlyChild => {
            el.prev_sibling_element().is_none() && el.next_sibling_element().is_none()
        }
        PseudoClass::Empty => el.is_empty(),
        PseudoClass::NthChild(a, b) => nth_matches(*a, *b, position_from_start(el)),
        PseudoClass::NthLastChild(a, b) => nth_matches(*a, *b, position_from_end(el)),
        PseudoClass::Not(inner) => !inner.matches(el),
        PseudoClass::Never => false,
    }
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self, StyleParseError> {
        match complex(input.trim()) {
            Ok(("", selector)) => Ok(selector),
            Ok((rest, _)) => Err(StyleParseError::Parse(format!(
                "Unexpected selector remainder: '{}'",
                rest
            ))),
            Err(e) => Err(StyleParseError::Parse(e.to_string())),
        }
    }

    pub fn specificity(&self) -> Specificity {
        self.compounds
            .iter()
            .map(Compound::specificity)
            .fold(Specificity::default(), |a, b| a + b)
    }

    pub fn matches<E: SelectorElement>(&self, el: &E) -> bool {
        self.matches_at(self.compounds.len() - 1, el)
    }

    fn matches_at<E: SelectorElement>(&self, idx: usize, el: &E) -> bool {
        if !self.compounds[idx].matches(el) {
            return false;
        }
        if idx == 0 {
            return true;
        }
        match self.combinators[idx - 1] {
            Combinator::Child => el
                .parent_element()
                .is_some_and(|p| self.matches_at(idx - 1, &p)),
            Combinator::NextSibling => el
                .prev_sibling_element()
                .is_some_and(|s| self.matches_at(idx - 1, &s)),
            Combinator::Descendant => {
                let mut cur = el.parent_element();
                while let Some(ancestor) = cur {
                    if self.matches_at(idx - 1, &ancestor) {
                        return true;
                    }
                    cur = ancestor.parent_element();
                }
                false
            }
            Combinator::SubsequentSibling => {
                let mut cur = el.prev_sibling_element();
                while let Some(sibling) = cur {
                    if self.matches_at(idx - 1, &sibling) {
                        return true;
                    }
                    cur = sibling.prev_sibling_element();
                }
                false
            }
        }
    }
}

impl SelectorList {
    /// Parses a comma-separated list. One invalid selector invalidates the
    /// whole list, as in browsers.
    pub fn parse(input: &str) -> Result<Self, StyleParseError> {
        split_top_level(input, ',')
            .into_iter()
            .map(Selector::parse)
            .collect::<Result<Vec<_>, _>>()
            .map(SelectorList)
    }

    /// Highest specificity among the selectors that match `el`.
    pub fn match_specificity<E: SelectorElement>(&self, el: &E) -> Option<Specificity> {
        self.0.iter().filter(|s| s.matches(el)).map(Selector::specificity).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal tree for matching tests: (tag, id, classes, parent, index among siblings).
    #[derive(Clone)]
    struct TestEl<'a> {
        nodes: &'a [(&'a str, Option<&'a str>, &'a [&'a str], Option<usize>)],
        idx: usize,
    }

    impl<'a> TestEl<'a> {
        fn siblings(&self) -> Vec<usize> {
            let parent = self.nodes[self.idx].3;
            (0..self.nodes.len())
                .filter(|&i| self.nodes[i].3 == parent && parent.is_some())
                .collect()
        }
        fn at(&self, idx: usize) -> Self {
            TestEl { nodes: self.nodes, idx }
        }
    }

    impl SelectorElement for TestEl<'_> {
        fn local_name(&self) -> &str {
            self.nodes[self.idx].0
        }
        fn id_attr(&self) -> Option<&str> {
            self.nodes[self.idx].1
        }
        fn has_class(&self, class: &str) -> bool {
            self.nodes[self.idx].2.contains(&class)
        }
        fn attr(&self, name: &str) -> Option<&str> {
            (name == "id").then(|| self.nodes[self.idx].1).flatten()
        }
        fn parent_element(&self) -> Option<Self> {
            self.nodes[self.idx].3.map(|p| self.at(p))
        }
        fn prev_sibling_element(&self) -> Option<Self> {
            let sibs = self.siblings();
            let pos = sibs.iter().position(|&i| i == self.idx)?;
            pos.checked_sub(1).map(|p| self.at(sibs[p]))
        }
        fn next_sibling_element(&self) -> Option<Self> {
            let sibs = self.siblings();
            let pos = sibs.iter().position(|&i| i == self.idx)?;
            sibs.get(pos + 1).map(|&i| self.at(i))
        }
        fn is_empty(&self) -> bool {
            !self.nodes.iter().any(|n| n.3 == Some(self.idx))
        }
    }

    const TREE: &[(&str, Option<&str>, &[&str], Option<usize>)] = &[
        ("div", None, &["slide-container"], None),
        ("div", Some("main"), &["slide-content", "dark"], Some(0)),
        ("h1", None, &["title"], Some(1)),
        ("p", None, &[], Some(1)),
        ("p", None, &["note"], Some(1)),
    ];

    fn el(idx: usize) -> TestEl<'static> {
        TestEl { nodes: TREE, idx }
    }

    #[test]
    fn specificity_counts_ids_classes_and_tags() {
        assert_eq!(Selector::parse("#main .title").unwrap().specificity(), Specificity(1, 1, 0));
        assert_eq!(Selector::parse("div > p.note").unwrap().specificity(), Specificity(0, 1, 2));
        assert_eq!(Selector::parse("p:not(.note)").unwrap().specificity(), Specificity(0, 1, 1));
        assert!(Specificity(0, 2, 0) > Specificity(0, 1, 5));
    }

    #[test]
    fn matches_descendant_and_child_combinators() {
        assert!(Selector::parse(".slide-container h1").unwrap().matches(&el(2)));
        assert!(Selector::parse(".slide-content > h1").unwrap().matches(&el(2)));
        assert!(!Selector::parse(".slide-container > h1").unwrap().matches(&el(2)));
        assert!(Selector::parse("div.dark p").unwrap().matches(&el(3)));
    }

    #[test]
    fn matches_sibling_combinators_and_structural_pseudos() {
        assert!(Selector::parse("h1 + p").unwrap().matches(&el(3)));
        assert!(!Selector::parse("h1 + p").unwrap().matches(&el(4)));
        assert!(Selector::parse("h1 ~ p").unwrap().matches(&el(4)));
        assert!(Selector::parse("p:last-child").unwrap().matches(&el(4)));
        assert!(Selector::parse("h1:first-child").unwrap().matches(&el(2)));
        assert!(Selector::parse(":nth-child(2n+1)").unwrap().matches(&el(4)));
        assert!(Selector::parse("p:not(.note)").unwrap().matches(&el(3)));
        assert!(!Selector::parse("p:not(.note)").unwrap().matches(&el(4)));
        assert!(Selector::parse(":root").unwrap().matches(&el(0)));
    }

    #[test]
    fn dynamic_pseudos_never_match() {
        assert!(!Selector::parse("p:hover").unwrap().matches(&el(3)));
        assert!(!Selector::parse("p::before").unwrap().matches(&el(3)));
    }

    #[test]
    fn parses_attribute_selectors() {
        let sel = Selector::parse("[id^='ma']").unwrap();
        assert!(sel.matches(&el(1)));
        let sel = Selector::parse("div[id=main]").unwrap();
        assert!(sel.matches(&el(1)));
        assert_eq!(sel.specificity(), Specificity(0, 1, 1));
    }

    #[test]
    fn invalid_member_invalidates_list() {
        assert!(SelectorList::parse("h1, p").is_ok());
        assert!(SelectorList::parse("h1, p >").is_err());
        let list = SelectorList::parse("p, .note").unwrap();
        assert_eq!(list.match_specificity(&el(4)), Some(Specificity(0, 1, 0)));
    }

    #[test]
    fn nth_formulas() {
        assert_eq!(parse_nth("odd"), Some((2, 1)));
        assert_eq!(parse_nth("-n+3"), Some((-1, 3)));
        assert_eq!(parse_nth("4"), Some((0, 4)));
        assert!(nth_matches(-1, 3, 2));
        assert!(!nth_matches(-1, 3, 4));
    }
}
