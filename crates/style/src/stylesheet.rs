//! Splits author CSS into rules, declarations and `@font-face` blocks.

use crate::font::{parse_font_family, FontStyle, FontWeight};
use crate::parsers::split_top_level;
use crate::selector::SelectorList;

#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    /// Lowercased, except for custom properties which are case-sensitive.
    pub property: String,
    pub value: String,
    pub important: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StyleRule {
    pub selectors: SelectorList,
    pub declarations: Vec<Declaration>,
    /// Every enclosing `@media` condition; all must hold.
    pub media: Vec<MediaQuery>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FontFaceRule {
    pub family: String,
    /// `url()` sources in preference order.
    pub sources: Vec<String>,
    pub weight: FontWeight,
    pub style: FontStyle,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stylesheet {
    pub rules: Vec<StyleRule>,
    pub font_faces: Vec<FontFaceRule>,
}

impl Stylesheet {
    pub fn parse(css: &str) -> Self {
        let mut sheet = Stylesheet::default();
        let cleaned = strip_comments(css);
        sheet.parse_rule_list(&cleaned, &[]);
        sheet
    }

    /// Appends another sheet, keeping source order.
    pub fn append(&mut self, other: Stylesheet) {
        self.rules.extend(other.rules);
        self.font_faces.extend(other.font_faces);
    }

    fn parse_rule_list(&mut self, mut rest: &str, media: &[MediaQuery]) {
        loop {
            rest = rest.trim_start();
            if rest.is_empty() {
                break;
            }
            let Some(block) = next_block(rest) else {
                log::debug!("Unterminated CSS rule dropped: {:.40}", rest);
                break;
            };
            match block {
                Block::Statement(end) => {
                    rest = &rest[end..];
                }
                Block::Braced { open, close } => {
                    let prelude = rest[..open].trim();
                    let body = &rest[open + 1..close];
                    rest = &rest[close + 1..];
                    if let Some(at_rule) = prelude.strip_prefix('@') {
                        self.parse_at_rule(at_rule, body, media);
                    } else {
                        self.parse_style_rule(prelude, body, media);
                    }
                }
            }
        }
    }

    fn parse_style_rule(&mut self, prelude: &str, body: &str, media: &[MediaQuery]) {
        match SelectorList::parse(prelude) {
            Ok(selectors) => self.rules.push(StyleRule {
                selectors,
                declarations: parse_declarations(body),
                media: media.to_vec(),
            }),
            Err(e) => log::debug!("Skipping rule '{}': {}", prelude, e),
        }
    }

    fn parse_at_rule(&mut self, at_rule: &str, body: &str, media: &[MediaQuery]) {
        let (name, prelude) = at_rule
            .split_once(|c: char| c.is_whitespace() || c == '(')
            .map(|(n, _)| (n, at_rule[n.len()..].trim()))
            .unwrap_or((at_rule, ""));
        match name.to_ascii_lowercase().as_str() {
            "media" => {
                let mut nested = media.to_vec();
                nested.push(MediaQuery::parse(prelude));
                self.parse_rule_list(body, &nested);
            }
            "supports" | "layer" | "container" => self.parse_rule_list(body, media),
            "font-face" => {
                if let Some(face) = parse_font_face(body) {
                    self.font_faces.push(face);
                }
            }
            other => log::debug!("Ignoring @{} block", other),
        }
    }
}

enum Block {
    /// A `;`-terminated statement such as `@import`; the index is past the `;`.
    Statement(usize),
    Braced { open: usize, close: usize },
}

/// Finds the extent of the next rule, honoring nested braces and strings.
fn next_block(input: &str) -> Option<Block> {
    let mut depth = 0usize;
    let mut open = None;
    let mut quote: Option<char> = None;
    for (i, c) in input.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            ';' if depth == 0 && input.starts_with('@') => return Some(Block::Statement(i + 1)),
            '{' => {
                if depth == 0 {
                    open = Some(i);
                }
                depth += 1;
            }
            '}' => {
                if depth == 0 {
                    // Stray closing brace: skip it.
                    return Some(Block::Statement(i + 1));
                }
                depth -= 1;
                if depth == 0 {
                    return open.map(|open| Block::Braced { open, close: i });
                }
            }
            _ => {}
        }
    }
    None
}

fn strip_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Parses a declaration block (or an inline `style` attribute).
pub fn parse_declarations(block: &str) -> Vec<Declaration> {
    split_top_level(block, ';')
        .into_iter()
        .filter_map(|decl| {
            let (property, value) = decl.split_once(':')?;
            let property = property.trim();
            if property.is_empty() {
                return None;
            }
            let mut value = value.trim();
            let mut important = false;
            if let Some(bang) = value.rfind('!')
                && value[bang + 1..].trim().eq_ignore_ascii_case("important")
            {
                important = true;
                value = value[..bang].trim_end();
            }
            if value.is_empty() {
                return None;
            }
            let property = if property.starts_with("--") {
                property.to_string()
            } else {
                property.to_ascii_lowercase()
            };
            Some(Declaration { property, value: value.to_string(), important })
        })
        .collect()
}

fn parse_font_face(body: &str) -> Option<FontFaceRule> {
    let mut family = None;
    let mut sources = Vec::new();
    let mut weight = FontWeight::Regular;
    let mut style = FontStyle::Normal;
    for decl in parse_declarations(body) {
        match decl.property.as_str() {
            "font-family" => family = parse_font_family(&decl.value).into_iter().next(),
            "src" => {
                sources = split_top_level(&decl.value, ',')
                    .into_iter()
                    .filter_map(|src| {
                        let src = src.trim();
                        let start = src.to_ascii_lowercase().find("url(")?;
                        let end = src[start..].find(')')? + start;
                        let url = src[start + 4..end].trim().trim_matches(|c| c == '"' || c == '\'');
                        (!url.is_empty()).then(|| url.to_string())
                    })
                    .collect();
            }
            "font-weight" => {
                // Variable fonts declare a range; the first bound is enough to register the face.
                let first = decl.value.split_whitespace().next().unwrap_or_default();
                weight = FontWeight::parse(first, FontWeight::Regular).unwrap_or_default();
            }
            "font-style" => style = FontStyle::from_keyword(&decl.value).unwrap_or_default(),
            _ => {}
        }
    }
    match family {
        Some(family) if !sources.is_empty() => Some(FontFaceRule { family, sources, weight, style }),
        _ => {
            log::debug!("Ignoring @font-face without family or url() source");
            None
        }
    }
}

/// One media query list; it matches when any alternative matches.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MediaQuery {
    alternatives: Vec<MediaAlternative>,
}

#[derive(Debug, Clone, PartialEq)]
struct MediaAlternative {
    negated: bool,
    media_type: Option<String>,
    features: Vec<(String, String)>,
}

impl MediaQuery {
    pub fn parse(prelude: &str) -> Self {
        let alternatives = split_top_level(prelude, ',')
            .into_iter()
            .map(|alt| {
                let mut negated = false;
                let mut media_type = None;
                let mut features = Vec::new();
                for part in alt.split(" and ").map(str::trim).filter(|p| !p.is_empty()) {
                    if let Some(feature) = part.strip_prefix('(').and_then(|p| p.strip_suffix(')')) {
                        let (name, value) = feature.split_once(':').unwrap_or((feature, ""));
                        features.push((name.trim().to_ascii_lowercase(), value.trim().to_string()));
                    } else {
                        let mut words = part.split_whitespace();
                        let mut word = words.next();
                        match word.map(str::to_ascii_lowercase).as_deref() {
                            Some("not") => {
                                negated = true;
                                word = words.next();
                            }
                            Some("only") => word = words.next(),
                            _ => {}
                        }
                        media_type = word.map(str::to_ascii_lowercase);
                    }
                }
                MediaAlternative { negated, media_type, features }
            })
            .collect();
        MediaQuery { alternatives }
    }

    /// Evaluates the query for a screen of the given size.
    pub fn matches(&self, width: f32, height: f32) -> bool {
        self.alternatives.is_empty() || self.alternatives.iter().any(|a| a.matches(width, height))
    }
}

impl MediaAlternative {
    fn matches(&self, width: f32, height: f32) -> bool {
        let type_ok = match self.media_type.as_deref() {
            None | Some("all") | Some("screen") => true,
            Some(_) => false,
        };
        let px = |v: &str| v.trim().trim_end_matches("px").trim().parse::<f32>().ok();
        let features_ok = self.features.iter().all(|(name, value)| match name.as_str() {
            "min-width" => px(value).is_some_and(|v| width >= v),
            "max-width" => px(value).is_some_and(|v| width <= v),
            "min-height" => px(value).is_some_and(|v| height >= v),
            "max-height" => px(value).is_some_and(|v| height <= v),
            "orientation" => match value.as_str() {
                "landscape" => width >= height,
                "portrait" => height > width,
                _ => false,
            },
            "prefers-color-scheme" => value == "light",
            "prefers-reduced-motion" => value == "no-preference",
            _ => false,
        });
        (type_ok && features_ok) != self.negated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rules_in_source_order() {
        let sheet = Stylesheet::parse(
            "/* theme */ body { margin: 0; } .title, h1 { color: #fff !important; font-size: 48px }",
        );
        assert_eq!(sheet.rules.len(), 2);
        let title = &sheet.rules[1];
        assert_eq!(title.selectors.0.len(), 2);
        assert_eq!(title.declarations[0].property, "color");
        assert!(title.declarations[0].important);
        assert_eq!(title.declarations[1].value, "48px");
    }

    #[test]
    fn keeps_semicolons_inside_urls() {
        let decls = parse_declarations(
            "background: url(data:image/png;base64,AAAA) no-repeat; color: red",
        );
        assert_eq!(decls.len(), 2);
        assert!(decls[0].value.contains("base64,AAAA"));
    }

    #[test]
    fn collects_font_faces() {
        let sheet = Stylesheet::parse(
            "@import url(x.css); @font-face { font-family: 'Brand Sans'; src: url('fonts/brand.woff2') format('woff2'), url(fonts/brand.ttf); font-weight: 700; }",
        );
        assert_eq!(sheet.font_faces.len(), 1);
        let face = &sheet.font_faces[0];
        assert_eq!(face.family, "Brand Sans");
        assert_eq!(face.sources, vec!["fonts/brand.woff2", "fonts/brand.ttf"]);
        assert_eq!(face.weight, FontWeight::Numeric(700));
    }

    #[test]
    fn media_rules_carry_their_condition() {
        let sheet = Stylesheet::parse(
            "@media (max-width: 768px) { .a { color: red } } @media screen and (min-width: 1024px) { .b { color: blue } } @media print { .c { color: green } }",
        );
        assert_eq!(sheet.rules.len(), 3);
        assert!(!sheet.rules[0].media[0].matches(1280.0, 720.0));
        assert!(sheet.rules[1].media[0].matches(1280.0, 720.0));
        assert!(!sheet.rules[2].media[0].matches(1280.0, 720.0));
        assert!(MediaQuery::parse("not print").matches(1280.0, 720.0));
    }

    #[test]
    fn skips_invalid_selectors_and_keyframes() {
        let sheet = Stylesheet::parse(
            "@keyframes spin { from { opacity: 0 } to { opacity: 1 } } p >> { color: red } p { color: blue }",
        );
        assert_eq!(sheet.rules.len(), 1);
        assert_eq!(sheet.rules[0].declarations[0].value, "blue");
    }

    #[test]
    fn custom_properties_keep_case() {
        let decls = parse_declarations("--Brand-Color: #123; COLOR: var(--Brand-Color)");
        assert_eq!(decls[0].property, "--Brand-Color");
        assert_eq!(decls[1].property, "color");
    }
}
