//! Low-level nom parser functions for CSS values.
//!
//! Everything here works on a single declaration value. Splitting a sheet
//! into rules and declarations happens in `stylesheet`.

use crate::border::{BorderSide, BorderStyle};
use crate::color::named_color;
use crate::length::{Edges, Length};
use nom::branch::alt;
use nom::bytes::complete::{tag, tag_no_case, take_while1};
use nom::character::complete::{char, digit1, multispace0, multispace1, one_of};
use nom::combinator::{map, map_res, opt, recognize, value};
use nom::multi::separated_list1;
use nom::sequence::{delimited, preceded};
use nom::{IResult, Parser};
use thiserror::Error;
use vellum_types::Color;

/// Errors that can occur during style parsing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StyleParseError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid value for '{property}': {value}")]
    InvalidValue { property: String, value: String },

    #[error("Unsupported property: {0}")]
    UnsupportedProperty(String),
}

impl StyleParseError {
    pub fn invalid(property: &str, value: &str) -> Self {
        StyleParseError::InvalidValue {
            property: property.to_string(),
            value: value.to_string(),
        }
    }
}

type Error<'a> = nom::error::Error<&'a str>;

// --- Helper Parsers ---

pub(crate) fn ws<'a, O, F>(inner: F) -> impl Parser<&'a str, Output = O, Error = Error<'a>>
where
    F: Parser<&'a str, Output = O, Error = Error<'a>>,
{
    delimited(multispace0, inner, multispace0)
}

pub(crate) fn ident(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii())
        .parse(input)
}

/// Parses a CSS number: optional sign, digits with an optional fraction, or a bare fraction.
pub fn parse_f32(input: &str) -> IResult<&str, f32> {
    map_res(
        recognize((
            opt(one_of("+-")),
            alt((
                recognize((digit1, opt((char('.'), digit1)))),
                recognize((char('.'), digit1)),
            )),
        )),
        |s: &str| s.parse::<f32>(),
    )
    .parse(input)
}

// --- Length Parsers ---

fn parse_unit(input: &str) -> IResult<&str, fn(f32) -> Length> {
    alt((
        value(Length::Px as fn(f32) -> Length, tag_no_case("px")),
        value((|v: f32| Length::Px(v * 96.0 / 72.0)) as fn(f32) -> Length, tag_no_case("pt")),
        value(Length::Rem as fn(f32) -> Length, tag_no_case("rem")),
        value(Length::Em as fn(f32) -> Length, tag_no_case("em")),
        value(Length::Vw as fn(f32) -> Length, tag_no_case("vw")),
        value(Length::Vh as fn(f32) -> Length, tag_no_case("vh")),
        value((|v: f32| Length::Px(v * 96.0)) as fn(f32) -> Length, tag_no_case("in")),
        value((|v: f32| Length::Px(v * 96.0 / 2.54)) as fn(f32) -> Length, tag_no_case("cm")),
        value((|v: f32| Length::Px(v * 96.0 / 25.4)) as fn(f32) -> Length, tag_no_case("mm")),
        value(Length::Percent as fn(f32) -> Length, tag("%")),
    ))
    .parse(input)
}

/// Parses a length (`12px`, `1.5em`, `50%`, `auto`, unitless `0`).
pub fn parse_length(input: &str) -> IResult<&str, Length> {
    alt((
        value(Length::Auto, tag_no_case("auto")),
        map_res((parse_f32, opt(parse_unit)), |(v, unit)| match unit {
            Some(make) => Ok(make(v)),
            None if v == 0.0 => Ok(Length::Px(0.0)),
            None => Err(StyleParseError::invalid("length", "missing unit")),
        }),
    ))
    .parse(input)
}

/// Parses 1 to 4 whitespace-separated lengths into edges (CSS shorthand order).
pub fn parse_edges(input: &str) -> IResult<&str, Edges<Length>> {
    map_res(separated_list1(multispace1, parse_length), |parts| {
        Edges::from_shorthand(&parts)
            .ok_or_else(|| StyleParseError::invalid("shorthand", "expected 1 to 4 values"))
    })
    .parse(input)
}

// --- Color Parsers ---

fn hex_color(input: &str) -> IResult<&str, Color> {
    map_res(
        preceded(char('#'), take_while1(|c: char| c.is_ascii_hexdigit())),
        |hex: &str| Color::parse_hex(&format!("#{}", hex)),
    )
    .parse(input)
}

fn channel(raw: &str) -> Option<f32> {
    if let Some(pct) = raw.strip_suffix('%') {
        return pct.parse::<f32>().ok().map(|p| (p / 100.0 * 255.0).clamp(0.0, 255.0));
    }
    raw.parse::<f32>().ok().map(|v| v.clamp(0.0, 255.0))
}

fn alpha(raw: Option<&&str>) -> Option<f32> {
    match raw {
        None => Some(1.0),
        Some(raw) => match raw.strip_suffix('%') {
            Some(pct) => pct.parse::<f32>().ok().map(|p| p / 100.0),
            None => raw.parse::<f32>().ok(),
        }
        .map(|a| a.clamp(0.0, 1.0)),
    }
}

/// Splits the arguments of `rgb()`/`hsl()`, accepting both the comma and the
/// space-with-slash syntaxes.
fn function_args(body: &str) -> Vec<&str> {
    body.split([',', '/', ' '])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn function_body<'a>(name: &'static str) -> impl Parser<&'a str, Output = &'a str, Error = Error<'a>> {
    preceded(
        (tag_no_case(name), opt(tag_no_case("a")), multispace0),
        delimited(char('('), take_while1(|c: char| c != ')'), char(')')),
    )
}

fn rgb_color(input: &str) -> IResult<&str, Color> {
    map_res(function_body("rgb"), |body: &str| {
        let args = function_args(body);
        if args.len() < 3 {
            return Err(StyleParseError::invalid("color", body));
        }
        match (channel(args[0]), channel(args[1]), channel(args[2]), alpha(args.get(3))) {
            (Some(r), Some(g), Some(b), Some(a)) => {
                Ok(Color::rgba(r.round() as u8, g.round() as u8, b.round() as u8, a))
            }
            _ => Err(StyleParseError::invalid("color", body)),
        }
    })
    .parse(input)
}

fn hsl_color(input: &str) -> IResult<&str, Color> {
    map_res(function_body("hsl"), |body: &str| {
        let args = function_args(body);
        if args.len() < 3 {
            return Err(StyleParseError::invalid("color", body));
        }
        let hue = args[0].trim_end_matches("deg").parse::<f32>().ok();
        let pct = |s: &str| s.trim_end_matches('%').parse::<f32>().ok().map(|v| v / 100.0);
        match (hue, pct(args[1]), pct(args[2]), alpha(args.get(3))) {
            (Some(h), Some(s), Some(l), Some(a)) => Ok(hsl_to_rgb(h, s, l).with_alpha(a)),
            _ => Err(StyleParseError::invalid("color", body)),
        }
    })
    .parse(input)
}

fn named(input: &str) -> IResult<&str, Color> {
    map_res(ident, |name: &str| {
        named_color(name).ok_or_else(|| StyleParseError::invalid("color", name))
    })
    .parse(input)
}

/// Parses any CSS color: hex, `rgb[a]()`, `hsl[a]()`, named colors and `transparent`.
pub fn parse_color(input: &str) -> IResult<&str, Color> {
    alt((hex_color, rgb_color, hsl_color, named)).parse(input)
}

pub(crate) fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Color {
    let h = h.rem_euclid(360.0) / 360.0;
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);
    if s == 0.0 {
        let v = (l * 255.0).round() as u8;
        return Color::rgb(v, v, v);
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let hue = |mut t: f32| {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        let v = if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        };
        (v * 255.0).round() as u8
    };
    Color::rgb(hue(h + 1.0 / 3.0), hue(h), hue(h - 1.0 / 3.0))
}

// --- Border Parsers ---

/// Parses a border style keyword.
pub fn parse_border_style(input: &str) -> IResult<&str, BorderStyle> {
    alt((
        value(BorderStyle::Solid, tag_no_case("solid")),
        value(BorderStyle::Dashed, tag_no_case("dashed")),
        value(BorderStyle::Dotted, tag_no_case("dotted")),
        value(BorderStyle::Double, tag_no_case("double")),
        value(BorderStyle::Solid, tag_no_case("groove")),
        value(BorderStyle::Solid, tag_no_case("ridge")),
        value(BorderStyle::Solid, tag_no_case("inset")),
        value(BorderStyle::Solid, tag_no_case("outset")),
        value(BorderStyle::None, tag_no_case("none")),
        value(BorderStyle::None, tag_no_case("hidden")),
    ))
    .parse(input)
}

fn border_width(input: &str) -> IResult<&str, f32> {
    alt((
        value(1.0, tag_no_case("thin")),
        value(3.0, tag_no_case("medium")),
        value(5.0, tag_no_case("thick")),
        map_res(parse_length, |l| match l {
            Length::Px(px) => Ok(px),
            _ => Err(StyleParseError::invalid("border-width", "relative width")),
        }),
    ))
    .parse(input)
}

enum BorderPart {
    Width(f32),
    Style(BorderStyle),
    Color(Color),
}

/// Parses a border shorthand (`1px solid #ccc`) with its parts in any order.
///
/// Missing parts take their initial values: `medium` width, `none` style and
/// `currentcolor`, which the caller supplies.
pub fn parse_border(input: &str, current_color: Color) -> Result<BorderSide, StyleParseError> {
    let input = input.trim();
    if input.eq_ignore_ascii_case("none") || input == "0" {
        return Ok(BorderSide::default());
    }
    let part = alt((
        map(parse_border_style, BorderPart::Style),
        map(border_width, BorderPart::Width),
        map(parse_color, BorderPart::Color),
    ));
    let (rest, parts) = separated_list1(multispace1, part)
        .parse(input)
        .map_err(|e| StyleParseError::Parse(e.to_string()))?;
    if !rest.trim().is_empty() {
        return Err(StyleParseError::invalid("border", input));
    }

    let mut side = BorderSide {
        width: 3.0,
        style: BorderStyle::None,
        color: current_color,
    };
    for part in parts {
        match part {
            BorderPart::Width(w) => side.width = w,
            BorderPart::Style(s) => side.style = s,
            BorderPart::Color(c) => side.color = c,
        }
    }
    Ok(side)
}

/// Runs a nom parser over the whole (trimmed) input.
pub fn run_parser<'a, T, F>(parser: F, input: &'a str) -> Result<T, StyleParseError>
where
    F: Fn(&'a str) -> IResult<&'a str, T>,
{
    match parser(input.trim()) {
        Ok(("", result)) => Ok(result),
        Ok((rem, _)) => Err(StyleParseError::Parse(format!(
            "Parser did not consume all input. Remainder: '{}'",
            rem
        ))),
        Err(e) => Err(StyleParseError::Parse(e.to_string())),
    }
}

/// Splits a value on `sep` at nesting depth zero, leaving parenthesized
/// groups and quoted strings intact.
pub fn split_top_level(input: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, c) if c == sep && depth == 0 => {
                parts.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

/// Whitespace-splitting variant of [`split_top_level`].
pub fn split_whitespace_top_level(input: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start: Option<usize> = None;
    for (i, c) in input.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && depth == 0 => {
                if let Some(s) = start.take() {
                    parts.push(&input[s..i]);
                }
                continue;
            }
            _ => {}
        }
        if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        parts.push(&input[s..]);
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lengths_with_units() {
        assert_eq!(run_parser(parse_length, "12px").unwrap(), Length::Px(12.0));
        assert_eq!(run_parser(parse_length, "1.5em").unwrap(), Length::Em(1.5));
        assert_eq!(run_parser(parse_length, "2rem").unwrap(), Length::Rem(2.0));
        assert_eq!(run_parser(parse_length, "50%").unwrap(), Length::Percent(50.0));
        assert_eq!(run_parser(parse_length, "12pt").unwrap(), Length::Px(16.0));
        assert_eq!(run_parser(parse_length, "0").unwrap(), Length::Px(0.0));
        assert_eq!(run_parser(parse_length, "auto").unwrap(), Length::Auto);
        assert_eq!(run_parser(parse_length, "-.5em").unwrap(), Length::Em(-0.5));
        assert!(run_parser(parse_length, "12").is_err());
    }

    #[test]
    fn parses_edge_shorthands() {
        let edges = run_parser(parse_edges, "10px 20px").unwrap();
        assert_eq!(edges.top, Length::Px(10.0));
        assert_eq!(edges.right, Length::Px(20.0));
        assert_eq!(edges.bottom, Length::Px(10.0));
        assert_eq!(edges.left, Length::Px(20.0));

        let edges = run_parser(parse_edges, "1px 2px 3px").unwrap();
        assert_eq!(edges.left, Length::Px(2.0));
        assert_eq!(edges.bottom, Length::Px(3.0));
    }

    #[test]
    fn parses_color_notations() {
        assert_eq!(run_parser(parse_color, "#1e293b").unwrap(), Color::rgb(0x1e, 0x29, 0x3b));
        assert_eq!(run_parser(parse_color, "rgb(255, 0, 0)").unwrap(), Color::rgb(255, 0, 0));
        assert_eq!(
            run_parser(parse_color, "rgba(0, 0, 255, 0.5)").unwrap(),
            Color::rgba(0, 0, 255, 0.5)
        );
        assert_eq!(
            run_parser(parse_color, "rgb(0 128 0 / 50%)").unwrap(),
            Color::rgba(0, 128, 0, 0.5)
        );
        assert_eq!(run_parser(parse_color, "hsl(120, 100%, 50%)").unwrap(), Color::rgb(0, 255, 0));
        assert_eq!(run_parser(parse_color, "Navy").unwrap(), Color::rgb(0, 0, 128));
        assert!(run_parser(parse_color, "transparent").unwrap().is_transparent());
        assert!(run_parser(parse_color, "notacolor").is_err());
    }

    #[test]
    fn parses_border_shorthand_in_any_order() {
        let side = parse_border("2px solid #ff0000", Color::BLACK).unwrap();
        assert_eq!(side.width, 2.0);
        assert_eq!(side.style, BorderStyle::Solid);
        assert_eq!(side.color, Color::rgb(255, 0, 0));

        let side = parse_border("dashed red thin", Color::BLACK).unwrap();
        assert_eq!(side.width, 1.0);
        assert_eq!(side.style, BorderStyle::Dashed);

        let side = parse_border("solid", Color::WHITE).unwrap();
        assert_eq!(side.width, 3.0);
        assert_eq!(side.color, Color::WHITE);

        assert!(!parse_border("none", Color::BLACK).unwrap().is_visible());
    }

    #[test]
    fn top_level_split_respects_parentheses() {
        let parts = split_top_level("linear-gradient(90deg, red, blue), url(a.png)", ',');
        assert_eq!(parts.len(), 2);
        let parts = split_whitespace_top_level("url(a b.png) no-repeat  center");
        assert_eq!(parts, vec!["url(a b.png)", "no-repeat", "center"]);
    }
}
