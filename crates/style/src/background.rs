//! Background images: gradients and `url()` references.

use crate::parsers::{parse_color, parse_f32, run_parser, split_top_level, split_whitespace_top_level};
use vellum_types::Color;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradientKind {
    /// CSS angle: 0deg points up, 90deg points right.
    Linear { angle_deg: f32 },
    Radial,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub color: Color,
    /// Position along the gradient line in `0.0..=1.0`, when given.
    pub offset: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BackgroundImage {
    Gradient { kind: GradientKind, stops: Vec<ColorStop> },
    Url(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackgroundSize {
    #[default]
    Auto,
    Cover,
    Contain,
}

impl BackgroundSize {
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s.trim() {
            "cover" => Some(Self::Cover),
            "contain" => Some(Self::Contain),
            "auto" | "auto auto" | "100% 100%" => Some(Self::Auto),
            _ => None,
        }
    }
}

impl BackgroundImage {
    /// Parses one `background-image` value. `none` yields `Ok(None)`.
    pub fn parse(value: &str) -> Result<Option<Self>, String> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("none") {
            return Ok(None);
        }
        // Only the top layer is kept when several are stacked.
        let first = split_top_level(value, ',')
            .into_iter()
            .next()
            .unwrap_or_default()
            .trim();
        parse_image(first).map(Some)
    }

    /// Evenly spread offsets for stops that were written without one.
    pub fn resolved_stops(stops: &[ColorStop]) -> Vec<(f32, Color)> {
        let n = stops.len();
        stops
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let fallback = if n > 1 { i as f32 / (n - 1) as f32 } else { 0.0 };
                (s.offset.unwrap_or(fallback).clamp(0.0, 1.0), s.color)
            })
            .collect()
    }
}

fn function_args<'a>(value: &'a str, name: &str) -> Option<&'a str> {
    let lower = value.to_ascii_lowercase();
    if !lower.starts_with(name) {
        return None;
    }
    let open = value.find('(')?;
    let close = value.rfind(')')?;
    (close > open).then(|| &value[open + 1..close])
}

fn parse_image(value: &str) -> Result<BackgroundImage, String> {
    if let Some(args) = function_args(value, "url") {
        let url = args.trim().trim_matches(|c| c == '"' || c == '\'').trim();
        if url.is_empty() {
            return Err("empty url()".to_string());
        }
        return Ok(BackgroundImage::Url(url.to_string()));
    }
    if let Some(args) = function_args(value, "linear-gradient")
        .or_else(|| function_args(value, "repeating-linear-gradient"))
    {
        return parse_linear(args);
    }
    if let Some(args) = function_args(value, "radial-gradient")
        .or_else(|| function_args(value, "repeating-radial-gradient"))
    {
        return parse_radial(args);
    }
    Err(format!("unsupported background image: {}", value))
}

fn parse_angle(raw: &str) -> Option<f32> {
    let raw = raw.trim().to_ascii_lowercase();
    if let Some(side) = raw.strip_prefix("to ") {
        let mut words: Vec<&str> = side.split_whitespace().collect();
        words.sort_unstable();
        return match words.as_slice() {
            ["top"] => Some(0.0),
            ["right"] => Some(90.0),
            ["bottom"] => Some(180.0),
            ["left"] => Some(270.0),
            ["right", "top"] => Some(45.0),
            ["bottom", "right"] => Some(135.0),
            ["bottom", "left"] => Some(225.0),
            ["left", "top"] => Some(315.0),
            _ => None,
        };
    }
    let (num, factor) = if let Some(n) = raw.strip_suffix("deg") {
        (n, 1.0)
    } else if let Some(n) = raw.strip_suffix("grad") {
        (n, 0.9)
    } else if let Some(n) = raw.strip_suffix("rad") {
        (n, 180.0 / std::f32::consts::PI)
    } else if let Some(n) = raw.strip_suffix("turn") {
        (n, 360.0)
    } else {
        return None;
    };
    run_parser(parse_f32, num).ok().map(|v| v * factor)
}

fn parse_stop(raw: &str) -> Option<ColorStop> {
    let parts = split_whitespace_top_level(raw.trim());
    let color = run_parser(parse_color, parts.first()?).ok()?;
    let offset = parts
        .get(1)
        .and_then(|p| p.strip_suffix('%'))
        .and_then(|p| p.parse::<f32>().ok())
        .map(|p| p / 100.0);
    Some(ColorStop { color, offset })
}

fn collect_stops(args: &[&str]) -> Result<Vec<ColorStop>, String> {
    let stops: Vec<ColorStop> = args.iter().filter_map(|a| parse_stop(a)).collect();
    if stops.is_empty() {
        return Err("gradient without color stops".to_string());
    }
    Ok(stops)
}

fn parse_linear(args: &str) -> Result<BackgroundImage, String> {
    let parts = split_top_level(args, ',');
    let (angle_deg, rest) = match parts.first().and_then(|p| parse_angle(p)) {
        Some(angle) => (angle, &parts[1..]),
        None => (180.0, &parts[..]),
    };
    Ok(BackgroundImage::Gradient {
        kind: GradientKind::Linear { angle_deg },
        stops: collect_stops(rest)?,
    })
}

fn parse_radial(args: &str) -> Result<BackgroundImage, String> {
    let parts = split_top_level(args, ',');
    // A leading shape/position clause has no color in first position.
    let rest = match parts.first() {
        Some(first) if parse_stop(first).is_none() => &parts[1..],
        _ => &parts[..],
    };
    Ok(BackgroundImage::Gradient { kind: GradientKind::Radial, stops: collect_stops(rest)? })
}

/// Splits the `background` shorthand into its color and image layers.
pub fn parse_background_shorthand(value: &str) -> (Option<Color>, Option<BackgroundImage>) {
    let layers = split_top_level(value, ',');
    let image = layers
        .first()
        .and_then(|layer| {
            split_whitespace_top_level(layer)
                .into_iter()
                .find(|tok| tok.contains('('))
                .filter(|tok| !tok.to_ascii_lowercase().starts_with("rgb") && !tok.to_ascii_lowercase().starts_with("hsl"))
        })
        .and_then(|tok| parse_image(tok).ok());
    // The color can only sit in the final layer.
    let color = layers.last().and_then(|layer| {
        split_whitespace_top_level(layer)
            .into_iter()
            .find_map(|tok| run_parser(parse_color, tok).ok())
    });
    (color, image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_linear_gradient_with_angle() {
        let img = BackgroundImage::parse("linear-gradient(135deg, #667eea 0%, #764ba2 100%)")
            .unwrap()
            .unwrap();
        match img {
            BackgroundImage::Gradient { kind: GradientKind::Linear { angle_deg }, stops } => {
                assert_eq!(angle_deg, 135.0);
                assert_eq!(stops.len(), 2);
                assert_eq!(stops[1].offset, Some(1.0));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn side_keywords_become_angles() {
        let img = BackgroundImage::parse("linear-gradient(to right, red, blue)").unwrap().unwrap();
        assert!(matches!(
            img,
            BackgroundImage::Gradient { kind: GradientKind::Linear { angle_deg }, .. } if angle_deg == 90.0
        ));
        let img = BackgroundImage::parse("linear-gradient(red, rgba(0,0,255,.5))").unwrap().unwrap();
        assert!(matches!(
            img,
            BackgroundImage::Gradient { kind: GradientKind::Linear { angle_deg }, ref stops } if angle_deg == 180.0 && stops.len() == 2
        ));
    }

    #[test]
    fn radial_skips_shape_clause() {
        let img = BackgroundImage::parse("radial-gradient(circle at center, #fff, #000)")
            .unwrap()
            .unwrap();
        assert!(matches!(
            img,
            BackgroundImage::Gradient { kind: GradientKind::Radial, ref stops } if stops.len() == 2
        ));
    }

    #[test]
    fn parses_url_and_none() {
        assert_eq!(
            BackgroundImage::parse("url('img/bg.jpg')").unwrap(),
            Some(BackgroundImage::Url("img/bg.jpg".to_string()))
        );
        assert_eq!(BackgroundImage::parse("none").unwrap(), None);
        assert!(BackgroundImage::parse("image-set(a.png 1x)").is_err());
    }

    #[test]
    fn shorthand_splits_color_and_image() {
        let (color, image) = parse_background_shorthand("#0f172a");
        assert_eq!(color, Some(Color::rgb(0x0f, 0x17, 0x2a)));
        assert!(image.is_none());

        let (color, image) =
            parse_background_shorthand("url(bg.png) no-repeat center / cover, rgb(10, 20, 30)");
        assert_eq!(color, Some(Color::rgb(10, 20, 30)));
        assert_eq!(image, Some(BackgroundImage::Url("bg.png".into())));

        let (color, image) = parse_background_shorthand("rgba(255,255,255,0.1)");
        assert_eq!(color, Some(Color::rgba(255, 255, 255, 0.1)));
        assert!(image.is_none());
    }

    #[test]
    fn unpositioned_stops_spread_evenly() {
        let stops = vec![
            ColorStop { color: Color::BLACK, offset: None },
            ColorStop { color: Color::WHITE, offset: None },
            ColorStop { color: Color::BLACK, offset: None },
        ];
        let resolved = BackgroundImage::resolved_stops(&stops);
        assert_eq!(resolved[1].0, 0.5);
    }
}
