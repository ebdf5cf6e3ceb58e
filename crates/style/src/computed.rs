//! Computed style for one element and the declaration application that
//! produces it.

use crate::background::{parse_background_shorthand, BackgroundImage, BackgroundSize};
use crate::border::{BorderSide, BorderStyle};
use crate::flex::{AlignItems, AlignSelf, FlexDirection, FlexWrap, JustifyContent};
use crate::font::{parse_font_family, FontStyle, FontWeight};
use crate::length::{Edges, Length, LengthContext, LineHeight};
use crate::list::ListStyleType;
use crate::parsers::{
    parse_border, parse_border_style, parse_color, parse_edges, parse_f32, parse_length,
    run_parser, split_whitespace_top_level, StyleParseError,
};
use crate::stylesheet::Declaration;
use crate::text::{TextAlign, TextDecoration, TextTransform, WhiteSpace};
use std::collections::BTreeMap;
use std::sync::Arc;
use vellum_types::{Color, Size};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Display {
    None,
    Block,
    #[default]
    Inline,
    InlineBlock,
    Flex,
    InlineFlex,
    Grid,
    ListItem,
    Contents,
    Table,
    TableRow,
    TableCell,
}

impl Display {
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Self::None),
            "block" | "flow-root" => Some(Self::Block),
            "inline" => Some(Self::Inline),
            "inline-block" => Some(Self::InlineBlock),
            "flex" => Some(Self::Flex),
            "inline-flex" => Some(Self::InlineFlex),
            "grid" | "inline-grid" => Some(Self::Grid),
            "list-item" => Some(Self::ListItem),
            "contents" => Some(Self::Contents),
            "table" | "inline-table" => Some(Self::Table),
            "table-row" => Some(Self::TableRow),
            "table-cell" => Some(Self::TableCell),
            "table-row-group" | "table-header-group" | "table-footer-group" => Some(Self::Block),
            _ => None,
        }
    }

    pub fn is_inline_level(&self) -> bool {
        matches!(self, Self::Inline)
    }

    pub fn is_flex_container(&self) -> bool {
        matches!(self, Self::Flex | Self::InlineFlex | Self::TableRow)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    #[default]
    Static,
    Relative,
    Absolute,
    Fixed,
    Sticky,
}

impl Position {
    /// Taken out of flow and placed by insets.
    pub fn is_out_of_flow(&self) -> bool {
        matches!(self, Self::Absolute | Self::Fixed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
    Collapse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoxSizing {
    #[default]
    ContentBox,
    BorderBox,
}

/// Viewport and root metrics for one cascade run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CascadeContext {
    pub viewport: Size,
    pub root_font_size: f32,
}

impl Default for CascadeContext {
    fn default() -> Self {
        Self { viewport: Size::new(1280.0, 720.0), root_font_size: ComputedStyle::DEFAULT_FONT_SIZE }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStyle {
    // Box
    pub display: Display,
    pub position: Position,
    pub inset: Edges<Length>,
    pub width: Length,
    pub height: Length,
    pub min_width: Length,
    pub min_height: Length,
    /// `Auto` stands for `none`.
    pub max_width: Length,
    pub max_height: Length,
    pub margin: Edges<Length>,
    pub padding: Edges<Length>,
    pub border: Edges<BorderSide>,
    pub border_radius: Length,
    pub box_sizing: BoxSizing,

    // Paint
    pub background_color: Color,
    pub background_image: Option<BackgroundImage>,
    pub background_size: BackgroundSize,
    pub opacity: f32,
    pub visibility: Visibility,

    // Text (inherited)
    pub color: Color,
    pub font_family: Vec<String>,
    /// Pixels.
    pub font_size: f32,
    pub font_weight: FontWeight,
    pub font_style: FontStyle,
    pub line_height: LineHeight,
    pub text_align: TextAlign,
    pub text_decoration: TextDecoration,
    pub text_transform: TextTransform,
    pub letter_spacing: f32,
    pub white_space: WhiteSpace,
    pub list_style_type: ListStyleType,

    // Flex
    pub flex_direction: FlexDirection,
    pub flex_wrap: FlexWrap,
    pub justify_content: JustifyContent,
    pub align_items: AlignItems,
    pub align_self: AlignSelf,
    pub flex_grow: f32,
    pub flex_shrink: f32,
    pub flex_basis: Length,
    pub row_gap: Length,
    pub column_gap: Length,

    /// `--name` values, inherited as a whole.
    pub custom_properties: Arc<BTreeMap<String, String>>,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: Display::Inline,
            position: Position::Static,
            inset: Edges::all(Length::Auto),
            width: Length::Auto,
            height: Length::Auto,
            min_width: Length::Auto,
            min_height: Length::Auto,
            max_width: Length::Auto,
            max_height: Length::Auto,
            margin: Edges::all(Length::zero()),
            padding: Edges::all(Length::zero()),
            border: Edges::all(BorderSide::default()),
            border_radius: Length::zero(),
            box_sizing: BoxSizing::ContentBox,
            background_color: Color::TRANSPARENT,
            background_image: None,
            background_size: BackgroundSize::Auto,
            opacity: 1.0,
            visibility: Visibility::Visible,
            color: Color::BLACK,
            font_family: vec!["serif".to_string()],
            font_size: Self::DEFAULT_FONT_SIZE,
            font_weight: FontWeight::Regular,
            font_style: FontStyle::Normal,
            line_height: LineHeight::Normal,
            text_align: TextAlign::Left,
            text_decoration: TextDecoration::default(),
            text_transform: TextTransform::None,
            letter_spacing: 0.0,
            white_space: WhiteSpace::Normal,
            list_style_type: ListStyleType::Disc,
            flex_direction: FlexDirection::Row,
            flex_wrap: FlexWrap::NoWrap,
            justify_content: JustifyContent::FlexStart,
            align_items: AlignItems::Stretch,
            align_self: AlignSelf::Auto,
            flex_grow: 0.0,
            flex_shrink: 1.0,
            flex_basis: Length::Auto,
            row_gap: Length::zero(),
            column_gap: Length::zero(),
            custom_properties: Arc::new(BTreeMap::new()),
        }
    }
}

impl ComputedStyle {
    pub const DEFAULT_FONT_SIZE: f32 = 16.0;

    /// Starting point for a child: inherited properties copied, the rest initial.
    pub fn inherit_from(parent: &ComputedStyle) -> Self {
        Self {
            color: parent.color,
            font_family: parent.font_family.clone(),
            font_size: parent.font_size,
            font_weight: parent.font_weight,
            font_style: parent.font_style,
            line_height: parent.line_height,
            text_align: parent.text_align,
            text_decoration: parent.text_decoration,
            text_transform: parent.text_transform,
            letter_spacing: parent.letter_spacing,
            white_space: parent.white_space,
            list_style_type: parent.list_style_type,
            visibility: parent.visibility,
            custom_properties: parent.custom_properties.clone(),
            ..Self::default()
        }
    }

    /// Computes an element's style from its winning declarations, already
    /// sorted by cascade order (lowest priority first).
    pub fn compute(
        parent: Option<&ComputedStyle>,
        declarations: &[&Declaration],
        ctx: &CascadeContext,
    ) -> Self {
        let initial = ComputedStyle::default();
        let parent_style = parent.unwrap_or(&initial);
        let mut style = match parent {
            Some(p) => Self::inherit_from(p),
            None => ComputedStyle::default(),
        };

        let custom: Vec<&&Declaration> =
            declarations.iter().filter(|d| d.property.starts_with("--")).collect();
        if !custom.is_empty() {
            let map = Arc::make_mut(&mut style.custom_properties);
            for decl in custom {
                map.insert(decl.property.clone(), decl.value.clone());
            }
        }

        let resolved: Vec<(&str, String)> = declarations
            .iter()
            .filter(|d| !d.property.starts_with("--"))
            .filter_map(|d| match substitute_vars(&d.value, &style.custom_properties, 0) {
                Some(value) => Some((d.property.as_str(), value)),
                None => {
                    log::debug!("Unresolvable var() in '{}: {}'", d.property, d.value);
                    None
                }
            })
            .collect();

        // font-size first, so em units resolve; color next, for currentcolor.
        let rank = |p: &str| match p {
            "font-size" | "font" => 0,
            "color" => 1,
            _ => 2,
        };
        for pass in 0..3 {
            for (property, value) in resolved.iter().filter(|(p, _)| rank(p) == pass) {
                let value = value.trim();
                let result = match value.to_ascii_lowercase().as_str() {
                    "inherit" => {
                        style.inherit_property(property, parent_style);
                        Ok(())
                    }
                    "initial" | "unset" | "revert" => {
                        style.inherit_property(property, &initial);
                        Ok(())
                    }
                    _ => style.apply(property, value, parent_style, ctx),
                };
                if let Err(e) = result {
                    log::debug!("Ignoring '{}: {}': {}", property, value, e);
                }
            }
        }
        style
    }

    fn length_context(&self, ctx: &CascadeContext) -> LengthContext {
        LengthContext {
            font_size: self.font_size,
            root_font_size: ctx.root_font_size,
            viewport_width: ctx.viewport.width,
            viewport_height: ctx.viewport.height,
        }
    }

    fn length(&self, value: &str, ctx: &CascadeContext) -> Result<Length, StyleParseError> {
        Ok(run_parser(parse_length, value)?.absolutize(&self.length_context(ctx)))
    }

    fn edges(&self, value: &str, ctx: &CascadeContext) -> Result<Edges<Length>, StyleParseError> {
        let lctx = self.length_context(ctx);
        Ok(run_parser(parse_edges, value)?.map(|l| l.absolutize(&lctx)))
    }

    fn color_value(&self, value: &str) -> Result<Color, StyleParseError> {
        if value.eq_ignore_ascii_case("currentcolor") {
            return Ok(self.color);
        }
        run_parser(parse_color, value)
    }

    fn border_sides(&mut self, sides: &str) -> Vec<&mut BorderSide> {
        match sides {
            "top" => vec![&mut self.border.top],
            "right" => vec![&mut self.border.right],
            "bottom" => vec![&mut self.border.bottom],
            "left" => vec![&mut self.border.left],
            _ => {
                let Edges { top, right, bottom, left } = &mut self.border;
                vec![top, right, bottom, left]
            }
        }
    }

    /// Applies one declaration. Errors leave the style untouched.
    pub fn apply(
        &mut self,
        property: &str,
        value: &str,
        parent: &ComputedStyle,
        ctx: &CascadeContext,
    ) -> Result<(), StyleParseError> {
        let keyword = value.to_ascii_lowercase();
        let invalid = || StyleParseError::invalid(property, value);
        match property {
            "display" => self.display = Display::from_keyword(&keyword).ok_or_else(invalid)?,
            "position" => {
                self.position = match keyword.as_str() {
                    "static" => Position::Static,
                    "relative" => Position::Relative,
                    "absolute" => Position::Absolute,
                    "fixed" => Position::Fixed,
                    "sticky" => Position::Sticky,
                    _ => return Err(invalid()),
                }
            }
            "top" => self.inset.top = self.length(value, ctx)?,
            "right" => self.inset.right = self.length(value, ctx)?,
            "bottom" => self.inset.bottom = self.length(value, ctx)?,
            "left" => self.inset.left = self.length(value, ctx)?,
            "inset" => self.inset = self.edges(value, ctx)?,
            "width" => self.width = self.length(value, ctx)?,
            "height" => self.height = self.length(value, ctx)?,
            "min-width" => self.min_width = self.length(value, ctx)?,
            "min-height" => self.min_height = self.length(value, ctx)?,
            "max-width" | "max-height" => {
                let l = if keyword == "none" { Length::Auto } else { self.length(value, ctx)? };
                if property == "max-width" {
                    self.max_width = l;
                } else {
                    self.max_height = l;
                }
            }
            "margin" => self.margin = self.edges(value, ctx)?,
            "margin-top" => self.margin.top = self.length(value, ctx)?,
            "margin-right" => self.margin.right = self.length(value, ctx)?,
            "margin-bottom" => self.margin.bottom = self.length(value, ctx)?,
            "margin-left" => self.margin.left = self.length(value, ctx)?,
            "padding" => self.padding = self.edges(value, ctx)?,
            "padding-top" => self.padding.top = self.length(value, ctx)?,
            "padding-right" => self.padding.right = self.length(value, ctx)?,
            "padding-bottom" => self.padding.bottom = self.length(value, ctx)?,
            "padding-left" => self.padding.left = self.length(value, ctx)?,
            "box-sizing" => {
                self.box_sizing = match keyword.as_str() {
                    "border-box" => BoxSizing::BorderBox,
                    "content-box" => BoxSizing::ContentBox,
                    _ => return Err(invalid()),
                }
            }
            "border" | "border-top" | "border-right" | "border-bottom" | "border-left" => {
                let side = parse_border(value, self.color)?;
                let which = property.strip_prefix("border-").unwrap_or("all");
                for s in self.border_sides(which) {
                    *s = side;
                }
            }
            "border-width" => {
                let widths = self.edges(value, ctx)?.map(|l| l.px_or_zero());
                self.border.top.width = widths.top;
                self.border.right.width = widths.right;
                self.border.bottom.width = widths.bottom;
                self.border.left.width = widths.left;
            }
            "border-style" => {
                let styles: Vec<BorderStyle> = value
                    .split_whitespace()
                    .map(|s| run_parser(parse_border_style, s))
                    .collect::<Result<_, _>>()?;
                let styles = Edges::from_shorthand(&styles).ok_or_else(invalid)?;
                self.border.top.style = styles.top;
                self.border.right.style = styles.right;
                self.border.bottom.style = styles.bottom;
                self.border.left.style = styles.left;
            }
            "border-color" => {
                let colors: Vec<Color> = split_whitespace_top_level(value)
                    .into_iter()
                    .map(|c| self.color_value(c))
                    .collect::<Result<_, _>>()?;
                let colors = Edges::from_shorthand(&colors).ok_or_else(invalid)?;
                self.border.top.color = colors.top;
                self.border.right.color = colors.right;
                self.border.bottom.color = colors.bottom;
                self.border.left.color = colors.left;
            }
            p if p.starts_with("border-") && p.ends_with("-radius") => {
                // Per-corner radii collapse onto one value; the first wins.
                if p == "border-radius" || self.border_radius == Length::zero() {
                    let first = value.split(['/', ' ']).find(|s| !s.is_empty()).unwrap_or("0");
                    self.border_radius = self.length(first, ctx)?;
                }
            }
            p if p.starts_with("border-") => {
                let mut parts = p.splitn(3, '-').skip(1);
                let (side, aspect) = (parts.next().unwrap_or_default(), parts.next().unwrap_or_default());
                match aspect {
                    "width" => {
                        let w = run_parser(parse_length, value)
                            .map(|l| l.absolutize(&self.length_context(ctx)).px_or_zero())
                            .or_else(|_| match keyword.as_str() {
                                "thin" => Ok(1.0),
                                "medium" => Ok(3.0),
                                "thick" => Ok(5.0),
                                _ => Err(invalid()),
                            })?;
                        for s in self.border_sides(side) {
                            s.width = w;
                        }
                    }
                    "style" => {
                        let st = run_parser(parse_border_style, value)?;
                        for s in self.border_sides(side) {
                            s.style = st;
                        }
                    }
                    "color" => {
                        let c = self.color_value(value)?;
                        for s in self.border_sides(side) {
                            s.color = c;
                        }
                    }
                    _ => return Err(StyleParseError::UnsupportedProperty(property.to_string())),
                }
            }
            "background" => {
                let (color, image) = parse_background_shorthand(value);
                if color.is_none() && image.is_none() && keyword != "none" && keyword != "transparent" {
                    return Err(invalid());
                }
                self.background_color = color.unwrap_or(Color::TRANSPARENT);
                self.background_image = image;
                if keyword.contains("cover") {
                    self.background_size = BackgroundSize::Cover;
                } else if keyword.contains("contain") {
                    self.background_size = BackgroundSize::Contain;
                }
            }
            "background-color" => self.background_color = self.color_value(value)?,
            "background-image" => {
                self.background_image =
                    BackgroundImage::parse(value).map_err(StyleParseError::Parse)?
            }
            "background-size" => {
                self.background_size = BackgroundSize::from_keyword(&keyword).ok_or_else(invalid)?
            }
            "opacity" => {
                let v = match keyword.strip_suffix('%') {
                    Some(pct) => run_parser(parse_f32, pct)? / 100.0,
                    None => run_parser(parse_f32, value)?,
                };
                self.opacity = v.clamp(0.0, 1.0);
            }
            "visibility" => {
                self.visibility = match keyword.as_str() {
                    "visible" => Visibility::Visible,
                    "hidden" => Visibility::Hidden,
                    "collapse" => Visibility::Collapse,
                    _ => return Err(invalid()),
                }
            }
            "color" => {
                self.color = if keyword == "currentcolor" {
                    parent.color
                } else {
                    run_parser(parse_color, value)?
                }
            }
            "font-family" => {
                let families = parse_font_family(value);
                if families.is_empty() {
                    return Err(invalid());
                }
                self.font_family = families;
            }
            "font-size" => self.font_size = self.font_size_value(&keyword, parent, ctx)?,
            "font-weight" => {
                self.font_weight = FontWeight::parse(value, parent.font_weight)
                    .map_err(StyleParseError::Parse)?
            }
            "font-style" => self.font_style = FontStyle::from_keyword(value).ok_or_else(invalid)?,
            "font" => self.apply_font_shorthand(value, parent, ctx)?,
            "line-height" => self.line_height = self.line_height_value(&keyword, ctx)?,
            "text-align" => self.text_align = TextAlign::from_keyword(value).ok_or_else(invalid)?,
            "text-decoration" | "text-decoration-line" => {
                // Decorations add up along the ancestor chain.
                let deco = TextDecoration::parse(value);
                self.text_decoration = if keyword.starts_with("none") {
                    TextDecoration::default()
                } else {
                    TextDecoration {
                        underline: deco.underline || parent.text_decoration.underline,
                        line_through: deco.line_through || parent.text_decoration.line_through,
                    }
                };
            }
            "text-transform" => {
                self.text_transform = TextTransform::from_keyword(value).ok_or_else(invalid)?
            }
            "letter-spacing" => {
                self.letter_spacing = if keyword == "normal" {
                    0.0
                } else {
                    self.length(value, ctx)?.px_or_zero()
                }
            }
            "white-space" => self.white_space = WhiteSpace::from_keyword(value).ok_or_else(invalid)?,
            "list-style-type" => {
                self.list_style_type = ListStyleType::from_keyword(value).ok_or_else(invalid)?
            }
            "list-style" => {
                if let Some(t) = value.split_whitespace().find_map(ListStyleType::from_keyword) {
                    self.list_style_type = t;
                }
            }
            "flex-direction" => {
                self.flex_direction = FlexDirection::from_keyword(&keyword).ok_or_else(invalid)?
            }
            "flex-wrap" => self.flex_wrap = FlexWrap::from_keyword(&keyword).ok_or_else(invalid)?,
            "flex-flow" => {
                for word in keyword.split_whitespace() {
                    if let Some(d) = FlexDirection::from_keyword(word) {
                        self.flex_direction = d;
                    } else if let Some(w) = FlexWrap::from_keyword(word) {
                        self.flex_wrap = w;
                    } else {
                        return Err(invalid());
                    }
                }
            }
            "justify-content" => {
                self.justify_content = JustifyContent::from_keyword(&keyword).ok_or_else(invalid)?
            }
            "align-items" => {
                self.align_items = AlignItems::from_keyword(&keyword).ok_or_else(invalid)?
            }
            "align-self" => self.align_self = AlignSelf::from_keyword(&keyword).ok_or_else(invalid)?,
            "flex-grow" => self.flex_grow = run_parser(parse_f32, value)?.max(0.0),
            "flex-shrink" => self.flex_shrink = run_parser(parse_f32, value)?.max(0.0),
            "flex-basis" => {
                self.flex_basis = if keyword == "content" { Length::Auto } else { self.length(value, ctx)? }
            }
            "flex" => self.apply_flex_shorthand(&keyword, ctx)?,
            "gap" | "grid-gap" => {
                let parts: Vec<Length> = value
                    .split_whitespace()
                    .map(|v| self.length(v, ctx))
                    .collect::<Result<_, _>>()?;
                match parts.as_slice() {
                    [both] => {
                        self.row_gap = *both;
                        self.column_gap = *both;
                    }
                    [row, col] => {
                        self.row_gap = *row;
                        self.column_gap = *col;
                    }
                    _ => return Err(invalid()),
                }
            }
            "row-gap" | "grid-row-gap" => self.row_gap = self.length(value, ctx)?,
            "column-gap" | "grid-column-gap" => self.column_gap = self.length(value, ctx)?,
            _ => return Err(StyleParseError::UnsupportedProperty(property.to_string())),
        }
        Ok(())
    }

    fn font_size_value(
        &self,
        keyword: &str,
        parent: &ComputedStyle,
        ctx: &CascadeContext,
    ) -> Result<f32, StyleParseError> {
        let size = match keyword {
            "xx-small" => 9.0,
            "x-small" => 10.0,
            "small" => 13.0,
            "medium" => 16.0,
            "large" => 18.0,
            "x-large" => 24.0,
            "xx-large" => 32.0,
            "xxx-large" => 48.0,
            "smaller" => parent.font_size / 1.2,
            "larger" => parent.font_size * 1.2,
            _ => {
                let lctx = LengthContext { font_size: parent.font_size, ..self.length_context(ctx) };
                match run_parser(parse_length, keyword)?.absolutize(&lctx) {
                    Length::Px(px) => px,
                    Length::Percent(p) => parent.font_size * p / 100.0,
                    _ => return Err(StyleParseError::invalid("font-size", keyword)),
                }
            }
        };
        Ok(size.max(0.0))
    }

    fn line_height_value(&self, keyword: &str, ctx: &CascadeContext) -> Result<LineHeight, StyleParseError> {
        if keyword == "normal" {
            return Ok(LineHeight::Normal);
        }
        if let Ok(multiple) = run_parser(parse_f32, keyword) {
            return Ok(LineHeight::Multiple(multiple));
        }
        match self.length(keyword, ctx)? {
            Length::Px(px) => Ok(LineHeight::Px(px)),
            Length::Percent(p) => Ok(LineHeight::Px(self.font_size * p / 100.0)),
            _ => Err(StyleParseError::invalid("line-height", keyword)),
        }
    }

    /// `font: [style] [weight] size[/line-height] family`
    fn apply_font_shorthand(
        &mut self,
        value: &str,
        parent: &ComputedStyle,
        ctx: &CascadeContext,
    ) -> Result<(), StyleParseError> {
        let mut rest = value.trim();
        let mut size_found = false;
        while let Some(token) = rest.split_whitespace().next() {
            let lower = token.to_ascii_lowercase();
            rest = rest[token.len()..].trim_start();
            if let Some(style) = FontStyle::from_keyword(&lower).filter(|_| lower != "normal") {
                self.font_style = style;
                continue;
            }
            if lower != "normal" && let Ok(weight) = FontWeight::parse(&lower, parent.font_weight) {
                self.font_weight = weight;
                continue;
            }
            if matches!(lower.as_str(), "normal" | "small-caps") {
                continue;
            }
            let (size, line_height) = match lower.split_once('/') {
                Some((s, lh)) => (s, Some(lh)),
                None => (lower.as_str(), None),
            };
            self.font_size = self.font_size_value(size, parent, ctx)?;
            if let Some(lh) = line_height {
                self.line_height = self.line_height_value(lh, ctx)?;
            }
            size_found = true;
            break;
        }
        let families = parse_font_family(rest);
        if !size_found || families.is_empty() {
            return Err(StyleParseError::invalid("font", value));
        }
        self.font_family = families;
        Ok(())
    }

    fn apply_flex_shorthand(&mut self, keyword: &str, ctx: &CascadeContext) -> Result<(), StyleParseError> {
        let (grow, shrink, basis) = match keyword {
            "none" => (0.0, 0.0, Length::Auto),
            "auto" => (1.0, 1.0, Length::Auto),
            "initial" => (0.0, 1.0, Length::Auto),
            _ => {
                let parts: Vec<&str> = keyword.split_whitespace().collect();
                let number = |s: &str| run_parser(parse_f32, s);
                match parts.as_slice() {
                    [one] => match number(one) {
                        Ok(g) => (g, 1.0, Length::Percent(0.0)),
                        Err(_) => (1.0, 1.0, self.length(one, ctx)?),
                    },
                    [g, second] => match number(second) {
                        Ok(s) => (number(g)?, s, Length::Percent(0.0)),
                        Err(_) => (number(g)?, 1.0, self.length(second, ctx)?),
                    },
                    [g, s, b] => (number(g)?, number(s)?, self.length(b, ctx)?),
                    _ => return Err(StyleParseError::invalid("flex", keyword)),
                }
            }
        };
        self.flex_grow = grow.max(0.0);
        self.flex_shrink = shrink.max(0.0);
        self.flex_basis = basis;
        Ok(())
    }

    /// Copies one property's value from `source` (`inherit`/`initial`).
    fn inherit_property(&mut self, property: &str, source: &ComputedStyle) {
        match property {
            "color" => self.color = source.color,
            "font-family" => self.font_family = source.font_family.clone(),
            "font-size" => self.font_size = source.font_size,
            "font-weight" => self.font_weight = source.font_weight,
            "font-style" => self.font_style = source.font_style,
            "line-height" => self.line_height = source.line_height,
            "text-align" => self.text_align = source.text_align,
            "text-transform" => self.text_transform = source.text_transform,
            "text-decoration" | "text-decoration-line" => self.text_decoration = source.text_decoration,
            "white-space" => self.white_space = source.white_space,
            "background" | "background-color" => {
                self.background_color = source.background_color;
                if property == "background" {
                    self.background_image = source.background_image.clone();
                }
            }
            "background-image" => self.background_image = source.background_image.clone(),
            "display" => self.display = source.display,
            "visibility" => self.visibility = source.visibility,
            "opacity" => self.opacity = source.opacity,
            "width" => self.width = source.width,
            "height" => self.height = source.height,
            "margin" => self.margin = source.margin,
            "padding" => self.padding = source.padding,
            "border" => self.border = source.border,
            "border-color" => {
                for (dst, src) in [
                    (&mut self.border.top, &source.border.top),
                    (&mut self.border.right, &source.border.right),
                    (&mut self.border.bottom, &source.border.bottom),
                    (&mut self.border.left, &source.border.left),
                ] {
                    dst.color = src.color;
                }
            }
            other => log::debug!("'inherit'/'initial' not supported for {}", other),
        }
    }

    // --- Queries used by layout and mapping ---

    pub fn is_hidden(&self) -> bool {
        self.display == Display::None || self.visibility != Visibility::Visible
    }

    pub fn has_visible_border(&self) -> bool {
        self.border.top.is_visible()
            || self.border.right.is_visible()
            || self.border.bottom.is_visible()
            || self.border.left.is_visible()
    }

    pub fn has_background_color(&self) -> bool {
        !self.background_color.is_transparent()
    }

    pub fn line_height_px(&self) -> f32 {
        self.line_height.to_px(self.font_size)
    }

    pub fn border_widths(&self) -> Edges<f32> {
        Edges {
            top: self.border.top.used_width(),
            right: self.border.right.used_width(),
            bottom: self.border.bottom.used_width(),
            left: self.border.left.used_width(),
        }
    }

    /// Padding in pixels; percentages resolve against the containing block width.
    pub fn padding_px(&self, containing_width: f32) -> Edges<f32> {
        self.padding.map(|l| l.resolve(containing_width).unwrap_or(0.0))
    }
}

/// Expands `var(--name[, fallback])`. Returns `None` when a variable is
/// undefined and has no fallback.
pub fn substitute_vars(value: &str, vars: &BTreeMap<String, String>, depth: usize) -> Option<String> {
    if depth > 8 {
        return None;
    }
    let Some(start) = value.find("var(") else {
        return Some(value.to_string());
    };
    let body_start = start + 4;
    let mut level = 1usize;
    let mut end = None;
    for (i, c) in value[body_start..].char_indices() {
        match c {
            '(' => level += 1,
            ')' => {
                level -= 1;
                if level == 0 {
                    end = Some(body_start + i);
                    break;
                }
            }
            _ => {}
        }
    }
    let end = end?;
    let body = &value[body_start..end];
    let (name, fallback) = match body.split_once(',') {
        Some((n, f)) => (n.trim(), Some(f.trim())),
        None => (body.trim(), None),
    };
    let replacement = match vars.get(name) {
        Some(v) => substitute_vars(v, vars, depth + 1)?,
        None => substitute_vars(fallback?, vars, depth + 1)?,
    };
    let tail = substitute_vars(&value[end + 1..], vars, depth)?;
    Some(format!("{}{}{}", &value[..start], replacement, tail))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stylesheet::parse_declarations;

    fn compute(parent: Option<&ComputedStyle>, css: &str) -> ComputedStyle {
        let decls = parse_declarations(css);
        let refs: Vec<&Declaration> = decls.iter().collect();
        ComputedStyle::compute(parent, &refs, &CascadeContext::default())
    }

    #[test]
    fn em_units_follow_own_font_size() {
        let style = compute(None, "padding: 1em 2em; font-size: 20px; width: 10em");
        assert_eq!(style.font_size, 20.0);
        assert_eq!(style.padding.top, Length::Px(20.0));
        assert_eq!(style.padding.left, Length::Px(40.0));
        assert_eq!(style.width, Length::Px(200.0));
    }

    #[test]
    fn font_size_em_uses_parent_size() {
        let parent = compute(None, "font-size: 20px");
        let child = compute(Some(&parent), "font-size: 1.5em");
        assert_eq!(child.font_size, 30.0);
        let child = compute(Some(&parent), "font-size: 50%");
        assert_eq!(child.font_size, 10.0);
    }

    #[test]
    fn inherited_and_reset_properties() {
        let parent = compute(None, "color: #ff0000; background: #00ff00; font-weight: bold");
        let child = compute(Some(&parent), "");
        assert_eq!(child.color, Color::rgb(255, 0, 0));
        assert!(child.font_weight.is_bold());
        assert!(child.background_color.is_transparent());
    }

    #[test]
    fn later_declarations_win_and_invalid_ones_are_ignored() {
        let style = compute(None, "color: red; color: blue; color: bogus");
        assert_eq!(style.color, Color::rgb(0, 0, 255));
    }

    #[test]
    fn currentcolor_borders_use_final_color() {
        let style = compute(None, "border: 2px solid; color: #123456");
        assert_eq!(style.border.left.color, Color::rgb(0x12, 0x34, 0x56));
        assert!(style.has_visible_border());
        assert_eq!(style.border_widths().horizontal(), 4.0);
    }

    #[test]
    fn custom_properties_substitute() {
        let root = compute(None, "--brand: #0ea5e9; --pad: 24px");
        let child = compute(Some(&root), "background-color: var(--brand); padding: var(--pad) 0; color: var(--missing, white)");
        assert_eq!(child.background_color, Color::rgb(0x0e, 0xa5, 0xe9));
        assert_eq!(child.padding.top, Length::Px(24.0));
        assert_eq!(child.color, Color::WHITE);
    }

    #[test]
    fn font_shorthand_sets_size_family_and_weight() {
        let style = compute(None, "font: italic 700 24px/1.5 'Inter', sans-serif");
        assert_eq!(style.font_size, 24.0);
        assert_eq!(style.line_height, LineHeight::Multiple(1.5));
        assert_eq!(style.font_family, vec!["Inter", "sans-serif"]);
        assert!(style.font_style.is_italic());
        assert!(style.font_weight.is_bold());
    }

    #[test]
    fn flex_shorthand_variants() {
        let style = compute(None, "flex: 1");
        assert_eq!((style.flex_grow, style.flex_shrink, style.flex_basis), (1.0, 1.0, Length::Percent(0.0)));
        let style = compute(None, "flex: 0 0 200px");
        assert_eq!(style.flex_basis, Length::Px(200.0));
        let style = compute(None, "flex: none");
        assert_eq!(style.flex_shrink, 0.0);
    }

    #[test]
    fn text_decoration_accumulates() {
        let parent = compute(None, "text-decoration: underline");
        let child = compute(Some(&parent), "text-decoration: line-through");
        assert!(child.text_decoration.underline);
        assert!(child.text_decoration.line_through);
    }

    #[test]
    fn background_gradient_keeps_no_color() {
        let style = compute(None, "background: linear-gradient(135deg, #667eea, #764ba2)");
        assert!(style.background_color.is_transparent());
        assert!(matches!(style.background_image, Some(BackgroundImage::Gradient { .. })));
    }

    #[test]
    fn hidden_queries() {
        assert!(compute(None, "display: none").is_hidden());
        assert!(compute(None, "visibility: hidden").is_hidden());
        assert!(!compute(None, "display: block").is_hidden());
    }
}
