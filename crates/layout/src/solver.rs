//! Maps computed styles onto taffy styles.

use crate::tree::BoxContent;
use taffy::style::{Dimension, LengthPercentage, LengthPercentageAuto};
use vellum_style::computed::BoxSizing;
use vellum_style::{
    AlignItems, AlignSelf, ComputedStyle, Display, Edges, FlexDirection, FlexWrap, JustifyContent,
    Length, TextAlign,
};

pub fn computed_style_to_taffy(style: &ComputedStyle, content: &BoxContent) -> taffy::style::Style {
    let inline_flow = matches!(content, BoxContent::Container { inline_flow: true });
    let flex = inline_flow || style.display.is_flex_container();

    let mut taffy_style = taffy::style::Style {
        display: if flex { taffy::style::Display::Flex } else { taffy::style::Display::Block },
        box_sizing: match style.box_sizing {
            BoxSizing::BorderBox => taffy::style::BoxSizing::BorderBox,
            BoxSizing::ContentBox => taffy::style::BoxSizing::ContentBox,
        },
        position: if style.position.is_out_of_flow() {
            taffy::style::Position::Absolute
        } else {
            taffy::style::Position::Relative
        },
        inset: to_taffy_inset(style),
        size: taffy::geometry::Size {
            width: to_taffy_dimension(style.width),
            height: to_taffy_dimension(style.height),
        },
        min_size: taffy::geometry::Size {
            width: to_taffy_dimension(style.min_width),
            height: to_taffy_dimension(style.min_height),
        },
        max_size: taffy::geometry::Size {
            width: to_taffy_dimension(style.max_width),
            height: to_taffy_dimension(style.max_height),
        },
        margin: to_taffy_margin(&style.margin),
        padding: to_taffy_padding(&style.padding),
        border: to_taffy_border(&style.border_widths()),
        gap: taffy::geometry::Size {
            width: to_length_percentage(style.column_gap),
            height: to_length_percentage(style.row_gap),
        },
        align_items: to_taffy_align_items(style.align_items),
        align_self: to_taffy_align_self(style.align_self),
        justify_content: to_taffy_justify_content(style.justify_content),
        flex_direction: to_taffy_flex_direction(style.flex_direction),
        flex_wrap: to_taffy_flex_wrap(style.flex_wrap),
        flex_grow: style.flex_grow,
        flex_shrink: style.flex_shrink,
        flex_basis: to_taffy_dimension(style.flex_basis),
        ..Default::default()
    };

    if inline_flow {
        taffy_style.flex_direction = taffy::style::FlexDirection::Row;
        taffy_style.flex_wrap = taffy::style::FlexWrap::Wrap;
        taffy_style.align_items = Some(taffy::style::AlignItems::Baseline);
        taffy_style.justify_content = match style.text_align {
            TextAlign::Center => Some(taffy::style::JustifyContent::Center),
            TextAlign::Right => Some(taffy::style::JustifyContent::FlexEnd),
            _ => Some(taffy::style::JustifyContent::FlexStart),
        };
    }

    match style.display {
        // Row children share the row the way table cells do.
        Display::TableCell if style.width.is_auto() => {
            taffy_style.flex_grow = 1.0;
            taffy_style.flex_basis = Dimension::length(0.0);
        }
        Display::TableRow => taffy_style.flex_direction = taffy::style::FlexDirection::Row,
        _ => {}
    }

    if let BoxContent::Replaced { intrinsic } = content
        && intrinsic.width > 0.0
        && intrinsic.height > 0.0
    {
        let ratio = intrinsic.aspect_ratio();
        taffy_style.aspect_ratio = Some(ratio);
        match (style.width, style.height) {
            (Length::Auto, Length::Auto) => taffy_style.size.width = Dimension::length(intrinsic.width),
            (Length::Auto, Length::Px(h)) => taffy_style.size.width = Dimension::length(h * ratio),
            _ => {}
        }
    }

    taffy_style
}

pub fn to_taffy_dimension(d: Length) -> Dimension {
    match d {
        Length::Px(v) => Dimension::length(v),
        Length::Percent(v) => Dimension::percent(v / 100.0),
        _ => Dimension::auto(),
    }
}

fn to_length_percentage(d: Length) -> LengthPercentage {
    match d {
        Length::Percent(v) => LengthPercentage::percent(v / 100.0),
        other => LengthPercentage::length(other.px_or_zero()),
    }
}

fn to_length_percentage_auto(d: Length) -> LengthPercentageAuto {
    match d {
        Length::Px(v) => LengthPercentageAuto::length(v),
        Length::Percent(v) => LengthPercentageAuto::percent(v / 100.0),
        _ => LengthPercentageAuto::auto(),
    }
}

fn to_taffy_inset(style: &ComputedStyle) -> taffy::geometry::Rect<LengthPercentageAuto> {
    taffy::geometry::Rect {
        left: to_length_percentage_auto(style.inset.left),
        right: to_length_percentage_auto(style.inset.right),
        top: to_length_percentage_auto(style.inset.top),
        bottom: to_length_percentage_auto(style.inset.bottom),
    }
}

pub fn to_taffy_margin(m: &Edges<Length>) -> taffy::geometry::Rect<LengthPercentageAuto> {
    taffy::geometry::Rect {
        left: to_length_percentage_auto(m.left),
        right: to_length_percentage_auto(m.right),
        top: to_length_percentage_auto(m.top),
        bottom: to_length_percentage_auto(m.bottom),
    }
}

pub fn to_taffy_padding(m: &Edges<Length>) -> taffy::geometry::Rect<LengthPercentage> {
    taffy::geometry::Rect {
        left: to_length_percentage(m.left),
        right: to_length_percentage(m.right),
        top: to_length_percentage(m.top),
        bottom: to_length_percentage(m.bottom),
    }
}

pub fn to_taffy_border(b: &Edges<f32>) -> taffy::geometry::Rect<LengthPercentage> {
    taffy::geometry::Rect {
        left: LengthPercentage::length(b.left),
        right: LengthPercentage::length(b.right),
        top: LengthPercentage::length(b.top),
        bottom: LengthPercentage::length(b.bottom),
    }
}

pub fn to_taffy_align_items(a: AlignItems) -> Option<taffy::style::AlignItems> {
    match a {
        AlignItems::Stretch => Some(taffy::style::AlignItems::Stretch),
        AlignItems::FlexStart => Some(taffy::style::AlignItems::FlexStart),
        AlignItems::FlexEnd => Some(taffy::style::AlignItems::FlexEnd),
        AlignItems::Center => Some(taffy::style::AlignItems::Center),
        AlignItems::Baseline => Some(taffy::style::AlignItems::Baseline),
    }
}

pub fn to_taffy_align_self(a: AlignSelf) -> Option<taffy::style::AlignSelf> {
    match a {
        AlignSelf::Auto => None,
        AlignSelf::Stretch => Some(taffy::style::AlignSelf::Stretch),
        AlignSelf::FlexStart => Some(taffy::style::AlignSelf::FlexStart),
        AlignSelf::FlexEnd => Some(taffy::style::AlignSelf::FlexEnd),
        AlignSelf::Center => Some(taffy::style::AlignSelf::Center),
        AlignSelf::Baseline => Some(taffy::style::AlignSelf::Baseline),
    }
}

pub fn to_taffy_justify_content(j: JustifyContent) -> Option<taffy::style::JustifyContent> {
    match j {
        JustifyContent::FlexStart => Some(taffy::style::JustifyContent::FlexStart),
        JustifyContent::FlexEnd => Some(taffy::style::JustifyContent::FlexEnd),
        JustifyContent::Center => Some(taffy::style::JustifyContent::Center),
        JustifyContent::SpaceBetween => Some(taffy::style::JustifyContent::SpaceBetween),
        JustifyContent::SpaceAround => Some(taffy::style::JustifyContent::SpaceAround),
        JustifyContent::SpaceEvenly => Some(taffy::style::JustifyContent::SpaceEvenly),
    }
}

pub fn to_taffy_flex_direction(f: FlexDirection) -> taffy::style::FlexDirection {
    match f {
        FlexDirection::Row => taffy::style::FlexDirection::Row,
        FlexDirection::RowReverse => taffy::style::FlexDirection::RowReverse,
        FlexDirection::Column => taffy::style::FlexDirection::Column,
        FlexDirection::ColumnReverse => taffy::style::FlexDirection::ColumnReverse,
    }
}

pub fn to_taffy_flex_wrap(f: FlexWrap) -> taffy::style::FlexWrap {
    match f {
        FlexWrap::NoWrap => taffy::style::FlexWrap::NoWrap,
        FlexWrap::Wrap => taffy::style::FlexWrap::Wrap,
        FlexWrap::WrapReverse => taffy::style::FlexWrap::WrapReverse,
    }
}
