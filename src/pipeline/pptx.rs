//! Editable presentation export: map each slide, convert to EMU, package.

use crate::config::ExportOptions;
use crate::error::ExportError;
use crate::mapper::{
    map_slide, MappedBackground, MappedSlide, Primitive, ShapeBorder, TextParagraph, TextPrimitive, TextRunSpec,
};
use vellum_host::RenderHost;
use vellum_raster::{ImageFormat, RasterImage};
use vellum_render_pptx::{
    write_package, Bullet, ChartFrame, Frame, LineDash, LineStyle, Paragraph, Picture, PictureFormat, Presentation,
    RectShape, Shape, SlideBackground, SlideModel, TextAlign, TextBox, TextRun,
};
use vellum_style::{BorderStyle, TextAlign as CssTextAlign};
use vellum_types::units::px_to_emu;
use vellum_types::{Rect, SlideRecord};

/// Loads, maps and closes every slide in order, then writes the package.
pub(crate) async fn build_pptx(
    host: &dyn RenderHost,
    slides: &[SlideRecord],
    options: &ExportOptions,
) -> Result<Vec<u8>, ExportError> {
    let config = options.host_config();
    let size = (px_to_emu(options.canvas.width), px_to_emu(options.canvas.height));
    let title = slides.first().and_then(|s| s.title.clone()).unwrap_or_else(|| options.file_name.clone());
    let mut presentation = Presentation::new(size).with_title(title);

    for slide in slides {
        let ctx = host.load(slide, &config).await?;
        let mapped = map_slide(&ctx, options);
        ctx.close();
        let mapped = mapped?;
        log::debug!("Slide {} carries {} shape(s)", slide.index, mapped.primitives.len());
        presentation.add_slide(slide_model(mapped));
    }

    Ok(write_package(&presentation)?)
}

/// Converts one mapped slide into the package model.
pub fn slide_model(mapped: MappedSlide) -> SlideModel {
    let background = match mapped.background {
        MappedBackground::Solid(color) => SlideBackground::Solid(color),
        MappedBackground::Picture(image) => {
            SlideBackground::Picture { format: picture_format(&image), data: image.data }
        }
        MappedBackground::None => SlideBackground::None,
    };
    let shapes = mapped.primitives.into_iter().map(shape).collect();
    SlideModel { background, shapes }
}

fn shape(primitive: Primitive) -> Shape {
    match primitive {
        Primitive::Text(text) => Shape::Text(text_box(text)),
        Primitive::Shape(rect) => Shape::Rect(RectShape {
            frame: frame(rect.frame),
            fill: rect.fill,
            line: rect.border.map(line_style),
            corner_radius: px_to_emu(rect.radius_px),
        }),
        Primitive::Image(image) => Shape::Picture(Picture {
            frame: frame(image.frame),
            format: picture_format(&image.image),
            data: image.image.data,
            description: image.description,
        }),
        Primitive::Chart(chart) => Shape::Chart(ChartFrame { frame: frame(chart.frame), chart: chart.chart }),
    }
}

fn frame(rect: Rect) -> Frame {
    Frame::new(px_to_emu(rect.x), px_to_emu(rect.y), px_to_emu(rect.width), px_to_emu(rect.height))
}

fn text_box(text: TextPrimitive) -> TextBox {
    let align = match text.align {
        CssTextAlign::Left => TextAlign::Left,
        CssTextAlign::Center => TextAlign::Center,
        CssTextAlign::Right => TextAlign::Right,
        CssTextAlign::Justify => TextAlign::Justify,
    };
    let paragraphs = text
        .paragraphs
        .into_iter()
        .map(|p| paragraph(p, align, text.line_spacing))
        .collect();
    TextBox { frame: frame(text.frame), paragraphs, insets: text.insets.map(px_to_emu), wrap: text.wrap }
}

fn paragraph(p: TextParagraph, align: TextAlign, line_spacing: Option<f32>) -> Paragraph {
    Paragraph {
        bullet: p.bullet.as_deref().map(bullet),
        runs: p.runs.into_iter().map(run).collect(),
        align,
        line_spacing,
    }
}

fn run(spec: TextRunSpec) -> TextRun {
    TextRun {
        text: spec.text,
        font: spec.font,
        size_pt: spec.size_pt,
        bold: spec.bold,
        italic: spec.italic,
        underline: spec.underline,
        strike: spec.strike,
        color: spec.color,
    }
}

/// `3.` numbers from 3, `c.` letters from c; anything else is a literal glyph.
fn bullet(marker: &str) -> Bullet {
    let marker = marker.trim();
    if let Some(body) = marker.strip_suffix('.') {
        if let Ok(start) = body.parse::<usize>() {
            return Bullet::AutoNumber { scheme: "arabicPeriod", start: start.max(1) };
        }
        let mut chars = body.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if c.is_ascii_lowercase() {
                return Bullet::AutoNumber { scheme: "alphaLcPeriod", start: (c as u8 - b'a') as usize + 1 };
            }
            if c.is_ascii_uppercase() {
                return Bullet::AutoNumber { scheme: "alphaUcPeriod", start: (c as u8 - b'A') as usize + 1 };
            }
        }
    }
    Bullet::Char(marker.to_string())
}

fn line_style(border: ShapeBorder) -> LineStyle {
    let dash = match border.style {
        BorderStyle::Dashed => LineDash::Dash,
        BorderStyle::Dotted => LineDash::Dot,
        _ => LineDash::Solid,
    };
    LineStyle { color: border.color, width: px_to_emu(border.width_px), dash }
}

fn picture_format(image: &RasterImage) -> PictureFormat {
    match image.format {
        ImageFormat::Png => PictureFormat::Png,
        ImageFormat::Jpeg { .. } => PictureFormat::Jpeg,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::ShapePrimitive;
    use vellum_types::Color;

    #[test]
    fn markers_become_auto_numbers() {
        assert_eq!(bullet("3."), Bullet::AutoNumber { scheme: "arabicPeriod", start: 3 });
        assert_eq!(bullet("c."), Bullet::AutoNumber { scheme: "alphaLcPeriod", start: 3 });
        assert_eq!(bullet("B."), Bullet::AutoNumber { scheme: "alphaUcPeriod", start: 2 });
        assert_eq!(bullet("\u{2022}"), Bullet::Char("\u{2022}".into()));
        assert_eq!(bullet("ab."), Bullet::Char("ab.".into()));
    }

    #[test]
    fn frames_convert_to_emu() {
        let f = frame(Rect::new(10.0, 20.0, 96.0, -5.0));
        assert_eq!(f, Frame { x: 95_250, y: 190_500, cx: 914_400, cy: 0 });
    }

    #[test]
    fn shapes_keep_fill_border_and_radius() {
        let mapped = MappedSlide {
            background: MappedBackground::Solid(Color::rgb(0x1e, 0x3a, 0x8a)),
            primitives: vec![Primitive::Shape(ShapePrimitive {
                frame: Rect::new(0.0, 0.0, 100.0, 50.0),
                fill: Some(Color::WHITE),
                border: Some(ShapeBorder { color: Color::BLACK, width_px: 2.0, style: BorderStyle::Dashed }),
                radius_px: 8.0,
            })],
        };
        let model = slide_model(mapped);
        assert_eq!(model.background, SlideBackground::Solid(Color::rgb(0x1e, 0x3a, 0x8a)));
        let Shape::Rect(rect) = &model.shapes[0] else { panic!("expected a rectangle") };
        assert_eq!(rect.fill, Some(Color::WHITE));
        assert_eq!(rect.corner_radius, 76_200);
        let line = rect.line.unwrap();
        assert_eq!(line.dash, LineDash::Dash);
        assert_eq!(line.width, 19_050);
    }
}
