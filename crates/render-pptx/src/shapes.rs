//! Slide XML: background, text boxes, rectangles, pictures and chart frames.

use crate::model::{
    Bullet, ChartFrame, Frame, LineDash, LineStyle, Paragraph, Picture, RectShape, Shape, SlideBackground, SlideModel,
    TextBox, TextRun,
};
use crate::Result;
use std::fmt::Write as FmtWrite;
use vellum_types::units::pt_to_centipoints;
use vellum_types::{escape_xml, Color};

const NS_DECLS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;
const CHART_URI: &str = "http://schemas.openxmlformats.org/drawingml/2006/chart";

/// Writes one slide part.
///
/// `rel_ids` runs parallel to `slide.shapes` and carries the relationship id
/// of every picture and chart. `background_rel` is the id of a picture
/// background, if any.
pub fn slide_xml(slide: &SlideModel, rel_ids: &[Option<String>], background_rel: Option<&str>) -> Result<String> {
    let mut xml = String::with_capacity(4096);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    write!(xml, "<p:sld {NS_DECLS}>")?;
    xml.push_str("<p:cSld>");
    write_background(&mut xml, &slide.background, background_rel)?;
    xml.push_str("<p:spTree>");
    xml.push_str(r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#);
    xml.push_str(r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#);

    // Id 1 is the group; shapes start at 2.
    for (i, shape) in slide.shapes.iter().enumerate() {
        let id = i + 2;
        let rel = rel_ids.get(i).and_then(|r| r.as_deref());
        match shape {
            Shape::Text(text) => write_text_box(&mut xml, id, text)?,
            Shape::Rect(rect) => write_rect(&mut xml, id, rect)?,
            Shape::Picture(picture) => match rel {
                Some(rel) => write_picture(&mut xml, id, picture, rel)?,
                None => log::warn!("Picture shape {} has no relationship, skipped", id),
            },
            Shape::Chart(chart) => match rel {
                Some(rel) => write_chart_frame(&mut xml, id, chart, rel)?,
                None => log::warn!("Chart shape {} has no relationship, skipped", id),
            },
        }
    }

    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
    xml.push_str("</p:sld>");
    Ok(xml)
}

fn write_background(xml: &mut String, background: &SlideBackground, rel: Option<&str>) -> Result<()> {
    match (background, rel) {
        (SlideBackground::Solid(color), _) => {
            xml.push_str("<p:bg><p:bgPr>");
            write_solid_fill(xml, *color)?;
            xml.push_str("<a:effectLst/></p:bgPr></p:bg>");
        }
        (SlideBackground::Picture { .. }, Some(rel)) => {
            write!(
                xml,
                r#"<p:bg><p:bgPr><a:blipFill dpi="0" rotWithShape="1"><a:blip r:embed="{rel}"/><a:srcRect/><a:stretch><a:fillRect/></a:stretch></a:blipFill><a:effectLst/></p:bgPr></p:bg>"#
            )?;
        }
        _ => {}
    }
    Ok(())
}

fn write_xfrm(xml: &mut String, frame: &Frame) -> Result<()> {
    write!(
        xml,
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        frame.x, frame.y, frame.cx, frame.cy
    )?;
    Ok(())
}

fn write_color(xml: &mut String, color: Color) -> Result<()> {
    if color.is_opaque() {
        write!(xml, r#"<a:srgbClr val="{}"/>"#, color.to_hex())?;
    } else {
        let alpha = (color.a.clamp(0.0, 1.0) * 100_000.0).round() as u32;
        write!(xml, r#"<a:srgbClr val="{}"><a:alpha val="{alpha}"/></a:srgbClr>"#, color.to_hex())?;
    }
    Ok(())
}

pub(crate) fn write_solid_fill(xml: &mut String, color: Color) -> Result<()> {
    xml.push_str("<a:solidFill>");
    write_color(xml, color)?;
    xml.push_str("</a:solidFill>");
    Ok(())
}

fn write_text_box(xml: &mut String, id: usize, text: &TextBox) -> Result<()> {
    xml.push_str("<p:sp>");
    write!(
        xml,
        r#"<p:nvSpPr><p:cNvPr id="{id}" name="TextBox {id}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>"#
    )?;
    xml.push_str("<p:spPr>");
    write_xfrm(xml, &text.frame)?;
    xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>"#);

    let [l, t, r, b] = text.insets;
    let wrap = if text.wrap { "square" } else { "none" };
    write!(
        xml,
        r#"<p:txBody><a:bodyPr wrap="{wrap}" lIns="{l}" tIns="{t}" rIns="{r}" bIns="{b}" rtlCol="0" anchor="t"><a:noAutofit/></a:bodyPr><a:lstStyle/>"#
    )?;
    if text.paragraphs.is_empty() {
        xml.push_str(r#"<a:p><a:endParaRPr lang="en-US" dirty="0"/></a:p>"#);
    }
    for paragraph in &text.paragraphs {
        write_paragraph(xml, paragraph)?;
    }
    xml.push_str("</p:txBody></p:sp>");
    Ok(())
}

fn write_paragraph(xml: &mut String, paragraph: &Paragraph) -> Result<()> {
    xml.push_str("<a:p>");
    write!(xml, r#"<a:pPr algn="{}""#, paragraph.align.xml_value())?;
    if paragraph.bullet.is_some() {
        xml.push_str(r#" marL="342900" indent="-342900""#);
    }
    xml.push('>');
    if let Some(spacing) = paragraph.line_spacing {
        let pct = (spacing.max(0.0) * 100_000.0).round() as u32;
        write!(xml, r#"<a:lnSpc><a:spcPct val="{pct}"/></a:lnSpc>"#)?;
    }
    match &paragraph.bullet {
        Some(Bullet::Char(ch)) => write!(xml, r#"<a:buChar char="{}"/>"#, escape_xml(ch))?,
        Some(Bullet::AutoNumber { scheme, start }) => {
            write!(xml, r#"<a:buFont typeface="+mj-lt"/><a:buAutoNum type="{scheme}""#)?;
            if *start > 1 {
                write!(xml, r#" startAt="{start}""#)?;
            }
            xml.push_str("/>");
        }
        None => xml.push_str("<a:buNone/>"),
    }
    xml.push_str("</a:pPr>");

    for run in &paragraph.runs {
        // Hard breaks inside a run become <a:br/>.
        for (i, piece) in run.text.split('\n').enumerate() {
            if i > 0 {
                xml.push_str("<a:br>");
                write_run_properties(xml, run, "a:rPr")?;
                xml.push_str("</a:br>");
            }
            if piece.is_empty() {
                continue;
            }
            xml.push_str("<a:r>");
            write_run_properties(xml, run, "a:rPr")?;
            write!(xml, "<a:t>{}</a:t></a:r>", escape_xml(piece))?;
        }
    }

    let end_size = paragraph.runs.last().map(|r| font_size(r.size_pt)).unwrap_or(1800);
    write!(xml, r#"<a:endParaRPr lang="en-US" sz="{end_size}" dirty="0"/></a:p>"#)?;
    Ok(())
}

/// Centipoints within the 1..4000pt range a text size may take.
fn font_size(size_pt: f32) -> u32 {
    pt_to_centipoints(size_pt).clamp(100, 400_000)
}

fn write_run_properties(xml: &mut String, run: &TextRun, tag: &str) -> Result<()> {
    write!(xml, r#"<{tag} lang="en-US" sz="{}""#, font_size(run.size_pt))?;
    if run.bold {
        xml.push_str(r#" b="1""#);
    }
    if run.italic {
        xml.push_str(r#" i="1""#);
    }
    if run.underline {
        xml.push_str(r#" u="sng""#);
    }
    if run.strike {
        xml.push_str(r#" strike="sngStrike""#);
    }
    xml.push_str(r#" dirty="0">"#);
    if let Some(color) = run.color {
        write_solid_fill(xml, color)?;
    }
    if let Some(font) = &run.font {
        let font = escape_xml(font);
        write!(xml, r#"<a:latin typeface="{font}"/><a:ea typeface="{font}"/><a:cs typeface="{font}"/>"#)?;
    }
    write!(xml, "</{tag}>")?;
    Ok(())
}

/// `adj` for a rounded rectangle: radius over the short side, capped at half.
pub(crate) fn corner_adjust(radius: i64, frame: &Frame) -> i64 {
    let short = frame.cx.min(frame.cy);
    if short <= 0 || radius <= 0 {
        return 0;
    }
    ((radius as f64 / short as f64) * 100_000.0).round().min(50_000.0) as i64
}

fn write_rect(xml: &mut String, id: usize, rect: &RectShape) -> Result<()> {
    xml.push_str("<p:sp>");
    write!(xml, r#"<p:nvSpPr><p:cNvPr id="{id}" name="Rectangle {id}"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr>"#)?;
    xml.push_str("<p:spPr>");
    write_xfrm(xml, &rect.frame)?;
    let adj = corner_adjust(rect.corner_radius, &rect.frame);
    if adj > 0 {
        write!(xml, r#"<a:prstGeom prst="roundRect"><a:avLst><a:gd name="adj" fmla="val {adj}"/></a:avLst></a:prstGeom>"#)?;
    } else {
        xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
    }
    match rect.fill {
        Some(color) => write_solid_fill(xml, color)?,
        None => xml.push_str("<a:noFill/>"),
    }
    match &rect.line {
        Some(line) => write_line(xml, line)?,
        None => xml.push_str("<a:ln><a:noFill/></a:ln>"),
    }
    xml.push_str("</p:spPr></p:sp>");
    Ok(())
}

fn write_line(xml: &mut String, line: &LineStyle) -> Result<()> {
    write!(xml, r#"<a:ln w="{}">"#, line.width.max(0))?;
    write_solid_fill(xml, line.color)?;
    let dash = match line.dash {
        LineDash::Solid => "solid",
        LineDash::Dash => "dash",
        LineDash::Dot => "sysDot",
    };
    write!(xml, r#"<a:prstDash val="{dash}"/></a:ln>"#)?;
    Ok(())
}

fn write_picture(xml: &mut String, id: usize, picture: &Picture, rel: &str) -> Result<()> {
    xml.push_str("<p:pic>");
    write!(
        xml,
        r#"<p:nvPicPr><p:cNvPr id="{id}" name="Picture {id}" descr="{}"/><p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>"#,
        escape_xml(&picture.description)
    )?;
    write!(xml, r#"<p:blipFill><a:blip r:embed="{rel}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>"#)?;
    xml.push_str("<p:spPr>");
    write_xfrm(xml, &picture.frame)?;
    xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr>"#);
    xml.push_str("</p:pic>");
    Ok(())
}

fn write_chart_frame(xml: &mut String, id: usize, chart: &ChartFrame, rel: &str) -> Result<()> {
    let frame = &chart.frame;
    xml.push_str("<p:graphicFrame>");
    write!(
        xml,
        r#"<p:nvGraphicFramePr><p:cNvPr id="{id}" name="Chart {id}"/><p:cNvGraphicFramePr/><p:nvPr/></p:nvGraphicFramePr>"#
    )?;
    write!(
        xml,
        r#"<p:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></p:xfrm>"#,
        frame.x, frame.y, frame.cx, frame.cy
    )?;
    write!(
        xml,
        r#"<a:graphic><a:graphicData uri="{CHART_URI}"><c:chart xmlns:c="{CHART_URI}" r:id="{rel}"/></a:graphicData></a:graphic>"#
    )?;
    xml.push_str("</p:graphicFrame>");
    Ok(())
}
