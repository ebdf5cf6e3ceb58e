//! Chart parts (`ppt/charts/chartN.xml`) with literal data caches, so the
//! chart opens editable without an embedded workbook.

use std::io::Write;
use vellum_chart::{NativeChart, NativeChartKind, NativeSeries};
use vellum_types::{escape_xml, Color};

const CAT_AX_ID: u32 = 111_111_111;
const VAL_AX_ID: u32 = 222_222_222;

/// Serializes a chart part.
pub fn chart_xml(chart: &NativeChart) -> crate::Result<Vec<u8>> {
    let mut out = Vec::with_capacity(4096);
    write_chart(&mut out, chart)?;
    Ok(out)
}

/// Write a chart space to XML.
pub fn write_chart<W: Write>(writer: &mut W, chart: &NativeChart) -> std::io::Result<()> {
    write!(writer, r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#)?;
    write!(
        writer,
        r#"<c:chartSpace xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart" "#
    )?;
    write!(writer, r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#)?;
    write!(
        writer,
        r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#
    )?;
    write!(writer, r#"<c:date1904 val="0"/><c:lang val="en-US"/><c:roundedCorners val="0"/>"#)?;

    write!(writer, "<c:chart>")?;
    match &chart.title {
        Some(title) => {
            write_title(writer, title)?;
            write!(writer, r#"<c:autoTitleDeleted val="0"/>"#)?;
        }
        None => write!(writer, r#"<c:autoTitleDeleted val="1"/>"#)?,
    }

    write!(writer, "<c:plotArea><c:layout/>")?;
    match chart.kind {
        NativeChartKind::Bar { horizontal, stacked } => write_bar_chart(writer, chart, horizontal, stacked)?,
        NativeChartKind::Line => write_line_chart(writer, chart)?,
        NativeChartKind::Pie => write_pie_chart(writer, chart, None)?,
        NativeChartKind::Doughnut => write_pie_chart(writer, chart, Some(50))?,
    }
    if !chart.kind.is_round() {
        let horizontal = matches!(chart.kind, NativeChartKind::Bar { horizontal: true, .. });
        write_axes(writer, horizontal)?;
    }
    write!(writer, "</c:plotArea>")?;

    write_legend(writer)?;
    write!(writer, r#"<c:plotVisOnly val="1"/><c:dispBlanksAs val="gap"/>"#)?;
    write!(writer, "</c:chart>")?;
    write!(writer, "</c:chartSpace>")?;
    Ok(())
}

fn write_title<W: Write>(writer: &mut W, title: &str) -> std::io::Result<()> {
    write!(writer, "<c:title>")?;
    write!(writer, "<c:tx><c:rich>")?;
    write!(writer, "<a:bodyPr/><a:lstStyle/>")?;
    write!(writer, "<a:p><a:pPr><a:defRPr/></a:pPr>")?;
    write!(writer, r#"<a:r><a:rPr lang="en-US"/><a:t>{}</a:t></a:r>"#, escape_xml(title))?;
    write!(writer, "</a:p></c:rich></c:tx>")?;
    write!(writer, r#"<c:overlay val="0"/>"#)?;
    write!(writer, "</c:title>")?;
    Ok(())
}

fn write_bar_chart<W: Write>(
    writer: &mut W,
    chart: &NativeChart,
    horizontal: bool,
    stacked: bool,
) -> std::io::Result<()> {
    write!(writer, "<c:barChart>")?;
    write!(writer, r#"<c:barDir val="{}"/>"#, if horizontal { "bar" } else { "col" })?;
    write!(writer, r#"<c:grouping val="{}"/>"#, if stacked { "stacked" } else { "clustered" })?;
    write!(writer, r#"<c:varyColors val="0"/>"#)?;
    for (i, series) in chart.series.iter().enumerate() {
        write_series(writer, i, series, &chart.categories, SeriesShape::Bar)?;
    }
    write_data_labels_default(writer)?;
    write!(writer, r#"<c:gapWidth val="150"/>"#)?;
    if stacked {
        write!(writer, r#"<c:overlap val="100"/>"#)?;
    }
    write!(writer, r#"<c:axId val="{CAT_AX_ID}"/><c:axId val="{VAL_AX_ID}"/>"#)?;
    write!(writer, "</c:barChart>")?;
    Ok(())
}

fn write_line_chart<W: Write>(writer: &mut W, chart: &NativeChart) -> std::io::Result<()> {
    write!(writer, "<c:lineChart>")?;
    write!(writer, r#"<c:grouping val="standard"/><c:varyColors val="0"/>"#)?;
    for (i, series) in chart.series.iter().enumerate() {
        write_series(writer, i, series, &chart.categories, SeriesShape::Line)?;
    }
    write_data_labels_default(writer)?;
    write!(writer, r#"<c:marker val="1"/>"#)?;
    write!(writer, r#"<c:axId val="{CAT_AX_ID}"/><c:axId val="{VAL_AX_ID}"/>"#)?;
    write!(writer, "</c:lineChart>")?;
    Ok(())
}

/// Pie, or doughnut when a hole size is given.
fn write_pie_chart<W: Write>(writer: &mut W, chart: &NativeChart, hole: Option<u8>) -> std::io::Result<()> {
    let tag = if hole.is_some() { "c:doughnutChart" } else { "c:pieChart" };
    write!(writer, "<{tag}>")?;
    write!(writer, r#"<c:varyColors val="1"/>"#)?;
    for (i, series) in chart.series.iter().enumerate() {
        write_series(writer, i, series, &chart.categories, SeriesShape::Pie)?;
    }
    write_data_labels_default(writer)?;
    write!(writer, r#"<c:firstSliceAng val="0"/>"#)?;
    if let Some(hole) = hole {
        write!(writer, r#"<c:holeSize val="{hole}"/>"#)?;
    }
    write!(writer, "</{tag}>")?;
    Ok(())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum SeriesShape {
    Bar,
    Line,
    Pie,
}

fn write_series<W: Write>(
    writer: &mut W,
    index: usize,
    series: &NativeSeries,
    categories: &[String],
    shape: SeriesShape,
) -> std::io::Result<()> {
    write!(writer, "<c:ser>")?;
    write!(writer, r#"<c:idx val="{index}"/>"#)?;
    write!(writer, r#"<c:order val="{index}"/>"#)?;
    write!(writer, "<c:tx><c:v>{}</c:v></c:tx>", escape_xml(&series.name))?;

    if let Some(color) = series.color {
        write!(writer, "<c:spPr>")?;
        if shape == SeriesShape::Line {
            write!(writer, r#"<a:ln w="28575" cap="rnd">"#)?;
            write_solid_fill(writer, color)?;
            write!(writer, "<a:round/></a:ln>")?;
        } else {
            write_solid_fill(writer, color)?;
        }
        write!(writer, "</c:spPr>")?;
    }
    match shape {
        SeriesShape::Bar => write!(writer, r#"<c:invertIfNegative val="0"/>"#)?,
        SeriesShape::Line => write!(writer, r#"<c:marker><c:symbol val="circle"/><c:size val="5"/></c:marker>"#)?,
        SeriesShape::Pie => {}
    }

    if shape != SeriesShape::Line {
        for (point, color) in series.point_colors.iter().enumerate() {
            write!(writer, "<c:dPt>")?;
            write!(writer, r#"<c:idx val="{point}"/>"#)?;
            if shape == SeriesShape::Bar {
                write!(writer, r#"<c:invertIfNegative val="0"/>"#)?;
            }
            write!(writer, r#"<c:bubble3D val="0"/>"#)?;
            write!(writer, "<c:spPr>")?;
            write_solid_fill(writer, *color)?;
            write!(writer, "</c:spPr>")?;
            write!(writer, "</c:dPt>")?;
        }
    }

    write_string_literal(writer, "c:cat", categories)?;
    write_numeric_literal(writer, "c:val", &series.values, categories.len())?;
    if shape == SeriesShape::Line {
        write!(writer, r#"<c:smooth val="0"/>"#)?;
    }
    write!(writer, "</c:ser>")?;
    Ok(())
}

fn write_solid_fill<W: Write>(writer: &mut W, color: Color) -> std::io::Result<()> {
    if color.is_opaque() {
        write!(writer, r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#, color.to_hex())
    } else {
        let alpha = (color.a.clamp(0.0, 1.0) * 100_000.0).round() as u32;
        write!(
            writer,
            r#"<a:solidFill><a:srgbClr val="{}"><a:alpha val="{alpha}"/></a:srgbClr></a:solidFill>"#,
            color.to_hex()
        )
    }
}

fn write_string_literal<W: Write>(writer: &mut W, tag: &str, values: &[String]) -> std::io::Result<()> {
    write!(writer, "<{tag}>")?;
    write!(writer, "<c:strLit>")?;
    write!(writer, r#"<c:ptCount val="{}"/>"#, values.len())?;
    for (i, val) in values.iter().enumerate() {
        write!(writer, r#"<c:pt idx="{}"><c:v>{}</c:v></c:pt>"#, i, escape_xml(val))?;
    }
    write!(writer, "</c:strLit>")?;
    write!(writer, "</{tag}>")?;
    Ok(())
}

/// Non-finite values are left out of the cache and show as gaps.
fn write_numeric_literal<W: Write>(writer: &mut W, tag: &str, values: &[f64], count: usize) -> std::io::Result<()> {
    write!(writer, "<{tag}>")?;
    write!(writer, "<c:numLit>")?;
    write!(writer, "<c:formatCode>General</c:formatCode>")?;
    write!(writer, r#"<c:ptCount val="{}"/>"#, count.max(values.len()))?;
    for (i, val) in values.iter().enumerate().filter(|(_, v)| v.is_finite()) {
        write!(writer, r#"<c:pt idx="{i}"><c:v>{val}</c:v></c:pt>"#)?;
    }
    write!(writer, "</c:numLit>")?;
    write!(writer, "</{tag}>")?;
    Ok(())
}

fn write_data_labels_default<W: Write>(writer: &mut W) -> std::io::Result<()> {
    write!(writer, "<c:dLbls>")?;
    write!(writer, r#"<c:showLegendKey val="0"/>"#)?;
    write!(writer, r#"<c:showVal val="0"/>"#)?;
    write!(writer, r#"<c:showCatName val="0"/>"#)?;
    write!(writer, r#"<c:showSerName val="0"/>"#)?;
    write!(writer, r#"<c:showPercent val="0"/>"#)?;
    write!(writer, r#"<c:showBubbleSize val="0"/>"#)?;
    write!(writer, "</c:dLbls>")?;
    Ok(())
}

/// Category and value axes. Horizontal bars put categories on the left.
fn write_axes<W: Write>(writer: &mut W, horizontal: bool) -> std::io::Result<()> {
    let (cat_pos, val_pos) = if horizontal { ("l", "b") } else { ("b", "l") };

    write!(writer, "<c:catAx>")?;
    write!(writer, r#"<c:axId val="{CAT_AX_ID}"/>"#)?;
    write!(writer, r#"<c:scaling><c:orientation val="minMax"/></c:scaling>"#)?;
    write!(writer, r#"<c:delete val="0"/>"#)?;
    write!(writer, r#"<c:axPos val="{cat_pos}"/>"#)?;
    write!(writer, r#"<c:majorTickMark val="out"/><c:minorTickMark val="none"/>"#)?;
    write!(writer, r#"<c:tickLblPos val="nextTo"/>"#)?;
    write!(writer, r#"<c:crossAx val="{VAL_AX_ID}"/>"#)?;
    write!(writer, r#"<c:crosses val="autoZero"/>"#)?;
    write!(writer, r#"<c:auto val="1"/><c:lblAlgn val="ctr"/><c:lblOffset val="100"/>"#)?;
    write!(writer, r#"<c:noMultiLvlLbl val="0"/>"#)?;
    write!(writer, "</c:catAx>")?;

    write!(writer, "<c:valAx>")?;
    write!(writer, r#"<c:axId val="{VAL_AX_ID}"/>"#)?;
    write!(writer, r#"<c:scaling><c:orientation val="minMax"/></c:scaling>"#)?;
    write!(writer, r#"<c:delete val="0"/>"#)?;
    write!(writer, r#"<c:axPos val="{val_pos}"/>"#)?;
    write!(writer, "<c:majorGridlines/>")?;
    write!(writer, r#"<c:numFmt formatCode="General" sourceLinked="1"/>"#)?;
    write!(writer, r#"<c:majorTickMark val="out"/><c:minorTickMark val="none"/>"#)?;
    write!(writer, r#"<c:tickLblPos val="nextTo"/>"#)?;
    write!(writer, r#"<c:crossAx val="{CAT_AX_ID}"/>"#)?;
    write!(writer, r#"<c:crosses val="autoZero"/>"#)?;
    write!(writer, r#"<c:crossBetween val="between"/>"#)?;
    write!(writer, "</c:valAx>")?;
    Ok(())
}

fn write_legend<W: Write>(writer: &mut W) -> std::io::Result<()> {
    write!(writer, "<c:legend>")?;
    write!(writer, r#"<c:legendPos val="b"/>"#)?;
    write!(writer, r#"<c:overlay val="0"/>"#)?;
    write!(writer, "</c:legend>")?;
    Ok(())
}
