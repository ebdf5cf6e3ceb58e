//! Assembles the `.pptx` zip container.

use crate::chart::chart_xml;
use crate::model::{Presentation, Shape, SlideBackground, SlideModel};
use crate::shapes::slide_xml;
use crate::template::{
    self, app_properties_xml, content_types_xml, core_properties_xml, presentation_relationships, presentation_xml,
    relationships_xml, Relationship,
};
use crate::{PptxError, Result};
use std::io::{Cursor, Seek, Write};
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

/// Writes a presentation into an in-memory `.pptx`.
pub fn write_package(presentation: &Presentation) -> Result<Vec<u8>> {
    let cursor = write_package_to(presentation, Cursor::new(Vec::new()))?;
    Ok(cursor.into_inner())
}

/// Writes a presentation into any seekable sink and hands the sink back.
pub fn write_package_to<W: Write + Seek>(presentation: &Presentation, sink: W) -> Result<W> {
    if presentation.slides.is_empty() {
        return Err(PptxError::Empty);
    }
    let mut package = PackageWriter::new(sink);
    let slide_count = presentation.slides.len();

    let mut chart_count = 0usize;
    let mut media_count = 0usize;
    for (i, slide) in presentation.slides.iter().enumerate() {
        let number = i + 1;
        let parts = package.write_slide(number, slide, &mut chart_count, &mut media_count)?;
        log::debug!(
            "Slide {} written: {} shapes, {} related parts",
            number,
            slide.shapes.len(),
            parts
        );
    }

    package.add_xml("[Content_Types].xml", &content_types_xml(slide_count, chart_count)?)?;
    package.add_xml("_rels/.rels", &relationships_xml(&template::root_relationships())?)?;
    package.add_xml(
        "docProps/core.xml",
        &core_properties_xml(presentation.title.as_deref(), presentation.created)?,
    )?;
    package.add_xml("docProps/app.xml", &app_properties_xml(slide_count)?)?;
    package.add_xml("ppt/presentation.xml", &presentation_xml(slide_count, presentation.slide_size)?)?;
    package.add_xml(
        "ppt/_rels/presentation.xml.rels",
        &relationships_xml(&presentation_relationships(slide_count))?,
    )?;
    package.add_xml("ppt/slideMasters/slideMaster1.xml", template::SLIDE_MASTER)?;
    package.add_xml(
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        &relationships_xml(&template::master_relationships())?,
    )?;
    package.add_xml("ppt/slideLayouts/slideLayout1.xml", template::SLIDE_LAYOUT)?;
    package.add_xml(
        "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
        &relationships_xml(&template::layout_relationships())?,
    )?;
    package.add_xml("ppt/theme/theme1.xml", template::THEME)?;
    package.add_xml("ppt/presProps.xml", template::PRES_PROPS)?;
    package.add_xml("ppt/viewProps.xml", template::VIEW_PROPS)?;
    package.add_xml("ppt/tableStyles.xml", template::TABLE_STYLES)?;

    log::info!(
        "Presentation package complete: {} slides, {} charts, {} media parts",
        slide_count,
        chart_count,
        media_count
    );
    package.finish()
}

struct PackageWriter<W: Write + Seek> {
    zip_writer: ZipWriter<W>,
}

impl<W: Write + Seek> PackageWriter<W> {
    fn new(sink: W) -> Self {
        Self { zip_writer: ZipWriter::new(sink) }
    }

    fn add_xml(&mut self, path: &str, content: &str) -> Result<()> {
        self.add_file(path, content.as_bytes(), CompressionMethod::Deflated)
    }

    fn add_file(&mut self, path: &str, content: &[u8], method: CompressionMethod) -> Result<()> {
        let options = SimpleFileOptions::default().compression_method(method);
        self.zip_writer.start_file(path, options)?;
        self.zip_writer.write_all(content)?;
        Ok(())
    }

    /// Writes a slide, its relationships, and the media and chart parts it
    /// references. Returns the number of related parts added.
    fn write_slide(
        &mut self,
        number: usize,
        slide: &SlideModel,
        chart_count: &mut usize,
        media_count: &mut usize,
    ) -> Result<usize> {
        let mut rels = vec![Relationship::new(1, "slideLayout", "../slideLayouts/slideLayout1.xml")];

        let background_rel = match &slide.background {
            SlideBackground::Picture { data, format } => {
                *media_count += 1;
                let name = format!("image{}.{}", *media_count, format.extension());
                // Already compressed.
                self.add_file(&format!("ppt/media/{name}"), data, CompressionMethod::Stored)?;
                let rel = Relationship::new(rels.len() + 1, "image", format!("../media/{name}"));
                let id = rel.id.clone();
                rels.push(rel);
                Some(id)
            }
            _ => None,
        };

        let mut rel_ids = Vec::with_capacity(slide.shapes.len());
        for shape in &slide.shapes {
            let rel = match shape {
                Shape::Picture(picture) => {
                    *media_count += 1;
                    let name = format!("image{}.{}", *media_count, picture.format.extension());
                    self.add_file(&format!("ppt/media/{name}"), &picture.data, CompressionMethod::Stored)?;
                    Some(Relationship::new(rels.len() + 1, "image", format!("../media/{name}")))
                }
                Shape::Chart(frame) => {
                    *chart_count += 1;
                    let name = format!("chart{}.xml", *chart_count);
                    let xml = chart_xml(&frame.chart)?;
                    self.add_file(&format!("ppt/charts/{name}"), &xml, CompressionMethod::Deflated)?;
                    Some(Relationship::new(rels.len() + 1, "chart", format!("../charts/{name}")))
                }
                Shape::Text(_) | Shape::Rect(_) => None,
            };
            rel_ids.push(rel.as_ref().map(|r| r.id.clone()));
            if let Some(rel) = rel {
                rels.push(rel);
            }
        }

        let xml = slide_xml(slide, &rel_ids, background_rel.as_deref())?;
        self.add_xml(&format!("ppt/slides/slide{number}.xml"), &xml)?;
        self.add_xml(&format!("ppt/slides/_rels/slide{number}.xml.rels"), &relationships_xml(&rels)?)?;
        Ok(rels.len() - 1)
    }

    fn finish(self) -> Result<W> {
        Ok(self.zip_writer.finish()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChartFrame, Frame, Paragraph, Picture, PictureFormat, TextBox, TextRun};
    use std::io::Read;
    use vellum_chart::{NativeChart, NativeChartKind, NativeSeries};
    use vellum_types::Color;
    use zip::ZipArchive;

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut out = String::new();
        file.read_to_string(&mut out).unwrap();
        out
    }

    fn part_names(bytes: &[u8]) -> Vec<String> {
        let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        archive.file_names().map(str::to_string).collect()
    }

    fn deck() -> Presentation {
        let mut presentation = Presentation::new((12_192_000, 6_858_000)).with_title("Deck");
        presentation.add_slide(SlideModel {
            background: SlideBackground::Solid(Color::rgb(0x10, 0x20, 0x30)),
            shapes: vec![Shape::Text(TextBox {
                frame: Frame::new(0, 0, 1_000_000, 500_000),
                paragraphs: vec![Paragraph { runs: vec![TextRun::new("Hello", 32.0)], ..Default::default() }],
                insets: [0; 4],
                wrap: true,
            })],
        });
        presentation.add_slide(SlideModel {
            background: SlideBackground::Picture { data: vec![0x89, b'P', b'N', b'G'], format: PictureFormat::Png },
            shapes: vec![
                Shape::Picture(Picture {
                    frame: Frame::new(10, 10, 100, 100),
                    data: vec![0xff, 0xd8, 0xff],
                    format: PictureFormat::Jpeg,
                    description: "photo".into(),
                }),
                Shape::Chart(ChartFrame {
                    frame: Frame::new(0, 0, 5_000_000, 3_000_000),
                    chart: NativeChart {
                        kind: NativeChartKind::Pie,
                        title: None,
                        categories: vec!["a".into(), "b".into()],
                        series: vec![NativeSeries {
                            name: "s".into(),
                            values: vec![1.0, 2.0],
                            color: None,
                            point_colors: Vec::new(),
                        }],
                    },
                }),
            ],
        });
        presentation
    }

    #[test]
    fn package_has_every_part() {
        let bytes = write_package(&deck()).unwrap();
        let names = part_names(&bytes);
        for expected in [
            "[Content_Types].xml",
            "_rels/.rels",
            "docProps/core.xml",
            "ppt/presentation.xml",
            "ppt/slides/slide1.xml",
            "ppt/slides/slide2.xml",
            "ppt/slides/_rels/slide2.xml.rels",
            "ppt/media/image1.png",
            "ppt/media/image2.jpeg",
            "ppt/charts/chart1.xml",
            "ppt/theme/theme1.xml",
        ] {
            assert!(names.iter().any(|n| n == expected), "missing {expected}");
        }
    }

    #[test]
    fn slide_relationships_line_up() {
        let bytes = write_package(&deck()).unwrap();
        let rels = read_part(&bytes, "ppt/slides/_rels/slide2.xml.rels");
        assert!(rels.contains(r#"Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout""#));
        assert!(rels.contains(r#"Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/image1.png""#));
        assert!(rels.contains(r#"Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/image2.jpeg""#));
        assert!(rels.contains(r#"Id="rId4" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/chart" Target="../charts/chart1.xml""#));

        let slide = read_part(&bytes, "ppt/slides/slide2.xml");
        assert!(slide.contains(r#"<a:blip r:embed="rId2"/><a:srcRect/>"#));
        assert!(slide.contains(r#"<a:blip r:embed="rId3"/>"#));
        assert!(slide.contains(r#"r:id="rId4"/>"#));

        let slide1 = read_part(&bytes, "ppt/slides/slide1.xml");
        assert!(slide1.contains("<a:t>Hello</a:t>"));
        assert!(slide1.contains(r#"<a:srgbClr val="102030"/>"#));
    }

    #[test]
    fn empty_presentations_are_rejected() {
        let err = write_package(&Presentation::new((914_400, 914_400))).unwrap_err();
        assert!(matches!(err, PptxError::Empty));
    }
}
