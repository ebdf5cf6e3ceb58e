//! Fixed package parts and the small generated ones around them.

use crate::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt::Write as FmtWrite;
use vellum_types::escape_xml;

pub(crate) const SLIDE_MASTER: &str = include_str!("../resources/slideMaster1.xml");
pub(crate) const SLIDE_LAYOUT: &str = include_str!("../resources/slideLayout1.xml");
pub(crate) const THEME: &str = include_str!("../resources/theme1.xml");
pub(crate) const PRES_PROPS: &str = include_str!("../resources/presProps.xml");
pub(crate) const VIEW_PROPS: &str = include_str!("../resources/viewProps.xml");
pub(crate) const TABLE_STYLES: &str = include_str!("../resources/tableStyles.xml");

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const RELS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
pub(crate) const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

pub(crate) const CT_SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
pub(crate) const CT_CHART: &str = "application/vnd.openxmlformats-officedocument.drawingml.chart+xml";

/// One entry of a `.rels` part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Relationship {
    pub id: String,
    /// Short type name appended to the officeDocument relationship base.
    pub kind: &'static str,
    pub target: String,
}

impl Relationship {
    pub fn new(id: usize, kind: &'static str, target: impl Into<String>) -> Self {
        Self { id: format!("rId{id}"), kind, target: target.into() }
    }
}

pub(crate) fn relationships_xml(rels: &[Relationship]) -> Result<String> {
    let mut xml = String::with_capacity(256 + rels.len() * 160);
    xml.push_str(XML_DECL);
    write!(xml, r#"<Relationships xmlns="{RELS_NS}">"#)?;
    for rel in rels {
        let kind = match rel.kind {
            "core-properties" => {
                "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties".to_string()
            }
            other => format!("{REL_BASE}/{other}"),
        };
        write!(
            xml,
            r#"<Relationship Id="{}" Type="{kind}" Target="{}"/>"#,
            rel.id,
            escape_xml(&rel.target)
        )?;
    }
    xml.push_str("</Relationships>");
    Ok(xml)
}

pub(crate) fn root_relationships() -> Vec<Relationship> {
    vec![
        Relationship::new(1, "officeDocument", "ppt/presentation.xml"),
        Relationship::new(2, "core-properties", "docProps/core.xml"),
        Relationship::new(3, "extended-properties", "docProps/app.xml"),
    ]
}

pub(crate) fn master_relationships() -> Vec<Relationship> {
    vec![
        Relationship::new(1, "slideLayout", "../slideLayouts/slideLayout1.xml"),
        Relationship::new(2, "theme", "../theme/theme1.xml"),
    ]
}

pub(crate) fn layout_relationships() -> Vec<Relationship> {
    vec![Relationship::new(1, "slideMaster", "../slideMasters/slideMaster1.xml")]
}

/// Fixed relationships of `presentation.xml`; slides follow from
/// [`FIRST_SLIDE_REL`].
pub(crate) fn presentation_relationships(slides: usize) -> Vec<Relationship> {
    let mut rels = vec![
        Relationship::new(1, "slideMaster", "slideMasters/slideMaster1.xml"),
        Relationship::new(2, "theme", "theme/theme1.xml"),
        Relationship::new(3, "presProps", "presProps.xml"),
        Relationship::new(4, "viewProps", "viewProps.xml"),
        Relationship::new(5, "tableStyles", "tableStyles.xml"),
    ];
    for i in 0..slides {
        rels.push(Relationship::new(FIRST_SLIDE_REL + i, "slide", format!("slides/slide{}.xml", i + 1)));
    }
    rels
}

pub(crate) const FIRST_SLIDE_REL: usize = 6;

pub(crate) fn presentation_xml(slides: usize, size: (i64, i64)) -> Result<String> {
    let mut xml = String::with_capacity(1024);
    xml.push_str(XML_DECL);
    xml.push_str(r#"<p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" saveSubsetFonts="1">"#);
    xml.push_str(r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#);
    xml.push_str("<p:sldIdLst>");
    for i in 0..slides {
        write!(xml, r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + i, FIRST_SLIDE_REL + i)?;
    }
    xml.push_str("</p:sldIdLst>");
    write!(xml, r#"<p:sldSz cx="{}" cy="{}"/>"#, size.0, size.1)?;
    xml.push_str(r#"<p:notesSz cx="6858000" cy="9144000"/>"#);
    xml.push_str("</p:presentation>");
    Ok(xml)
}

/// `[Content_Types].xml` for the given slide and chart counts.
pub(crate) fn content_types_xml(slides: usize, charts: usize) -> Result<String> {
    let mut xml = String::with_capacity(2048);
    xml.push_str(XML_DECL);
    xml.push_str(r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#);
    xml.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    xml.push_str(r#"<Default Extension="png" ContentType="image/png"/>"#);
    xml.push_str(r#"<Default Extension="jpeg" ContentType="image/jpeg"/>"#);

    let fixed = [
        ("/ppt/presentation.xml", "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"),
        ("/ppt/slideMasters/slideMaster1.xml", "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"),
        ("/ppt/slideLayouts/slideLayout1.xml", "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"),
        ("/ppt/theme/theme1.xml", "application/vnd.openxmlformats-officedocument.theme+xml"),
        ("/ppt/presProps.xml", "application/vnd.openxmlformats-officedocument.presentationml.presProps+xml"),
        ("/ppt/viewProps.xml", "application/vnd.openxmlformats-officedocument.presentationml.viewProps+xml"),
        ("/ppt/tableStyles.xml", "application/vnd.openxmlformats-officedocument.presentationml.tableStyles+xml"),
        ("/docProps/core.xml", "application/vnd.openxmlformats-package.core-properties+xml"),
        ("/docProps/app.xml", "application/vnd.openxmlformats-officedocument.extended-properties+xml"),
    ];
    for (part, content_type) in fixed {
        write!(xml, r#"<Override PartName="{part}" ContentType="{content_type}"/>"#)?;
    }
    for i in 1..=slides {
        write!(xml, r#"<Override PartName="/ppt/slides/slide{i}.xml" ContentType="{CT_SLIDE}"/>"#)?;
    }
    for i in 1..=charts {
        write!(xml, r#"<Override PartName="/ppt/charts/chart{i}.xml" ContentType="{CT_CHART}"/>"#)?;
    }
    xml.push_str("</Types>");
    Ok(xml)
}

pub(crate) fn core_properties_xml(title: Option<&str>, created: DateTime<Utc>) -> Result<String> {
    let stamp = created.to_rfc3339_opts(SecondsFormat::Secs, true);
    let mut xml = String::with_capacity(768);
    xml.push_str(XML_DECL);
    xml.push_str(r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#);
    if let Some(title) = title {
        write!(xml, "<dc:title>{}</dc:title>", escape_xml(title))?;
    }
    xml.push_str("<dc:creator>Vellum</dc:creator>");
    write!(xml, r#"<dcterms:created xsi:type="dcterms:W3CDTF">{stamp}</dcterms:created>"#)?;
    write!(xml, r#"<dcterms:modified xsi:type="dcterms:W3CDTF">{stamp}</dcterms:modified>"#)?;
    xml.push_str("</cp:coreProperties>");
    Ok(xml)
}

pub(crate) fn app_properties_xml(slides: usize) -> Result<String> {
    let mut xml = String::with_capacity(512);
    xml.push_str(XML_DECL);
    xml.push_str(r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">"#);
    write!(
        xml,
        "<Application>Vellum</Application><PresentationFormat>Custom</PresentationFormat><Slides>{slides}</Slides>"
    )?;
    xml.push_str("</Properties>");
    Ok(xml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn presentation_lists_every_slide() {
        let xml = presentation_xml(2, (12_192_000, 6_858_000)).unwrap();
        assert!(xml.contains(r#"<p:sldId id="256" r:id="rId6"/><p:sldId id="257" r:id="rId7"/>"#));
        assert!(xml.contains(r#"<p:sldSz cx="12192000" cy="6858000"/>"#));
        let rels = presentation_relationships(2);
        assert_eq!(rels.last().unwrap().target, "slides/slide2.xml");
    }

    #[test]
    fn content_types_cover_charts() {
        let xml = content_types_xml(1, 2).unwrap();
        assert!(xml.contains(r#"PartName="/ppt/slides/slide1.xml""#));
        assert!(xml.contains(r#"<Override PartName="/ppt/charts/chart2.xml" ContentType="application/vnd.openxmlformats-officedocument.drawingml.chart+xml"/>"#));
    }

    #[test]
    fn core_properties_carry_title_and_dates() {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let xml = core_properties_xml(Some("Q&A"), created).unwrap();
        assert!(xml.contains("<dc:title>Q&amp;A</dc:title>"));
        assert!(xml.contains(">2024-03-01T09:30:00Z</dcterms:created>"));
    }

    #[test]
    fn relationship_types() {
        let xml = relationships_xml(&root_relationships()).unwrap();
        assert!(xml.contains(r#"Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml""#));
        assert!(xml.contains("package/2006/relationships/metadata/core-properties"));
    }
}
