//! Builds the PDF document with lopdf.

use crate::error::PdfError;
use crate::page::PageSetup;
use chrono::Utc;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use vellum_types::Size;

const HEADER_FONT_SIZE: f32 = 9.0;
const FONT_RESOURCE: &str = "F1";

/// One slide image, already encoded as JPEG.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfPage {
    pub jpeg: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub title: Option<String>,
}

/// Collects slide pages and writes the finished document.
pub struct SlidePdfWriter {
    doc: Document,
    setup: PageSetup,
    pages_id: ObjectId,
    resources_font_id: ObjectId,
    pages: Vec<PdfPage>,
    title: Option<String>,
}

impl SlidePdfWriter {
    pub fn new(setup: PageSetup) -> Self {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let resources_font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        Self { doc, setup, pages_id, resources_font_id, pages: Vec::new(), title: None }
    }

    /// Document title for the info dictionary.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    pub fn add_page(&mut self, page: PdfPage) {
        self.pages.push(page);
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Lays out every page and serializes the document.
    pub fn finish(mut self) -> Result<Vec<u8>, PdfError> {
        if self.pages.is_empty() {
            return Err(PdfError::Empty);
        }
        let page_size = self.setup.page_size();
        let total = self.pages.len();
        let pages = std::mem::take(&mut self.pages);

        let mut kids: Vec<Object> = Vec::with_capacity(total);
        for (i, page) in pages.into_iter().enumerate() {
            let page_id = self.write_page(i, total, page, page_size)?;
            kids.push(page_id.into());
        }

        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => total as i64,
        };
        self.doc.objects.insert(self.pages_id, Object::Dictionary(pages_dict));

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        let mut info = dictionary! {
            "Producer" => Object::string_literal("Vellum"),
            "CreationDate" => Object::string_literal(Utc::now().format("D:%Y%m%d%H%M%SZ").to_string()),
        };
        if let Some(title) = &self.title {
            info.set("Title", Object::String(encode_win_ansi(title), StringFormat::Literal));
        }
        let info_id = self.doc.add_object(info);
        self.doc.trailer.set("Info", info_id);

        let mut out = Vec::new();
        self.doc.save_to(&mut out).map_err(|e| PdfError::Save(e.to_string()))?;
        log::debug!("PDF written: {} pages, {} bytes", total, out.len());
        Ok(out)
    }

    fn write_page(&mut self, index: usize, total: usize, page: PdfPage, page_size: Size) -> Result<ObjectId, PdfError> {
        if page.width == 0 || page.height == 0 {
            return Err(PdfError::EmptyImage { page: index, width: page.width, height: page.height });
        }
        let placement = self
            .setup
            .fit_image(Size::new(page.width as f32, page.height as f32))
            .ok_or(PdfError::NoPrintableArea { width: page_size.width, height: page_size.height })?;

        let image_dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => page.width as i64,
            "Height" => page.height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8i64,
            "Filter" => "DCTDecode",
        };
        let image_id = self.doc.add_object(Stream::new(image_dict, page.jpeg).with_compression(false));

        let mut operations = vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    placement.width.into(),
                    0.0f32.into(),
                    0.0f32.into(),
                    placement.height.into(),
                    placement.x.into(),
                    placement.y.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Im1".to_vec())]),
            Operation::new("Q", vec![]),
        ];

        let margin = self.setup.margin_pt();
        let band = (margin - HEADER_FONT_SIZE) / 2.0;
        if self.setup.page_numbers && band > 0.0 {
            let label = format!("{} / {}", index + 1, total);
            let x = page_size.width - margin - helvetica_width(&label, HEADER_FONT_SIZE);
            let y = page_size.height - margin + band;
            push_text(&mut operations, &label, x, y);
        }
        if self.setup.titles
            && band > 0.0
            && let Some(title) = page.title.as_deref().map(str::trim).filter(|t| !t.is_empty())
        {
            push_text(&mut operations, title, margin, band + 2.0);
        }

        let content = Content { operations };
        let content_id = self.doc.add_object(Stream::new(dictionary! {}, content.encode()?));

        let resources = dictionary! {
            "Font" => dictionary! { FONT_RESOURCE => self.resources_font_id },
            "XObject" => dictionary! { "Im1" => image_id },
        };
        let page_dict: Dictionary = dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0i64.into(), 0i64.into(), page_size.width.into(), page_size.height.into()],
            "Contents" => content_id,
            "Resources" => resources,
        };
        Ok(self.doc.add_object(page_dict))
    }
}

fn push_text(operations: &mut Vec<Operation>, text: &str, x: f32, y: f32) {
    operations.extend([
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![FONT_RESOURCE.into(), HEADER_FONT_SIZE.into()]),
        Operation::new("rg", vec![0.4f32.into(), 0.4f32.into(), 0.4f32.into()]),
        Operation::new("Td", vec![x.into(), y.into()]),
        Operation::new("Tj", vec![Object::String(encode_win_ansi(text), StringFormat::Literal)]),
        Operation::new("ET", vec![]),
    ]);
}

/// Latin-1 covers the WinAnsi range used here; anything else becomes `?`.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?')).collect()
}

/// Advance width of Helvetica for the characters a page label uses.
fn helvetica_width(text: &str, size: f32) -> f32 {
    let units: u32 = text
        .chars()
        .map(|c| match c {
            '0'..='9' => 556,
            ' ' | '/' => 278,
            _ => 556,
        })
        .sum();
    units as f32 / 1000.0 * size
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{Orientation, PageFormat};

    fn page(title: Option<&str>) -> PdfPage {
        PdfPage { jpeg: vec![0xff, 0xd8, 0xff, 0xd9], width: 1280, height: 720, title: title.map(str::to_string) }
    }

    fn page_text(doc: &Document, page_id: ObjectId) -> String {
        let content = doc.get_page_content(page_id).unwrap();
        String::from_utf8_lossy(&content).into_owned()
    }

    #[test]
    fn one_page_per_slide_in_order() {
        let mut writer = SlidePdfWriter::new(PageSetup::default());
        writer.set_title("Deck");
        writer.add_page(page(Some("Intro")));
        writer.add_page(page(None));
        writer.add_page(page(Some("End")));
        let bytes = writer.finish().unwrap();

        let doc = Document::load_mem(&bytes).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 3);
        let first = page_text(&doc, pages[&1]);
        assert!(first.contains("(1 / 3) Tj"));
        assert!(first.contains("(Intro) Tj"));
        assert!(first.contains("/Im1 Do"));
        assert!(page_text(&doc, pages[&3]).contains("(3 / 3) Tj"));
        assert!(!page_text(&doc, pages[&2]).contains("Intro"));
    }

    #[test]
    fn media_box_follows_the_setup() {
        let setup = PageSetup { format: PageFormat::Letter, orientation: Orientation::Portrait, ..Default::default() };
        let mut writer = SlidePdfWriter::new(setup);
        writer.add_page(page(None));
        let doc = Document::load_mem(&writer.finish().unwrap()).unwrap();
        let page_id = doc.get_pages()[&1];
        let dict = doc.get_dictionary(page_id).unwrap();
        let media_box = dict.get(b"MediaBox").unwrap().as_array().unwrap();
        assert_eq!(media_box[2].as_float().unwrap(), 612.0);
        assert_eq!(media_box[3].as_float().unwrap(), 792.0);
    }

    #[test]
    fn headers_can_be_turned_off() {
        let setup = PageSetup { page_numbers: false, titles: false, ..Default::default() };
        let mut writer = SlidePdfWriter::new(setup);
        writer.add_page(page(Some("Intro")));
        let doc = Document::load_mem(&writer.finish().unwrap()).unwrap();
        let text = page_text(&doc, doc.get_pages()[&1]);
        assert!(!text.contains("Tj"));
    }

    #[test]
    fn empty_documents_and_images_fail() {
        assert!(matches!(SlidePdfWriter::new(PageSetup::default()).finish(), Err(PdfError::Empty)));
        let mut writer = SlidePdfWriter::new(PageSetup::default());
        writer.add_page(PdfPage { width: 0, ..page(None) });
        assert!(matches!(writer.finish(), Err(PdfError::EmptyImage { page: 0, .. })));
    }

    #[test]
    fn win_ansi_replaces_wide_characters() {
        assert_eq!(encode_win_ansi("Café ✓"), b"Caf\xe9 ?".to_vec());
    }
}
