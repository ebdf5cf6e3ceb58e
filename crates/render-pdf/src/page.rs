//! Page formats and the image fit.

use serde::{Deserialize, Serialize};
use vellum_types::units::mm_to_pt;
use vellum_types::{Rect, Size};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageFormat {
    #[default]
    A4,
    Letter,
    Legal,
}

impl PageFormat {
    /// Portrait size in points.
    pub fn size(&self) -> Size {
        match self {
            PageFormat::A4 => Size::new(595.28, 841.89),
            PageFormat::Letter => Size::new(612.0, 792.0),
            PageFormat::Legal => Size::new(612.0, 1008.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    #[default]
    Landscape,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSetup {
    pub format: PageFormat,
    pub orientation: Orientation,
    pub margin_mm: f32,
    pub page_numbers: bool,
    pub titles: bool,
}

impl Default for PageSetup {
    fn default() -> Self {
        Self {
            format: PageFormat::A4,
            orientation: Orientation::Landscape,
            margin_mm: 10.0,
            page_numbers: true,
            titles: true,
        }
    }
}

impl PageSetup {
    /// Page size in points, oriented.
    pub fn page_size(&self) -> Size {
        let Size { width, height } = self.format.size();
        match self.orientation {
            Orientation::Portrait => Size::new(width.min(height), width.max(height)),
            Orientation::Landscape => Size::new(width.max(height), width.min(height)),
        }
    }

    pub fn margin_pt(&self) -> f32 {
        mm_to_pt(self.margin_mm.max(0.0))
    }

    /// The area inside the margins, in PDF space (origin bottom-left).
    pub fn printable_area(&self) -> Option<Rect> {
        let page = self.page_size();
        let margin = self.margin_pt();
        let area = Rect::new(margin, margin, page.width - 2.0 * margin, page.height - 2.0 * margin);
        (area.width > 0.0 && area.height > 0.0).then_some(area)
    }

    /// Places an image of the given pixel size: scaled to fit the printable
    /// area with its aspect ratio kept, then centered.
    pub fn fit_image(&self, image: Size) -> Option<Rect> {
        let area = self.printable_area()?;
        if image.width <= 0.0 || image.height <= 0.0 {
            return None;
        }
        let fitted = image.fit_within(area.size());
        Some(Rect::new(
            area.x + (area.width - fitted.width) / 2.0,
            area.y + (area.height - fitted.height) / 2.0,
            fitted.width,
            fitted.height,
        ))
    }
}
