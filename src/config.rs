//! Export options, read from JSON with every field defaulted.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use vellum_host::HostConfig;
use vellum_render_pdf::{Orientation, PageFormat, PageSetup};
use vellum_types::Size;

/// Off-screen canvas size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f32,
    pub height: f32,
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self { width: 1280.0, height: 720.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PdfOptions {
    pub format: PageFormat,
    pub orientation: Orientation,
    /// JPEG quality between 0 and 1.
    pub quality: f32,
    pub margin_mm: f32,
    /// `i / N` in the top margin.
    pub page_numbers: bool,
    /// Slide titles in the bottom margin.
    pub titles: bool,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            format: PageFormat::A4,
            orientation: Orientation::Landscape,
            quality: 0.95,
            margin_mm: 10.0,
            page_numbers: true,
            titles: true,
        }
    }
}

impl PdfOptions {
    pub fn page_setup(&self) -> PageSetup {
        PageSetup {
            format: self.format,
            orientation: self.orientation,
            margin_mm: self.margin_mm,
            page_numbers: self.page_numbers,
            titles: self.titles,
        }
    }

    /// Quality on the encoder's 1-100 scale.
    pub fn jpeg_quality(&self) -> u8 {
        (self.quality.clamp(0.0, 1.0) * 100.0).round().max(1.0) as u8
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportOptions {
    /// Output name without extension.
    pub file_name: String,
    pub canvas: CanvasSize,
    pub settle_delay_ms: u64,
    pub load_timeout_ms: u64,
    /// Class of the element captured as the slide.
    pub container_class: String,
    /// Class of the content wrapper walked when the slide background is complex.
    pub content_class: String,
    /// Device pixels per CSS pixel for every raster.
    pub raster_scale: f32,
    pub pdf: PdfOptions,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            file_name: "presentation".to_string(),
            canvas: CanvasSize::default(),
            settle_delay_ms: 100,
            load_timeout_ms: 10_000,
            container_class: "slide-container".to_string(),
            content_class: "slide-content".to_string(),
            raster_scale: 2.0,
            pdf: PdfOptions::default(),
        }
    }
}

impl ExportOptions {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn host_config(&self) -> HostConfig {
        HostConfig {
            canvas: Size::new(self.canvas.width, self.canvas.height),
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            load_timeout: Duration::from_millis(self.load_timeout_ms),
        }
    }

    /// `file_name` with `extension`, unless it already carries it.
    pub fn output_name(&self, extension: &str) -> String {
        let base = self.file_name.trim();
        let base = if base.is_empty() { "presentation" } else { base };
        let suffix = format!(".{extension}");
        if base.to_ascii_lowercase().ends_with(&suffix) {
            base.to_string()
        } else {
            format!("{base}{suffix}")
        }
    }

    pub fn raster_scale(&self) -> f32 {
        if self.raster_scale.is_finite() && self.raster_scale > 0.0 { self.raster_scale } else { 1.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let options = ExportOptions::from_json(
            r#"{ "fileName": "q3", "settleDelayMs": 0, "pdf": { "format": "letter", "marginMm": 5 } }"#,
        )
        .unwrap();
        assert_eq!(options.file_name, "q3");
        assert_eq!(options.settle_delay_ms, 0);
        assert_eq!(options.container_class, "slide-container");
        assert_eq!(options.pdf.format, PageFormat::Letter);
        assert_eq!(options.pdf.margin_mm, 5.0);
        assert_eq!(options.pdf.orientation, Orientation::Landscape);
        assert_eq!(options.pdf.quality, 0.95);
    }

    #[test]
    fn output_names_get_one_extension() {
        let mut options = ExportOptions::default();
        assert_eq!(options.output_name("pptx"), "presentation.pptx");
        options.file_name = "Deck.PDF".into();
        assert_eq!(options.output_name("pdf"), "Deck.PDF");
        options.file_name = "  ".into();
        assert_eq!(options.output_name("pdf"), "presentation.pdf");
    }

    #[test]
    fn host_config_uses_the_canvas() {
        let options = ExportOptions { settle_delay_ms: 0, ..Default::default() };
        let config = options.host_config();
        assert_eq!(config.canvas, Size::new(1280.0, 720.0));
        assert!(config.settle_delay.is_zero());
        assert_eq!(config.load_timeout, Duration::from_secs(10));
    }

    #[test]
    fn quality_maps_to_percent() {
        assert_eq!(PdfOptions::default().jpeg_quality(), 95);
        assert_eq!(PdfOptions { quality: 0.0, ..Default::default() }.jpeg_quality(), 1);
    }
}
