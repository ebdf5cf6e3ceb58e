//! SVG to pixels, and pixels to PNG or JPEG.

use crate::RasterError;
use image::ImageEncoder;
use std::sync::Arc;
use vellum_types::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    /// Quality 1-100.
    Jpeg { quality: u8 },
}

impl ImageFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg { .. } => "image/jpeg",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg { .. } => "jpeg",
        }
    }
}

/// Encoded image with its size in device pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pub data: Vec<u8>,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

/// Renders an SVG document at its own width and height.
pub fn rasterize_svg(svg: &str, fontdb: Arc<usvg::fontdb::Database>) -> Result<tiny_skia::Pixmap, RasterError> {
    let mut opt = usvg::Options::default();
    opt.fontdb = fontdb;
    let tree = usvg::Tree::from_str(svg, &opt).map_err(|e| RasterError::Svg(e.to_string()))?;

    let width = tree.size().width().ceil() as u32;
    let height = tree.size().height().ceil() as u32;
    let mut pixmap =
        tiny_skia::Pixmap::new(width.max(1), height.max(1)).ok_or(RasterError::Pixmap(width, height))?;
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());
    Ok(pixmap)
}

/// Encodes a pixmap. JPEG has no alpha, so pixels are composited over
/// `backdrop` first.
pub fn encode(pixmap: &tiny_skia::Pixmap, format: ImageFormat, backdrop: Color) -> Result<RasterImage, RasterError> {
    let (width, height) = (pixmap.width(), pixmap.height());
    let data = match format {
        ImageFormat::Png => pixmap
            .encode_png()
            .map_err(|e| RasterError::Encode { format: "PNG", message: e.to_string() })?,
        ImageFormat::Jpeg { quality } => {
            let mut rgb = Vec::with_capacity((width * height * 3) as usize);
            // Pixmap data is premultiplied, so the source term needs no alpha factor.
            for pixel in pixmap.data().chunks_exact(4) {
                let inv = 1.0 - f32::from(pixel[3]) / 255.0;
                rgb.push((f32::from(pixel[0]) + f32::from(backdrop.r) * inv).min(255.0) as u8);
                rgb.push((f32::from(pixel[1]) + f32::from(backdrop.g) * inv).min(255.0) as u8);
                rgb.push((f32::from(pixel[2]) + f32::from(backdrop.b) * inv).min(255.0) as u8);
            }
            let mut buf = std::io::Cursor::new(Vec::new());
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100))
                .write_image(&rgb, width, height, image::ColorType::Rgb8.into())
                .map_err(|e| RasterError::Encode { format: "JPEG", message: e.to_string() })?;
            buf.into_inner()
        }
    };
    Ok(RasterImage { data, format, width, height })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"8\" height=\"4\" viewBox=\"0 0 4 2\">\
        <rect width=\"2\" height=\"2\" fill=\"#ff0000\"/></svg>";

    #[test]
    fn rasterizes_at_document_size() {
        let pixmap = rasterize_svg(SQUARE, Arc::new(usvg::fontdb::Database::new())).unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (8, 4));
        let left = pixmap.pixel(1, 1).unwrap();
        assert_eq!((left.red(), left.alpha()), (255, 255));
        assert_eq!(pixmap.pixel(6, 1).unwrap().alpha(), 0);
    }

    #[test]
    fn encodes_png_and_jpeg() {
        let pixmap = rasterize_svg(SQUARE, Arc::new(usvg::fontdb::Database::new())).unwrap();
        let png = encode(&pixmap, ImageFormat::Png, Color::WHITE).unwrap();
        assert!(png.data.starts_with(b"\x89PNG"));
        let jpeg = encode(&pixmap, ImageFormat::Jpeg { quality: 90 }, Color::WHITE).unwrap();
        assert!(jpeg.data.starts_with(&[0xFF, 0xD8]));
        assert_eq!((jpeg.width, jpeg.height), (8, 4));
    }

    #[test]
    fn malformed_svg_is_an_error() {
        let err = rasterize_svg("<svg", Arc::new(usvg::fontdb::Database::new())).unwrap_err();
        assert!(matches!(err, RasterError::Svg(_)));
    }
}
