//! Flat PDF export: every slide container rasterized to one JPEG page.

use crate::config::ExportOptions;
use crate::error::ExportError;
use crate::mapper::find_container;
use vellum_host::{RenderContext, RenderHost};
use vellum_raster::{rasterize, ImageFormat, PaintOptions};
use vellum_render_pdf::{PdfPage, SlidePdfWriter};
use vellum_types::{Color, SlideRecord};

pub(crate) async fn build_pdf(
    host: &dyn RenderHost,
    slides: &[SlideRecord],
    options: &ExportOptions,
) -> Result<Vec<u8>, ExportError> {
    let config = options.host_config();
    let mut writer = SlidePdfWriter::new(options.pdf.page_setup());
    writer.set_title(slides.first().and_then(|s| s.title.clone()).unwrap_or_else(|| options.file_name.clone()));

    for slide in slides {
        let ctx = host.load(slide, &config).await?;
        let page = capture_page(&ctx, slide, options);
        ctx.close();
        writer.add_page(page?);
    }

    Ok(writer.finish()?)
}

fn capture_page(ctx: &RenderContext, slide: &SlideRecord, options: &ExportOptions) -> Result<PdfPage, ExportError> {
    let container = find_container(ctx, &options.container_class);
    let paint = PaintOptions { scale: options.raster_scale(), backdrop: Some(Color::WHITE), ..Default::default() };
    let image = rasterize(ctx, container, &paint, ImageFormat::Jpeg { quality: options.pdf.jpeg_quality() })?;
    log::debug!("Slide {} rasterized at {}x{}", slide.index, image.width, image.height);
    Ok(PdfPage { jpeg: image.data, width: image.width, height: image.height, title: slide.title.clone() })
}
