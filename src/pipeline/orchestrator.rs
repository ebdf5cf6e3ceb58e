use super::{pdf, pptx, ExportOutcome, ExporterBuilder};
use crate::config::ExportOptions;
use crate::error::ExportError;
use crate::sink::OutputSink;
use std::sync::Arc;
use std::time::Instant;
use vellum_host::RenderHost;
use vellum_types::SlideRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Pptx,
    Pdf,
}

impl Target {
    fn extension(self) -> &'static str {
        match self {
            Target::Pptx => "pptx",
            Target::Pdf => "pdf",
        }
    }
}

/// Exports decks through one render host into one output sink.
///
/// Slides are loaded strictly in order; each render context is closed before
/// the next one is created. The sink is called once, after the whole
/// document was assembled, so a failed export never leaves a partial file.
#[derive(Clone)]
pub struct Exporter {
    host: Arc<dyn RenderHost>,
    sink: Arc<dyn OutputSink>,
}

impl Exporter {
    pub fn new(host: Arc<dyn RenderHost>, sink: Arc<dyn OutputSink>) -> Self {
        Self { host, sink }
    }

    pub fn builder() -> ExporterBuilder {
        ExporterBuilder::new()
    }

    /// Exports an editable presentation.
    pub async fn export_pptx(&self, slides: &[SlideRecord], options: &ExportOptions) -> ExportOutcome {
        self.run(Target::Pptx, slides, options).await
    }

    /// Exports one rasterized page per slide.
    pub async fn export_pdf(&self, slides: &[SlideRecord], options: &ExportOptions) -> ExportOutcome {
        self.run(Target::Pdf, slides, options).await
    }

    async fn run(&self, target: Target, slides: &[SlideRecord], options: &ExportOptions) -> ExportOutcome {
        match self.try_export(target, slides, options).await {
            Ok(file_name) => ExportOutcome::saved(format!("Saved {file_name}")),
            Err(e) => {
                log::error!("{} export failed: {}", target.extension(), e);
                ExportOutcome::failed(e.to_string())
            }
        }
    }

    async fn try_export(
        &self,
        target: Target,
        slides: &[SlideRecord],
        options: &ExportOptions,
    ) -> Result<String, ExportError> {
        if slides.is_empty() {
            return Err(ExportError::NoSlides);
        }
        let start = Instant::now();
        log::info!("Exporting {} slide(s) as {}", slides.len(), target.extension());

        let bytes = match target {
            Target::Pptx => pptx::build_pptx(self.host.as_ref(), slides, options).await?,
            Target::Pdf => pdf::build_pdf(self.host.as_ref(), slides, options).await?,
        };

        let file_name = options.output_name(target.extension());
        self.sink.save(&file_name, &bytes).await?;
        log::info!("Exported {} ({} bytes) in {:.2?}", file_name, bytes.len(), start.elapsed());
        Ok(file_name)
    }
}
