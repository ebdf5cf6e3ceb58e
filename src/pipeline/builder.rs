use super::Exporter;
use crate::error::ExportError;
use crate::sink::OutputSink;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use vellum_host::{HeadlessHost, RenderHost};
use vellum_layout::FontLibrary;
use vellum_resource::{FilesystemResourceProvider, InMemoryResourceProvider, ResourceProvider};

/// A builder for creating an [`Exporter`].
pub struct ExporterBuilder {
    system_fonts: bool,
    font_dirs: Vec<PathBuf>,
    resources: Option<Arc<dyn ResourceProvider>>,
    sink: Option<Arc<dyn OutputSink>>,
    host: Option<Arc<dyn RenderHost>>,
}

impl Default for ExporterBuilder {
    fn default() -> Self {
        Self { system_fonts: true, font_dirs: Vec::new(), resources: None, sink: None, host: None }
    }
}

impl ExporterBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Loads the fonts installed on the host system. On by default.
    pub fn with_system_fonts(mut self, system_fonts: bool) -> Self {
        self.system_fonts = system_fonts;
        self
    }

    /// Scans a directory for font files (`.ttf`, `.otf`, ...).
    pub fn with_font_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.font_dirs.push(path.as_ref().to_path_buf());
        self
    }

    /// Resolves relative `src` and `url(...)` references against a directory.
    pub fn with_resource_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.resources = Some(Arc::new(FilesystemResourceProvider::new(path)));
        self
    }

    pub fn with_resource_provider(mut self, provider: Arc<dyn ResourceProvider>) -> Self {
        self.resources = Some(provider);
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn OutputSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Replaces the headless host. Fonts and resources are then up to `host`.
    pub fn with_host(mut self, host: Arc<dyn RenderHost>) -> Self {
        self.host = Some(host);
        self
    }

    pub fn build(self) -> Result<Exporter, ExportError> {
        let sink = self
            .sink
            .ok_or_else(|| ExportError::Config("No output sink has been configured. Use `with_sink`.".to_string()))?;

        let host = match self.host {
            Some(host) => host,
            None => {
                let mut fonts = FontLibrary::new().with_system_fonts(self.system_fonts);
                for dir in &self.font_dirs {
                    fonts.add_font_dir(dir);
                }
                log::debug!("Font library holds {} face(s)", fonts.face_count());
                let resources = self.resources.unwrap_or_else(|| Arc::new(InMemoryResourceProvider::new()));
                Arc::new(HeadlessHost::new(fonts, resources)) as Arc<dyn RenderHost>
            }
        };

        Ok(Exporter::new(host, sink))
    }
}
