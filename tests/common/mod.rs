pub mod fixtures;
pub mod package_assertions;

use async_trait::async_trait;
use lopdf::Document as LopdfDocument;
use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use vellum::{
    ExportOptions, ExportOutcome, Exporter, HeadlessHost, HostConfig, HostError, MemorySink, RenderContext,
    RenderHost, SlideRecord,
};
use zip::ZipArchive;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Options for fast tests: no settling delay, 1x rasters.
pub fn test_options() -> ExportOptions {
    ExportOptions { settle_delay_ms: 0, raster_scale: 1.0, ..Default::default() }
}

/// A headless exporter without system fonts writing into `sink`.
pub fn exporter(sink: Arc<MemorySink>) -> Exporter {
    Exporter::new(Arc::new(headless()), sink)
}

pub fn headless() -> HeadlessHost {
    HeadlessHost::default()
}

/// Loads one slide through the headless host.
pub async fn load(slide: &SlideRecord) -> RenderContext {
    headless()
        .load(slide, &test_options().host_config())
        .await
        .expect("slide should load")
}

/// Wrapper around a generated presentation package.
pub struct GeneratedPptx {
    pub bytes: Vec<u8>,
    parts: BTreeMap<String, Vec<u8>>,
}

impl GeneratedPptx {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, Box<dyn std::error::Error>> {
        let mut archive = ZipArchive::new(Cursor::new(bytes.clone()))?;
        let mut parts = BTreeMap::new();
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let mut data = Vec::new();
            file.read_to_end(&mut data)?;
            parts.insert(file.name().to_string(), data);
        }
        Ok(Self { bytes, parts })
    }

    pub fn part_names(&self) -> Vec<&str> {
        self.parts.keys().map(String::as_str).collect()
    }

    pub fn part(&self, name: &str) -> Option<String> {
        self.parts.get(name).map(|d| String::from_utf8_lossy(d).into_owned())
    }

    pub fn slide_count(&self) -> usize {
        self.parts
            .keys()
            .filter(|n| n.starts_with("ppt/slides/slide") && n.ends_with(".xml"))
            .count()
    }

    /// XML of slide `n`, counting from 1.
    pub fn slide(&self, n: usize) -> String {
        self.part(&format!("ppt/slides/slide{n}.xml")).unwrap_or_default()
    }
}

/// Wrapper around a generated PDF.
pub struct GeneratedPdf {
    pub bytes: Vec<u8>,
    pub doc: LopdfDocument,
}

impl GeneratedPdf {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, Box<dyn std::error::Error>> {
        let doc = LopdfDocument::load_mem(&bytes)?;
        Ok(Self { bytes, doc })
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Raw content stream of page `n`, counting from 1.
    pub fn page_text(&self, n: u32) -> String {
        let page_id = self.doc.get_pages()[&n];
        let content = self.doc.get_page_content(page_id).unwrap();
        String::from_utf8_lossy(&content).into_owned()
    }
}

/// Exports `slides` as PPTX into a fresh memory sink.
pub async fn export_pptx(slides: &[SlideRecord]) -> (ExportOutcome, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let outcome = exporter(sink.clone()).export_pptx(slides, &test_options()).await;
    (outcome, sink)
}

pub async fn export_pdf(slides: &[SlideRecord]) -> (ExportOutcome, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let outcome = exporter(sink.clone()).export_pdf(slides, &test_options()).await;
    (outcome, sink)
}

/// Delegates to the headless host but fails on one slide index.
pub struct FailingHost {
    inner: HeadlessHost,
    fail_on: usize,
    loads: AtomicUsize,
}

impl FailingHost {
    pub fn new(fail_on: usize) -> Self {
        Self { inner: headless(), fail_on, loads: AtomicUsize::new(0) }
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RenderHost for FailingHost {
    async fn load(&self, slide: &SlideRecord, config: &HostConfig) -> Result<RenderContext, HostError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if slide.index == self.fail_on {
            return Err(HostError::Other(format!("renderer crashed on slide {}", slide.index)));
        }
        self.inner.load(slide, config).await
    }
}
