//! Render hosts: turn one slide record into a laid-out render context.

use crate::boxes::BoxBuilder;
use crate::cascade::{author_stylesheet, cascade};
use crate::charts::build_registry;
use crate::context::RenderContext;
use crate::dom::Document;
use crate::fonts::load_web_fonts;
use crate::HostError;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use vellum_layout::{compute_layout, FontLibrary};
use vellum_resource::{InMemoryResourceProvider, ResourceProvider};
use vellum_style::CascadeContext;
use vellum_types::{SlideRecord, Size};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostConfig {
    /// Off-screen canvas in CSS pixels.
    pub canvas: Size,
    /// Wait after layout before the context is handed out.
    pub settle_delay: Duration,
    /// Upper bound on one whole load, settling included.
    pub load_timeout: Duration,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            canvas: Size::new(1280.0, 720.0),
            settle_delay: Duration::from_millis(100),
            load_timeout: Duration::from_secs(10),
        }
    }
}

/// Creates isolated render contexts. Any error is fatal for the slide.
#[async_trait]
pub trait RenderHost: Send + Sync {
    async fn load(&self, slide: &SlideRecord, config: &HostConfig) -> Result<RenderContext, HostError>;
}

/// Renders slides without a browser: html5ever, the cascade, then taffy.
#[derive(Debug, Clone)]
pub struct HeadlessHost {
    fonts: FontLibrary,
    resources: Arc<dyn ResourceProvider>,
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new(FontLibrary::new(), Arc::new(InMemoryResourceProvider::new()))
    }
}

impl HeadlessHost {
    pub fn new(fonts: FontLibrary, resources: Arc<dyn ResourceProvider>) -> Self {
        Self { fonts, resources }
    }

    pub fn fonts(&self) -> &FontLibrary {
        &self.fonts
    }
}

#[async_trait]
impl RenderHost for HeadlessHost {
    async fn load(&self, slide: &SlideRecord, config: &HostConfig) -> Result<RenderContext, HostError> {
        let index = slide.index;
        let fonts = self.fonts.fork();
        let resources = self.resources.clone();
        let record = slide.clone();
        let canvas = config.canvas;
        let settle = config.settle_delay;

        let load = async move {
            let context = tokio::task::spawn_blocking(move || build_context(&record, canvas, fonts, resources))
                .await
                .map_err(|e| HostError::Join(e.to_string()))??;
            if !settle.is_zero() {
                tokio::time::sleep(settle).await;
            }
            Ok(context)
        };

        match tokio::time::timeout(config.load_timeout, load).await {
            Ok(result) => result,
            Err(_) => Err(HostError::Timeout { slide: index, after: config.load_timeout }),
        }
    }
}

/// The synchronous part of a load: parse, fonts, cascade, charts, layout.
pub fn build_context(
    slide: &SlideRecord,
    canvas: Size,
    mut fonts: FontLibrary,
    resources: Arc<dyn ResourceProvider>,
) -> Result<RenderContext, HostError> {
    let document = Document::parse(&slide.html_body);
    let author = author_stylesheet(&document);
    let web_fonts = load_web_fonts(&mut fonts, &author, resources.as_ref());
    if web_fonts > 0 {
        log::debug!("Slide {} loaded {} web font(s)", slide.index, web_fonts);
    }

    let cascade_ctx = CascadeContext { viewport: canvas, ..Default::default() };
    let styles = cascade(&document, &author, &cascade_ctx);
    let charts = build_registry(&document, slide);

    let tree = BoxBuilder::new(&document, &styles, resources.as_ref())
        .build()
        .ok_or(HostError::EmptyDocument(slide.index))?;
    let layout = compute_layout(&tree.root, canvas, &fonts)?;

    Ok(RenderContext::new(slide.index, canvas, document, styles, tree, layout, charts, fonts, resources))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_types::Rect;

    fn instant() -> HostConfig {
        HostConfig { settle_delay: Duration::ZERO, ..Default::default() }
    }

    #[tokio::test]
    async fn lays_out_a_slide_at_canvas_size() {
        let slide = SlideRecord::new(
            0,
            "<style>body { margin: 0 } .slide-container { width: 1280px; height: 720px; padding: 40px; box-sizing: border-box }</style>\
             <div class='slide-container'><h1 id=t>Quarterly review</h1></div>",
        );
        let ctx = HeadlessHost::default().load(&slide, &instant()).await.unwrap();
        let container = ctx.find_by_class("slide-container").unwrap();
        assert_eq!(ctx.rect(container), Some(Rect::new(0.0, 0.0, 1280.0, 720.0)));

        let title = ctx.document().find_by_id("t").unwrap();
        let rect = ctx.rect(title).unwrap();
        assert_eq!(rect.x, 40.0);
        assert!(rect.height > 0.0);
        let text = ctx.text(title).unwrap();
        assert_eq!(text.runs[0].text, "Quarterly review");
        ctx.close();
    }

    #[tokio::test]
    async fn contexts_keep_their_own_charts() {
        let host = HeadlessHost::default();
        let chart = serde_json::json!({ "type": "pie", "data": { "datasets": [{ "data": [1, 2] }] } });
        let first = SlideRecord::new(0, "<canvas id=c></canvas>").with_chart("c", chart);
        let second = SlideRecord::new(1, "<canvas id=c></canvas>");
        let a = host.load(&first, &instant()).await.unwrap();
        let b = host.load(&second, &instant()).await.unwrap();
        assert_eq!(a.charts().len(), 1);
        assert!(b.charts().is_empty());
    }

    #[tokio::test]
    async fn list_items_are_numbered() {
        let slide = SlideRecord::new(
            0,
            "<ol start=3><li id=a>x</li><li id=b>y</li></ol><ul><li id=c>z</li></ul><p id=p>w</p>",
        );
        let ctx = HeadlessHost::default().load(&slide, &instant()).await.unwrap();
        let id = |s: &str| ctx.document().find_by_id(s).unwrap();
        assert_eq!(ctx.list_marker(id("a")).as_deref(), Some("3."));
        assert_eq!(ctx.list_marker(id("b")).as_deref(), Some("4."));
        assert_eq!(ctx.list_marker(id("c")).as_deref(), Some("\u{2022}"));
        assert_eq!(ctx.list_marker(id("p")), None);
    }

    #[tokio::test]
    async fn slow_loads_time_out() {
        let config = HostConfig {
            settle_delay: Duration::from_millis(200),
            load_timeout: Duration::from_millis(20),
            ..Default::default()
        };
        let err = HeadlessHost::default()
            .load(&SlideRecord::new(3, "<p>x</p>"), &config)
            .await
            .unwrap_err();
        assert!(matches!(err, HostError::Timeout { slide: 3, .. }));
    }
}
