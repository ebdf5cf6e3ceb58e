mod common;

use common::fixtures::*;
use common::{FailingHost, init_logger, test_options};
use std::sync::Arc;
use vellum::{Exporter, MemorySink, SlideRecord};

#[tokio::test]
async fn host_failure_aborts_without_saving() {
    init_logger();
    let host = Arc::new(FailingHost::new(1));
    let sink = Arc::new(MemorySink::new());
    let exporter = Exporter::new(host.clone(), sink.clone());

    let outcome = exporter.export_pptx(&numbered_deck(3), &test_options()).await;

    assert!(!outcome.success);
    assert!(outcome.error.as_deref().unwrap_or_default().contains("renderer crashed on slide 1"));
    assert_eq!(sink.save_count(), 0);
    // Slide 2 is never loaded once slide 1 failed.
    assert_eq!(host.loads(), 2);
}

#[tokio::test]
async fn host_failure_aborts_pdf_too() {
    init_logger();
    let sink = Arc::new(MemorySink::new());
    let exporter = Exporter::new(Arc::new(FailingHost::new(0)), sink.clone());
    let outcome = exporter.export_pdf(&numbered_deck(2), &test_options()).await;
    assert!(!outcome.success);
    assert_eq!(sink.save_count(), 0);
}

#[tokio::test]
async fn empty_deck_is_an_error() {
    init_logger();
    let sink = Arc::new(MemorySink::new());
    let outcome = common::exporter(sink.clone()).export_pptx(&[], &test_options()).await;
    assert!(!outcome.success);
    assert_eq!(outcome.error.as_deref(), Some("No slides to export"));
    assert_eq!(sink.save_count(), 0);
}

#[tokio::test]
async fn missing_content_wrapper_is_structural() {
    init_logger();
    let record = SlideRecord::new(
        0,
        "<div class='slide-container' style='width: 1280px; height: 720px; \
         background-image: linear-gradient(#000, #fff)'><h1>Loose</h1></div>",
    );
    let sink = Arc::new(MemorySink::new());
    let outcome = common::exporter(sink.clone()).export_pptx(&[record], &test_options()).await;
    assert!(!outcome.success);
    assert!(outcome.error.unwrap().contains("slide-content"));
    assert_eq!(sink.save_count(), 0);
}

#[tokio::test]
async fn file_sink_writes_into_its_directory() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let exporter = Exporter::builder()
        .with_system_fonts(false)
        .with_sink(Arc::new(vellum::FileSink::new(dir.path())))
        .build()
        .unwrap();
    let options = vellum::ExportOptions { file_name: "deck".into(), ..test_options() };
    let outcome = exporter.export_pptx(&numbered_deck(1), &options).await;
    assert!(outcome.success, "{outcome:?}");
    assert!(dir.path().join("deck.pptx").exists());
}
