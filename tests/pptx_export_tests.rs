mod common;

use common::fixtures::*;
use common::package_assertions::occurrences;
use common::{GeneratedPptx, TestResult, export_pptx, init_logger};

#[tokio::test]
async fn solid_background_is_written_as_slide_fill() -> TestResult {
    init_logger();
    let (outcome, sink) = export_pptx(&[solid_slide(0, "#1e3a8a", "<p>Plain paragraph</p>")]).await;
    assert!(outcome.success, "{outcome:?}");

    let (name, bytes) = sink.last().unwrap();
    assert_eq!(name, "presentation.pptx");
    let pptx = GeneratedPptx::from_bytes(bytes)?;
    assert_slide_contains!(pptx, 1, r#"<p:bg><p:bgPr><a:solidFill><a:srgbClr val="1E3A8A"/>"#);
    assert_slide_contains!(pptx, 1, "<a:t>Plain paragraph</a:t>");
    Ok(())
}

#[tokio::test]
async fn package_has_the_fixed_parts() -> TestResult {
    init_logger();
    let (outcome, sink) = export_pptx(&numbered_deck(1)).await;
    assert!(outcome.success);
    let pptx = GeneratedPptx::from_bytes(sink.last().unwrap().1)?;
    for part in [
        "[Content_Types].xml",
        "_rels/.rels",
        "docProps/core.xml",
        "docProps/app.xml",
        "ppt/presentation.xml",
        "ppt/_rels/presentation.xml.rels",
        "ppt/slideMasters/slideMaster1.xml",
        "ppt/slideLayouts/slideLayout1.xml",
        "ppt/theme/theme1.xml",
        "ppt/slides/slide1.xml",
        "ppt/slides/_rels/slide1.xml.rels",
    ] {
        assert!(pptx.part_names().contains(&part), "missing {part}: {:?}", pptx.part_names());
    }
    let presentation = pptx.part("ppt/presentation.xml").unwrap();
    assert!(presentation.contains(r#"<p:sldSz cx="12192000" cy="6858000""#), "{presentation}");
    let core = pptx.part("docProps/core.xml").unwrap();
    assert!(core.contains("<dc:title>Part 1</dc:title>"), "{core}");
    Ok(())
}

#[tokio::test]
async fn slides_keep_input_order() -> TestResult {
    init_logger();
    let (outcome, sink) = export_pptx(&numbered_deck(3)).await;
    assert!(outcome.success);
    assert_eq!(sink.save_count(), 1);

    let pptx = GeneratedPptx::from_bytes(sink.last().unwrap().1)?;
    assert_eq!(pptx.slide_count(), 3);
    for n in 1..=3 {
        assert_slide_contains!(pptx, n, &format!("<a:t>Slide number {n}</a:t>"));
    }
    Ok(())
}

#[tokio::test]
async fn bold_run_is_flagged_in_the_xml() -> TestResult {
    init_logger();
    let (_, sink) = export_pptx(&[solid_slide(0, "#ffffff", "<p>Hello <strong>bold</strong> world</p>")]).await;
    let pptx = GeneratedPptx::from_bytes(sink.last().unwrap().1)?;
    let xml = pptx.slide(1);
    assert_eq!(occurrences(&xml, r#" b="1""#), 1, "{xml}");
    assert_slide_contains!(pptx, 1, "<a:t>bold</a:t>");
    Ok(())
}

#[tokio::test]
async fn registered_chart_gets_a_chart_part() -> TestResult {
    init_logger();
    let (outcome, sink) = export_pptx(&[chart_slide(0, Some(pie_config(1)))]).await;
    assert!(outcome.success);
    let pptx = GeneratedPptx::from_bytes(sink.last().unwrap().1)?;

    assert_slide_contains!(pptx, 1, "<c:chart ");
    let chart = pptx.part("ppt/charts/chart1.xml").unwrap();
    assert!(chart.contains("<c:pieChart>"), "{chart}");
    assert_eq!(occurrences(&chart, "<c:ser>"), 1);
    Ok(())
}

#[tokio::test]
async fn unregistered_canvas_becomes_a_picture() -> TestResult {
    init_logger();
    let (_, sink) = export_pptx(&[chart_slide(0, None)]).await;
    let pptx = GeneratedPptx::from_bytes(sink.last().unwrap().1)?;
    assert_eq!(occurrences(&pptx.slide(1), "<p:pic>"), 1);
    assert!(pptx.part_names().iter().any(|n| n.starts_with("ppt/media/")));
    assert!(!pptx.part_names().iter().any(|n| n.starts_with("ppt/charts/")));
    Ok(())
}

#[tokio::test]
async fn gradient_background_is_a_full_bleed_picture() -> TestResult {
    init_logger();
    let (outcome, sink) = export_pptx(&[gradient_slide(0, "<h1>Editable title</h1>")]).await;
    assert!(outcome.success, "{outcome:?}");
    let pptx = GeneratedPptx::from_bytes(sink.last().unwrap().1)?;

    assert_slide_contains!(pptx, 1, "<a:blipFill dpi=\"0\" rotWithShape=\"1\">");
    assert_slide_contains!(pptx, 1, "<a:t>Editable title</a:t>");
    assert_slide_not_contains!(pptx, 1, "<p:pic>");
    Ok(())
}

#[tokio::test]
async fn file_name_option_names_the_output() -> TestResult {
    init_logger();
    let sink = std::sync::Arc::new(vellum::MemorySink::new());
    let options = vellum::ExportOptions { file_name: "q3-review".into(), ..common::test_options() };
    let outcome = common::exporter(sink.clone()).export_pptx(&numbered_deck(1), &options).await;
    assert_eq!(outcome.message.as_deref(), Some("Saved q3-review.pptx"));
    assert_eq!(sink.last().unwrap().0, "q3-review.pptx");
    Ok(())
}
