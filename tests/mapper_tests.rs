mod common;

use common::fixtures::*;
use common::{init_logger, load, test_options};
use vellum::mapper::{map_slide, MappedBackground, Primitive, PrimitiveKind};
use vellum::SlideRecord;
use vellum_types::Color;

#[tokio::test]
async fn solid_root_background_becomes_the_slide_background() {
    init_logger();
    let ctx = load(&solid_slide(0, "#1e3a8a", "<p>Plain paragraph</p><p>Another one</p>")).await;
    let mapped = map_slide(&ctx, &test_options()).unwrap();
    ctx.close();

    assert_eq!(mapped.background, MappedBackground::Solid(Color::rgb(0x1e, 0x3a, 0x8a)));
    assert!(mapped.kinds().iter().all(|k| *k == PrimitiveKind::Text));
}

#[tokio::test]
async fn transparent_root_has_no_background() {
    init_logger();
    let ctx = load(&slide(0, "", "<p>Text</p>")).await;
    let mapped = map_slide(&ctx, &test_options()).unwrap();
    assert_eq!(mapped.background, MappedBackground::None);
}

#[tokio::test]
async fn inline_formatting_splits_runs() {
    init_logger();
    let ctx = load(&solid_slide(0, "#ffffff", "<p>Hello <strong>bold</strong> world</p>")).await;
    let mapped = map_slide(&ctx, &test_options()).unwrap();

    let texts: Vec<_> = mapped
        .primitives
        .iter()
        .filter_map(|p| match p {
            Primitive::Text(t) => Some(t),
            _ => None,
        })
        .collect();
    assert_eq!(texts.len(), 1);
    let text = texts[0];
    assert_eq!(text.text(), "Hello bold world");

    let runs: Vec<_> = text.runs().collect();
    assert_eq!(runs.len(), 3);
    let bold: Vec<&str> = runs.iter().filter(|r| r.bold).map(|r| r.text.as_str()).collect();
    assert_eq!(bold, vec!["bold"]);
}

#[tokio::test]
async fn registered_pie_becomes_a_native_chart() {
    init_logger();
    let ctx = load(&chart_slide(0, Some(pie_config(2)))).await;
    let mapped = map_slide(&ctx, &test_options()).unwrap();

    assert_eq!(mapped.kinds(), vec![PrimitiveKind::Chart]);
    let Primitive::Chart(chart) = &mapped.primitives[0] else { panic!("expected a chart") };
    assert_eq!(chart.chart.series.len(), 2);
    assert_eq!(chart.chart.categories, vec!["North", "South", "West"]);
}

#[tokio::test]
async fn unregistered_canvas_becomes_one_image() {
    init_logger();
    let ctx = load(&chart_slide(0, None)).await;
    let mapped = map_slide(&ctx, &test_options()).unwrap();
    assert_eq!(mapped.kinds(), vec![PrimitiveKind::Image]);
}

#[tokio::test]
async fn untranslatable_chart_is_drawn_as_an_image() {
    init_logger();
    let radar = serde_json::json!({
        "type": "radar",
        "data": { "labels": ["a", "b", "c"], "datasets": [{ "data": [1, 2, 3] }] }
    });
    let ctx = load(&chart_slide(0, Some(radar))).await;
    let mapped = map_slide(&ctx, &test_options()).unwrap();
    assert_eq!(mapped.kinds(), vec![PrimitiveKind::Image]);
}

#[tokio::test]
async fn gradient_root_walks_only_the_content_wrapper() {
    init_logger();
    let ctx = load(&gradient_slide(0, "<h1>On a gradient</h1>")).await;
    let mapped = map_slide(&ctx, &test_options()).unwrap();

    let MappedBackground::Picture(picture) = &mapped.background else { panic!("expected a picture background") };
    assert_eq!((picture.width, picture.height), (1280, 720));
    assert_eq!(mapped.kinds(), vec![PrimitiveKind::Text]);
}

#[tokio::test]
async fn gradient_root_without_content_wrapper_fails() {
    init_logger();
    let record = SlideRecord::new(
        4,
        "<div class='slide-container' style='width: 1280px; height: 720px; \
         background-image: linear-gradient(#000, #fff)'><h1>Loose</h1></div>",
    );
    let ctx = load(&record).await;
    let err = map_slide(&ctx, &test_options()).unwrap_err();
    assert!(err.to_string().contains("slide-content"), "{err}");
}

#[tokio::test]
async fn boxes_become_shapes_and_images_become_pictures() {
    init_logger();
    let ctx = load(&solid_slide(
        0,
        "#ffffff",
        "<div style='width: 200px; height: 100px; background: #0ea5e9; border-radius: 12px'></div>\
         <img alt='logo' style='width: 64px; height: 64px' src='data:image/svg+xml;utf8,<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"8\" height=\"8\"><rect width=\"8\" height=\"8\" fill=\"red\"/></svg>'>",
    ))
    .await;
    let mapped = map_slide(&ctx, &test_options()).unwrap();

    assert_eq!(mapped.kinds(), vec![PrimitiveKind::Shape, PrimitiveKind::Image]);
    let Primitive::Shape(shape) = &mapped.primitives[0] else { panic!("expected a shape") };
    assert_eq!(shape.fill, Some(Color::rgb(0x0e, 0xa5, 0xe9)));
    assert_eq!(shape.radius_px, 12.0);
    // Frames are relative to the container, inside its 48px padding.
    assert_eq!((shape.frame.x, shape.frame.y), (48.0, 48.0));
    let Primitive::Image(image) = &mapped.primitives[1] else { panic!("expected an image") };
    assert_eq!(image.description, "logo");
}

#[tokio::test]
async fn decorative_and_hidden_nodes_are_skipped() {
    init_logger();
    let ctx = load(&solid_slide(
        0,
        "#ffffff",
        "<p data-decorative>ornament</p><p style='visibility: hidden'>hidden</p><p>kept</p>",
    ))
    .await;
    let mapped = map_slide(&ctx, &test_options()).unwrap();
    let texts: Vec<String> = mapped
        .primitives
        .iter()
        .filter_map(|p| match p {
            Primitive::Text(t) => Some(t.text()),
            _ => None,
        })
        .collect();
    assert_eq!(texts, vec!["kept"]);
}

#[tokio::test]
async fn list_items_carry_their_markers() {
    init_logger();
    let ctx = load(&solid_slide(0, "#ffffff", "<ol start='2'><li>first</li><li>second</li></ol><ul><li>dot</li></ul>")).await;
    let mapped = map_slide(&ctx, &test_options()).unwrap();
    let bullets: Vec<Option<String>> = mapped
        .primitives
        .iter()
        .filter_map(|p| match p {
            Primitive::Text(t) => Some(t.paragraphs[0].bullet.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(bullets, vec![Some("2.".to_string()), Some("3.".to_string()), Some("\u{2022}".to_string())]);
}

#[tokio::test]
async fn mapping_is_deterministic() {
    init_logger();
    let record = solid_slide(
        0,
        "#f8fafc",
        "<h1>Title</h1><div style='border: 2px solid #333; padding: 8px'><p>Boxed <em>text</em></p></div>\
         <canvas id='c' width='200' height='100'></canvas>",
    );
    let first = {
        let ctx = load(&record).await;
        map_slide(&ctx, &test_options()).unwrap()
    };
    let second = {
        let ctx = load(&record).await;
        map_slide(&ctx, &test_options()).unwrap()
    };
    assert!(!first.primitives.is_empty());
    assert_eq!(first.kinds(), second.kinds());
}

fn texts_of(mapped: &vellum::mapper::MappedSlide) -> Vec<String> {
    mapped
        .primitives
        .iter()
        .filter_map(|p| match p {
            Primitive::Text(t) => Some(t.text()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn inline_only_container_keeps_its_text() {
    init_logger();
    let record = SlideRecord::new(
        2,
        "<div class='slide-container' style='width: 1280px; height: 720px; border: 2px solid #111'>\
         Quarterly <strong>results</strong> are in</div>",
    );
    let ctx = load(&record).await;
    let mapped = map_slide(&ctx, &test_options()).unwrap();

    assert_eq!(texts_of(&mapped), vec!["Quarterly results are in"]);
    // The root border is kept, its fill never is.
    let Primitive::Shape(border) = &mapped.primitives[0] else { panic!("expected the root border first") };
    assert_eq!(border.fill, None);
}

#[tokio::test]
async fn bare_text_slide_falls_back_to_the_body() {
    init_logger();
    let ctx = load(&SlideRecord::new(1, "Just a sentence on the slide")).await;
    let mapped = map_slide(&ctx, &test_options()).unwrap();
    assert_eq!(texts_of(&mapped), vec!["Just a sentence on the slide"]);
}

#[tokio::test]
async fn icon_lookalike_classes_stay_text() {
    init_logger();
    let ctx = load(&solid_slide(0, "#ffffff", "<p>Not an <span class='iconic-title'>icon</span></p>")).await;
    let mapped = map_slide(&ctx, &test_options()).unwrap();
    assert_eq!(mapped.kinds(), vec![PrimitiveKind::Text]);
    assert_eq!(texts_of(&mapped), vec!["Not an icon"]);
}
