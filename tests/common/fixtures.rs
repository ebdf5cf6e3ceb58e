use serde_json::{Value, json};
use vellum::SlideRecord;

/// A slide with the default container and content wrapper around `content`.
pub fn slide(index: usize, container_style: &str, content: &str) -> SlideRecord {
    SlideRecord::new(
        index,
        format!(
            "<style>body {{ margin: 0 }} \
             .slide-container {{ width: 1280px; height: 720px; box-sizing: border-box; padding: 48px; {container_style} }}</style>\
             <div class='slide-container'><div class='slide-content'>{content}</div></div>"
        ),
    )
}

/// A slide on a solid background.
pub fn solid_slide(index: usize, background: &str, content: &str) -> SlideRecord {
    slide(index, &format!("background-color: {background};"), content)
}

/// A slide whose container has a gradient background.
pub fn gradient_slide(index: usize, content: &str) -> SlideRecord {
    slide(index, "background-image: linear-gradient(135deg, #1e3a8a, #9333ea);", content)
}

/// A deck of `n` titled slides, each with one numbered heading.
pub fn numbered_deck(n: usize) -> Vec<SlideRecord> {
    (0..n)
        .map(|i| solid_slide(i, "#ffffff", &format!("<h1>Slide number {}</h1>", i + 1)).with_title(format!("Part {}", i + 1)))
        .collect()
}

pub fn pie_config(datasets: usize) -> Value {
    let datasets: Vec<Value> = (0..datasets)
        .map(|i| json!({ "label": format!("Series {}", i + 1), "data": [10 + i, 20, 30] }))
        .collect();
    json!({
        "type": "pie",
        "data": { "labels": ["North", "South", "West"], "datasets": datasets }
    })
}

pub fn chart_slide(index: usize, config: Option<Value>) -> SlideRecord {
    let record = solid_slide(index, "#ffffff", "<canvas id='sales' width='400' height='300'></canvas>");
    match config {
        Some(config) => record.with_chart("sales", config),
        None => record,
    }
}
