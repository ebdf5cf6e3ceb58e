//! Builds the per-context chart registry from markup and caller-supplied configs.

use crate::dom::{Document, ElementRef};
use vellum_chart::ChartRegistry;
use vellum_types::SlideRecord;

/// Registry key for a canvas: its `id`, or a key derived from its node id.
pub fn canvas_chart_key(canvas: ElementRef<'_>) -> String {
    match canvas.get_attr("id").map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => id.to_string(),
        None => format!("canvas-{}", canvas.id()),
    }
}

/// Collects chart configurations in increasing precedence: `data-chart`
/// attributes, then `<script data-chart-for>` blocks, then the slide record's
/// own map. A later source replaces an earlier one for the same canvas.
pub fn build_registry(doc: &Document, slide: &SlideRecord) -> ChartRegistry {
    let mut registry = ChartRegistry::new();

    for canvas in doc.elements().filter(|e| e.name() == "canvas") {
        if let Some(source) = canvas.get_attr("data-chart") {
            let key = canvas_chart_key(canvas);
            if let Err(e) = registry.register_json(key.clone(), source) {
                log::warn!("Ignoring data-chart on canvas '{}': {}", key, e);
            }
        }
    }

    for script in doc.elements().filter(|e| e.name() == "script") {
        let Some(target) = script.get_attr("data-chart-for") else { continue };
        let json_type = script
            .get_attr("type")
            .is_some_and(|t| t.trim().eq_ignore_ascii_case("application/json"));
        if !json_type {
            log::warn!("Chart script for '{}' is not application/json; skipped", target);
            continue;
        }
        if let Err(e) = registry.register_json(target.trim(), &script.text()) {
            log::warn!("Ignoring chart script for canvas '{}': {}", target, e);
        }
    }

    for (canvas_id, config) in &slide.charts {
        if let Err(e) = registry.register(canvas_id.clone(), config) {
            log::warn!("Ignoring chart registered for canvas '{}': {}", canvas_id, e);
        }
    }

    log::debug!("Slide {} registered {} chart(s)", slide.index, registry.len());
    registry
}
