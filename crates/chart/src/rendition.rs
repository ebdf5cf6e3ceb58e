//! The chart fallback chain as a tagged result.

use crate::native::{translate, NativeChart};
use crate::snapshot::ChartSnapshot;

/// What to draw from when a chart cannot be native.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RasterSource<'a> {
    /// Redraw the registered configuration.
    Snapshot(&'a ChartSnapshot),
    /// Paint whatever the canvas box shows.
    CanvasBox,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rendition<'a> {
    Native(NativeChart),
    Rasterized(RasterSource<'a>),
}

/// Picks the rendition for one canvas. A snapshot that translates becomes a
/// native chart, one that doesn't is drawn from its configuration, and a
/// canvas without a snapshot is painted as is.
pub fn choose_rendition(snapshot: Option<&ChartSnapshot>) -> Rendition<'_> {
    let Some(snapshot) = snapshot else {
        return Rendition::Rasterized(RasterSource::CanvasBox);
    };
    match translate(snapshot) {
        Ok(chart) => Rendition::Native(chart),
        Err(e) => {
            log::warn!("Chart '{}' falls back to an image: {}", snapshot.kind, e);
            Rendition::Rasterized(RasterSource::Snapshot(snapshot))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn translatable_snapshot_is_native() {
        let snap = ChartSnapshot::capture(&json!({
            "type": "pie",
            "data": { "datasets": [{ "data": [1, 2] }, { "data": [3, 4] }] }
        }))
        .unwrap();
        match choose_rendition(Some(&snap)) {
            Rendition::Native(chart) => assert_eq!(chart.series.len(), 2),
            other => panic!("expected native chart, got {:?}", other),
        }
    }

    #[test]
    fn failed_translation_draws_the_snapshot() {
        let snap = ChartSnapshot::capture(&json!({ "type": "radar", "data": { "datasets": [{ "data": [1] }] } }))
            .unwrap();
        assert_eq!(choose_rendition(Some(&snap)), Rendition::Rasterized(RasterSource::Snapshot(&snap)));
    }

    #[test]
    fn missing_snapshot_paints_the_canvas() {
        assert_eq!(choose_rendition(None), Rendition::Rasterized(RasterSource::CanvasBox));
    }
}
