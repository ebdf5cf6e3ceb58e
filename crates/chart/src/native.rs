//! Translation of chart snapshots into native presentation chart models.

use crate::snapshot::{ChartSnapshot, DatasetSnapshot};
use crate::ChartError;
use vellum_types::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeChartKind {
    Bar { horizontal: bool, stacked: bool },
    Line,
    Pie,
    Doughnut,
}

impl NativeChartKind {
    pub fn is_round(&self) -> bool {
        matches!(self, NativeChartKind::Pie | NativeChartKind::Doughnut)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NativeSeries {
    pub name: String,
    pub values: Vec<f64>,
    /// Series fill or line color.
    pub color: Option<Color>,
    /// Per-category colors, used for pie slices and multi-colored bars.
    pub point_colors: Vec<Color>,
}

/// Chart data in the shape a presentation chart part needs: categories plus
/// one value list per series, all with literal caches.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeChart {
    pub kind: NativeChartKind,
    pub title: Option<String>,
    pub categories: Vec<String>,
    pub series: Vec<NativeSeries>,
}

/// Maps a snapshot onto a native chart.
///
/// # Errors
///
/// `Unsupported` for types without a native equivalent (radar, polar area,
/// scatter, bubble and unknown ones). `NoData` when every dataset is empty.
pub fn translate(snapshot: &ChartSnapshot) -> Result<NativeChart, ChartError> {
    let kind = match snapshot.kind.as_str() {
        "bar" => NativeChartKind::Bar {
            horizontal: snapshot.index_axis.as_deref() == Some("y"),
            stacked: snapshot.stacked,
        },
        "horizontalBar" => NativeChartKind::Bar { horizontal: true, stacked: snapshot.stacked },
        "line" => NativeChartKind::Line,
        "pie" => NativeChartKind::Pie,
        "doughnut" => NativeChartKind::Doughnut,
        other => return Err(ChartError::Unsupported(other.to_string())),
    };

    if snapshot.datasets.is_empty() || snapshot.datasets.iter().all(DatasetSnapshot::is_empty) {
        return Err(ChartError::NoData);
    }

    let points = snapshot.datasets.iter().map(|d| d.data.len()).max().unwrap_or(0);
    let categories = if snapshot.labels.is_empty() {
        (1..=points).map(|i| i.to_string()).collect()
    } else {
        snapshot.labels.clone()
    };

    let series = snapshot
        .datasets
        .iter()
        .enumerate()
        .map(|(i, dataset)| series(i, dataset, categories.len()))
        .collect();

    Ok(NativeChart { kind, title: snapshot.title.clone(), categories, series })
}

fn series(index: usize, dataset: &DatasetSnapshot, categories: usize) -> NativeSeries {
    let mut values: Vec<f64> = dataset.data.iter().map(|v| v.unwrap_or(0.0)).collect();
    values.resize(categories.max(values.len()), 0.0);
    let color = dataset
        .background_colors
        .first()
        .copied()
        .or(dataset.border_color)
        .filter(|c| !c.is_transparent());
    let point_colors = if dataset.background_colors.len() > 1 {
        dataset.background_colors.clone()
    } else {
        Vec::new()
    };
    NativeSeries {
        name: dataset.label.clone().unwrap_or_else(|| format!("Series {}", index + 1)),
        values,
        color,
        point_colors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snap(value: serde_json::Value) -> ChartSnapshot {
        ChartSnapshot::capture(&value).unwrap()
    }

    #[test]
    fn translates_vertical_and_horizontal_bars() {
        let chart = translate(&snap(json!({
            "type": "bar",
            "data": { "labels": ["a", "b"], "datasets": [{ "label": "x", "data": [1, 2] }] }
        })))
        .unwrap();
        assert_eq!(chart.kind, NativeChartKind::Bar { horizontal: false, stacked: false });
        assert_eq!(chart.categories, vec!["a", "b"]);
        assert_eq!(chart.series[0].values, vec![1.0, 2.0]);

        let chart = translate(&snap(json!({
            "type": "bar",
            "data": { "datasets": [{ "data": [1] }] },
            "options": { "indexAxis": "y" }
        })))
        .unwrap();
        assert_eq!(chart.kind, NativeChartKind::Bar { horizontal: true, stacked: false });

        let chart = translate(&snap(json!({ "type": "horizontalBar", "data": { "datasets": [{ "data": [1] }] } })))
            .unwrap();
        assert!(matches!(chart.kind, NativeChartKind::Bar { horizontal: true, .. }));
    }

    #[test]
    fn pie_keeps_one_series_per_dataset_with_slice_colors() {
        let chart = translate(&snap(json!({
            "type": "pie",
            "data": {
                "labels": ["red", "blue", "green"],
                "datasets": [{ "data": [3, 5, 2], "backgroundColor": ["#ff0000", "#0000ff", "#00ff00"] }]
            }
        })))
        .unwrap();
        assert_eq!(chart.kind, NativeChartKind::Pie);
        assert_eq!(chart.series.len(), 1);
        assert_eq!(chart.series[0].name, "Series 1");
        assert_eq!(chart.series[0].point_colors.len(), 3);
        assert_eq!(chart.series[0].color, Some(Color::rgb(255, 0, 0)));
    }

    #[test]
    fn gaps_become_zero_and_labels_default_to_positions() {
        let chart = translate(&snap(json!({
            "type": "line",
            "data": { "datasets": [{ "data": [1, null, 3] }, { "data": [4] }] }
        })))
        .unwrap();
        assert_eq!(chart.categories, vec!["1", "2", "3"]);
        assert_eq!(chart.series[0].values, vec![1.0, 0.0, 3.0]);
        assert_eq!(chart.series[1].values, vec![4.0, 0.0, 0.0]);
    }

    #[test]
    fn unsupported_types_and_empty_data_fail() {
        for kind in ["radar", "polarArea", "scatter", "bubble", "sankey"] {
            let result = translate(&snap(json!({ "type": kind, "data": { "datasets": [{ "data": [1] }] } })));
            assert!(matches!(result, Err(ChartError::Unsupported(_))), "{kind}");
        }
        assert!(matches!(
            translate(&snap(json!({ "type": "bar", "data": { "datasets": [] } }))),
            Err(ChartError::NoData)
        ));
        assert!(matches!(
            translate(&snap(json!({ "type": "pie", "data": { "datasets": [{ "data": [null] }] } }))),
            Err(ChartError::NoData)
        ));
    }
}
