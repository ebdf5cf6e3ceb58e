//! Serializable copies of chart configurations.

use crate::ChartError;
use serde::Serialize;
use serde_json::{Map, Value};
use vellum_style::parsers::{parse_color, run_parser};
use vellum_types::Color;

/// An `{x, y[, r]}` data point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub r: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSnapshot {
    pub label: Option<String>,
    /// Per-type override in mixed charts.
    pub kind: Option<String>,
    /// Plain values; `None` for gaps.
    pub data: Vec<Option<f64>>,
    /// Object-valued data, for scatter and bubble charts.
    pub points: Vec<ScatterPoint>,
    pub background_colors: Vec<Color>,
    pub border_color: Option<Color>,
}

impl DatasetSnapshot {
    pub fn is_empty(&self) -> bool {
        self.data.iter().all(Option::is_none) && self.points.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSnapshot {
    /// The configuration with function values removed.
    pub config: Value,
    pub kind: String,
    pub labels: Vec<String>,
    pub datasets: Vec<DatasetSnapshot>,
    pub index_axis: Option<String>,
    pub title: Option<String>,
    pub stacked: bool,
}

impl ChartSnapshot {
    /// Deep-copies a chart configuration, dropping entries that hold
    /// function source, and extracts what translation and drawing need.
    pub fn capture(config: &Value) -> Result<Self, ChartError> {
        let config = strip_functions(config)
            .ok_or_else(|| ChartError::InvalidConfig("configuration is a function".into()))?;
        let root = config
            .as_object()
            .ok_or_else(|| ChartError::InvalidConfig("expected a JSON object".into()))?;
        let kind = root
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| ChartError::InvalidConfig("missing 'type'".into()))?
            .to_string();

        let data = root.get("data").and_then(Value::as_object);
        let labels = data
            .and_then(|d| d.get("labels"))
            .and_then(Value::as_array)
            .map(|labels| labels.iter().map(label_text).collect())
            .unwrap_or_default();
        let datasets = data
            .and_then(|d| d.get("datasets"))
            .and_then(Value::as_array)
            .map(|sets| sets.iter().filter_map(Value::as_object).map(dataset).collect())
            .unwrap_or_default();

        let options = root.get("options").and_then(Value::as_object);
        let index_axis = options
            .and_then(|o| o.get("indexAxis"))
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(Self {
            kind,
            labels,
            datasets,
            index_axis,
            title: options.and_then(title),
            stacked: options.is_some_and(stacked),
            config,
        })
    }

    pub fn dataset_count(&self) -> usize {
        self.datasets.len()
    }
}

/// Recognizes JavaScript function source stored as a string.
pub fn is_function_source(s: &str) -> bool {
    let s = s.trim();
    if let Some(rest) = s.strip_prefix("function") {
        return rest.starts_with(|c: char| c == '(' || c.is_whitespace());
    }
    let Some(pos) = s.find("=>") else {
        return false;
    };
    let head = s[..pos].trim();
    let body = s[pos + 2..].trim();
    let is_ident = |p: &str| p.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$');
    match head.strip_prefix('(').and_then(|p| p.strip_suffix(')')) {
        Some(params) => params.split(',').all(|p| is_ident(p.trim())),
        // A bare parameter must show up in the body, so prose like
        // "Revenue => Profit" is left alone.
        None => !head.is_empty() && is_ident(head) && (body.starts_with('{') || (body.contains(head) && body != head)),
    }
}

fn strip_functions(value: &Value) -> Option<Value> {
    match value {
        Value::String(s) if is_function_source(s) => None,
        Value::Array(items) => Some(Value::Array(items.iter().filter_map(strip_functions).collect())),
        Value::Object(map) => Some(Value::Object(
            map.iter()
                .filter_map(|(k, v)| strip_functions(v).map(|v| (k.clone(), v)))
                .collect::<Map<String, Value>>(),
        )),
        other => Some(other.clone()),
    }
}

fn label_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(parts) => parts.iter().map(label_text).collect::<Vec<_>>().join(" "),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn color(value: &Value) -> Option<Color> {
    value.as_str().and_then(|s| run_parser(parse_color, s).ok())
}

fn colors(value: Option<&Value>) -> Vec<Color> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(color).collect(),
        Some(v) => color(v).into_iter().collect(),
        None => Vec::new(),
    }
}

fn number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn dataset(map: &Map<String, Value>) -> DatasetSnapshot {
    let raw = map.get("data").and_then(Value::as_array).cloned().unwrap_or_default();
    let mut data = Vec::with_capacity(raw.len());
    let mut points = Vec::new();
    for item in &raw {
        match item {
            Value::Object(p) => {
                if let (Some(x), Some(y)) = (p.get("x").and_then(number), p.get("y").and_then(number)) {
                    points.push(ScatterPoint { x, y, r: p.get("r").and_then(number) });
                }
                data.push(p.get("y").and_then(number));
            }
            other => data.push(number(other)),
        }
    }
    DatasetSnapshot {
        label: map.get("label").map(label_text).filter(|l| !l.is_empty()),
        kind: map.get("type").and_then(Value::as_str).map(str::to_string),
        data,
        points,
        background_colors: colors(map.get("backgroundColor")),
        border_color: colors(map.get("borderColor")).into_iter().next(),
    }
}

fn title(options: &Map<String, Value>) -> Option<String> {
    let title = options
        .get("plugins")
        .and_then(|p| p.get("title"))
        .or_else(|| options.get("title"))?;
    if title.get("display").and_then(Value::as_bool) == Some(false) {
        return None;
    }
    title.get("text").map(label_text).filter(|t| !t.is_empty())
}

fn stacked(options: &Map<String, Value>) -> bool {
    let Some(scales) = options.get("scales") else {
        return false;
    };
    let flag = |axis: &Value| axis.get("stacked").and_then(Value::as_bool).unwrap_or(false);
    match scales {
        Value::Object(axes) => axes.values().any(|axis| match axis {
            // Chart.js 2 nests axes in arrays under xAxes/yAxes.
            Value::Array(list) => list.iter().any(flag),
            other => flag(other),
        }),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn captures_bar_chart() {
        let config = json!({
            "type": "bar",
            "data": {
                "labels": ["Q1", "Q2", ["Q3", "(est)"]],
                "datasets": [
                    { "label": "Revenue", "data": [10, "20", null], "backgroundColor": "#3b82f6" },
                    { "label": "Cost", "data": [5, 6, 7], "backgroundColor": ["red", "rgba(0,0,255,0.5)"] }
                ]
            },
            "options": {
                "indexAxis": "y",
                "plugins": { "title": { "display": true, "text": "Growth" } },
                "scales": { "x": { "stacked": true } }
            }
        });
        let snap = ChartSnapshot::capture(&config).unwrap();
        assert_eq!(snap.kind, "bar");
        assert_eq!(snap.labels, vec!["Q1", "Q2", "Q3 (est)"]);
        assert_eq!(snap.dataset_count(), 2);
        assert_eq!(snap.datasets[0].data, vec![Some(10.0), Some(20.0), None]);
        assert_eq!(snap.datasets[0].background_colors, vec![Color::rgb(0x3b, 0x82, 0xf6)]);
        assert_eq!(snap.datasets[1].background_colors.len(), 2);
        assert_eq!(snap.index_axis.as_deref(), Some("y"));
        assert_eq!(snap.title.as_deref(), Some("Growth"));
        assert!(snap.stacked);
    }

    #[test]
    fn strips_function_strings() {
        let config = json!({
            "type": "line",
            "data": { "datasets": [{ "data": [1, 2] }] },
            "options": {
                "scales": { "y": { "ticks": { "callback": "function (value) { return value + '%'; }" } } },
                "onClick": "(e, items) => console.log(items)",
                "label": "Revenue => Profit"
            }
        });
        let snap = ChartSnapshot::capture(&config).unwrap();
        let ticks = &snap.config["options"]["scales"]["y"]["ticks"];
        assert!(ticks.get("callback").is_none());
        assert!(snap.config["options"].get("onClick").is_none());
        assert_eq!(snap.config["options"]["label"], "Revenue => Profit");
    }

    #[test]
    fn function_source_detection() {
        assert!(is_function_source("function(v) { return v; }"));
        assert!(is_function_source("  function format(v) {}"));
        assert!(is_function_source("v => v * 2"));
        assert!(is_function_source("(a, b) => a + b"));
        assert!(is_function_source("() => 1"));
        assert!(!is_function_source("functional"));
        assert!(!is_function_source("Revenue => Profit"));
        assert!(!is_function_source("#ff0000"));
    }

    #[test]
    fn rejects_configs_without_type() {
        assert!(matches!(
            ChartSnapshot::capture(&json!({ "data": {} })),
            Err(ChartError::InvalidConfig(_))
        ));
        assert!(ChartSnapshot::capture(&json!([1, 2])).is_err());
    }

    #[test]
    fn non_finite_strings_are_gaps() {
        let config = json!({
            "type": "line",
            "data": { "datasets": [{ "data": ["NaN", "inf", "-Infinity", " 4.5 ", 3] }] }
        });
        let snap = ChartSnapshot::capture(&config).unwrap();
        assert_eq!(snap.datasets[0].data, vec![None, None, None, Some(4.5), Some(3.0)]);
    }

    #[test]
    fn scatter_points_are_kept() {
        let config = json!({
            "type": "bubble",
            "data": { "datasets": [{ "data": [{ "x": 1, "y": 2, "r": 5 }, { "x": 3, "y": 4 }] }] }
        });
        let snap = ChartSnapshot::capture(&config).unwrap();
        assert_eq!(snap.datasets[0].points.len(), 2);
        assert_eq!(snap.datasets[0].points[0].r, Some(5.0));
        assert_eq!(snap.datasets[0].data, vec![Some(2.0), Some(4.0)]);
    }
}
