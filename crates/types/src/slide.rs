use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One slide of the deck as handed over by the caller.
///
/// `html_body` is a full HTML fragment (styles included). `charts` maps a
/// canvas id to a chart configuration for decks that register charts from
/// the outside instead of embedding them in markup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideRecord {
    pub index: usize,
    pub html_body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub charts: BTreeMap<String, Value>,
}

impl SlideRecord {
    pub fn new(index: usize, html_body: impl Into<String>) -> Self {
        Self {
            index,
            html_body: html_body.into(),
            title: None,
            charts: BTreeMap::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_chart(mut self, canvas_id: impl Into<String>, config: Value) -> Self {
        self.charts.insert(canvas_id.into(), config);
        self
    }
}
