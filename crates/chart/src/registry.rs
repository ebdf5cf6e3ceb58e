use crate::snapshot::ChartSnapshot;
use crate::ChartError;
use serde_json::Value;
use std::collections::BTreeMap;

/// Chart snapshots of one render context, keyed by canvas id.
///
/// Registering the same id twice keeps the last configuration, matching a
/// chart that is rebuilt on the same canvas.
#[derive(Debug, Clone, Default)]
pub struct ChartRegistry {
    charts: BTreeMap<String, ChartSnapshot>,
}

impl ChartRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, canvas_id: impl Into<String>, config: &Value) -> Result<(), ChartError> {
        let canvas_id = canvas_id.into();
        let snapshot = ChartSnapshot::capture(config)?;
        log::debug!(
            "Registered '{}' chart with {} dataset(s) for canvas '{}'",
            snapshot.kind,
            snapshot.dataset_count(),
            canvas_id
        );
        self.charts.insert(canvas_id, snapshot);
        Ok(())
    }

    /// Parses `source` as JSON before registering it.
    pub fn register_json(&mut self, canvas_id: impl Into<String>, source: &str) -> Result<(), ChartError> {
        let config: Value = serde_json::from_str(source)?;
        self.register(canvas_id, &config)
    }

    pub fn get(&self, canvas_id: &str) -> Option<&ChartSnapshot> {
        self.charts.get(canvas_id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.charts.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }
}
