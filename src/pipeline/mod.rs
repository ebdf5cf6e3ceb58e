//! Export orchestration.
//!
//! - [`ExporterBuilder`]: fonts, resources, sink and host for an [`Exporter`]
//! - [`Exporter`]: runs a deck through the host, one slide at a time
//! - [`ExportOutcome`]: the only thing that crosses the public boundary

mod builder;
mod orchestrator;
pub(crate) mod pdf;
pub(crate) mod pptx;

pub use builder::ExporterBuilder;
pub use orchestrator::Exporter;
pub use pptx::slide_model;

use serde::Serialize;

/// Result shape of one export. `error` is set exactly when `success` is false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExportOutcome {
    pub fn saved(message: impl Into<String>) -> Self {
        Self { success: true, message: Some(message.into()), error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self { success: false, message: None, error: Some(error.into()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_serializes_without_empty_fields() {
        let json = serde_json::to_value(ExportOutcome::failed("Slide 2 has no renderable content")).unwrap();
        assert_eq!(json, serde_json::json!({ "success": false, "error": "Slide 2 has no renderable content" }));
        let json = serde_json::to_value(ExportOutcome::saved("Saved deck.pptx")).unwrap();
        assert_eq!(json, serde_json::json!({ "success": true, "message": "Saved deck.pptx" }));
    }
}
