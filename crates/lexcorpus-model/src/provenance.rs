use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Recorded when a [`crate::Document`] or [`crate::Section`] originated from
/// the PDF/OCR fallback path (§4.5) rather than direct XML parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Provenance {
    pub source: ProvenanceSource,
    /// The OCR model identifier, when `source == Ocr`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_id: Option<String>,
}

impl Provenance {
    pub fn xml() -> Self {
        Self {
            source: ProvenanceSource::Xml,
            model: None,
            prompt_version: None,
            timestamp: None,
            response_id: None,
        }
    }

    pub fn ocr(model: impl Into<String>, response_id: impl Into<String>) -> Self {
        Self {
            source: ProvenanceSource::Ocr,
            model: Some(model.into()),
            prompt_version: None,
            timestamp: Some(chrono::Utc::now()),
            response_id: Some(response_id.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProvenanceSource {
    Xml,
    Ocr,
}
