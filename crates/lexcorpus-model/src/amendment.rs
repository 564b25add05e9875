use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::id::DocumentId;

/// §3: a single inter-act amendment record. Serves both as a searchable
/// record and, per §4.9, as a change-data-capture manifest entry for
/// incremental refresh.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Amendment {
    pub id: DocumentId,
    pub changed_document_id: DocumentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changed_provision_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affecting_document_id: Option<DocumentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affecting_provision_url: Option<String>,
    pub type_of_effect: String,
    pub affecting_year: i32,
}

impl Amendment {
    /// The amendments-collection adapter's embedding text (§4.6): the
    /// effect description plus the ids on either side, so a lexical match
    /// on "words substituted" or on a cited act still retrieves the record.
    pub fn embedding_text(&self) -> String {
        let mut parts = vec![self.type_of_effect.clone(), self.changed_document_id.to_string()];
        if let Some(affecting) = &self.affecting_document_id {
            parts.push(affecting.to_string());
        }
        parts.join(" ")
    }
}
