use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::id::DocumentId;

/// §3: an editorial explanatory note attached to a parent document, ordered
/// by its position within the parent's explanatory-notes document.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExplanatoryNote {
    pub id: DocumentId,
    pub parent_document_id: DocumentId,
    /// Ordered heading breadcrumbs, outermost first.
    pub route: Vec<String>,
    /// Stable order within the parent.
    pub order: u32,
    pub note_type: String,
    pub section_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_number: Option<String>,
    pub text: String,
}

impl ExplanatoryNote {
    /// The explanatory-notes-collection adapter's embedding text (§4.6): the
    /// route breadcrumb followed by the note body, so a query phrased in
    /// either the heading's or the body's wording can retrieve the note.
    pub fn embedding_text(&self) -> String {
        if self.route.is_empty() {
            self.text.clone()
        } else {
            format!("{}\n{}", self.route.join(" > "), self.text)
        }
    }
}
