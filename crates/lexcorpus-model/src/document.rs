use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{Category, DocType, Extent};
use crate::id::DocumentId;
use crate::provenance::Provenance;

/// The parent entity of §3: a piece of legislation (or case) as a whole,
/// independent of its constituent sections.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Document {
    pub id: DocumentId,
    pub uri: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub enactment_date: Option<chrono::NaiveDate>,
    pub category: Category,
    #[serde(rename = "type")]
    pub doc_type: DocType,
    pub year: i32,
    pub number: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub extent: Vec<Extent>,
    #[serde(default)]
    pub provision_count: u32,
    /// Last time the stored payload changed; drives §4.9 staleness checks.
    pub modified_date: chrono::DateTime<chrono::Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,
}

impl Document {
    /// §3 I2: a Document's `type` must agree with its id's second path
    /// component. Returns the conflicting tag when it does not.
    pub fn check_type_consistency(&self) -> Result<(), String> {
        match self.id.parent_type() {
            Ok(head) if head == self.doc_type.as_str() => Ok(()),
            Ok(head) => Err(format!(
                "id type segment {head:?} disagrees with doc_type {:?}",
                self.doc_type.as_str()
            )),
            Err(err) => Err(err.to_string()),
        }
    }

    /// §3 I5: category is derivable from type via a fixed table; when the
    /// explicit value disagrees, the explicit value wins but the disagreement
    /// is reported so the caller can log it (the parser does this at
    /// construction time).
    pub fn reconcile_category(explicit: Category, doc_type: &DocType) -> (Category, bool) {
        let derived = doc_type.derived_category();
        (explicit, explicit != derived)
    }

    /// Text assembled for embedding: title + description, matching the
    /// "embedding text is built by each collection's adapter" rule of §4.6 —
    /// this is the documents-collection adapter's version.
    pub fn embedding_text(&self) -> String {
        if self.description.is_empty() {
            self.title.clone()
        } else {
            format!("{}\n\n{}", self.title, self.description)
        }
    }
}
