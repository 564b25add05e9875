use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{Extent, ProvisionType};
use crate::id::DocumentId;
use crate::provenance::Provenance;

/// The child entity of §3: a citable section or schedule of a [`crate::Document`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Section {
    pub id: DocumentId,
    pub uri: String,
    pub parent_document_id: DocumentId,
    #[serde(default)]
    pub title: String,
    #[serde(deserialize_with = "deserialize_text_envelope")]
    pub text: String,
    #[serde(default)]
    pub extent: Vec<Extent>,
    pub provision_type: ProvisionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,
    /// Ids of `Commentary` elements this provision's paragraphs cite (§4.4).
    /// Empty for PDF-fallback sections, which carry no commentary structure.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commentary_refs: Vec<String>,
}

impl Section {
    /// §3: parent-type/year/number are derivable from parent-id.
    pub fn parent_type(&self) -> Result<&str, crate::id::IdError> {
        self.parent_document_id.parent_type()
    }

    pub fn parent_year(&self) -> Result<i32, crate::id::IdError> {
        self.parent_document_id.parent_year()
    }

    pub fn parent_number(&self) -> Result<&str, crate::id::IdError> {
        self.parent_document_id.parent_number()
    }

    /// Text assembled for embedding: the sections-collection adapter's
    /// version of §4.6's "embedding text is built by each collection's
    /// adapter" rule — title followed by body text.
    pub fn embedding_text(&self) -> String {
        if self.title.is_empty() {
            self.text.clone()
        } else {
            format!("{}\n{}", self.title, self.text)
        }
    }

    /// The numeric suffix of `number`, used to sort sections/schedules in
    /// stable numeric (not lexicographic) order for `get_full_text` (§4.10).
    pub fn numeric_suffix(&self) -> Option<u64> {
        self.number
            .as_deref()
            .and_then(|n| n.trim_end_matches('.').parse().ok())
    }
}

/// §3 I4: Section.text is plain text; if the source system ever wraps it in
/// an inference envelope (`{"text": "..."}`), unwrap to the inner plain
/// string on read. New writes always emit the bare string form — see
/// SPEC_FULL.md's resolution of the "nested text" open question.
fn deserialize_text_envelope<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Envelope {
        Bare(String),
        Wrapped { text: String },
    }

    match Envelope::deserialize(deserializer)? {
        Envelope::Bare(s) => Ok(s),
        Envelope::Wrapped { text } => Ok(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json(text_value: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "id": "ukpga/2006/46/section/1",
            "uri": "https://www.legislation.gov.uk/id/ukpga/2006/46/section/1",
            "parent_document_id": "ukpga/2006/46",
            "title": "Section 1",
            "text": text_value,
            "extent": ["england", "wales"],
            "provision_type": "section",
            "number": "1",
        })
    }

    #[test]
    fn bare_text_parses_directly() {
        let v = sample_json(serde_json::json!("The company is formed."));
        let section: Section = serde_json::from_value(v).unwrap();
        assert_eq!(section.text, "The company is formed.");
    }

    #[test]
    fn wrapped_text_envelope_is_unwrapped_on_read() {
        let v = sample_json(serde_json::json!({"text": "Wrapped body."}));
        let section: Section = serde_json::from_value(v).unwrap();
        assert_eq!(section.text, "Wrapped body.");
    }

    #[test]
    fn numeric_suffix_parses_trailing_number() {
        let v = sample_json(serde_json::json!("text"));
        let section: Section = serde_json::from_value(v).unwrap();
        assert_eq!(section.numeric_suffix(), Some(1));
    }

    #[test]
    fn writes_always_emit_bare_form() {
        let v = sample_json(serde_json::json!({"text": "Wrapped body."}));
        let section: Section = serde_json::from_value(v).unwrap();
        let round_tripped = serde_json::to_value(&section).unwrap();
        assert_eq!(round_tripped["text"], serde_json::json!("Wrapped body."));
    }

    #[test]
    fn serialized_payload_shape_matches_the_storage_schema() {
        let v = sample_json(serde_json::json!("The company is formed."));
        let section: Section = serde_json::from_value(v).unwrap();
        insta::assert_json_snapshot!(section, @r###"
        {
          "extent": [
            "england",
            "wales"
          ],
          "id": "ukpga/2006/46/section/1",
          "number": "1",
          "parent_document_id": "ukpga/2006/46",
          "provision_type": "section",
          "text": "The company is formed.",
          "title": "Section 1",
          "uri": "https://www.legislation.gov.uk/id/ukpga/2006/46/section/1"
        }
        "###);
    }
}
