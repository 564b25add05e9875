use lexcorpus_model::{Document, ProvisionType};
use serde::Serialize;

/// One matching section attached to an act result, per §4.10's
/// `search_acts` step 5 (`{number, provision_type, score}`).
#[derive(Debug, Clone, Serialize)]
pub struct ActSection {
    pub number: String,
    pub provision_type: ProvisionType,
    pub score: f32,
}

/// One act result: the parent document's own payload plus its best-scoring
/// sections, ordered by `score` descending and capped at
/// `Config::act_search_sections_per_act`.
#[derive(Debug, Clone, Serialize)]
pub struct ActResult {
    #[serde(flatten)]
    pub document: Document,
    pub sections: Vec<ActSection>,
}

/// `search_acts`'s return shape: `{results, total, offset, limit}` (§4.10).
#[derive(Debug, Clone, Serialize)]
pub struct ActSearchResponse {
    pub results: Vec<ActResult>,
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
}

/// `get_full_text`'s return shape: the parent document's metadata plus the
/// concatenated body of its provisions.
#[derive(Debug, Clone, Serialize)]
pub struct FullText {
    pub document: Document,
    pub full_text: String,
}

/// Placeholder text `get_full_text` returns when every provision's body is
/// empty after concatenation (§4.10).
pub const NO_TEXT_PLACEHOLDER: &str = "No text content available for this legislation.";
