use std::collections::HashMap;

use lexcorpus_embed::EmbeddingService;
use lexcorpus_model::{DocType, Document, DocumentId, ProvisionType, Section};
use lexcorpus_vectorstore::{Filter, VectorStore};

use crate::config::Config;
use crate::error::Result;
use crate::filters::SearchFilters;
use crate::models::{ActResult, ActSearchResponse, ActSection, FullText, NO_TEXT_PLACEHOLDER};

/// `legislation_lookup`'s validated year window: the authority portal's own
/// coverage, from the earliest surviving statute to a few years of runway
/// past the present.
const LOOKUP_YEAR_RANGE: std::ops::RangeInclusive<i32> = 1267..=2030;

/// `get_legislation_full_text`'s scroll cap: generous enough that no real
/// act's provision count would be truncated.
const FULL_TEXT_SCROLL_LIMIT: usize = 1000;

/// Payload projection used whenever a caller doesn't need section bodies
/// (§4.10: "excludes `text`, for a 40-60% speedup"). `search_acts` only
/// needs these fields to group and rank candidates by parent.
const METADATA_ONLY_FIELDS: &[&str] = &[
    "id",
    "uri",
    "parent_document_id",
    "title",
    "number",
    "provision_type",
    "legislation_type",
    "legislation_year",
    "legislation_number",
    "extent",
];

/// Hybrid search engine (C10): semantic section search, act-level search
/// with per-parent grouping, and the direct lookup operations. Grounded on
/// `original_source/src/backend/legislation/search.py`.
#[derive(Clone)]
pub struct SearchEngine {
    embed: EmbeddingService,
    store: VectorStore,
    config: Config,
}

impl SearchEngine {
    pub fn new(embed: EmbeddingService, store: VectorStore, config: Config) -> Self {
        Self { embed, store, config }
    }

    /// `legislation_section_search`: a hybrid query over the sections
    /// collection under `filters`, normalized per §4.10/P4.
    pub async fn search_sections(
        &self,
        query: &str,
        filters: &SearchFilters,
        size: usize,
        offset: usize,
        include_text: bool,
    ) -> Result<Vec<Section>> {
        let (dense, sparse) = self.embed.embed_one(query).await?;
        let filter = filters.to_section_filter();
        let include_fields = if include_text { None } else { Some(METADATA_ONLY_FIELDS) };
        let hits = self
            .store
            .hybrid_query(&self.config.sections_collection, &dense, &sparse, filter.as_ref(), size, offset, include_fields)
            .await?;
        hits.into_iter().map(|(payload, _score)| Ok(serde_json::from_value(payload)?)).collect()
    }

    /// `legislation_act_search`'s five-step algorithm (§4.10): hybrid-query
    /// a wide candidate pool of sections, group by parent act keeping each
    /// act's top-scoring sections, paginate the distinct acts, then batch
    /// the parent lookup under the same year/type filters for consistency.
    pub async fn search_acts(&self, query: &str, filters: &SearchFilters, offset: usize, limit: usize) -> Result<ActSearchResponse> {
        let (dense, sparse) = self.embed.embed_one(query).await?;
        let section_filter = filters.to_section_filter();
        let hits = self
            .store
            .hybrid_query(
                &self.config.sections_collection,
                &dense,
                &sparse,
                section_filter.as_ref(),
                self.config.act_search_candidate_pool,
                0,
                Some(METADATA_ONLY_FIELDS),
            )
            .await?;

        let (order, grouped) = group_top_sections(hits, self.config.act_search_sections_per_act);
        let total = order.len();
        let page_ids: Vec<DocumentId> = order.into_iter().skip(offset).take(limit).collect();

        if page_ids.is_empty() {
            return Ok(ActSearchResponse { results: Vec::new(), total, offset, limit });
        }

        let id_values: Vec<serde_json::Value> = page_ids.iter().map(|id| serde_json::json!(id.as_str())).collect();
        let mut lookup_clauses = vec![Filter::in_set("id", id_values)];
        if let Some(year_clause) = filters.to_document_filter() {
            lookup_clauses.push(year_clause);
        }
        let lookup_filter = Filter::and(lookup_clauses);

        let documents = self
            .store
            .scroll(&self.config.documents_collection, lookup_filter.as_ref(), page_ids.len(), true)
            .await?;

        let mut by_id: HashMap<DocumentId, Document> = HashMap::new();
        for payload in documents {
            let document: Document = serde_json::from_value(payload)?;
            by_id.insert(document.id.clone(), document);
        }

        let missing: Vec<&DocumentId> = page_ids.iter().filter(|id| !by_id.contains_key(*id)).collect();
        if !missing.is_empty() {
            tracing::warn!(count = missing.len(), "parent legislation missing from documents collection");
        }

        let results = page_ids
            .into_iter()
            .filter_map(|id| {
                let document = by_id.remove(&id)?;
                let sections = grouped
                    .get(&id)
                    .map(|hits| hits.iter().map(|(payload, score)| act_section_from(payload, *score)).collect())
                    .unwrap_or_default();
                Some(ActResult { document, sections })
            })
            .collect();

        Ok(ActSearchResponse { results, total, offset, limit })
    }

    /// `legislation_lookup`: exact type/year/number lookup, rejecting an
    /// out-of-range year or an empty number up front rather than querying.
    pub async fn lookup_document(&self, doc_type: &DocType, year: i32, number: &str) -> Result<Option<Document>> {
        if !LOOKUP_YEAR_RANGE.contains(&year) {
            tracing::warn!(year, "lookup_document: year outside the valid range");
            return Ok(None);
        }
        if number.is_empty() {
            tracing::warn!("lookup_document: empty number");
            return Ok(None);
        }

        let filter = Filter::and(vec![
            Filter::eq("type", serde_json::json!(doc_type.as_str())),
            Filter::eq("year", serde_json::json!(year)),
            Filter::eq("number", serde_json::json!(number)),
        ]);
        let matches = self.store.scroll(&self.config.documents_collection, filter.as_ref(), 1, true).await?;
        matches.into_iter().next().map(|p| Ok(serde_json::from_value(p)?)).transpose()
    }

    /// `get_legislation_sections`: every section/schedule of `parent_id`,
    /// sorted by numeric suffix ascending (the store itself does not
    /// support server-side sort).
    pub async fn get_sections(&self, parent_id: &DocumentId, limit: usize) -> Result<Vec<Section>> {
        let filter = Filter::eq("parent_document_id", serde_json::json!(parent_id.as_str()));
        let payloads = self.store.scroll(&self.config.sections_collection, Some(&filter), limit, true).await?;
        let mut sections: Vec<Section> = payloads.into_iter().map(|p| Ok(serde_json::from_value(p)?)).collect::<Result<Vec<Section>>>()?;
        sections.sort_by_key(|s| s.numeric_suffix().unwrap_or(0));
        Ok(sections)
    }

    /// `get_legislation_full_text`: concatenates a document's provisions in
    /// stable order (sections before schedules, then numeric), or a
    /// placeholder when the result would otherwise be empty.
    pub async fn get_full_text(&self, parent_id: &DocumentId, include_schedules: bool) -> Result<Option<FullText>> {
        let id_filter = Filter::eq("id", serde_json::json!(parent_id.as_str()));
        let Some(doc_payload) = self.store.scroll(&self.config.documents_collection, Some(&id_filter), 1, true).await?.into_iter().next() else {
            return Ok(None);
        };
        let document: Document = serde_json::from_value(doc_payload)?;

        let mut provision_types = vec![serde_json::json!("section")];
        if include_schedules {
            provision_types.push(serde_json::json!("schedule"));
        }
        let filter = Filter::And(vec![
            Filter::eq("parent_document_id", serde_json::json!(parent_id.as_str())),
            Filter::in_set("provision_type", provision_types),
        ]);
        let payloads = self
            .store
            .scroll(&self.config.sections_collection, Some(&filter), FULL_TEXT_SCROLL_LIMIT, true)
            .await?;
        let mut provisions: Vec<Section> = payloads.into_iter().map(|p| Ok(serde_json::from_value(p)?)).collect::<Result<Vec<Section>>>()?;
        provisions.sort_by_key(|p| (!matches!(p.provision_type, ProvisionType::Section) as u8, p.numeric_suffix().unwrap_or(0)));

        let mut full_text = String::new();
        for provision in &provisions {
            full_text.push_str("\n\n");
            full_text.push_str(&provision.text);
        }
        let trimmed = full_text.trim();
        let full_text = if trimmed.is_empty() { NO_TEXT_PLACEHOLDER.to_string() } else { trimmed.to_string() };

        Ok(Some(FullText { document, full_text }))
    }
}

fn act_section_from(payload: &serde_json::Value, score: f32) -> ActSection {
    let number = payload.get("number").and_then(|v| v.as_str()).unwrap_or("").to_string();
    let provision_type = payload
        .get("provision_type")
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or(ProvisionType::Section);
    ActSection { number, provision_type, score }
}

/// The grouping half of `legislation_act_search`: fold a ranked section hit
/// list into per-parent buckets (top `per_act` sections each, still ranked
/// descending) and the order parents first appeared in — which, since
/// `hits` arrives already ranked, is the same as ranking acts by their
/// best-matching section. Split out as a free function so it can be
/// exercised without a live vector store.
fn group_top_sections(hits: Vec<(serde_json::Value, f32)>, per_act: usize) -> (Vec<DocumentId>, HashMap<DocumentId, Vec<(serde_json::Value, f32)>>) {
    let mut order = Vec::new();
    let mut grouped: HashMap<DocumentId, Vec<(serde_json::Value, f32)>> = HashMap::new();
    for (payload, score) in hits {
        let Some(parent_id) = payload.get("parent_document_id").and_then(|v| v.as_str()).and_then(|s| s.parse::<DocumentId>().ok()) else {
            continue;
        };
        if !grouped.contains_key(&parent_id) {
            order.push(parent_id.clone());
        }
        grouped.entry(parent_id).or_default().push((payload, score));
    }
    for sections in grouped.values_mut() {
        sections.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        sections.truncate(per_act);
    }
    (order, grouped)
}
