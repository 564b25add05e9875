use std::collections::HashMap;

use chrono::Datelike;
use lexcorpus_model::DocumentId;
use lexcorpus_vectorstore::Filter;

use crate::error::Result;
use crate::outcome::StageStats;
use crate::pipeline::Pipeline;

/// Upper bound on amendment records scanned per refresh pass. The window is
/// a handful of years of amendments, not the whole corpus, so this is
/// generous headroom rather than a meaningful cap in practice.
const AMENDMENT_SCAN_LIMIT: usize = 10_000;

/// Amendment-led refresh (C9): treats the amendments collection as a
/// change-data-capture manifest. Rather than re-sweeping a whole year, scan
/// amendments whose `affecting_year` falls within the look-back window,
/// collect the distinct `changed_document_id`s they name, and rescrape only
/// those that are stale or missing from the documents collection.
impl Pipeline {
    /// `force=true` bypasses the staleness check and rescrapes every id
    /// named by an amendment in the window (§4.9).
    pub async fn refresh_amended(&self, force: bool) -> Result<StageStats> {
        let current_year = chrono::Utc::now().year();
        let since_year = current_year - self.config().amendment_lookback_years;
        let filter = Filter::between("affecting_year", Some(serde_json::json!(since_year)), None);

        let amendments = self
            .vector_store()
            .scroll(&self.config().amendments_collection, Some(&filter), AMENDMENT_SCAN_LIMIT, true)
            .await?;

        let mut newest_affecting: HashMap<DocumentId, chrono::NaiveDate> = HashMap::new();
        for payload in &amendments {
            let Some(changed_id) = payload.get("changed_document_id").and_then(|v| v.as_str()).and_then(|s| s.parse().ok())
            else {
                continue;
            };
            let affecting_year = payload.get("affecting_year").and_then(|v| v.as_i64()).unwrap_or(since_year as i64) as i32;
            let marker = chrono::NaiveDate::from_ymd_opt(affecting_year, 12, 31).unwrap_or_default();
            newest_affecting
                .entry(changed_id)
                .and_modify(|existing| *existing = (*existing).max(marker))
                .or_insert(marker);
        }

        let mut stats = StageStats::default();
        for (changed_id, newest) in newest_affecting {
            let stale_or_missing = force || self.is_stale(&changed_id, newest).await?;
            if !stale_or_missing {
                continue;
            }
            tracing::info!(id = %changed_id, "rescraping amended document");
            let item_url = format!(
                "{}/{}/data.xml",
                self.authority_base().trim_end_matches('/'),
                changed_id.as_str()
            );
            match ingest_one(self, &item_url).await {
                Ok(()) => stats.documents_ingested += 1,
                Err(err) => {
                    tracing::warn!(id = %changed_id, %err, "amendment-led refresh failed for this document");
                    stats.failed += 1;
                }
            }
        }
        Ok(stats)
    }

    /// A parent document is stale when its stored `modified_date` predates
    /// the newest affecting amendment, or missing when no payload exists
    /// for it at all (§4.9) — both count as needing a rescrape.
    async fn is_stale(&self, changed_id: &DocumentId, newest_affecting: chrono::NaiveDate) -> Result<bool> {
        let filter = Filter::eq("id", serde_json::json!(changed_id.as_str()));
        let matches = self.vector_store().scroll(&self.documents_collection(), Some(&filter), 1, true).await?;
        let Some(payload) = matches.into_iter().next() else {
            return Ok(true);
        };
        let modified = payload
            .get("modified_date")
            .and_then(|v| v.as_str())
            .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.date_naive());
        Ok(modified.map_or(true, |modified| modified < newest_affecting))
    }
}

/// Rescrapes a single legislation item through the same fetch/parse/fallback
/// path the bulk pipeline uses, then upserts it immediately rather than
/// batching — refresh runs are expected to touch a small, scattered set of
/// ids, not a whole combination worth of items.
async fn ingest_one(pipeline: &Pipeline, item_url: &str) -> Result<()> {
    let (document, sections) = crate::ingest::fetch_and_parse_legislation(
        pipeline.http_client(),
        pipeline.pdf_client(),
        item_url,
        pipeline.authority_base(),
    )
    .await?;

    let doc_text = document.embedding_text();
    let (doc_dense, doc_sparse) = pipeline.embedding_service().embed_one(&doc_text).await?;
    let doc_point = lexcorpus_vectorstore::Point::new(document.id.point_uuid(), serde_json::to_value(&document)?, doc_dense, doc_sparse);
    pipeline.vector_store().upsert(&pipeline.documents_collection(), &[doc_point]).await?;

    let mut section_points = Vec::with_capacity(sections.len());
    for section in &sections {
        let (dense, sparse) = pipeline.embedding_service().embed_one(&section.embedding_text()).await?;
        section_points.push(lexcorpus_vectorstore::Point::new(
            section.id.point_uuid(),
            crate::batch::section_search_payload(section)?,
            dense,
            sparse,
        ));
    }
    pipeline.vector_store().upsert(&pipeline.sections_collection(), &section_points).await?;
    Ok(())
}
