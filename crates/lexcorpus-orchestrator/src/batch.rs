use lexcorpus_embed::EmbeddingService;
use lexcorpus_model::{Amendment, Document, ExplanatoryNote, Section};
use lexcorpus_vectorstore::{Point, VectorStore};

use crate::error::Result;

/// Materializes a section's payload with `legislation_type`/`legislation_year`/
/// `legislation_number` denormalized alongside the stored fields, derived
/// from `parent_document_id` (§3's id-derivability invariant). The search
/// engine's `search_sections`/`search_acts` filter on these directly rather
/// than requiring a vector-store-side join against the parent document.
pub(crate) fn section_search_payload(section: &Section) -> Result<serde_json::Value> {
    let mut payload = serde_json::to_value(section)?;
    if let Ok(doc_type) = section.parent_type() {
        payload["legislation_type"] = serde_json::json!(doc_type);
    }
    if let Ok(year) = section.parent_year() {
        payload["legislation_year"] = serde_json::json!(year);
    }
    if let Ok(number) = section.parent_number() {
        payload["legislation_number"] = serde_json::json!(number);
    }
    Ok(payload)
}

/// Accumulates parsed legislation items until `batch_size` documents have
/// been seen, then embeds and upserts the documents and their sections as
/// one round trip each (§4.8). Flushing replaces the backing `Vec`s with
/// fresh, empty ones via [`std::mem::take`] rather than calling `clear()`,
/// so the drained allocation is dropped immediately instead of retained at
/// peak batch capacity — the Rust rendition of "invoke garbage collection
/// between batches to bound resident memory".
pub struct DocumentSectionBatch {
    batch_size: usize,
    documents: Vec<Document>,
    sections: Vec<Section>,
}

impl DocumentSectionBatch {
    pub fn new(batch_size: usize) -> Self {
        Self { batch_size: batch_size.max(1), documents: Vec::new(), sections: Vec::new() }
    }

    pub fn push(&mut self, document: Document, sections: Vec<Section>) {
        self.documents.push(document);
        self.sections.extend(sections);
    }

    pub fn is_full(&self) -> bool {
        self.documents.len() >= self.batch_size
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub async fn flush(
        &mut self,
        embed: &EmbeddingService,
        store: &VectorStore,
        documents_collection: &str,
        sections_collection: &str,
    ) -> Result<(usize, usize)> {
        if self.is_empty() {
            return Ok((0, 0));
        }
        let documents = std::mem::take(&mut self.documents);
        let sections = std::mem::take(&mut self.sections);

        let doc_texts: Vec<String> = documents.iter().map(Document::embedding_text).collect();
        let doc_embeddings = embed.embed_batch(&doc_texts).await?;
        let doc_points = documents
            .iter()
            .zip(doc_embeddings)
            .map(|(document, (dense, sparse))| {
                let payload = serde_json::to_value(document)?;
                Ok(Point::new(document.id.point_uuid(), payload, dense, sparse))
            })
            .collect::<Result<Vec<Point>>>()?;
        store.upsert(documents_collection, &doc_points).await?;

        let section_texts: Vec<String> = sections.iter().map(Section::embedding_text).collect();
        let section_embeddings = embed.embed_batch(&section_texts).await?;
        let section_points = sections
            .iter()
            .zip(section_embeddings)
            .map(|(section, (dense, sparse))| {
                let payload = section_search_payload(section)?;
                Ok(Point::new(section.id.point_uuid(), payload, dense, sparse))
            })
            .collect::<Result<Vec<Point>>>()?;
        store.upsert(sections_collection, &section_points).await?;

        Ok((doc_points.len(), section_points.len()))
    }
}

/// The same accumulate-then-flush shape as [`DocumentSectionBatch`], for the
/// single-collection amendments stage.
pub struct AmendmentBatch {
    batch_size: usize,
    items: Vec<Amendment>,
}

impl AmendmentBatch {
    pub fn new(batch_size: usize) -> Self {
        Self { batch_size: batch_size.max(1), items: Vec::new() }
    }

    pub fn push(&mut self, amendment: Amendment) {
        self.items.push(amendment);
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.batch_size
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub async fn flush(&mut self, embed: &EmbeddingService, store: &VectorStore, collection: &str) -> Result<usize> {
        if self.is_empty() {
            return Ok(0);
        }
        let items = std::mem::take(&mut self.items);
        let texts: Vec<String> = items.iter().map(Amendment::embedding_text).collect();
        let embeddings = embed.embed_batch(&texts).await?;
        let points = items
            .iter()
            .zip(embeddings)
            .map(|(amendment, (dense, sparse))| {
                let payload = serde_json::to_value(amendment)?;
                Ok(Point::new(amendment.id.point_uuid(), payload, dense, sparse))
            })
            .collect::<Result<Vec<Point>>>()?;
        store.upsert(collection, &points).await?;
        Ok(points.len())
    }
}

/// The explanatory-notes counterpart of [`AmendmentBatch`].
pub struct NoteBatch {
    batch_size: usize,
    items: Vec<ExplanatoryNote>,
}

impl NoteBatch {
    pub fn new(batch_size: usize) -> Self {
        Self { batch_size: batch_size.max(1), items: Vec::new() }
    }

    pub fn push(&mut self, note: ExplanatoryNote) {
        self.items.push(note);
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.batch_size
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub async fn flush(&mut self, embed: &EmbeddingService, store: &VectorStore, collection: &str) -> Result<usize> {
        if self.is_empty() {
            return Ok(0);
        }
        let items = std::mem::take(&mut self.items);
        let texts: Vec<String> = items.iter().map(ExplanatoryNote::embedding_text).collect();
        let embeddings = embed.embed_batch(&texts).await?;
        let points = items
            .iter()
            .zip(embeddings)
            .map(|(note, (dense, sparse))| {
                let payload = serde_json::to_value(note)?;
                Ok(Point::new(note.id.point_uuid(), payload, dense, sparse))
            })
            .collect::<Result<Vec<Point>>>()?;
        store.upsert(collection, &points).await?;
        Ok(points.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_section_batch_is_full_at_configured_size() {
        let mut batch = DocumentSectionBatch::new(2);
        assert!(batch.is_empty());
        assert!(!batch.is_full());
        batch.push(sample_document("1"), vec![]);
        assert!(!batch.is_full());
        batch.push(sample_document("2"), vec![]);
        assert!(batch.is_full());
    }

    #[test]
    fn zero_batch_size_is_clamped_to_one() {
        let batch = DocumentSectionBatch::new(0);
        assert_eq!(batch.batch_size, 1);
    }

    fn sample_document(number: &str) -> Document {
        let id = lexcorpus_model::DocumentId::new("ukpga", 2020, number);
        Document {
            uri: id.canonical_uri("https://www.legislation.gov.uk"),
            id,
            title: "Sample Act".into(),
            description: String::new(),
            enactment_date: None,
            category: lexcorpus_model::Category::Primary,
            doc_type: lexcorpus_model::DocType::Ukpga,
            year: 2020,
            number: number.to_string(),
            status: String::new(),
            extent: Vec::new(),
            provision_count: 0,
            modified_date: chrono::Utc::now(),
            provenance: None,
        }
    }
}
