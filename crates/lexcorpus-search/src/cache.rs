use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use lru::LruCache;

use crate::config::Config;
use crate::engine::SearchEngine;
use crate::error::Result;
use crate::filters::SearchFilters;
use crate::models::ActSearchResponse;
use lexcorpus_model::{DocType, Document, Section};

/// A cached value plus the instant it was inserted, so an optional TTL can
/// be checked on read without a background eviction task.
struct Entry<T> {
    value: T,
    inserted_at: Instant,
}

/// Read-through memoization over [`SearchEngine`] (C11): a bounded LRU per
/// operation, keyed by the normalized input record. Writes to the vector
/// store never invalidate an entry — §4.11 accepts the resulting staleness
/// window in exchange for not threading a write-side notification through
/// every ingest path that shares no process with the search layer.
pub struct CachedSearchEngine {
    inner: SearchEngine,
    ttl: Option<Duration>,
    sections: Mutex<LruCache<String, Entry<Vec<Section>>>>,
    acts: Mutex<LruCache<String, Entry<ActSearchResponse>>>,
    lookups: Mutex<LruCache<String, Entry<Option<Document>>>>,
}

impl CachedSearchEngine {
    pub fn new(inner: SearchEngine, config: &Config, ttl: Option<Duration>) -> Self {
        let capacity = NonZeroUsize::new(config.cache_capacity.max(1)).expect("capacity is at least 1");
        Self {
            inner,
            ttl,
            sections: Mutex::new(LruCache::new(capacity)),
            acts: Mutex::new(LruCache::new(capacity)),
            lookups: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub async fn search_sections(
        &self,
        query: &str,
        filters: &SearchFilters,
        size: usize,
        offset: usize,
        include_text: bool,
    ) -> Result<Vec<Section>> {
        let key = format!("{}|{}|{size}|{offset}|{include_text}", query, filter_key(filters));
        if let Some(hit) = self.read(&self.sections, &key) {
            return Ok(hit);
        }
        let result = self.inner.search_sections(query, filters, size, offset, include_text).await?;
        self.write(&self.sections, key, result.clone());
        Ok(result)
    }

    pub async fn search_acts(&self, query: &str, filters: &SearchFilters, offset: usize, limit: usize) -> Result<ActSearchResponse> {
        let key = format!("{}|{}|{offset}|{limit}", query, filter_key(filters));
        if let Some(hit) = self.read(&self.acts, &key) {
            return Ok(hit);
        }
        let result = self.inner.search_acts(query, filters, offset, limit).await?;
        self.write(&self.acts, key, result.clone());
        Ok(result)
    }

    pub async fn lookup_document(&self, doc_type: &DocType, year: i32, number: &str) -> Result<Option<Document>> {
        let key = format!("{}|{year}|{number}", doc_type.as_str());
        if let Some(hit) = self.read(&self.lookups, &key) {
            return Ok(hit);
        }
        let result = self.inner.lookup_document(doc_type, year, number).await?;
        self.write(&self.lookups, key, result.clone());
        Ok(result)
    }

    /// Lookup operations with no useful memoization (unbounded-size results,
    /// or already-cheap single-id scrolls) pass straight through.
    pub fn inner(&self) -> &SearchEngine {
        &self.inner
    }

    fn read<T: Clone>(&self, cache: &Mutex<LruCache<String, Entry<T>>>, key: &str) -> Option<T> {
        let mut guard = cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let entry = guard.get(key)?;
        if let Some(ttl) = self.ttl {
            if entry.inserted_at.elapsed() > ttl {
                guard.pop(key);
                return None;
            }
        }
        Some(entry.value.clone())
    }

    fn write<T>(&self, cache: &Mutex<LruCache<String, Entry<T>>>, key: String, value: T) {
        let mut guard = cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.put(key, Entry { value, inserted_at: Instant::now() });
    }
}

/// Normalizes a [`SearchFilters`] into a stable cache-key fragment. Built by
/// hand rather than via `Serialize` so the key is independent of field
/// declaration order and of any future `Hash`/`Eq` derive drift on the
/// filter struct itself.
fn filter_key(filters: &SearchFilters) -> String {
    let mut categories: Vec<&str> = filters.categories.iter().map(|c| match c {
        lexcorpus_model::Category::Primary => "primary",
        lexcorpus_model::Category::Secondary => "secondary",
        lexcorpus_model::Category::European => "european",
        lexcorpus_model::Category::Retained => "retained",
    }).collect();
    categories.sort_unstable();

    let mut doc_types: Vec<&str> = filters.doc_types.iter().map(DocType::as_str).collect();
    doc_types.sort_unstable();

    format!(
        "c={}&t={}&yf={:?}&yt={:?}&pid={:?}",
        categories.join(","),
        doc_types.join(","),
        filters.year_from,
        filters.year_to,
        filters.parent_document_id.as_ref().map(DocumentIdKey),
    )
}

struct DocumentIdKey<'a>(&'a lexcorpus_model::DocumentId);

impl std::fmt::Debug for DocumentIdKey<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn filter_key_is_stable_regardless_of_vec_insertion_order() {
        let a = SearchFilters {
            doc_types: vec![DocType::Uksi, DocType::Ukpga],
            ..Default::default()
        };
        let b = SearchFilters {
            doc_types: vec![DocType::Ukpga, DocType::Uksi],
            ..Default::default()
        };
        assert_eq!(filter_key(&a), filter_key(&b));
    }

    #[test]
    fn filter_key_distinguishes_legislation_id_override() {
        let a = SearchFilters::default();
        let b = SearchFilters {
            parent_document_id: Some(lexcorpus_model::DocumentId::new("ukpga", 2006, "46")),
            ..Default::default()
        };
        assert_ne!(filter_key(&a), filter_key(&b));
    }

    /// A direct exercise of the read/write memoization path against a
    /// hand-rolled counting cache, independent of any live `SearchEngine` —
    /// mirrors the shape of `CachedSearchEngine`'s internals without needing
    /// a vector store or embedding provider double.
    #[test]
    fn ttl_expiry_forces_a_miss_after_elapsed_time() {
        let capacity = NonZeroUsize::new(4).unwrap();
        let cache: Mutex<LruCache<String, Entry<u32>>> = Mutex::new(LruCache::new(capacity));
        let calls = Arc::new(AtomicUsize::new(0));

        let read = |ttl: Option<Duration>| -> Option<u32> {
            let mut guard = cache.lock().unwrap();
            let entry = guard.get("k")?;
            if let Some(ttl) = ttl {
                if entry.inserted_at.elapsed() > ttl {
                    guard.pop("k");
                    return None;
                }
            }
            Some(entry.value)
        };

        {
            let mut guard = cache.lock().unwrap();
            guard.put("k".to_string(), Entry { value: 1, inserted_at: Instant::now() - Duration::from_millis(50) });
        }
        calls.fetch_add(1, Ordering::Relaxed);

        assert_eq!(read(Some(Duration::from_millis(10))), None);
        assert_eq!(read(None), None);
    }
}
