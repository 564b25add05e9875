use std::collections::HashMap;

use serde::Deserialize;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::filter::Filter;
use crate::fusion;
use crate::point::{Point, ScoredPoint, ScrolledPoint};

/// Which named vector slot a search runs against (§4.7/§6.5: collections
/// carry a `dense` and a `sparse` slot).
enum Using<'a> {
    Dense(&'a [f32]),
    Sparse(&'a [(u64, f32)]),
}

impl Using<'_> {
    fn name(&self) -> &'static str {
        match self {
            Using::Dense(_) => "dense",
            Using::Sparse(_) => "sparse",
        }
    }

    fn to_wire(&self) -> serde_json::Value {
        match self {
            Using::Dense(v) => serde_json::json!(v),
            Using::Sparse(v) => serde_json::json!(v),
        }
    }
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    points: Vec<ScoredPoint>,
}

#[derive(Deserialize)]
struct ScrollResponse {
    #[serde(default)]
    points: Vec<ScrolledPoint>,
}

#[derive(Deserialize)]
struct CountResponse {
    count: u64,
}

/// Vector store adapter (C7): collection schema management, chunked
/// idempotent upsert, and hybrid-query execution via DBSF fusion. The only
/// component downstream of C6 that talks to the remote store; C8's
/// orchestrator and C10's search engine both go through this type rather
/// than constructing RPC bodies themselves.
#[derive(Clone)]
pub struct VectorStore {
    http: lexcorpus_http::Client,
    config: Config,
}

impl VectorStore {
    pub fn new(http: lexcorpus_http::Client, config: Config) -> Self {
        Self { http, config }
    }

    pub fn from_env(http: lexcorpus_http::Client) -> Self {
        Self::new(http, Config::from_env())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Idempotent: creates the named collection with two vector slots
    /// (`dense` 1024-dim cosine, `sparse` BM25) if it doesn't already
    /// exist. A `409 Conflict` from an already-existing collection is
    /// treated as success, not an error.
    #[tracing::instrument(skip(self))]
    pub async fn ensure_collection(&self, name: &str, dense_dimensions: usize) -> Result<()> {
        let body = serde_json::json!({
            "vectors": {
                "dense": {"size": dense_dimensions, "distance": "cosine"},
                "sparse": {"modifier": "bm25"},
            }
        });
        let response = self.http.put(&self.url(&format!("/collections/{name}")), &body).await?;
        if response.is_success() || response.status == 409 {
            return Ok(());
        }
        Err(Error::Rpc { url: self.url(&format!("/collections/{name}")), status: response.status })
    }

    /// Upserts points in chunks of `config.upsert_chunk_size`, per §4.7.
    /// The final chunk is sent with `wait=true` so the caller observes
    /// read-after-write consistency; earlier chunks use `wait=false` to
    /// avoid paying that latency repeatedly.
    #[tracing::instrument(skip(self, points), fields(collection = name, count = points.len()))]
    pub async fn upsert(&self, name: &str, points: &[Point]) -> Result<()> {
        let chunk_size = self.config.upsert_chunk_size.max(1);
        let chunks: Vec<&[Point]> = points.chunks(chunk_size).collect();
        let last_index = chunks.len().saturating_sub(1);
        for (index, chunk) in chunks.into_iter().enumerate() {
            let wait = index == last_index;
            let body = serde_json::json!({
                "points": chunk.iter().map(point_wire).collect::<Vec<_>>(),
                "wait": wait,
            });
            let url = self.url(&format!("/collections/{name}/points"));
            let response = self.http.put(&url, &body).await?;
            if !response.is_success() {
                return Err(Error::Rpc { url, status: response.status });
            }
            tracing::debug!(collection = name, chunk_len = chunk.len(), wait, "upserted chunk");
        }
        Ok(())
    }

    /// Paged enumeration under a filter, hydrating full JSON payloads
    /// (§4.7). Used by C9's staleness scan and C10's batch parent lookup.
    #[tracing::instrument(skip(self, filter))]
    pub async fn scroll(&self, name: &str, filter: Option<&Filter>, limit: usize, with_payload: bool) -> Result<Vec<serde_json::Value>> {
        let body = serde_json::json!({
            "filter": filter.map(Filter::to_wire),
            "limit": limit,
            "with_payload": with_payload,
        });
        let url = self.url(&format!("/collections/{name}/points/scroll"));
        let response = self.http.post(&url, &body).await?;
        if !response.is_success() {
            return Err(Error::Rpc { url, status: response.status });
        }
        let parsed: ScrollResponse = response.json().map_err(|err| Error::UnexpectedShape(err.to_string()))?;
        Ok(parsed.points.into_iter().map(|p| p.payload).collect())
    }

    /// `count(name, filter)`.
    pub async fn count(&self, name: &str, filter: Option<&Filter>) -> Result<u64> {
        let body = serde_json::json!({ "filter": filter.map(Filter::to_wire) });
        let url = self.url(&format!("/collections/{name}/points/count"));
        let response = self.http.post(&url, &body).await?;
        if !response.is_success() {
            return Err(Error::Rpc { url, status: response.status });
        }
        let parsed: CountResponse = response.json().map_err(|err| Error::UnexpectedShape(err.to_string()))?;
        Ok(parsed.count)
    }

    async fn raw_search(&self, name: &str, using: Using<'_>, filter: Option<&Filter>, limit: usize, include_fields: Option<&[&str]>) -> Result<Vec<ScoredPoint>> {
        let with_payload = match include_fields {
            Some(fields) => serde_json::json!(fields),
            None => serde_json::json!(true),
        };
        let body = serde_json::json!({
            "using": using.name(),
            "query": using.to_wire(),
            "filter": filter.map(Filter::to_wire),
            "limit": limit,
            "with_payload": with_payload,
        });
        let url = self.url(&format!("/collections/{name}/points/query"));
        let response = self.http.post(&url, &body).await?;
        if !response.is_success() {
            return Err(Error::Rpc { url, status: response.status });
        }
        let parsed: QueryResponse = response.json().map_err(|err| Error::UnexpectedShape(err.to_string()))?;
        Ok(parsed.points)
    }

    /// `hybrid_query(name, dense_q, sparse_q, filter, size, offset,
    /// include_fields)`: prefetch a dense ANN candidate list and a sparse
    /// BM25 candidate list, fuse with DBSF, then page the fused,
    /// max-normalized ranking (§4.7, §4.10).
    #[tracing::instrument(skip(self, dense_q, sparse_q, filter))]
    pub async fn hybrid_query(
        &self,
        name: &str,
        dense_q: &[f32],
        sparse_q: &[(u64, f32)],
        filter: Option<&Filter>,
        size: usize,
        offset: usize,
        include_fields: Option<&[&str]>,
    ) -> Result<Vec<(serde_json::Value, f32)>> {
        let dense_limit = (3 * (size + offset)).max(30);
        let sparse_limit = ((0.8 * (size + offset) as f32) as usize).max(8);

        let dense_points = self.raw_search(name, Using::Dense(dense_q), filter, dense_limit, include_fields).await?;
        let sparse_points = self.raw_search(name, Using::Sparse(sparse_q), filter, sparse_limit, include_fields).await?;

        let mut payloads: HashMap<Uuid, serde_json::Value> = HashMap::new();
        for point in dense_points.iter().chain(sparse_points.iter()) {
            payloads.entry(point.id).or_insert_with(|| point.payload.clone());
        }

        let dense_scores: Vec<(Uuid, f32)> = dense_points.iter().map(|p| (p.id, p.score)).collect();
        let sparse_scores: Vec<(Uuid, f32)> = sparse_points.iter().map(|p| (p.id, p.score)).collect();
        let fused = fusion::max_normalize(fusion::dbsf_fuse(&dense_scores, &sparse_scores));

        Ok(fused
            .into_iter()
            .skip(offset)
            .take(size)
            .filter_map(|(id, score)| payloads.get(&id).cloned().map(|payload| (payload, score)))
            .collect())
    }
}

fn point_wire(point: &Point) -> serde_json::Value {
    serde_json::json!({
        "id": point.id,
        "payload": point.payload,
        "vectors": {
            "dense": point.dense,
            "sparse": point.sparse,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> VectorStore {
        let dir = tempfile::tempdir().unwrap();
        let http = lexcorpus_http::Client::new(lexcorpus_http::Config {
            cache_root: dir.path().to_path_buf(),
            ..Default::default()
        })
        .unwrap();
        VectorStore::new(http, Config { base_url: "https://vectorstore.example.invalid".to_string(), ..Default::default() })
    }

    #[test]
    fn url_trims_trailing_slash_on_base() {
        let mut config = Config::default();
        config.base_url = "https://vectorstore.example.invalid/".to_string();
        let http = lexcorpus_http::Client::new(lexcorpus_http::Config::default()).unwrap();
        let store = VectorStore::new(http, config);
        assert_eq!(store.url("/collections/sections"), "https://vectorstore.example.invalid/collections/sections");
    }

    #[test]
    fn point_wire_carries_both_vector_slots() {
        let point = Point::new(Uuid::nil(), serde_json::json!({"id": "ukpga/2006/46"}), vec![0.1, 0.2], vec![(7, 0.5)]);
        let wire = point_wire(&point);
        assert_eq!(wire["vectors"]["dense"], serde_json::json!([0.1, 0.2]));
        assert!(wire["vectors"]["sparse"].is_array());
    }

    #[test]
    fn chunk_count_matches_configured_chunk_size() {
        let store = store();
        let points: Vec<Point> = (0..250)
            .map(|i| Point::new(Uuid::new_v4(), serde_json::json!({"i": i}), vec![0.0], Vec::new()))
            .collect();
        let chunk_size = store.config.upsert_chunk_size.max(1);
        let chunks: Vec<&[Point]> = points.chunks(chunk_size).collect();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2].len(), 50);
    }
}
