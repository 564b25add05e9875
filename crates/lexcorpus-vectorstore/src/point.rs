use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single stored point: a deterministic key, a JSON payload, and two
/// named vector slots (§4.7, §6.5). The key is always the payload's id
/// field run through [`lexcorpus_model::DocumentId::point_uuid`] upstream —
/// this crate treats it as an opaque `Uuid` and never derives it itself, so
/// idempotency (P1) is the caller's responsibility to preserve, not this
/// crate's to enforce.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Point {
    pub id: Uuid,
    pub payload: serde_json::Value,
    pub dense: Vec<f32>,
    pub sparse: Vec<(u64, f32)>,
}

impl Point {
    pub fn new(id: Uuid, payload: serde_json::Value, dense: Vec<f32>, sparse: Vec<(u64, f32)>) -> Self {
        Self { id, payload, dense, sparse }
    }
}

/// One scored candidate returned by a dense or sparse search (§4.7's
/// prefetch step, before fusion).
#[derive(Debug, Clone, Deserialize)]
pub struct ScoredPoint {
    pub id: Uuid,
    #[serde(default)]
    pub payload: serde_json::Value,
    pub score: f32,
}

/// One payload hydrated from a `scroll` call (no score attached).
#[derive(Debug, Clone, Deserialize)]
pub struct ScrolledPoint {
    pub id: Uuid,
    #[serde(default)]
    pub payload: serde_json::Value,
}
