use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// A single failed-URL record: last error message and the number of times
/// it has been attempted, so stats can surface "persistently failing" vs.
/// "failed once" items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureInfo {
    pub error: String,
    pub attempts: u32,
    pub last_attempt_at: chrono::DateTime<chrono::Utc>,
}

/// The durable state record for one checkpoint key (§4.2, §6.6). Serialized
/// whole on every flush — the state is small enough (URLs and scroll
/// positions for a single doc-type/year-range run) that partial updates
/// aren't worth the complexity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckpointState {
    pub processed_urls: BTreeSet<String>,
    pub failed_urls: BTreeMap<String, FailureInfo>,
    pub completed_combinations: BTreeSet<String>,
    pub positions: BTreeMap<String, serde_json::Value>,
    pub metadata: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Stats {
    pub processed_count: usize,
    pub failed_count: usize,
    pub completed_combination_count: usize,
    pub persistently_failing: Vec<String>,
}

impl CheckpointState {
    pub fn stats(&self) -> Stats {
        Stats {
            processed_count: self.processed_urls.len(),
            failed_count: self.failed_urls.len(),
            completed_combination_count: self.completed_combinations.len(),
            persistently_failing: self
                .failed_urls
                .iter()
                .filter(|(_, info)| info.attempts >= 3)
                .map(|(url, _)| url.clone())
                .collect(),
        }
    }
}
