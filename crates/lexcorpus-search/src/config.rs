use std::env;

/// §4.10/§4.11/§6.7: search-engine configuration. Collection names mirror
/// [`lexcorpus_orchestrator::Config`]'s defaults so the two crates agree on
/// where to read/write without either depending on the other.
#[derive(Debug, Clone)]
pub struct Config {
    pub documents_collection: String,
    pub sections_collection: String,
    /// Candidate sections pulled per `search_acts` call before grouping by
    /// parent (§4.10: "200, tuned constant; higher hurts latency without
    /// quality gains").
    pub act_search_candidate_pool: usize,
    /// Top-scoring sections kept per act after grouping (§4.10).
    pub act_search_sections_per_act: usize,
    /// Bounded LRU capacity for the read-through query cache (§4.11).
    pub cache_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            documents_collection: "documents".to_string(),
            sections_collection: "sections".to_string(),
            act_search_candidate_pool: 200,
            act_search_sections_per_act: 10,
            cache_capacity: 512,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            act_search_candidate_pool: env::var("LEXCORPUS_SEARCH_CANDIDATE_POOL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.act_search_candidate_pool),
            cache_capacity: env::var("LEXCORPUS_SEARCH_CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.cache_capacity),
            ..default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.act_search_candidate_pool, 200);
        assert_eq!(config.act_search_sections_per_act, 10);
        assert_eq!(config.documents_collection, "documents");
        assert_eq!(config.sections_collection, "sections");
    }
}
