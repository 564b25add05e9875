use std::env;
use std::path::PathBuf;

/// §4.8/§4.9/§6.7: orchestrator configuration — batching, collection names,
/// and the thresholds that drive graceful degradation and amendment-led
/// refresh. Composes the other crates' own `Config::from_env()` rather than
/// duplicating their keys.
#[derive(Debug, Clone)]
pub struct Config {
    pub authority_base: String,
    pub cache_root: PathBuf,
    pub batch_size: usize,
    pub max_consecutive_rate_limits: u32,
    pub amendment_lookback_years: i32,
    pub documents_collection: String,
    pub sections_collection: String,
    pub amendments_collection: String,
    pub explanatory_notes_collection: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            authority_base: "https://www.legislation.gov.uk".to_string(),
            cache_root: PathBuf::from("./.lexcorpus-cache"),
            batch_size: 10,
            max_consecutive_rate_limits: 50,
            amendment_lookback_years: 2,
            documents_collection: "documents".to_string(),
            sections_collection: "sections".to_string(),
            amendments_collection: "amendments".to_string(),
            explanatory_notes_collection: "explanatory_notes".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            authority_base: env::var("LEXCORPUS_AUTHORITY_BASE_URL").unwrap_or(default.authority_base),
            cache_root: env::var("LEXCORPUS_CACHE_ROOT").map(PathBuf::from).unwrap_or(default.cache_root),
            batch_size: env::var("LEXCORPUS_BATCH_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.batch_size),
            max_consecutive_rate_limits: env::var("LEXCORPUS_MAX_CONSECUTIVE_RATE_LIMITS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_consecutive_rate_limits),
            amendment_lookback_years: env::var("LEXCORPUS_AMENDMENT_LOOKBACK_YEARS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.amendment_lookback_years),
            ..default
        }
    }
}
