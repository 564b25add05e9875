use std::env;

/// §4.6/§6.7: embedding service configuration, `from_env` per the
/// ambient-stack convention.
#[derive(Debug, Clone)]
pub struct Config {
    pub embedding_url: String,
    pub embedding_api_key: String,
    pub deployment: String,
    pub max_workers: usize,
    pub dense_dimensions: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            embedding_url: String::new(),
            embedding_api_key: String::new(),
            deployment: "text-embedding-3-large".to_string(),
            max_workers: 10,
            dense_dimensions: 1024,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            embedding_url: env::var("LEXCORPUS_EMBEDDING_URL").unwrap_or(default.embedding_url),
            embedding_api_key: env::var("LEXCORPUS_EMBEDDING_API_KEY").unwrap_or(default.embedding_api_key),
            deployment: env::var("LEXCORPUS_EMBEDDING_DEPLOYMENT").unwrap_or(default.deployment),
            max_workers: env::var("LEXCORPUS_MAX_EMBED_WORKERS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_workers),
            ..default
        }
    }
}
