use std::env;

/// §4.7/§6.7: vector-store adapter configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub api_key: String,
    /// Points per upsert request (§4.7: "default 100; smaller for large
    /// payloads such as full case text").
    pub upsert_chunk_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            upsert_chunk_size: 100,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            base_url: env::var("LEXCORPUS_VECTORSTORE_URL").unwrap_or(default.base_url),
            api_key: env::var("LEXCORPUS_VECTORSTORE_API_KEY").unwrap_or(default.api_key),
            upsert_chunk_size: env::var("LEXCORPUS_UPSERT_CHUNK_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.upsert_chunk_size),
        }
    }

    /// A chunk size tuned down for large payloads (full case text), per
    /// §4.7's "smaller for large payloads" note.
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.upsert_chunk_size = size;
        self
    }
}
