use serde::Deserialize;

use crate::config::Config;
use crate::error::{Error, Result};

/// The dense vector produced by the remote embedding endpoint: always
/// `dense_dimensions`-wide (1024 by default, §4.6).
pub type DenseVector = Vec<f32>;

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
}

/// Thin wrapper around [`lexcorpus_http::Client`] for the remote dense
/// embedding endpoint. The deployment name and API key travel as query
/// parameters on the request URL, following the same "no bespoke header
/// plumbing" shape `lexcorpus-pdf::FallbackClient` uses for its RPC.
#[derive(Clone)]
pub struct DenseEmbedder {
    http: lexcorpus_http::Client,
    config: Config,
}

impl DenseEmbedder {
    pub fn new(http: lexcorpus_http::Client, config: Config) -> Self {
        Self { http, config }
    }

    fn endpoint_url(&self) -> String {
        format!(
            "{}?deployment={}&api-key={}",
            self.config.embedding_url, self.config.deployment, self.config.embedding_api_key
        )
    }

    /// Embeds a single piece of text. Empty input short-circuits to a zero
    /// vector without a network call (§4.6: "empty input yields a zero
    /// vector but is never upserted" — the skip-on-empty decision itself
    /// belongs to the caller, this just avoids billing a provider for
    /// nothing).
    pub async fn embed(&self, text: &str) -> Result<DenseVector> {
        if text.trim().is_empty() {
            return Ok(vec![0.0; self.config.dense_dimensions]);
        }
        let body = serde_json::json!({ "input": text });
        self.request(&body).await
    }

    async fn request(&self, body: &serde_json::Value) -> Result<DenseVector> {
        let response = self.http.post(&self.endpoint_url(), body).await?;
        if !response.is_success() {
            return Err(Error::UnexpectedShape(format!(
                "embedding endpoint returned status {}",
                response.status
            )));
        }
        let parsed: EmbeddingResponse = response.json()?;
        let vector = parsed
            .data
            .into_iter()
            .next()
            .ok_or_else(|| Error::UnexpectedShape("embedding response had no data entries".to_string()))?
            .embedding;
        if vector.len() != self.config.dense_dimensions {
            return Err(Error::UnexpectedShape(format!(
                "embedding vector had {} dimensions, expected {}",
                vector.len(),
                self.config.dense_dimensions
            )));
        }
        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embedder() -> DenseEmbedder {
        let dir = tempfile::tempdir().unwrap();
        let http = lexcorpus_http::Client::new(lexcorpus_http::Config {
            cache_root: dir.path().to_path_buf(),
            ..Default::default()
        })
        .unwrap();
        DenseEmbedder::new(http, Config::default())
    }

    #[tokio::test]
    async fn empty_text_short_circuits_to_zero_vector() {
        let dense = embedder().embed("").await.unwrap();
        assert_eq!(dense.len(), 1024);
        assert!(dense.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn endpoint_url_carries_deployment_and_key() {
        let embedder = embedder();
        let url = embedder.endpoint_url();
        assert!(url.contains("deployment=text-embedding-3-large"));
        assert!(url.contains("api-key="));
    }
}
