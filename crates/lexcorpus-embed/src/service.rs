use futures::stream::{self, StreamExt};

use crate::config::Config;
use crate::dense::{DenseEmbedder, DenseVector};
use crate::error::Result;
use crate::sparse::{sparse_embed, SparseTerm};

/// Both vectors for one piece of text: the remote dense embedding and the
/// locally-computed sparse one (§4.6).
pub type Embedding = (DenseVector, Vec<SparseTerm>);

/// The embedding service (C6): dense vectors come from a remote endpoint,
/// sparse vectors are computed locally and never leave the process.
#[derive(Clone)]
pub struct EmbeddingService {
    dense: DenseEmbedder,
    max_workers: usize,
}

impl EmbeddingService {
    pub fn new(http: lexcorpus_http::Client, config: Config) -> Self {
        let max_workers = config.max_workers;
        Self {
            dense: DenseEmbedder::new(http, config),
            max_workers,
        }
    }

    pub fn from_env(http: lexcorpus_http::Client) -> Self {
        Self::new(http, Config::from_env())
    }

    /// `embed_one(text) → (dense, sparse)`.
    pub async fn embed_one(&self, text: &str) -> Result<Embedding> {
        let dense = self.dense.embed(text).await?;
        let sparse = sparse_embed(text);
        Ok((dense, sparse))
    }

    /// `embed_batch(texts, max_workers) → list<(dense, sparse)>`. Dense
    /// embedding fans out across a bounded worker pool (§4.6, §5: "express
    /// as a bounded worker pool with a result channel; do not spawn
    /// per-item tasks") — sparse is computed inline since it never touches
    /// the network. Output order matches input order regardless of which
    /// dense request completes first.
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let mut indexed: Vec<(usize, Result<Embedding>)> = stream::iter(texts.iter().enumerate())
            .map(|(index, text)| async move {
                let result = self.embed_one(text).await;
                (index, result)
            })
            .buffer_unordered(self.max_workers.max(1))
            .collect()
            .await;

        indexed.sort_by_key(|(index, _)| *index);
        indexed.into_iter().map(|(_, result)| result).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> EmbeddingService {
        let dir = tempfile::tempdir().unwrap();
        let http = lexcorpus_http::Client::new(lexcorpus_http::Config {
            cache_root: dir.path().to_path_buf(),
            ..Default::default()
        })
        .unwrap();
        EmbeddingService::new(http, Config::default())
    }

    #[tokio::test]
    async fn embed_one_on_empty_text_has_zero_dense_and_no_sparse_terms() {
        let (dense, sparse) = service().embed_one("").await.unwrap();
        assert!(dense.iter().all(|&x| x == 0.0));
        assert!(sparse.is_empty());
    }

    #[tokio::test]
    async fn embed_batch_preserves_input_order() {
        let texts = vec!["".to_string(), "".to_string(), "".to_string()];
        let results = service().embed_batch(&texts).await.unwrap();
        assert_eq!(results.len(), 3);
    }
}
