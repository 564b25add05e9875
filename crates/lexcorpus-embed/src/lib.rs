//! Embedding service (C6): dense vectors from a remote 1024-dim endpoint,
//! sparse vectors computed locally via a per-document BM25 approximation.
//! Both are produced together by [`EmbeddingService`], the only public
//! entry point the pipeline orchestrator (C8) and search engine (C10) use.

mod config;
mod dense;
mod error;
mod service;
mod sparse;

pub use config::Config;
pub use dense::{DenseEmbedder, DenseVector};
pub use error::{Error, Result};
pub use service::{Embedding, EmbeddingService};
pub use sparse::{sparse_embed, SparseTerm};
