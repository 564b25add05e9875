//! Hybrid search engine (C10) and its read-through query cache (C11).
//! Reads exclusively from [`lexcorpus_vectorstore::VectorStore`]: this crate
//! depends on none of the ingestion crates and never calls upstream
//! scrapers (§2: "the Search Engine reads only from the Vector Store").

mod cache;
mod config;
mod engine;
mod error;
mod filters;
mod models;

pub use cache::CachedSearchEngine;
pub use config::Config;
pub use engine::SearchEngine;
pub use error::{Error, Result};
pub use filters::SearchFilters;
pub use models::{ActResult, ActSearchResponse, ActSection, FullText, NO_TEXT_PLACEHOLDER};
