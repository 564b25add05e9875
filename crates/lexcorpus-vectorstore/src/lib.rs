//! Vector store adapter (C7): collection schema management, chunked
//! idempotent upsert, scrolled enumeration, and hybrid dense+sparse query
//! execution fused by DBSF. [`filter::Filter`] is the abstract predicate
//! tree shared by every caller that needs to express "what subset of the
//! collection" without depending on the wire format of the remote store.

mod config;
mod error;
mod filter;
mod fusion;
mod point;
mod store;

pub use config::Config;
pub use error::{Error, Result};
pub use filter::Filter;
pub use fusion::{dbsf_fuse, max_normalize};
pub use point::{Point, ScoredPoint, ScrolledPoint};
pub use store::VectorStore;
