//! Durable, file-backed checkpoint store for the ingest pipeline (C2).
//! One [`Store`] per logical run, keyed by `<doc-type>_<min-year>_<max-year>_<sorted-subtypes>`.

mod error;
mod key;
mod state;
mod store;

pub use error::{Error, Result};
pub use key::{checkpoint_key, combination_key};
pub use state::{CheckpointState, FailureInfo, Stats};
pub use store::Store;
