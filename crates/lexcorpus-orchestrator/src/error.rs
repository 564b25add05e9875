/// Error kinds surfaced while running an ingest stage (§7). Whether a given
/// error is item-scoped (skip and continue) or pipeline-scoped (graceful
/// exit, fatal abort) is decided by the caller, not encoded here — this enum
/// only carries what happened, matching §7's "components surface typed
/// errors upward; only the orchestrator decides" propagation policy.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Http(#[from] lexcorpus_http::Error),
    #[error(transparent)]
    Enumerate(#[from] lexcorpus_enumerate::Error),
    #[error(transparent)]
    Xml(#[from] lexcorpus_xml::Error),
    #[error(transparent)]
    Pdf(#[from] lexcorpus_pdf::Error),
    #[error(transparent)]
    Embed(#[from] lexcorpus_embed::Error),
    #[error(transparent)]
    VectorStore(#[from] lexcorpus_vectorstore::Error),
    #[error(transparent)]
    Checkpoint(#[from] lexcorpus_checkpoint::Error),
    #[error("could not derive a document id from item URL {0:?}")]
    UnresolvableUrl(String),
    #[error("payload did not serialize to JSON")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to initialize a component from its environment configuration")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Whether `err` represents a rate-limit exception specifically — the only
/// kind that counts toward the pipeline-level graceful-degradation
/// threshold of §4.8 (distinct from the HTTP client's own internal retry
/// budget, which has already been exhausted by the time this surfaces).
pub fn is_rate_limited(err: &Error) -> bool {
    matches!(err, Error::Http(lexcorpus_http::Error::RateLimited { .. }))
        || matches!(err, Error::Enumerate(lexcorpus_enumerate::Error::Http(lexcorpus_http::Error::RateLimited { .. })))
}
