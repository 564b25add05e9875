/// Error kinds surfaced by a search or lookup operation (§7: "search
/// components never retry... they only surface vector-store errors to the
/// caller"). There is no item-skip/retry policy here — every error is
/// terminal for the call that produced it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Embed(#[from] lexcorpus_embed::Error),
    #[error(transparent)]
    VectorStore(#[from] lexcorpus_vectorstore::Error),
    #[error("stored payload did not match the expected shape: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
