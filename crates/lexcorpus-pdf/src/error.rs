#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("fetching resources page failed")]
    Http(#[from] lexcorpus_http::Error),
    #[error("no PDF link found on resources page {0:?}")]
    NoPdfFound(String),
    #[error("OCR extractor returned malformed JSON")]
    MalformedExtraction(#[from] serde_json::Error),
    #[error("OCR extractor returned HTTP {status} for {url:?}")]
    ExtractorFailed { url: String, status: u16 },
}

pub type Result<T> = std::result::Result<T, Error>;
