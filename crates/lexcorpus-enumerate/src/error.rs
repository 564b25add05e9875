#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("listing page request failed")]
    Http(#[from] lexcorpus_http::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
