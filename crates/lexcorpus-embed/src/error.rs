#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("embedding request failed")]
    Http(#[from] lexcorpus_http::Error),
    #[error("embedding response had unexpected shape: {0}")]
    UnexpectedShape(String),
}

pub type Result<T> = std::result::Result<T, Error>;
