#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("vector store request failed")]
    Http(#[from] lexcorpus_http::Error),
    #[error("vector store response had unexpected shape: {0}")]
    UnexpectedShape(String),
    #[error("vector store returned error status {status} for {url}")]
    Rpc { url: String, status: u16 },
}

pub type Result<T> = std::result::Result<T, Error>;
