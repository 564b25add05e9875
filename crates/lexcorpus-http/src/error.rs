use std::time::Duration;

/// Error kinds surfaced by [`crate::Client`]. Matches §7's "Transient
/// transport" / "RateLimited" error kinds; everything else either retries
/// internally or is a caller bug (invalid URL, etc).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("request to {url} failed after exhausting retries")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("rate limited by {url}, retry after {retry_after:?}")]
    RateLimited { url: String, retry_after: Duration },
    #[error("circuit open for host {host:?}, recovers in {remaining:?}")]
    CircuitOpen { host: String, remaining: Duration },
    #[error("invalid URL {0:?}")]
    InvalidUrl(String),
}

pub type Result<T> = std::result::Result<T, Error>;
