//! Cached, retrying, circuit-broken, adaptively rate-limited HTTP client
//! (C1). Every other ingestion crate talks to the outside world exclusively
//! through [`Client`]; nobody else constructs a bare `reqwest::Client`.

mod cache;
mod circuit_breaker;
mod client;
mod config;
mod error;
mod rate_limiter;
mod response;

pub use cache::{cache_key, HttpCache};
pub use circuit_breaker::{Admission, CircuitBreaker};
pub use client::Client;
pub use config::Config;
pub use error::{Error, Result};
pub use rate_limiter::RateLimiter;
pub use response::Response;
