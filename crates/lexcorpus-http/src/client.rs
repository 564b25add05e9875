use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use exponential_backoff::Backoff;

use crate::cache::{cache_key, HttpCache};
use crate::circuit_breaker::{Admission, CircuitBreaker};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::rate_limiter::RateLimiter;
use crate::response::Response;

/// A per-host retry/rate-limit/circuit state bundle. Kept behind an `Arc` on
/// [`Client`] and never as a process-wide singleton (REDESIGN FLAGS: explicit
/// state, not `lazy_static`/`OnceLock`), so that two `Client`s pointed at
/// different hosts never share backoff state.
struct HostState {
    rate_limiter: RateLimiter,
    circuit_breaker: CircuitBreaker,
}

/// Cached, retrying, circuit-broken, adaptively rate-limited request
/// executor (§4.1, C1). Modeled on `flow-client::Client`'s "encapsulate
/// sub-clients, clone cheaply" shape, with the retry policy itself grounded
/// in `journal-client`'s `Retry`/`ExponentialBackoff` abstraction.
#[derive(Clone)]
pub struct Client {
    inner: reqwest::Client,
    cache: Arc<HttpCache>,
    host_state: Arc<HostState>,
    config: Config,
}

impl Client {
    pub fn new(config: Config) -> std::io::Result<Self> {
        let cache = HttpCache::new(&config.cache_root, config.cache_ttl)?;
        Ok(Self {
            inner: reqwest::Client::new(),
            cache: Arc::new(cache),
            host_state: Arc::new(HostState {
                rate_limiter: RateLimiter::new(config.rate_limit_min_delay, config.rate_limit_max_delay),
                circuit_breaker: CircuitBreaker::new(config.circuit_threshold, config.circuit_recovery),
            }),
            config,
        })
    }

    pub fn from_env() -> std::io::Result<Self> {
        Self::new(Config::from_env())
    }

    #[tracing::instrument(skip(self), fields(url = %url))]
    pub async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<Response> {
        let key = cache_key(
            "GET",
            url,
            query.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        );
        if let Some(cached) = self.cache.get(&key) {
            tracing::debug!("http cache hit");
            return Ok(cached);
        }
        let response = self
            .execute(self.inner.get(url).query(query))
            .await?;
        if response.is_success() {
            self.cache.put(&key, &response);
        }
        Ok(response)
    }

    #[tracing::instrument(skip(self, body), fields(url = %url))]
    pub async fn post(&self, url: &str, body: &serde_json::Value) -> Result<Response> {
        let response = self.execute(self.inner.post(url).json(body)).await?;
        self.cache.clear();
        Ok(response)
    }

    #[tracing::instrument(skip(self, body), fields(url = %url))]
    pub async fn put(&self, url: &str, body: &serde_json::Value) -> Result<Response> {
        let response = self.execute(self.inner.put(url).json(body)).await?;
        self.cache.clear();
        Ok(response)
    }

    #[tracing::instrument(skip(self), fields(url = %url))]
    pub async fn delete(&self, url: &str) -> Result<Response> {
        let response = self.execute(self.inner.delete(url)).await?;
        self.cache.clear();
        Ok(response)
    }

    #[tracing::instrument(skip(self), fields(url = %url))]
    pub async fn head(&self, url: &str) -> Result<Response> {
        self.execute(self.inner.head(url)).await
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<Response> {
        let url = request
            .try_clone()
            .and_then(|r| r.build().ok())
            .map(|r| r.url().to_string())
            .unwrap_or_default();

        if let Admission::Blocked { remaining } = self.host_state.circuit_breaker.admit() {
            return Err(Error::CircuitOpen {
                host: host_of(&url),
                remaining,
            });
        }

        let backoff = Backoff::new(
            self.config.max_retries,
            Duration::from_millis(200),
            Some(Duration::from_secs(30)),
        );

        let mut attempt: u32 = 0;
        loop {
            tokio::time::sleep(self.host_state.rate_limiter.current_delay()).await;

            let attempt_request = request.try_clone().ok_or_else(|| Error::InvalidUrl(url.clone()))?;
            let sent = attempt_request.send().await;

            let reqwest_response = match sent {
                Ok(r) => r,
                Err(source) => {
                    attempt += 1;
                    match backoff.next(attempt) {
                        Some(delay) => {
                            tracing::warn!(%url, attempt, ?delay, "transport error, retrying");
                            tokio::time::sleep(delay).await;
                            continue;
                        }
                        None => return Err(Error::Transport { url, source }),
                    }
                }
            };

            let response = to_response(reqwest_response).await.map_err(|source| Error::Transport {
                url: url.clone(),
                source,
            })?;

            if response.is_rate_limited() {
                self.host_state.rate_limiter.record_rate_limited();
                self.host_state.circuit_breaker.record_rate_limited();
                let retry_after = response.retry_after().unwrap_or(Duration::from_secs(1));
                attempt += 1;
                if attempt <= self.config.max_retries {
                    tracing::warn!(%url, attempt, ?retry_after, "rate limited, retrying");
                    tokio::time::sleep(retry_after).await;
                    continue;
                }
                return Err(Error::RateLimited { url, retry_after });
            }

            if response.is_server_error() {
                attempt += 1;
                match backoff.next(attempt) {
                    Some(delay) => {
                        tracing::warn!(%url, attempt, status = response.status, ?delay, "server error, retrying");
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    None => {
                        self.host_state.rate_limiter.record_success();
                        return Ok(response);
                    }
                }
            }

            self.host_state.rate_limiter.record_success();
            self.host_state.circuit_breaker.record_success();
            return Ok(response);
        }
    }
}

async fn to_response(response: reqwest::Response) -> std::result::Result<Response, reqwest::Error> {
    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or_default().to_string()))
        .collect::<BTreeMap<_, _>>();
    let body = response.bytes().await?.to_vec();
    Ok(Response { status, headers, body })
}

fn host_of(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| url.to_string())
}
