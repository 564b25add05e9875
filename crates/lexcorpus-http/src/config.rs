use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Client-local configuration, read via `Config::from_env()` per the
/// ambient-stack convention: each crate family owns a plain struct and an
/// explicit constructor rather than a shared config-file layer.
#[derive(Debug, Clone)]
pub struct Config {
    pub cache_root: PathBuf,
    pub cache_ttl: Duration,
    pub max_retries: u32,
    pub circuit_threshold: u32,
    pub circuit_recovery: Duration,
    pub rate_limit_min_delay: Duration,
    pub rate_limit_max_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_root: PathBuf::from("./.lexcorpus-cache/http"),
            cache_ttl: Duration::from_secs(28_800),
            max_retries: 5,
            circuit_threshold: 5,
            circuit_recovery: Duration::from_secs(60),
            rate_limit_min_delay: Duration::from_millis(0),
            rate_limit_max_delay: Duration::from_secs(30),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            cache_root: env::var("LEXCORPUS_CACHE_ROOT")
                .map(|root| PathBuf::from(root).join("http"))
                .unwrap_or(default.cache_root),
            cache_ttl: env::var("LEXCORPUS_HTTP_CACHE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(default.cache_ttl),
            max_retries: env::var("LEXCORPUS_MAX_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_retries),
            circuit_threshold: env::var("LEXCORPUS_CIRCUIT_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.circuit_threshold),
            circuit_recovery: env::var("LEXCORPUS_CIRCUIT_RECOVERY_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(default.circuit_recovery),
            ..default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.cache_ttl, Duration::from_secs(28_800));
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.circuit_threshold, 5);
        assert_eq!(config.circuit_recovery, Duration::from_secs(60));
    }
}
