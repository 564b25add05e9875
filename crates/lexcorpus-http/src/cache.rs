use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::response::Response;

const SHARD_COUNT: usize = 64;

/// A sharded, lock-tolerant on-disk key-value cache for `GET` responses
/// (§4.1). Each shard is an independent JSON file guarded by its own
/// in-process `RwLock`; a shard that fails to parse (corruption) is rebuilt
/// from empty rather than failing the caller.
pub struct HttpCache {
    root: PathBuf,
    ttl: Duration,
    shards: Vec<Arc<RwLock<()>>>,
}

#[derive(Serialize, Deserialize)]
struct Entry {
    expires_at_unix: i64,
    response: Response,
}

#[derive(Serialize, Deserialize, Default)]
struct Shard {
    entries: std::collections::BTreeMap<String, Entry>,
}

impl HttpCache {
    pub fn new(root: impl Into<PathBuf>, ttl: Duration) -> std::io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            ttl,
            shards: (0..SHARD_COUNT).map(|_| Arc::new(RwLock::new(()))).collect(),
        })
    }

    /// Only `GET` is cacheable. Key = (method, url, sorted non-body kwargs);
    /// callers build that composite key via [`cache_key`].
    pub fn get(&self, key: &str) -> Option<Response> {
        let shard_index = self.shard_index(key);
        let _guard = self.shards[shard_index].read().ok()?;
        let shard = self.read_shard(shard_index);
        let entry = shard.entries.get(key)?;
        if entry.expires_at_unix < now_unix() {
            return None;
        }
        Some(entry.response.clone())
    }

    pub fn put(&self, key: &str, response: &Response) {
        let shard_index = self.shard_index(key);
        let _guard = match self.shards[shard_index].write() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut shard = self.read_shard(shard_index);
        shard.entries.insert(
            key.to_string(),
            Entry {
                expires_at_unix: now_unix() + self.ttl.as_secs() as i64,
                response: response.clone(),
            },
        );
        self.write_shard(shard_index, &shard);
    }

    /// Mutating verbs clear the cache (§4.1): conservative, but correct —
    /// the source system offers no fine-grained invalidation signal.
    pub fn clear(&self) {
        for (index, lock) in self.shards.iter().enumerate() {
            let _guard = match lock.write() {
                Ok(g) => g,
                Err(poisoned) => poisoned.into_inner(),
            };
            let _ = std::fs::remove_file(self.shard_path(index));
        }
    }

    fn shard_index(&self, key: &str) -> usize {
        (fxhash::hash64(key.as_bytes()) as usize) % SHARD_COUNT
    }

    fn shard_path(&self, index: usize) -> PathBuf {
        self.root.join(format!("shard-{index:02x}.json"))
    }

    fn read_shard(&self, index: usize) -> Shard {
        let path = self.shard_path(index);
        match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|err| {
                tracing::warn!(?err, shard = index, "http cache shard corrupt, rebuilding");
                Shard::default()
            }),
            Err(_) => Shard::default(),
        }
    }

    fn write_shard(&self, index: usize, shard: &Shard) {
        let path = self.shard_path(index);
        if let Err(err) = atomic_write_json(&path, shard) {
            tracing::warn!(?err, shard = index, "failed to persist http cache shard");
        }
    }
}

fn atomic_write_json<T: Serialize>(path: &Path, value: &T) -> std::io::Result<()> {
    let tmp = path.with_extension("tmp");
    let bytes = serde_json::to_vec(value).expect("shard always serializes");
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)
}

fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Builds the composite cache key for a GET request: method, url, and the
/// sorted non-body keyword arguments (query params + a stable subset of
/// headers that affect the response, e.g. `Accept`).
pub fn cache_key(method: &str, url: &str, mut kwargs: Vec<(String, String)>) -> String {
    kwargs.sort();
    let joined = kwargs
        .into_iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    format!("{method}:{url}?{joined}")
}
