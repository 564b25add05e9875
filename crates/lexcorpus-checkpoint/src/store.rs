use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::state::{CheckpointState, FailureInfo, Stats};

const FLUSH_EVERY: u32 = 100;

/// Durable, file-backed checkpoint state for a single logical pipeline run
/// (§4.2). Single writer per pipeline instance; internal mutability is a
/// plain `Mutex` rather than anything fancier since writes are serialized
/// through one `Store` anyway. Writes batch every [`FLUSH_EVERY`] mutating
/// calls or on an explicit [`Store::flush`] (graceful shutdown).
pub struct Store {
    path: PathBuf,
    inner: Mutex<Inner>,
}

struct Inner {
    state: CheckpointState,
    dirty_count: u32,
}

impl Store {
    /// Loads the checkpoint file at `<cache_root>/checkpoints/<key>.json` if
    /// present, otherwise starts from empty state.
    pub fn open(cache_root: impl AsRef<Path>, key: &str) -> Result<Self> {
        let dir = cache_root.as_ref().join("checkpoints");
        std::fs::create_dir_all(&dir).map_err(|source| Error::Write {
            path: dir.clone(),
            source,
        })?;
        let path = dir.join(format!("{key}.json"));
        let state = Self::load(&path)?;
        Ok(Self {
            path,
            inner: Mutex::new(Inner { state, dirty_count: 0 }),
        })
    }

    fn load(path: &Path) -> Result<CheckpointState> {
        match std::fs::read(path) {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(state) => Ok(state),
                Err(source) => {
                    tracing::warn!(?path, ?source, "checkpoint file corrupt, starting fresh");
                    Ok(CheckpointState::default())
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(CheckpointState::default()),
            Err(source) => Err(Error::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn is_processed(&self, url: &str) -> bool {
        self.inner.lock().unwrap().state.processed_urls.contains(url)
    }

    pub fn mark_processed(&self, url: &str) -> Result<()> {
        let mut guard = self.inner.lock().unwrap();
        guard.state.processed_urls.insert(url.to_string());
        guard.state.failed_urls.remove(url);
        self.maybe_flush(guard)
    }

    pub fn mark_failed(&self, url: &str, error: impl ToString) -> Result<()> {
        let mut guard = self.inner.lock().unwrap();
        let attempts = guard
            .state
            .failed_urls
            .get(url)
            .map(|info| info.attempts + 1)
            .unwrap_or(1);
        guard.state.failed_urls.insert(
            url.to_string(),
            FailureInfo {
                error: error.to_string(),
                attempts,
                last_attempt_at: chrono::Utc::now(),
            },
        );
        self.maybe_flush(guard)
    }

    pub fn is_combination_complete(&self, combination_key: &str) -> bool {
        self.inner
            .lock()
            .unwrap()
            .state
            .completed_combinations
            .contains(combination_key)
    }

    pub fn mark_combination_complete(&self, combination_key: &str) -> Result<()> {
        let mut guard = self.inner.lock().unwrap();
        guard.state.completed_combinations.insert(combination_key.to_string());
        self.maybe_flush(guard)
    }

    pub fn save_position(&self, key: &str, value: serde_json::Value) -> Result<()> {
        let mut guard = self.inner.lock().unwrap();
        guard.state.positions.insert(key.to_string(), value);
        self.maybe_flush(guard)
    }

    pub fn get_position(&self, key: &str) -> Option<serde_json::Value> {
        self.inner.lock().unwrap().state.positions.get(key).cloned()
    }

    pub fn stats(&self) -> Stats {
        self.inner.lock().unwrap().state.stats()
    }

    /// Discards all state and the backing file. Used when an operator
    /// forces a cold rebuild (§6.6: checkpoint directories are safe to
    /// delete).
    pub fn clear(&self) -> Result<()> {
        let mut guard = self.inner.lock().unwrap();
        guard.state = CheckpointState::default();
        guard.dirty_count = 0;
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(Error::Write {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Forces a write regardless of the batching counter. Call on
    /// rate-limit degradation, unhandled exception, or normal completion
    /// (§4.2).
    pub fn flush(&self) -> Result<()> {
        let guard = self.inner.lock().unwrap();
        self.write(&guard.state)
    }

    fn maybe_flush(&self, mut guard: std::sync::MutexGuard<'_, Inner>) -> Result<()> {
        guard.dirty_count += 1;
        if guard.dirty_count >= FLUSH_EVERY {
            guard.dirty_count = 0;
            self.write(&guard.state)?;
        }
        Ok(())
    }

    fn write(&self, state: &CheckpointState) -> Result<()> {
        let tmp = self.path.with_extension("tmp");
        let bytes = serde_json::to_vec_pretty(state).expect("checkpoint state always serializes");
        std::fs::write(&tmp, &bytes).map_err(|source| Error::Write {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|source| Error::Write {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_processed_is_visible_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path(), "ukpga_2000_2020").unwrap();
        assert!(!store.is_processed("https://example.invalid/a"));
        store.mark_processed("https://example.invalid/a").unwrap();
        assert!(store.is_processed("https://example.invalid/a"));
    }

    #[test]
    fn flush_then_reopen_restores_state() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = Store::open(dir.path(), "ukpga_2000_2020").unwrap();
            store.mark_processed("https://example.invalid/a").unwrap();
            store.mark_combination_complete("ukpga_2010").unwrap();
            store.flush().unwrap();
        }
        let reopened = Store::open(dir.path(), "ukpga_2000_2020").unwrap();
        assert!(reopened.is_processed("https://example.invalid/a"));
        assert!(reopened.is_combination_complete("ukpga_2010"));
    }

    #[test]
    fn mark_processed_clears_prior_failure() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path(), "ukpga_2000_2020").unwrap();
        store.mark_failed("https://example.invalid/a", "boom").unwrap();
        assert_eq!(store.stats().failed_count, 1);
        store.mark_processed("https://example.invalid/a").unwrap();
        assert_eq!(store.stats().failed_count, 0);
    }

    #[test]
    fn repeated_failures_accumulate_attempts() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path(), "ukpga_2000_2020").unwrap();
        for _ in 0..3 {
            store.mark_failed("https://example.invalid/a", "boom").unwrap();
        }
        let stats = store.stats();
        assert_eq!(stats.persistently_failing, vec!["https://example.invalid/a".to_string()]);
    }

    #[test]
    fn clear_removes_state_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path(), "ukpga_2000_2020").unwrap();
        store.mark_processed("https://example.invalid/a").unwrap();
        store.flush().unwrap();
        store.clear().unwrap();
        assert!(!store.is_processed("https://example.invalid/a"));

        let reopened = Store::open(dir.path(), "ukpga_2000_2020").unwrap();
        assert!(!reopened.is_processed("https://example.invalid/a"));
    }

    #[test]
    fn corrupt_file_falls_back_to_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let checkpoints_dir = dir.path().join("checkpoints");
        std::fs::create_dir_all(&checkpoints_dir).unwrap();
        std::fs::write(checkpoints_dir.join("ukpga_2000_2020.json"), b"not json").unwrap();

        let store = Store::open(dir.path(), "ukpga_2000_2020").unwrap();
        assert_eq!(store.stats().processed_count, 0);
    }
}
