//! Persisted content hashes for the watch loop

use crate::error::{AutotagError, Result};
use crate::storage::{atomic_write, load_json_or_default};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Hex SHA-256 of a document
pub fn content_hash(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// On-disk shape: `{processedFiles: [[path, hash], ...], lastCheck}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchState {
    #[serde(default)]
    pub processed_files: Vec<(PathBuf, String)>,

    #[serde(default)]
    pub last_check: Option<DateTime<Utc>>,
}

/// Thread-safe keyed hash store; every update is persisted before returning
pub struct WatchStateStore {
    path: PathBuf,
    hashes: Mutex<HashMap<PathBuf, String>>,
}

impl WatchStateStore {
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let state: WatchState = load_json_or_default(&path, "watch state");
        Self {
            path,
            hashes: Mutex::new(state.processed_files.into_iter().collect()),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<PathBuf, String>>> {
        self.hashes
            .lock()
            .map_err(|_| AutotagError::Other("watch state lock poisoned".to_string()))
    }

    pub fn hash_for(&self, path: &Path) -> Result<Option<String>> {
        Ok(self.lock()?.get(path).cloned())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    /// Store the hash for `path` and persist the whole map
    pub fn record(&self, path: &Path, hash: String) -> Result<()> {
        let mut hashes = self.lock()?;
        hashes.insert(path.to_path_buf(), hash);

        let mut processed_files: Vec<(PathBuf, String)> =
            hashes.iter().map(|(p, h)| (p.clone(), h.clone())).collect();
        processed_files.sort();
        let state = WatchState {
            processed_files,
            last_check: Some(Utc::now()),
        };
        atomic_write(&self.path, &serde_json::to_vec_pretty(&state)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_content_hash_is_hex_sha256() {
        assert_eq!(
            content_hash(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_record_persists_camel_case() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        let store = WatchStateStore::open(&path);
        assert_eq!(store.len().unwrap(), 0);

        store.record(Path::new("/notes/a.md"), "h1".to_string()).unwrap();
        store.record(Path::new("/notes/a.md"), "h2".to_string()).unwrap();

        let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["processedFiles"][0][1], "h2");
        assert!(raw["lastCheck"].is_string());

        let reopened = WatchStateStore::open(&path);
        assert_eq!(reopened.hash_for(Path::new("/notes/a.md")).unwrap().as_deref(), Some("h2"));
        assert_eq!(reopened.len().unwrap(), 1);
    }

    #[test]
    fn test_corrupt_state_starts_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "[[[").unwrap();
        assert_eq!(WatchStateStore::open(&path).len().unwrap(), 0);
    }
}
