//! Key-value backends for the registration collection.
//!
//! The store only needs `get`/`set`/`remove` on string values, so any
//! backend that can hold a blob per key will do.

use crate::error::{StoreError, StoreResult};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// A string key-value capability.
pub trait KeyValueStore {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> StoreResult<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> StoreResult<()>;
}

/// In-memory backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no keys are held.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Directory-backed backend: one `<key>.json` file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            StoreError::Storage(format!("cannot create {}: {}", dir.display(), e))
        })?;

        Ok(Self { dir })
    }

    /// Root directory of this store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Get the file path for a key.
    fn key_file(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", safe))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let file = self.key_file(key);

        if !file.exists() {
            return Ok(None);
        }

        fs::read_to_string(&file)
            .map(Some)
            .map_err(|e| StoreError::Storage(format!("cannot read {}: {}", file.display(), e)))
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        let file = self.key_file(key);
        let tmp = file.with_extension("json.tmp");

        fs::write(&tmp, value)
            .and_then(|_| fs::rename(&tmp, &file))
            .map_err(|e| StoreError::Storage(format!("cannot write {}: {}", file.display(), e)))
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        let file = self.key_file(key);

        if !file.exists() {
            return Ok(());
        }

        fs::remove_file(&file)
            .map_err(|e| StoreError::Storage(format!("cannot remove {}: {}", file.display(), e)))
    }
}
