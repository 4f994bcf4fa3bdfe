//! Typed JSON access over a `KeyValueStore`

use crate::storage::error::StorageResult;
use crate::storage::store::KeyValueStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// JSON view of a key-value store
///
/// Reads never fail: a missing key, a backend error or a value that does not
/// parse all come back as `None`. Writes report backend errors.
#[derive(Clone)]
pub struct LocalStorage {
    backend: Arc<dyn KeyValueStore>,
}

impl LocalStorage {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// In-memory storage, used for session-scoped data and tests
    pub fn in_memory() -> Self {
        Self::new(Arc::new(crate::storage::MemoryStore::new()))
    }

    pub fn backend(&self) -> &Arc<dyn KeyValueStore> {
        &self.backend
    }

    /// Read and deserialize the value under `key`
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get_string(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key = key, error = %e, "Ignoring malformed stored value");
                None
            }
        }
    }

    /// Serialize `value` and store it under `key`
    pub fn set_json<T: Serialize>(&self, key: &str, value: &T) -> StorageResult<()> {
        let raw = serde_json::to_string(value)?;
        self.backend.set(key, &raw)
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key = key, error = %e, "Storage read failed");
                None
            }
        }
    }

    pub fn set_string(&self, key: &str, value: &str) -> StorageResult<()> {
        self.backend.set(key, value)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get_string(key).is_some()
    }

    pub fn remove(&self, key: &str) -> StorageResult<()> {
        self.backend.remove(key)
    }

    /// Remove several keys, stopping at the first backend error
    pub fn remove_all(&self, keys: &[&str]) -> StorageResult<()> {
        for key in keys {
            self.backend.remove(key)?;
        }
        Ok(())
    }
}
