use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::StoreError;
use crate::state::backend::KvBackend;

/// A single KV entry with a value and write timestamp.
///
/// `created_at` is the Unix timestamp (seconds since epoch) at which
/// the key was last set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub value: String,
    pub created_at: i64,
}

/// Internal HashMap type.
pub type InnerMap = HashMap<String, Entry>;

/// In-process backend. Clones share the same map.
#[derive(Clone, Default)]
pub struct MemoryStore {
    map: Arc<RwLock<InnerMap>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn read(&self) -> Result<RwLockReadGuard<'_, InnerMap>, StoreError> {
        self.map.read().map_err(|_| StoreError::Poisoned)
    }

    pub(crate) fn write(&self) -> Result<RwLockWriteGuard<'_, InnerMap>, StoreError> {
        self.map.write().map_err(|_| StoreError::Poisoned)
    }

    /// Number of stored keys.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.len())
    }

    /// Kill a writer while it holds the lock.
    #[cfg(test)]
    pub(crate) fn poison(&self) {
        let map = Arc::clone(&self.map);
        let _ = std::thread::spawn(move || {
            let _guard = map.write().unwrap();
            panic!("writer died holding the lock");
        })
        .join();
    }
}

#[async_trait]
impl KvBackend for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read()?.get(key).map(|entry| entry.value.clone()))
    }

    async fn put(&self, key: &str, value: String) -> Result<(), StoreError> {
        let entry = Entry {
            value,
            created_at: Utc::now().timestamp(),
        };
        self.write()?.insert(key.to_string(), entry);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut keys: Vec<String> = self
            .read()?
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }
}
