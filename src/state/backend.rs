use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;

use crate::errors::StoreError;

/// The three primitives every backing key-value store must provide.
///
/// Values are opaque text. Nothing here is transactional: a `get` followed by
/// a `put` on the same key can lose a concurrent writer's update.
#[async_trait]
pub trait KvBackend: Send + Sync {
    /// Value stored under `key`, or `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Insert or overwrite `key`.
    async fn put(&self, key: &str, value: String) -> Result<(), StoreError>;

    /// All keys starting with `prefix`, in ascending order.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError>;
}

/// Store handle shared by every route.
pub type SharedStore = Arc<dyn KvBackend>;

/// Bounds every call on the wrapped backend so a stalled store
/// fails the request instead of hanging it.
pub struct TimedStore<B> {
    inner: B,
    limit: Duration,
}

impl<B> TimedStore<B> {
    pub fn new(inner: B, limit: Duration) -> Self {
        Self { inner, limit }
    }
}

#[async_trait]
impl<B: KvBackend> KvBackend for TimedStore<B> {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        timeout(self.limit, self.inner.get(key))
            .await
            .map_err(|_| StoreError::Timeout(self.limit))?
    }

    async fn put(&self, key: &str, value: String) -> Result<(), StoreError> {
        timeout(self.limit, self.inner.put(key, value))
            .await
            .map_err(|_| StoreError::Timeout(self.limit))?
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        timeout(self.limit, self.inner.list(prefix))
            .await
            .map_err(|_| StoreError::Timeout(self.limit))?
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Fake backends for exercising failure paths.

    use super::*;

    /// Every call fails as if the store were down.
    pub struct DownStore;

    #[async_trait]
    impl KvBackend for DownStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }

        async fn put(&self, _key: &str, _value: String) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }

        async fn list(&self, _prefix: &str) -> Result<Vec<String>, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
    }

    /// Every call sleeps well past any sane timeout before answering.
    pub struct StalledStore;

    #[async_trait]
    impl KvBackend for StalledStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(None)
        }

        async fn put(&self, _key: &str, _value: String) -> Result<(), StoreError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        }

        async fn list(&self, _prefix: &str) -> Result<Vec<String>, StoreError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Vec::new())
        }
    }
}
