use crate::errors::StoreError;
use crate::state::backend::KvBackend;

pub const VIEWS_KEY: &str = "total-views";

/// Bump the global view counter and return the new total.
///
/// Read-then-write with no compare-and-swap: two concurrent calls may
/// both read N and both write N + 1.
pub async fn increment(store: &dyn KvBackend) -> Result<u64, StoreError> {
    let current = store
        .get(VIEWS_KEY)
        .await?
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .unwrap_or(0);

    let views = current.saturating_add(1);
    store.put(VIEWS_KEY, views.to_string()).await?;

    tracing::debug!(views, "View counter incremented");
    Ok(views)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::backend::testing::DownStore;
    use crate::state::kv::MemoryStore;

    #[tokio::test]
    async fn n_calls_count_to_n() {
        let store = MemoryStore::new();
        for expected in 1..=25 {
            assert_eq!(increment(&store).await.unwrap(), expected);
        }
        assert_eq!(store.get(VIEWS_KEY).await.unwrap().as_deref(), Some("25"));
    }

    #[tokio::test]
    async fn non_integer_counter_restarts_at_one() {
        for garbage in ["lots", "12abc", "3.7", "-2"] {
            let store = MemoryStore::new();
            store.put(VIEWS_KEY, garbage.into()).await.unwrap();
            assert_eq!(increment(&store).await.unwrap(), 1, "stored {garbage:?}");
        }
    }

    #[tokio::test]
    async fn store_failure_propagates() {
        let err = increment(&DownStore).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
