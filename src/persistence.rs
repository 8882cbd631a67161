use std::{fs, io::Write};

use chrono::Utc;
use serde_json::{Map, Value};
use tokio::time::{sleep, Duration};

use crate::state::kv::{Entry, MemoryStore};

/// Load snapshot from disk into memory.
///
/// Missing or unreadable snapshots leave the store empty; the service
/// starts either way.
pub async fn load_snapshot(path: &str, store: &MemoryStore) {
    let data = match fs::read_to_string(path) {
        Ok(d) => d,
        Err(_) => {
            tracing::info!("No snapshot found at startup (path = {})", path);
            return;
        }
    };

    let json: Value = match serde_json::from_str(&data) {
        Ok(j) => j,
        Err(e) => {
            tracing::warn!("Failed to parse snapshot JSON: {e}");
            return;
        }
    };

    let obj = match json.as_object() {
        Some(m) => m,
        None => {
            tracing::warn!("Snapshot is not a JSON object, ignoring");
            return;
        }
    };

    let now = Utc::now().timestamp();

    let mut kv = match store.write() {
        Ok(kv) => kv,
        Err(e) => {
            tracing::warn!("Cannot load snapshot: {e}");
            return;
        }
    };
    kv.clear();

    for (k, v) in obj {
        let entry = match v {
            // { "value": "...", "created_at": 123456789 }
            Value::Object(fields) => Entry {
                value: fields
                    .get("value")
                    .and_then(|vv| vv.as_str())
                    .unwrap_or("")
                    .to_string(),
                created_at: fields
                    .get("created_at")
                    .and_then(|vv| vv.as_i64())
                    .unwrap_or(now),
            },
            // Bare "value-as-string" with no metadata
            Value::String(s) => Entry {
                value: s.clone(),
                created_at: now,
            },
            _ => {
                tracing::debug!("Skipping snapshot key {k}: unsupported shape");
                continue;
            }
        };

        kv.insert(k.clone(), entry);
    }

    tracing::info!("Loaded snapshot: {} entries", kv.len());
}

/// Save the current KV state to `path`.
pub async fn save_snapshot(path: &str, store: &MemoryStore) {
    let obj = match store.read() {
        Ok(kv) => kv
            .iter()
            .map(|(k, entry)| {
                (
                    k.clone(),
                    serde_json::json!({
                        "value": entry.value,
                        "created_at": entry.created_at,
                    }),
                )
            })
            .collect::<Map<String, Value>>(),
        Err(e) => {
            tracing::warn!("Cannot snapshot store: {e}");
            return;
        }
    };

    let json = match serde_json::to_string_pretty(&Value::Object(obj)) {
        Ok(j) => j,
        Err(e) => {
            tracing::warn!("Failed to serialize snapshot JSON: {e}");
            return;
        }
    };

    // Write beside the target and rename over it; the old snapshot stays
    // whole until the rename.
    let tmp_path = format!("{path}.tmp");
    let written = fs::File::create(&tmp_path).and_then(|mut file| {
        file.write_all(json.as_bytes())?;
        file.sync_all()
    });

    if let Err(e) = written {
        tracing::warn!("Failed to write snapshot file {tmp_path}: {e}");
        return;
    }

    match fs::rename(&tmp_path, path) {
        Ok(()) => tracing::debug!("Snapshot saved"),
        Err(e) => tracing::warn!("Failed to move snapshot into place: {e}"),
    }
}

/// Background task that periodically saves the snapshot.
pub async fn autosave_loop(path: String, store: MemoryStore, every_sec: u64) {
    loop {
        sleep(Duration::from_secs(every_sec)).await;
        save_snapshot(&path, &store).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::backend::KvBackend;

    #[tokio::test]
    async fn snapshot_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snap.json");
        let path = path.to_str().unwrap();

        let store = MemoryStore::new();
        store.put("total-views", "12".into()).await.unwrap();
        store
            .put(
                "score-1700000000000-0",
                r#"{"username":"ann","score":40,"timestamp":1700000000000}"#.into(),
            )
            .await
            .unwrap();
        save_snapshot(path, &store).await;

        let restored = MemoryStore::new();
        load_snapshot(path, &restored).await;

        assert_eq!(restored.len().unwrap(), 2);
        assert_eq!(restored.get("total-views").await.unwrap().as_deref(), Some("12"));
        assert_eq!(
            restored.list("score-").await.unwrap(),
            vec!["score-1700000000000-0"]
        );
    }

    #[tokio::test]
    async fn save_replaces_snapshot_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snap.json");
        let tmp = dir.path().join("snap.json.tmp");
        fs::write(&path, r#"{ "total-views": "1" }"#).unwrap();

        let store = MemoryStore::new();
        store.put("total-views", "2".into()).await.unwrap();
        save_snapshot(path.to_str().unwrap(), &store).await;

        assert!(!tmp.exists());
        let restored = MemoryStore::new();
        load_snapshot(path.to_str().unwrap(), &restored).await;
        assert_eq!(restored.get("total-views").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn failed_save_keeps_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snap.json");
        fs::write(&path, r#"{ "total-views": "7" }"#).unwrap();
        // A directory squatting on the temp name makes the write fail.
        fs::create_dir(dir.path().join("snap.json.tmp")).unwrap();

        let store = MemoryStore::new();
        store.put("total-views", "8".into()).await.unwrap();
        save_snapshot(path.to_str().unwrap(), &store).await;

        let restored = MemoryStore::new();
        load_snapshot(path.to_str().unwrap(), &restored).await;
        assert_eq!(restored.get("total-views").await.unwrap().as_deref(), Some("7"));
    }

    #[tokio::test]
    async fn bare_string_values_are_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snap.json");
        fs::write(&path, r#"{ "player-ann": "40", "bogus": 5 }"#).unwrap();

        let store = MemoryStore::new();
        load_snapshot(path.to_str().unwrap(), &store).await;

        assert_eq!(store.get("player-ann").await.unwrap().as_deref(), Some("40"));
        assert_eq!(store.get("bogus").await.unwrap(), None);
    }

    #[tokio::test]
    async fn missing_or_corrupt_snapshot_leaves_store_empty() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        let corrupt = dir.path().join("corrupt.json");
        fs::write(&corrupt, "{ not json").unwrap();

        let store = MemoryStore::new();
        load_snapshot(missing.to_str().unwrap(), &store).await;
        load_snapshot(corrupt.to_str().unwrap(), &store).await;

        assert_eq!(store.len().unwrap(), 0);
    }
}
