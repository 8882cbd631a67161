use std::cmp::Ordering;

use crate::errors::StoreError;
use crate::services::score_service::{numeric, ScoreEntry, SCORE_PREFIX};
use crate::state::backend::KvBackend;

pub const LEADERBOARD_SIZE: usize = 10;

/// Highest `limit` score records, best first.
///
/// Scans every history record on each call. Records that are gone by the
/// time they are fetched, or that don't parse as a `ScoreEntry`, are
/// skipped. Equal scores rank the earlier submission first.
pub async fn top(store: &dyn KvBackend, limit: usize) -> Result<Vec<ScoreEntry>, StoreError> {
    let keys = store.list(SCORE_PREFIX).await?;
    let mut entries = Vec::with_capacity(keys.len());

    for key in &keys {
        let Some(raw) = store.get(key).await? else {
            continue;
        };

        match serde_json::from_str::<ScoreEntry>(&raw) {
            Ok(entry) => entries.push(entry),
            Err(e) => tracing::debug!("Skipping malformed score record {key}: {e}"),
        }
    }

    entries.sort_by(rank);
    entries.truncate(limit);
    Ok(entries)
}

fn rank(a: &ScoreEntry, b: &ScoreEntry) -> Ordering {
    numeric(&b.score)
        .total_cmp(&numeric(&a.score))
        .then(a.timestamp.cmp(&b.timestamp))
}
