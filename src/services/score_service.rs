use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::errors::{ApiError, StoreError};
use crate::state::backend::KvBackend;

pub const PLAYER_PREFIX: &str = "player-";
pub const SCORE_PREFIX: &str = "score-";

/// A validated `POST /score` body.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreSubmission {
    pub username: String,
    pub score: Number,
}

/// One immutable history record, stored as JSON under `score-<millis>-<seq>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub username: String,
    pub score: Number,
    /// Receipt time in Unix milliseconds.
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreOutcome {
    pub username: String,
    pub score: Number,
    pub best_score: Number,
}

/// Validate a raw request body.
///
/// Anything other than a JSON object with a non-empty string `username`
/// and a numeric `score` is rejected. JSON has no NaN, so a `Number` is
/// always a real value.
pub fn parse_submission(body: &[u8]) -> Result<ScoreSubmission, ApiError> {
    let value: Value = serde_json::from_slice(body).map_err(|_| ApiError::InvalidSubmission)?;

    let username = value
        .get("username")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .ok_or(ApiError::InvalidSubmission)?;

    let score = match value.get("score") {
        Some(Value::Number(n)) => n.clone(),
        _ => return Err(ApiError::InvalidSubmission),
    };

    Ok(ScoreSubmission {
        username: username.to_string(),
        score,
    })
}

/// Update the player's best score if beaten, then append a history record.
///
/// The best-score check and the two writes are not atomic; concurrent
/// submissions for the same player can overwrite each other's best.
pub async fn record(
    store: &dyn KvBackend,
    submission: ScoreSubmission,
) -> Result<ScoreOutcome, StoreError> {
    let ScoreSubmission { username, score } = submission;
    let player_key = format!("{PLAYER_PREFIX}{username}");

    let mut best = store
        .get(&player_key)
        .await?
        .and_then(|raw| parse_number(&raw))
        .unwrap_or_else(|| Number::from(0));

    if numeric(&score) > numeric(&best) {
        store.put(&player_key, score.to_string()).await?;
        tracing::info!(%username, %score, "New best score");
        best = score.clone();
    }

    let timestamp = Utc::now().timestamp_millis();
    let entry = ScoreEntry {
        username: username.clone(),
        score: score.clone(),
        timestamp,
    };
    store
        .put(&history_key(timestamp), serde_json::to_string(&entry)?)
        .await?;

    Ok(ScoreOutcome {
        username,
        score,
        best_score: best,
    })
}

/// Numeric value used for every score comparison.
pub(crate) fn numeric(n: &Number) -> f64 {
    n.as_f64().unwrap_or(0.0)
}

fn parse_number(raw: &str) -> Option<Number> {
    serde_json::from_str::<Number>(raw.trim()).ok()
}

/// Millisecond timestamp plus a process-wide sequence number, so that two
/// submissions landing in the same millisecond get distinct keys. The
/// sequence is zero-padded so lexical key order is submission order.
fn history_key(timestamp: i64) -> String {
    static SEQ: AtomicU64 = AtomicU64::new(0);
    let seq = SEQ.fetch_add(1, Ordering::Relaxed);
    format!("{SCORE_PREFIX}{timestamp}-{seq:020}")
}
