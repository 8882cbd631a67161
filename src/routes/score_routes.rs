use axum::{body::Bytes, extract::State, routing::post, Json, Router};

use crate::errors::ApiError;
use crate::routes::not_found;
use crate::services::score_service::{self, ScoreOutcome};
use crate::state::backend::SharedStore;

pub fn routes(store: SharedStore) -> Router {
    Router::new()
        .route("/score", post(post_score).fallback(not_found))
        .with_state(store)
}

//
// ─────────────────────────────────────────────────────────────
// POST /score
// Body: { "username": string, "score": number }
// ─────────────────────────────────────────────────────────────
//
// The body is taken raw so that a missing content type or broken JSON
// gets the same 400 as a missing field.
async fn post_score(
    State(store): State<SharedStore>,
    body: Bytes,
) -> Result<Json<ScoreOutcome>, ApiError> {
    let submission = score_service::parse_submission(&body)?;
    let outcome = score_service::record(store.as_ref(), submission).await?;
    Ok(Json(outcome))
}
