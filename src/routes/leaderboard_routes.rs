use axum::{extract::State, routing::get, Json, Router};

use crate::errors::ApiError;
use crate::routes::not_found;
use crate::services::leaderboard_service::{self, LEADERBOARD_SIZE};
use crate::services::score_service::ScoreEntry;
use crate::state::backend::SharedStore;

pub fn routes(store: SharedStore) -> Router {
    Router::new()
        .route("/leaderboard", get(get_leaderboard).head(not_found).fallback(not_found))
        .with_state(store)
}

/// GET /leaderboard
async fn get_leaderboard(
    State(store): State<SharedStore>,
) -> Result<Json<Vec<ScoreEntry>>, ApiError> {
    let board = leaderboard_service::top(store.as_ref(), LEADERBOARD_SIZE).await?;
    Ok(Json(board))
}
