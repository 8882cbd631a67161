use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::errors::ApiError;
use crate::routes::not_found;
use crate::services::views_service;
use crate::state::backend::SharedStore;

pub fn routes(store: SharedStore) -> Router {
    Router::new()
        .route("/views", get(get_views).head(not_found).fallback(not_found))
        .with_state(store)
}

//
// ─────────────────────────────────────────────────────────────
// GET /views
// Increment the global counter and return the new total
// ─────────────────────────────────────────────────────────────
//
async fn get_views(State(store): State<SharedStore>) -> Result<Json<Value>, ApiError> {
    let views = views_service::increment(store.as_ref()).await?;
    Ok(Json(json!({ "views": views })))
}
