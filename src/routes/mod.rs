use axum::http::StatusCode;

pub mod leaderboard_routes;
pub mod score_routes;
pub mod system_routes;
pub mod views_routes;

/// Plain-text 404 for unknown paths and wrong methods on known ones.
pub async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not found")
}
