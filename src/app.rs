use axum::Router;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::AppConfig;
use crate::routes::{leaderboard_routes, not_found, score_routes, system_routes, views_routes};
use crate::state::backend::SharedStore;

/// Build the complete Axum application:
/// - /views        (view counter)
/// - /score        (score submission)
/// - /leaderboard  (top 10)
/// - /system       (alive + version)
///
/// Everything else answers 404 "Not found".
pub fn build_app(store: SharedStore, cfg: AppConfig) -> Router {
    Router::new()
        .merge(views_routes::routes(store.clone()))
        .merge(score_routes::routes(store.clone()))
        .merge(leaderboard_routes::routes(store))
        // /system/*
        .nest("/system", system_routes::routes(cfg))
        .fallback(not_found)
        // Logging middleware
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
