/*****************************************************************************************
 *
 *  Scoreboard – view counter, score submission and top-10 leaderboard
 *  --------------------------------------------------------------------
 *
 *  Backed by a key-value store (in-memory + JSON snapshot)
 *
 *****************************************************************************************/

mod app;
mod config;
mod errors;
mod persistence;
mod routes;
mod services;
mod state;

use std::path::PathBuf;
use std::sync::Arc;

use axum::serve;
use tokio::net::TcpListener;
use tokio::task;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::FmtSubscriber;

use crate::config::AppConfig;
use crate::persistence::{autosave_loop, load_snapshot, save_snapshot};
use crate::state::backend::{SharedStore, TimedStore};
use crate::state::kv::MemoryStore;

#[tokio::main]
async fn main() {
    //
    // ────────────────────────────────────────────────────────
    //  Locate config.json (EXE folder or one level up)
    // ────────────────────────────────────────────────────────
    //
    let exe_path = std::env::current_exe().expect("Cannot get executable path");
    let exe_dir = exe_path.parent().expect("Cannot get executable directory");

    let mut config_path: PathBuf = exe_dir.join("config.json");

    if !config_path.exists() {
        let fallback = exe_dir.join("..").join("config.json");
        if fallback.exists() {
            config_path = fallback;
        } else {
            panic!(
                "config.json not found in:\n  {}\n  {}\nCopy config.json to one of these paths.",
                exe_dir.join("config.json").display(),
                fallback.display()
            );
        }
    }

    //
    // ────────────────────────────────────────────────────────
    //  Load configuration
    // ────────────────────────────────────────────────────────
    //
    let cfg = AppConfig::load_from_file(&config_path)
        .unwrap_or_else(|e| panic!("{}: {e}", config_path.display()));

    //
    // ────────────────────────────────────────────────────────
    //  Configure logging
    // ────────────────────────────────────────────────────────
    //
    let level = match cfg.log_level.to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => LevelFilter::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    tracing::info!("Starting scoreboard…");
    tracing::info!("Loaded configuration from {}: {:?}", config_path.display(), cfg);

    //
    // ────────────────────────────────────────────────────────
    //  Create store and load snapshot
    // ────────────────────────────────────────────────────────
    //
    let memory = MemoryStore::new();
    load_snapshot(&cfg.snapshot_path, &memory).await;

    if let Ok(keys) = memory.len() {
        tracing::info!("Store ready with {} keys", keys);
    }

    {
        let store_clone = memory.clone();
        let path = cfg.snapshot_path.clone();
        let interval = cfg.snapshot_interval;

        task::spawn(async move {
            autosave_loop(path, store_clone, interval).await;
        });
    }

    let store: SharedStore = Arc::new(TimedStore::new(memory.clone(), cfg.store_timeout()));

    //
    // ────────────────────────────────────────────────────────
    //  Build router, bind and serve
    // ────────────────────────────────────────────────────────
    //
    let app = app::build_app(store, cfg.clone());

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], cfg.port));
    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    tracing::info!("Listening on http://{}", addr);

    serve(listener, app)
        .with_graceful_shutdown(shutdown(memory, cfg.snapshot_path.clone()))
        .await
        .expect("Server error");
}

//
// ─────────────────────────────────────────────────────────────
//  Graceful shutdown handler
// ─────────────────────────────────────────────────────────────
//
async fn shutdown(store: MemoryStore, path: String) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }

    tracing::warn!("CTRL+C received — saving snapshot…");
    save_snapshot(&path, &store).await;
    tracing::info!("Snapshot saved. Goodbye.");
}
