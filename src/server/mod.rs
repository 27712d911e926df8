// src/server/mod.rs

//! Backend HTTP service.
//!
//! Serves the paper catalog, accepts uploads, and relays contact messages.
//! The catalog snapshot is loaded at startup (falling back to the disk
//! cache when the listing API is unreachable) and refreshed on an interval.

pub mod routes;
pub mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;

use crate::catalog::{CatalogSnapshot, CatalogStore, DriveSource, QueryEngine};
use crate::error::Result;
use crate::events::Observer;
use crate::mail::Mailer;
use crate::models::Config;
use crate::storage::SnapshotStore;

pub use state::AppState;

/// Allowance on top of the upload cap for multipart framing overhead.
const BODY_LIMIT_SLACK: usize = 64 * 1024;

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.server.max_upload_bytes + BODY_LIMIT_SLACK;

    Router::new()
        .route("/health", get(routes::health))
        .route("/api/papers", get(routes::list_papers))
        .route("/api/papers/{id}", get(routes::get_paper))
        .route("/api/upload", post(routes::upload))
        .route("/send", post(routes::send_contact))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Assemble the shared state, loading the initial snapshot.
pub async fn build_state(
    config: Config,
    mailer: Arc<dyn Mailer>,
    observer: Arc<dyn Observer>,
) -> Result<Arc<AppState>> {
    tokio::fs::create_dir_all(&config.server.uploads_dir).await?;

    let source = DriveSource::new(config.drive.clone())?;
    let store = CatalogStore::with_observer(source, observer.clone());
    let cache = SnapshotStore::new(&config.server.snapshot_dir);
    let engine = QueryEngine::with_observer(&config.display, observer.clone());

    let snapshot = initial_snapshot(&store, &cache).await;
    log::info!("serving {} papers", snapshot.len());

    Ok(Arc::new(AppState {
        config,
        snapshot: tokio::sync::RwLock::new(snapshot),
        store,
        cache,
        engine,
        mailer,
        observer,
    }))
}

/// Load the startup snapshot: remote listing first, disk cache as fallback.
async fn initial_snapshot(store: &CatalogStore, cache: &SnapshotStore) -> CatalogSnapshot {
    let outcome = store.load(&CancellationToken::new()).await;
    if outcome.fetch_error.is_none() {
        if let Err(e) = cache.save(&outcome.snapshot).await {
            log::warn!("failed to cache snapshot: {}", e);
        }
        return outcome.snapshot;
    }

    match cache.load().await {
        Ok(Some(data)) => {
            log::warn!("listing unreachable, serving {} cached records", data.count);
            CatalogSnapshot::from_papers(data.papers)
        }
        Ok(None) => outcome.snapshot,
        Err(e) => {
            log::warn!("snapshot cache unreadable: {}", e);
            outcome.snapshot
        }
    }
}

/// Periodically refresh the served snapshot.
async fn refresh_loop(state: Arc<AppState>) {
    let interval = Duration::from_secs(state.config.server.refresh_interval_secs.max(1));
    loop {
        tokio::time::sleep(interval).await;

        let outcome = state.store.load(&CancellationToken::new()).await;
        if outcome.fetch_error.is_some() {
            // Keep serving the previous snapshot.
            continue;
        }
        if let Err(e) = state.cache.save(&outcome.snapshot).await {
            log::warn!("failed to cache snapshot: {}", e);
        }
        log::info!("snapshot refreshed, {} papers", outcome.snapshot.len());
        state.replace_snapshot(outcome.snapshot).await;
    }
}

/// Run the backend service until the process exits.
pub async fn serve(
    config: Config,
    mailer: Arc<dyn Mailer>,
    observer: Arc<dyn Observer>,
) -> Result<()> {
    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    let state = build_state(config, mailer, observer).await?;

    tokio::spawn(refresh_loop(state.clone()));

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    log::info!("listening on {}", bind_address);
    axum::serve(listener, app).await?;

    Ok(())
}
