// src/server/state.rs

//! Shared application state for the backend service.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::catalog::{CatalogSnapshot, CatalogStore, QueryEngine};
use crate::events::Observer;
use crate::mail::Mailer;
use crate::models::Config;
use crate::storage::SnapshotStore;

/// State shared across request handlers.
pub struct AppState {
    pub config: Config,

    /// The served snapshot; replaced wholesale on refresh, never edited
    pub snapshot: RwLock<CatalogSnapshot>,

    /// Assembles fresh snapshots from the listing API
    pub store: CatalogStore,

    /// Disk cache used as a cold-start fallback
    pub cache: SnapshotStore,

    pub engine: QueryEngine,
    pub mailer: Arc<dyn Mailer>,
    pub observer: Arc<dyn Observer>,
}

impl AppState {
    /// Swap in a new snapshot, holding the write lock only for the swap.
    pub async fn replace_snapshot(&self, snapshot: CatalogSnapshot) {
        *self.snapshot.write().await = snapshot;
    }
}
