//! Snapshot cache on local disk.
//!
//! The latest catalog snapshot is persisted to `papers.json` so the CLI can
//! search offline and the server has a cold-start fallback when the listing
//! API is unreachable.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! └── papers.json           # Latest snapshot with header metadata
//! ```

pub mod local;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::PaperRecord;

// Re-export for convenience
pub use local::SnapshotStore;

/// Header for papers.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotData {
    /// ISO 8601 timestamp of last update
    pub updated_at: DateTime<Utc>,
    /// Total record count
    pub count: usize,
    /// The records, in snapshot (recency) order
    pub papers: Vec<PaperRecord>,
}

impl SnapshotData {
    pub fn new(papers: Vec<PaperRecord>) -> Self {
        Self {
            updated_at: Utc::now(),
            count: papers.len(),
            papers,
        }
    }
}
