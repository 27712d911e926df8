//! Local filesystem snapshot cache.

use std::path::PathBuf;

use tokio::io::AsyncWriteExt;

use crate::catalog::CatalogSnapshot;
use crate::error::{AppError, Result};
use crate::storage::SnapshotData;

const SNAPSHOT_FILE: &str = "papers.json";

/// Snapshot cache rooted at a directory.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    root_dir: PathBuf,
}

impl SnapshotStore {
    /// Create a new store rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Path of the snapshot file.
    pub fn path(&self) -> PathBuf {
        self.root_dir.join(SNAPSHOT_FILE)
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        let path = self.path();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Persist a snapshot.
    pub async fn save(&self, snapshot: &CatalogSnapshot) -> Result<SnapshotData> {
        let data = SnapshotData::new(snapshot.papers.clone());
        let bytes = serde_json::to_vec_pretty(&data)?;
        self.write_bytes(&bytes).await?;
        log::info!("{} records written to {}", data.count, self.path().display());
        Ok(data)
    }

    /// Load the cached snapshot, returning `None` when absent.
    pub async fn load(&self) -> Result<Option<SnapshotData>> {
        match tokio::fs::read(self.path()).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExamType, PaperRecord};
    use tempfile::TempDir;

    fn sample_papers() -> Vec<PaperRecord> {
        vec![PaperRecord {
            id: "abc123".to_string(),
            course_code: "CSE1001".to_string(),
            course_name: "Intro To Programming".to_string(),
            exam_type: ExamType::Cat1,
            semester: "Winter2023".to_string(),
            slot: "A1".to_string(),
            storage_link: "https://example.com/view/abc123".to_string(),
            uploaded_at: "2024-01-15T10:00:00Z".parse().unwrap(),
        }]
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let tmp = TempDir::new().unwrap();
        let store = SnapshotStore::new(tmp.path());

        let snapshot = CatalogSnapshot::from_papers(sample_papers());
        store.save(&snapshot).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.count, 1);
        assert_eq!(loaded.papers, snapshot.papers);
    }

    #[tokio::test]
    async fn test_load_missing_returns_none() {
        let tmp = TempDir::new().unwrap();
        let store = SnapshotStore::new(tmp.path());

        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_replaces_previous_snapshot() {
        let tmp = TempDir::new().unwrap();
        let store = SnapshotStore::new(tmp.path());

        store
            .save(&CatalogSnapshot::from_papers(sample_papers()))
            .await
            .unwrap();
        store
            .save(&CatalogSnapshot::empty())
            .await
            .unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.count, 0);
        assert!(loaded.papers.is_empty());
    }
}
