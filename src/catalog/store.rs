// src/catalog/store.rs

//! Catalog store.
//!
//! Turns raw listing entries into an immutable, recency-sorted snapshot.
//! A load never fails from the consumer's point of view: fetch errors
//! degrade to an empty snapshot, recorded in the outcome for operators.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use crate::catalog::parser::parse_filename;
use crate::catalog::source::DriveSource;
use crate::events::{null_observer, Event, Observer};
use crate::models::PaperRecord;

/// The ordered paper collection held for a browsing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSnapshot {
    /// Records sorted by upload time, most recent first, unique by id
    pub papers: Vec<PaperRecord>,

    /// Distinct `"{code} - {name}"` labels, computed once per load
    pub course_options: Vec<String>,

    /// When this snapshot was assembled
    pub fetched_at: DateTime<Utc>,
}

impl CatalogSnapshot {
    /// An empty snapshot, used on the fail-soft path.
    pub fn empty() -> Self {
        Self::from_papers(Vec::new())
    }

    /// Build a snapshot from parsed records: sort by recency, deduplicate
    /// by id keeping the most recent occurrence, derive course options.
    pub fn from_papers(mut papers: Vec<PaperRecord>) -> Self {
        papers.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));

        let mut seen = HashSet::new();
        papers.retain(|p| seen.insert(p.id.clone()));

        let mut course_options: Vec<String> = papers
            .iter()
            .map(PaperRecord::course_label)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        course_options.sort();

        Self {
            papers,
            course_options,
            fetched_at: Utc::now(),
        }
    }

    /// Look up a record by its backend id.
    pub fn find(&self, id: &str) -> Option<&PaperRecord> {
        self.papers.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.papers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }
}

/// A listing entry dropped during snapshot assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub name: String,
    pub reason: String,
}

/// Result of a catalog load, including the operator-facing report.
#[derive(Debug)]
pub struct LoadOutcome {
    pub snapshot: CatalogSnapshot,
    pub skipped: Vec<SkippedFile>,
    pub fetch_error: Option<String>,
}

/// Service that assembles catalog snapshots from the listing source.
pub struct CatalogStore {
    source: DriveSource,
    observer: Arc<dyn Observer>,
}

impl CatalogStore {
    pub fn new(source: DriveSource) -> Self {
        Self::with_observer(source, null_observer())
    }

    pub fn with_observer(source: DriveSource, observer: Arc<dyn Observer>) -> Self {
        Self { source, observer }
    }

    /// Load a fresh snapshot.
    ///
    /// A fetch failure yields an empty snapshot with `fetch_error` set
    /// rather than an error: a transient network problem degrades the
    /// catalog instead of taking the page down. Unparseable entries are
    /// dropped and reported in `skipped`.
    pub async fn load(&self, cancel: &CancellationToken) -> LoadOutcome {
        let entries = match self.source.fetch_all(cancel).await {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("catalog fetch failed, serving empty snapshot: {}", e);
                self.observer.on_event(&Event::CatalogError {
                    message: e.to_string(),
                });
                return LoadOutcome {
                    snapshot: CatalogSnapshot::empty(),
                    skipped: Vec::new(),
                    fetch_error: Some(e.to_string()),
                };
            }
        };

        let mut papers = Vec::with_capacity(entries.len());
        let mut skipped = Vec::new();

        for entry in entries {
            let parsed = match parse_filename(&entry.name) {
                Ok(parsed) => parsed,
                Err(rejection) => {
                    skipped.push(SkippedFile {
                        name: entry.name,
                        reason: rejection.to_string(),
                    });
                    continue;
                }
            };

            let uploaded_at = match DateTime::parse_from_rfc3339(&entry.modified_time) {
                Ok(ts) => ts.with_timezone(&Utc),
                Err(e) => {
                    skipped.push(SkippedFile {
                        name: entry.name,
                        reason: format!("invalid modifiedTime '{}': {}", entry.modified_time, e),
                    });
                    continue;
                }
            };

            papers.push(PaperRecord {
                id: entry.id,
                course_code: parsed.course_code,
                course_name: parsed.course_name,
                exam_type: parsed.exam_type,
                semester: parsed.semester,
                slot: parsed.slot,
                storage_link: entry.web_view_link,
                uploaded_at,
            });
        }

        if !skipped.is_empty() {
            log::warn!("{} listing entries dropped during parse", skipped.len());
        }

        let snapshot = CatalogSnapshot::from_papers(papers);
        self.observer.on_event(&Event::CatalogLoaded {
            papers: snapshot.len(),
            skipped: skipped.len(),
        });

        LoadOutcome {
            snapshot,
            skipped,
            fetch_error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::testing::RecordingObserver;
    use crate::models::{DriveConfig, ExamType};

    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    fn record(id: &str, code: &str, uploaded_at: &str) -> PaperRecord {
        PaperRecord {
            id: id.to_string(),
            course_code: code.to_string(),
            course_name: "Intro To Programming".to_string(),
            exam_type: ExamType::Cat1,
            semester: "Winter2023".to_string(),
            slot: "A1".to_string(),
            storage_link: format!("https://example.com/view/{id}"),
            uploaded_at: uploaded_at.parse().unwrap(),
        }
    }

    #[test]
    fn snapshot_sorts_by_recency() {
        let snapshot = CatalogSnapshot::from_papers(vec![
            record("old", "CSE1001", "2023-01-01T00:00:00Z"),
            record("new", "CSE1001", "2024-06-01T00:00:00Z"),
            record("mid", "CSE1001", "2023-09-01T00:00:00Z"),
        ]);
        let ids: Vec<&str> = snapshot.papers.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }

    #[test]
    fn snapshot_dedups_by_id_keeping_most_recent() {
        let snapshot = CatalogSnapshot::from_papers(vec![
            record("a", "CSE1001", "2023-01-01T00:00:00Z"),
            record("a", "CSE1001", "2024-01-01T00:00:00Z"),
        ]);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(
            snapshot.papers[0].uploaded_at,
            "2024-01-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    #[test]
    fn snapshot_course_options_are_distinct_and_sorted() {
        let snapshot = CatalogSnapshot::from_papers(vec![
            record("a", "MAT1001", "2024-01-01T00:00:00Z"),
            record("b", "CSE1001", "2024-01-02T00:00:00Z"),
            record("c", "CSE1001", "2024-01-03T00:00:00Z"),
        ]);
        assert_eq!(
            snapshot.course_options,
            vec![
                "CSE1001 - Intro To Programming".to_string(),
                "MAT1001 - Intro To Programming".to_string(),
            ]
        );
    }

    fn listing_router(files: serde_json::Value) -> Router {
        Router::new().route("/files", get(move || async move { Json(json!({"files": files})) }))
    }

    async fn store_for(router: Router) -> CatalogStore {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        let config = DriveConfig {
            base_url: format!("http://{addr}"),
            api_key: "k".to_string(),
            folder_id: "f".to_string(),
            ..DriveConfig::default()
        };
        CatalogStore::new(DriveSource::new(config).unwrap())
    }

    #[tokio::test]
    async fn load_drops_and_reports_malformed_entries() {
        let files = json!([
            {
                "id": "good",
                "name": "CSE1001_IntroToProgramming_CAT1_Winter2023_SlotA1.pdf",
                "webViewLink": "https://example.com/view/good",
                "modifiedTime": "2024-01-15T10:00:00Z",
            },
            {
                "id": "bad-shape",
                "name": "bad-name.pdf",
                "webViewLink": "https://example.com/view/bad",
                "modifiedTime": "2024-01-15T10:00:00Z",
            },
            {
                "id": "bad-time",
                "name": "MAT1001_Calculus_FAT_Fall2024_SlotC1.pdf",
                "webViewLink": "https://example.com/view/bad-time",
                "modifiedTime": "yesterday",
            },
        ]);
        let store = store_for(listing_router(files)).await;

        let outcome = store.load(&CancellationToken::new()).await;

        assert!(outcome.fetch_error.is_none());
        assert_eq!(outcome.snapshot.len(), 1);
        assert_eq!(outcome.snapshot.papers[0].id, "good");
        assert_eq!(outcome.snapshot.papers[0].course_name, "Intro To Programming");
        assert_eq!(outcome.skipped.len(), 2);
        assert!(outcome.skipped.iter().any(|s| s.name == "bad-name.pdf"));
        assert!(outcome
            .skipped
            .iter()
            .any(|s| s.reason.contains("invalid modifiedTime")));
    }

    #[tokio::test]
    async fn load_degrades_to_empty_on_fetch_failure() {
        // Port 1 is never listening; the fetch fails fast.
        let config = DriveConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            api_key: "k".to_string(),
            folder_id: "f".to_string(),
            ..DriveConfig::default()
        };
        let observer = Arc::new(RecordingObserver::default());
        let store =
            CatalogStore::with_observer(DriveSource::new(config).unwrap(), observer.clone());

        let outcome = store.load(&CancellationToken::new()).await;

        assert!(outcome.snapshot.is_empty());
        assert!(outcome.fetch_error.is_some());
        let events = observer.events.lock().unwrap();
        assert!(matches!(events.as_slice(), [Event::CatalogError { .. }]));
    }

    #[tokio::test]
    async fn load_twice_yields_identical_record_sets() {
        let files = json!([
            {
                "id": "a",
                "name": "CSE1001_IntroToProgramming_CAT1_Winter2023_SlotA1.pdf",
                "webViewLink": "https://example.com/view/a",
                "modifiedTime": "2024-01-15T10:00:00Z",
            },
        ]);
        let store = store_for(listing_router(files)).await;

        let first = store.load(&CancellationToken::new()).await;
        let second = store.load(&CancellationToken::new()).await;
        assert_eq!(first.snapshot.papers, second.snapshot.papers);
    }
}
