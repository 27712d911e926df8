// src/catalog/query.rs

//! Query engine.
//!
//! Pure, synchronous filtering and autocomplete over a catalog snapshot.
//! An explicit course selection beats the free-text query; filters never
//! re-sort, so results keep the snapshot's recency order.

use std::sync::Arc;

use crate::catalog::store::CatalogSnapshot;
use crate::events::{null_observer, Event, Observer};
use crate::models::{DisplayConfig, ExamType, PaperRecord};

/// Assessment-category filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Category {
    #[default]
    All,
    Exam(ExamType),
}

impl Category {
    /// Parse a query-string or CLI value (`all`, `CAT1`, `CAT-1`, ...).
    pub fn parse(s: &str) -> Option<Self> {
        if s.trim().is_empty() || s.trim().eq_ignore_ascii_case("all") {
            return Some(Category::All);
        }
        ExamType::parse_label(s).map(Category::Exam)
    }

    fn matches(&self, paper: &PaperRecord) -> bool {
        match self {
            Category::All => true,
            Category::Exam(t) => paper.exam_type == *t,
        }
    }
}

/// A pinned course, picked from a suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseSelection {
    pub code: String,
    pub name: String,
}

impl CourseSelection {
    /// Decompose a `"{code} - {name}"` label. Splits on the first
    /// `" - "`, so course names containing the separator survive.
    pub fn from_label(label: &str) -> Option<Self> {
        let (code, name) = label.split_once(" - ")?;
        Some(Self {
            code: code.to_string(),
            name: name.to_string(),
        })
    }

    fn matches(&self, paper: &PaperRecord) -> bool {
        paper.course_code == self.code && paper.course_name == self.name
    }
}

/// One filter request against a snapshot.
#[derive(Debug, Clone, Default)]
pub struct Query {
    /// Free-text query, matched against course code OR name
    pub text: String,

    /// Category filter
    pub category: Category,

    /// Pinned course; when set, `text` is ignored
    pub selection: Option<CourseSelection>,
}

impl Query {
    /// True when nothing narrows the view, i.e. the idle "latest papers"
    /// display applies.
    fn is_idle(&self) -> bool {
        self.text.is_empty() && self.category == Category::All && self.selection.is_none()
    }
}

/// Filtering and autocomplete over catalog snapshots.
pub struct QueryEngine {
    latest_limit: Option<usize>,
    suggestion_limit: usize,
    observer: Arc<dyn Observer>,
}

impl QueryEngine {
    pub fn new(display: &DisplayConfig) -> Self {
        Self::with_observer(display, null_observer())
    }

    pub fn with_observer(display: &DisplayConfig, observer: Arc<dyn Observer>) -> Self {
        Self {
            latest_limit: display.latest_limit,
            suggestion_limit: display.suggestion_limit,
            observer,
        }
    }

    /// Produce the filtered view for a query.
    ///
    /// With no active query, selection, or category filter, the result is
    /// capped at the configured latest-papers limit; any active filter
    /// returns the full filtered set in snapshot order.
    pub fn filter<'a>(&self, snapshot: &'a CatalogSnapshot, query: &Query) -> Vec<&'a PaperRecord> {
        let mut results: Vec<&PaperRecord> = if let Some(selection) = &query.selection {
            snapshot
                .papers
                .iter()
                .filter(|p| selection.matches(p) && query.category.matches(p))
                .collect()
        } else {
            let needle = query.text.to_lowercase();
            snapshot
                .papers
                .iter()
                .filter(|p| {
                    query.category.matches(p)
                        && (needle.is_empty()
                            || p.course_code.to_lowercase().contains(&needle)
                            || p.course_name.to_lowercase().contains(&needle))
                })
                .collect()
        };

        if query.is_idle() {
            if let Some(limit) = self.latest_limit {
                results.truncate(limit);
            }
        }

        if !query.text.is_empty() && query.selection.is_none() {
            self.observer.on_event(&Event::Search {
                term: query.text.clone(),
                results: results.len(),
            });
        }

        results
    }

    /// Autocomplete suggestions for a partial query.
    ///
    /// Case-insensitive substring match against the snapshot's precomputed
    /// course options, capped at the configured limit. An empty query
    /// yields no suggestions.
    pub fn suggest<'a>(&self, snapshot: &'a CatalogSnapshot, text: &str) -> Vec<&'a str> {
        if text.is_empty() {
            return Vec::new();
        }
        let needle = text.to_lowercase();
        snapshot
            .course_options
            .iter()
            .filter(|option| option.to_lowercase().contains(&needle))
            .take(self.suggestion_limit)
            .map(String::as_str)
            .collect()
    }
}
