//! Paper record data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category of assessment an exam paper belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExamType {
    #[serde(rename = "CAT1")]
    Cat1,
    #[serde(rename = "CAT2")]
    Cat2,
    #[serde(rename = "FAT")]
    Fat,
}

impl ExamType {
    /// Canonical wire form (`CAT1`, `CAT2`, `FAT`).
    pub fn as_str(&self) -> &'static str {
        match self {
            ExamType::Cat1 => "CAT1",
            ExamType::Cat2 => "CAT2",
            ExamType::Fat => "FAT",
        }
    }

    /// Display label (`CAT-1`, `CAT-2`, `FAT`).
    pub fn label(&self) -> &'static str {
        match self {
            ExamType::Cat1 => "CAT-1",
            ExamType::Cat2 => "CAT-2",
            ExamType::Fat => "FAT",
        }
    }

    /// Parse a label as it appears in filenames or query strings.
    ///
    /// Accepts both spellings seen in stored files (`CAT1` and `CAT-1`),
    /// case-insensitively. Returns `None` for anything outside the closed set.
    pub fn parse_label(s: &str) -> Option<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-')
            .map(|c| c.to_ascii_uppercase())
            .collect();
        match normalized.as_str() {
            "CAT1" => Some(ExamType::Cat1),
            "CAT2" => Some(ExamType::Cat2),
            "FAT" => Some(ExamType::Fat),
            _ => None,
        }
    }
}

impl std::fmt::Display for ExamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One stored exam paper, derived from a listing entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaperRecord {
    /// Opaque identifier assigned by the storage backend
    pub id: String,

    /// Short alphanumeric course identifier (e.g., "CSE1001")
    pub course_code: String,

    /// Human-readable course title
    pub course_name: String,

    /// Assessment category
    pub exam_type: ExamType,

    /// Semester label (e.g., "Winter2023")
    pub semester: String,

    /// Exam slot code with the "Slot" prefix stripped
    pub slot: String,

    /// URL to view the file at the storage backend
    pub storage_link: String,

    /// Last-modified timestamp reported by the storage backend
    pub uploaded_at: DateTime<Utc>,
}

impl PaperRecord {
    /// The `"{code} - {name}"` label used for course autocomplete.
    pub fn course_label(&self) -> String {
        format!("{} - {}", self.course_code, self.course_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_paper() -> PaperRecord {
        PaperRecord {
            id: "abc123".to_string(),
            course_code: "CSE1001".to_string(),
            course_name: "Intro To Programming".to_string(),
            exam_type: ExamType::Cat1,
            semester: "Winter2023".to_string(),
            slot: "A1".to_string(),
            storage_link: "https://example.com/view/abc123".to_string(),
            uploaded_at: "2024-01-15T10:00:00Z".parse().unwrap(),
        }
    }

    #[test]
    fn test_course_label() {
        let paper = sample_paper();
        assert_eq!(paper.course_label(), "CSE1001 - Intro To Programming");
    }

    #[test]
    fn test_exam_type_parse_label() {
        assert_eq!(ExamType::parse_label("CAT1"), Some(ExamType::Cat1));
        assert_eq!(ExamType::parse_label("CAT-1"), Some(ExamType::Cat1));
        assert_eq!(ExamType::parse_label("cat-2"), Some(ExamType::Cat2));
        assert_eq!(ExamType::parse_label("fat"), Some(ExamType::Fat));
        assert_eq!(ExamType::parse_label("MIDTERM"), None);
        assert_eq!(ExamType::parse_label(""), None);
    }

    #[test]
    fn test_exam_type_labels() {
        assert_eq!(ExamType::Cat1.as_str(), "CAT1");
        assert_eq!(ExamType::Cat1.label(), "CAT-1");
        assert_eq!(ExamType::Fat.label(), "FAT");
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let paper = sample_paper();
        let json = serde_json::to_value(&paper).unwrap();
        assert_eq!(json["courseCode"], "CSE1001");
        assert_eq!(json["examType"], "CAT1");
        assert!(json["uploadedAt"].is_string());
    }
}
