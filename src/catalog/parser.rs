// src/catalog/parser.rs

//! Structured filename parsing.
//!
//! Stored papers follow the naming convention
//! `{courseCode}_{CourseName}_{examType}_{semester}_Slot{slot}.pdf`.
//! Parsing is strict: a filename that does not yield all five fields is
//! rejected with a reason, and the caller drops it from the catalog while
//! keeping the rejection for the operator report.

use thiserror::Error;

use crate::models::ExamType;

/// Fields derived from a well-formed filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    pub course_code: String,
    pub course_name: String,
    pub exam_type: ExamType,
    pub semester: String,
    pub slot: String,
}

/// Why a filename was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseRejection {
    #[error("expected 5 '_'-separated segments, found {0}")]
    SegmentCount(usize),

    #[error("course code segment is empty")]
    EmptyCourseCode,

    #[error("unknown exam type '{0}'")]
    UnknownExamType(String),
}

/// Parse a stored filename into its paper fields.
pub fn parse_filename(name: &str) -> Result<ParsedName, ParseRejection> {
    let stem = strip_pdf_extension(name);

    let segments: Vec<&str> = stem.split('_').collect();
    if segments.len() != 5 {
        return Err(ParseRejection::SegmentCount(segments.len()));
    }

    let course_code = segments[0].trim();
    if course_code.is_empty() {
        return Err(ParseRejection::EmptyCourseCode);
    }

    let exam_type = ExamType::parse_label(segments[2])
        .ok_or_else(|| ParseRejection::UnknownExamType(segments[2].to_string()))?;

    Ok(ParsedName {
        course_code: course_code.to_string(),
        course_name: humanize_course_name(segments[1]),
        exam_type,
        semester: segments[3].to_string(),
        slot: strip_slot_prefix(segments[4]),
    })
}

/// Strip a trailing `.pdf`, tolerating an accidental `.pdf.pdf`.
fn strip_pdf_extension(name: &str) -> &str {
    let mut stem = name;
    for _ in 0..2 {
        match stem.len().checked_sub(4) {
            Some(idx) if stem.is_char_boundary(idx) && stem[idx..].eq_ignore_ascii_case(".pdf") => {
                stem = &stem[..idx];
            }
            _ => break,
        }
    }
    stem
}

/// Insert a space before every capital letter not already preceded by one.
///
/// `IntroToProgramming` becomes `Intro To Programming`. Re-applying to
/// already-spaced output is a no-op; consecutive capitals (`ABTest`) are
/// split one-way (`A B Test`) and never rejoined.
fn humanize_course_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + raw.len() / 4);
    let mut prev: Option<char> = None;
    for ch in raw.chars() {
        if ch.is_ascii_uppercase() {
            if let Some(p) = prev {
                if p != ' ' {
                    out.push(' ');
                }
            }
        }
        out.push(ch);
        prev = Some(ch);
    }
    out.trim().to_string()
}

/// Remove a leading `Slot` prefix, case-insensitively.
fn strip_slot_prefix(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.len() >= 4 && trimmed[..4].eq_ignore_ascii_case("slot") {
        trimmed[4..].trim().to_string()
    } else {
        trimmed.to_string()
    }
}
