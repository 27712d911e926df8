//! Utility functions and helpers.

pub mod url;

use std::sync::OnceLock;

use regex::Regex;

/// Replace filesystem-hostile characters in an uploaded filename.
///
/// Keeps ASCII alphanumerics, dots, dashes, and underscores; everything else
/// becomes `_`. Leading dots are stripped so a stored name can never be
/// hidden or traverse upward.
pub fn sanitize_filename(name: &str) -> String {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| Regex::new(r"[^A-Za-z0-9._-]+").unwrap());

    let cleaned = pattern.replace_all(name, "_");
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_safe_names() {
        assert_eq!(
            sanitize_filename("CSE1001_IntroToProgramming_CAT1_Winter2023_SlotA1.pdf"),
            "CSE1001_IntroToProgramming_CAT1_Winter2023_SlotA1.pdf"
        );
    }

    #[test]
    fn test_sanitize_replaces_hostile_characters() {
        assert_eq!(sanitize_filename("my exam (1).pdf"), "my_exam_1_.pdf");
        assert_eq!(sanitize_filename("../../etc/passwd"), "_.._etc_passwd");
    }

    #[test]
    fn test_sanitize_empty_falls_back() {
        assert_eq!(sanitize_filename(""), "upload");
        assert_eq!(sanitize_filename("..."), "upload");
    }
}
