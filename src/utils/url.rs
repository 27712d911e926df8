// src/utils/url.rs

//! Storage-backend URL helpers.

use url::Url;

/// Direct-download URL for a stored file.
pub fn download_url(id: &str) -> String {
    Url::parse_with_params(
        "https://drive.google.com/uc",
        &[("export", "download"), ("id", id)],
    )
    .map(|u| u.to_string())
    .unwrap_or_else(|_| format!("https://drive.google.com/uc?export=download&id={id}"))
}

/// Embeddable preview URL for a stored file.
pub fn preview_url(id: &str) -> String {
    format!("https://drive.google.com/file/d/{id}/preview")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_url() {
        assert_eq!(
            download_url("abc123"),
            "https://drive.google.com/uc?export=download&id=abc123"
        );
    }

    #[test]
    fn test_download_url_encodes_id() {
        assert_eq!(
            download_url("a b"),
            "https://drive.google.com/uc?export=download&id=a+b"
        );
    }

    #[test]
    fn test_preview_url() {
        assert_eq!(
            preview_url("abc123"),
            "https://drive.google.com/file/d/abc123/preview"
        );
    }
}
