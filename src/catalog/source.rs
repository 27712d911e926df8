// src/catalog/source.rs

//! Catalog source service.
//!
//! Fetches the raw list of stored paper files from the file-listing API,
//! following the page-token chain until every page is materialized.

use std::time::Duration;

use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::error::{AppError, Result};
use crate::models::DriveConfig;

/// One raw listing entry, prior to filename parsing.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub web_view_link: String,
    #[serde(default)]
    pub modified_time: String,
}

/// One page of the listing response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileListPage {
    #[serde(default)]
    files: Vec<FileEntry>,
    next_page_token: Option<String>,
}

/// Read-only client for the file-listing API.
pub struct DriveSource {
    config: DriveConfig,
    client: reqwest::Client,
}

impl DriveSource {
    /// Create a new source with the given (injected) configuration.
    pub fn new(config: DriveConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, client })
    }

    /// Fetch every listing entry in the configured folder.
    ///
    /// Follows `nextPageToken` until absent and returns all pages as one
    /// list. Checks the cancellation token between page requests and
    /// returns [`AppError::Cancelled`] once it fires.
    pub async fn fetch_all(&self, cancel: &CancellationToken) -> Result<Vec<FileEntry>> {
        let mut entries = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            if cancel.is_cancelled() {
                return Err(AppError::Cancelled);
            }

            let page = self.fetch_page(page_token.as_deref()).await?;
            pages += 1;
            entries.extend(page.files);

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        log::debug!("fetched {} listing entries over {} pages", entries.len(), pages);
        Ok(entries)
    }

    async fn fetch_page(&self, page_token: Option<&str>) -> Result<FileListPage> {
        let query = format!(
            "'{}' in parents and mimeType='application/pdf'",
            self.config.folder_id
        );
        let page_size = self.config.page_size.to_string();

        let mut request = self
            .client
            .get(format!("{}/files", self.config.base_url.trim_end_matches('/')))
            .query(&[
                ("q", query.as_str()),
                ("key", self.config.api_key.as_str()),
                (
                    "fields",
                    "files(id,name,webViewLink,modifiedTime),nextPageToken",
                ),
                ("pageSize", page_size.as_str()),
            ]);
        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(AppError::Listing {
                status: response.status().as_u16(),
            });
        }

        Ok(response.json().await?)
    }
}
