//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Environment variable overriding `drive.api_key`.
pub const ENV_API_KEY: &str = "PAPERBANK_API_KEY";

/// Environment variable overriding `mail.password`.
pub const ENV_SMTP_PASSWORD: &str = "PAPERBANK_SMTP_PASSWORD";

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// File-listing API settings
    #[serde(default)]
    pub drive: DriveConfig,

    /// Result display policy
    #[serde(default)]
    pub display: DisplayConfig,

    /// Backend service settings
    #[serde(default)]
    pub server: ServerConfig,

    /// SMTP relay settings; absent means mail is disabled
    #[serde(default)]
    pub mail: Option<MailConfig>,
}

impl Config {
    /// Load configuration from a TOML file, applying environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            let mut config = Self::default();
            config.apply_env_overrides();
            config
        })
    }

    /// Pull secrets from the environment so they never have to live in the
    /// config file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(ENV_API_KEY) {
            self.drive.api_key = key;
        }
        if let Ok(password) = std::env::var(ENV_SMTP_PASSWORD) {
            if let Some(mail) = self.mail.as_mut() {
                mail.password = password;
            }
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.drive.user_agent.trim().is_empty() {
            return Err(AppError::validation("drive.user_agent is empty"));
        }
        if self.drive.timeout_secs == 0 {
            return Err(AppError::validation("drive.timeout_secs must be > 0"));
        }
        if self.drive.page_size == 0 {
            return Err(AppError::validation("drive.page_size must be > 0"));
        }
        if self.drive.api_key.trim().is_empty() {
            return Err(AppError::validation(format!(
                "drive.api_key is empty (set it in the config file or via {ENV_API_KEY})"
            )));
        }
        if self.drive.folder_id.trim().is_empty() {
            return Err(AppError::validation("drive.folder_id is empty"));
        }
        if self.server.max_upload_bytes == 0 {
            return Err(AppError::validation("server.max_upload_bytes must be > 0"));
        }
        if self.display.suggestion_limit == 0 {
            return Err(AppError::validation("display.suggestion_limit must be > 0"));
        }
        if let Some(mail) = &self.mail {
            if mail.smtp_host.trim().is_empty() {
                return Err(AppError::validation("mail.smtp_host is empty"));
            }
            if mail.username.trim().is_empty() {
                return Err(AppError::validation("mail.username is empty"));
            }
            if !mail.recipient.contains('@') {
                return Err(AppError::validation("mail.recipient is not an address"));
            }
        }
        Ok(())
    }
}

/// File-listing API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveConfig {
    /// Base URL of the listing API
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// API key sent with every listing request
    #[serde(default)]
    pub api_key: String,

    /// Folder the catalog is scoped to
    #[serde(default)]
    pub folder_id: String,

    /// Page size requested from the listing API
    #[serde(default = "defaults::page_size")]
    pub page_size: u32,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            api_key: String::new(),
            folder_id: String::new(),
            page_size: defaults::page_size(),
            timeout_secs: defaults::timeout(),
            user_agent: defaults::user_agent(),
        }
    }
}

/// Result display policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// How many records the idle (no query, no filter) view shows.
    /// `None` means unbounded.
    #[serde(default = "defaults::latest_limit")]
    pub latest_limit: Option<usize>,

    /// Maximum number of autocomplete suggestions
    #[serde(default = "defaults::suggestion_limit")]
    pub suggestion_limit: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            latest_limit: defaults::latest_limit(),
            suggestion_limit: defaults::suggestion_limit(),
        }
    }
}

/// Backend service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "defaults::host")]
    pub host: String,

    /// Bind port
    #[serde(default = "defaults::port")]
    pub port: u16,

    /// Directory uploaded files are stored in
    #[serde(default = "defaults::uploads_dir")]
    pub uploads_dir: String,

    /// Maximum accepted upload size in bytes
    #[serde(default = "defaults::max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Directory the snapshot cache is written to
    #[serde(default = "defaults::snapshot_dir")]
    pub snapshot_dir: String,

    /// How often the served snapshot is refreshed from the listing API
    #[serde(default = "defaults::refresh_interval")]
    pub refresh_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::host(),
            port: defaults::port(),
            uploads_dir: defaults::uploads_dir(),
            max_upload_bytes: defaults::max_upload_bytes(),
            snapshot_dir: defaults::snapshot_dir(),
            refresh_interval_secs: defaults::refresh_interval(),
        }
    }
}

/// SMTP relay settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// SMTP server hostname
    pub smtp_host: String,

    /// SMTP submission port
    #[serde(default = "defaults::smtp_port")]
    pub smtp_port: u16,

    /// SMTP username; also the From address
    pub username: String,

    /// SMTP password (prefer the environment override)
    #[serde(default)]
    pub password: String,

    /// Address contact messages and upload notices are delivered to
    pub recipient: String,
}

mod defaults {
    // Drive defaults
    pub fn base_url() -> String {
        "https://www.googleapis.com/drive/v3".into()
    }
    pub fn page_size() -> u32 {
        100
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; paperbank/1.0)".into()
    }

    // Display defaults
    pub fn latest_limit() -> Option<usize> {
        Some(9)
    }
    pub fn suggestion_limit() -> usize {
        8
    }

    // Server defaults
    pub fn host() -> String {
        "0.0.0.0".into()
    }
    pub fn port() -> u16 {
        5000
    }
    pub fn uploads_dir() -> String {
        "uploads".into()
    }
    pub fn max_upload_bytes() -> usize {
        10 * 1024 * 1024
    }
    pub fn snapshot_dir() -> String {
        "storage".into()
    }
    pub fn refresh_interval() -> u64 {
        900
    }

    // Mail defaults
    pub fn smtp_port() -> u16 {
        587
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> Config {
        let mut config = Config::default();
        config.drive.api_key = "test-key".to_string();
        config.drive.folder_id = "folder-1".to_string();
        config
    }

    #[test]
    fn validate_configured_ok() {
        assert!(configured().validate().is_ok());
    }

    #[test]
    fn validate_rejects_missing_api_key() {
        let mut config = configured();
        config.drive.api_key = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_page_size() {
        let mut config = configured();
        config.drive.page_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_mail_recipient() {
        let mut config = configured();
        config.mail = Some(MailConfig {
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 587,
            username: "papers@example.com".to_string(),
            password: String::new(),
            recipient: "not-an-address".to_string(),
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn parse_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [drive]
            api_key = "k"
            folder_id = "f"

            [display]
            latest_limit = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.drive.page_size, 100);
        assert_eq!(config.display.latest_limit, Some(4));
        assert_eq!(config.display.suggestion_limit, 8);
        assert_eq!(config.server.port, 5000);
        assert!(config.mail.is_none());
    }
}
