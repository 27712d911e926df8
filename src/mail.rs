// src/mail.rs

//! Mail relay.
//!
//! Contact-form submissions and upload notices are delivered through the
//! [`Mailer`] trait. The SMTP implementation authenticates as the configured
//! account; a submitter's address goes into Reply-To rather than From, so
//! the relay never forges sender identity. With no mail configuration the
//! no-op mailer is used and delivery is skipped.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::MailConfig;

/// A contact-form submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub full_name: String,
    pub email: String,
    pub mobile_number: String,
    pub subject: String,
    pub message: String,
}

impl ContactMessage {
    /// Field-level validation errors; empty when the submission is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let required = [
            ("fullName", &self.full_name),
            ("email", &self.email),
            ("mobileNumber", &self.mobile_number),
            ("subject", &self.subject),
            ("message", &self.message),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                errors.push(format!("{field} is required"));
            }
        }
        if !self.email.trim().is_empty() && !self.email.contains('@') {
            errors.push("email is not an address".to_string());
        }
        errors
    }

    /// Subject line for the relayed message.
    pub fn subject_line(&self) -> String {
        format!("New message from {}: {}", self.full_name, self.subject)
    }

    /// Plain-text body for the relayed message.
    pub fn body(&self) -> String {
        format!(
            "Full Name: {}\nEmail: {}\nMobile: {}\nSubject: {}\nMessage: {}",
            self.full_name, self.email, self.mobile_number, self.subject, self.message
        )
    }
}

/// Notification about an accepted upload.
#[derive(Debug, Clone)]
pub struct UploadNotice {
    pub original_name: String,
    pub stored_name: String,
    pub size_bytes: usize,
    pub uploaded_at: DateTime<Utc>,
}

impl UploadNotice {
    /// Plain-text body for the notification message.
    pub fn body(&self) -> String {
        format!(
            "A new file has been uploaded:\nFilename: {}\nStored as: {}\nSize: {} bytes\nUploaded at: {}",
            self.original_name,
            self.stored_name,
            self.size_bytes,
            self.uploaded_at.to_rfc3339()
        )
    }
}

/// Mail delivery interface.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Relay a contact-form submission.
    async fn send_contact(&self, message: &ContactMessage) -> Result<()>;

    /// Deliver an upload notification.
    async fn send_upload_notice(&self, notice: &UploadNotice) -> Result<()>;
}

/// Mailer that skips delivery entirely.
#[derive(Debug, Default)]
pub struct NullMailer;

#[async_trait]
impl Mailer for NullMailer {
    async fn send_contact(&self, message: &ContactMessage) -> Result<()> {
        log::debug!("mail disabled, dropping contact message: {}", message.subject_line());
        Ok(())
    }

    async fn send_upload_notice(&self, notice: &UploadNotice) -> Result<()> {
        log::debug!("mail disabled, dropping upload notice for {}", notice.stored_name);
        Ok(())
    }
}

/// SMTP mailer.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(AppError::mail)?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        let from: Mailbox = config
            .username
            .parse()
            .map_err(|e| AppError::config(format!("mail.username: {e}")))?;
        let to: Mailbox = config
            .recipient
            .parse()
            .map_err(|e| AppError::config(format!("mail.recipient: {e}")))?;

        Ok(Self {
            transport,
            from,
            to,
        })
    }

    async fn send(&self, subject: String, body: String, reply_to: Option<Mailbox>) -> Result<()> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject);
        if let Some(reply_to) = reply_to {
            builder = builder.reply_to(reply_to);
        }
        let email = builder.body(body).map_err(AppError::mail)?;

        self.transport.send(email).await.map_err(AppError::mail)?;
        Ok(())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_contact(&self, message: &ContactMessage) -> Result<()> {
        let reply_to = message.email.trim().parse::<Mailbox>().ok();
        self.send(message.subject_line(), message.body(), reply_to)
            .await
    }

    async fn send_upload_notice(&self, notice: &UploadNotice) -> Result<()> {
        self.send(
            "New File Upload Notification".to_string(),
            notice.body(),
            None,
        )
        .await
    }
}

/// Build the mailer matching the configuration.
pub fn build_mailer(config: Option<&MailConfig>) -> Result<Arc<dyn Mailer>> {
    match config {
        Some(mail) => Ok(Arc::new(SmtpMailer::new(mail)?)),
        None => {
            log::warn!("no [mail] configuration, notifications disabled");
            Ok(Arc::new(NullMailer))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_message() -> ContactMessage {
        ContactMessage {
            full_name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            mobile_number: "9999999999".to_string(),
            subject: "Missing paper".to_string(),
            message: "CSE1001 FAT for Fall 2024 is missing.".to_string(),
        }
    }

    #[test]
    fn test_valid_message_passes() {
        assert!(valid_message().validate().is_empty());
    }

    #[test]
    fn test_missing_fields_are_enumerated() {
        let message = ContactMessage {
            full_name: String::new(),
            email: String::new(),
            mobile_number: "  ".to_string(),
            subject: "s".to_string(),
            message: "m".to_string(),
        };
        let errors = message.validate();
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| e.starts_with("fullName")));
        assert!(errors.iter().any(|e| e.starts_with("mobileNumber")));
    }

    #[test]
    fn test_bad_email_is_rejected() {
        let mut message = valid_message();
        message.email = "not-an-address".to_string();
        let errors = message.validate();
        assert_eq!(errors, vec!["email is not an address".to_string()]);
    }

    #[test]
    fn test_contact_body_layout() {
        let body = valid_message().body();
        assert!(body.starts_with("Full Name: Ada Lovelace\n"));
        assert!(body.contains("\nMobile: 9999999999\n"));
        assert!(body.ends_with("Message: CSE1001 FAT for Fall 2024 is missing."));
    }

    #[test]
    fn test_upload_notice_body() {
        let notice = UploadNotice {
            original_name: "exam.pdf".to_string(),
            stored_name: "1700000000000-exam.pdf".to_string(),
            size_bytes: 1024,
            uploaded_at: "2024-01-15T10:00:00Z".parse().unwrap(),
        };
        let body = notice.body();
        assert!(body.contains("Filename: exam.pdf"));
        assert!(body.contains("Stored as: 1700000000000-exam.pdf"));
        assert!(body.contains("Size: 1024 bytes"));
    }

    #[tokio::test]
    async fn test_null_mailer_accepts_everything() {
        let mailer = NullMailer;
        assert!(mailer.send_contact(&valid_message()).await.is_ok());
    }
}
