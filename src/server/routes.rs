// src/server/routes.rs

//! Request handlers for the backend service.

use std::sync::Arc;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::catalog::{Category, CourseSelection, Query as CatalogQuery};
use crate::events::Event;
use crate::mail::{ContactMessage, UploadNotice};
use crate::models::PaperRecord;
use crate::server::state::AppState;
use crate::utils::{sanitize_filename, url};

/// Handler-level error mapped onto the wire formats the endpoints expose.
#[derive(Debug)]
pub enum ApiError {
    /// Upload/request validation failure: `{message, errors}`
    BadRequest { message: String, errors: Vec<String> },

    /// Contact validation failure: `{success: false, errors}`
    ContactInvalid { errors: Vec<String> },

    /// Unknown resource: `{message}`
    NotFound { message: String },

    /// Mail transport failure: `{success: false, message}`
    Mail { message: String },

    /// Anything else: `{message}`
    Internal { message: String },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest { message, errors } => (
                StatusCode::BAD_REQUEST,
                Json(json!({"message": message, "errors": errors})),
            )
                .into_response(),
            ApiError::ContactInvalid { errors } => (
                StatusCode::BAD_REQUEST,
                Json(json!({"success": false, "errors": errors})),
            )
                .into_response(),
            ApiError::NotFound { message } => (
                StatusCode::NOT_FOUND,
                Json(json!({"message": message})),
            )
                .into_response(),
            ApiError::Mail { message } => (
                StatusCode::BAD_GATEWAY,
                Json(json!({"success": false, "message": message})),
            )
                .into_response(),
            ApiError::Internal { message } => {
                log::error!("internal error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"message": message})),
                )
                    .into_response()
            }
        }
    }
}

/// Liveness probe.
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "ok"}))
}

/// Query parameters accepted by the paper listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub q: Option<String>,
    pub category: Option<String>,
    pub course: Option<String>,
}

impl ListParams {
    fn is_empty(&self) -> bool {
        self.q.is_none() && self.category.is_none() && self.course.is_none()
    }
}

/// List papers, optionally filtered through the query engine.
///
/// Without parameters the full snapshot is returned (the shape the
/// original backend served); with any of `q`, `category`, or `course`
/// the filtered view is returned instead.
pub async fn list_papers(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let snapshot = state.snapshot.read().await;

    if params.is_empty() {
        return Ok(Json(json!({"files": snapshot.papers})));
    }

    let category = match params.category.as_deref() {
        Some(raw) => Category::parse(raw).ok_or_else(|| ApiError::BadRequest {
            message: "Invalid query".to_string(),
            errors: vec![format!("unknown category '{raw}'")],
        })?,
        None => Category::All,
    };
    if let Some(raw) = params.category.as_deref() {
        state.observer.on_event(&Event::Filter {
            category: raw.to_string(),
        });
    }

    let query = CatalogQuery {
        text: params.q.unwrap_or_default(),
        category,
        selection: params.course.as_deref().and_then(CourseSelection::from_label),
    };

    let files: Vec<PaperRecord> = state
        .engine
        .filter(&snapshot, &query)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(json!({"files": files})))
}

/// Detail payload for a single paper.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperDetail {
    #[serde(flatten)]
    pub paper: PaperRecord,
    pub download_url: String,
    pub preview_url: String,
}

/// Fetch one paper by id.
pub async fn get_paper(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PaperDetail>, ApiError> {
    let snapshot = state.snapshot.read().await;
    let paper = snapshot.find(&id).ok_or_else(|| ApiError::NotFound {
        message: "Paper not found".to_string(),
    })?;

    state.observer.on_event(&Event::PaperView {
        id: paper.id.clone(),
        course_code: paper.course_code.clone(),
    });

    Ok(Json(PaperDetail {
        download_url: url::download_url(&paper.id),
        preview_url: url::preview_url(&paper.id),
        paper: paper.clone(),
    }))
}

/// Accept a single PDF through the `file` multipart field.
///
/// The file is validated, written to the uploads directory, and a
/// notification email is attempted. Mail failure is logged and does not
/// fail the upload.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut file: Option<(String, Option<String>, axum::body::Bytes)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| ApiError::BadRequest {
        message: "Malformed multipart body".to_string(),
        errors: vec![e.to_string()],
    })? {
        if field.name() != Some("file") {
            continue;
        }
        let original_name = field.file_name().unwrap_or("upload.pdf").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| ApiError::BadRequest {
            message: "Failed to read uploaded file".to_string(),
            errors: vec![e.to_string()],
        })?;
        file = Some((original_name, content_type, bytes));
        break;
    }

    let Some((original_name, content_type, bytes)) = file else {
        return Err(ApiError::BadRequest {
            message: "No file uploaded".to_string(),
            errors: vec!["multipart field 'file' is required".to_string()],
        });
    };

    let mut errors = Vec::new();
    if !original_name.to_lowercase().ends_with(".pdf") {
        errors.push("only PDF files are accepted".to_string());
    }
    if let Some(content_type) = &content_type {
        if content_type != "application/pdf" {
            errors.push(format!("unexpected content type '{content_type}'"));
        }
    }
    let max = state.config.server.max_upload_bytes;
    if bytes.len() > max {
        errors.push(format!("file exceeds the maximum size of {max} bytes"));
    }
    if bytes.is_empty() {
        errors.push("file is empty".to_string());
    }
    if !errors.is_empty() {
        state.observer.on_event(&Event::Upload {
            filename: original_name,
            success: false,
        });
        return Err(ApiError::BadRequest {
            message: "Upload validation failed".to_string(),
            errors,
        });
    }

    let uploaded_at = Utc::now();
    let stored_name = format!(
        "{}-{}",
        uploaded_at.timestamp_millis(),
        sanitize_filename(&original_name)
    );
    let dest = std::path::Path::new(&state.config.server.uploads_dir).join(&stored_name);
    tokio::fs::write(&dest, &bytes)
        .await
        .map_err(|e| ApiError::Internal {
            message: format!("failed to store upload: {e}"),
        })?;

    let notice = UploadNotice {
        original_name: original_name.clone(),
        stored_name: stored_name.clone(),
        size_bytes: bytes.len(),
        uploaded_at,
    };
    // Notification is best-effort; the stored upload stands either way.
    if let Err(e) = state.mailer.send_upload_notice(&notice).await {
        log::warn!("upload notification failed: {}", e);
    }

    state.observer.on_event(&Event::Upload {
        filename: stored_name.clone(),
        success: true,
    });

    Ok(Json(json!({
        "success": true,
        "message": "File uploaded successfully",
        "filename": stored_name,
    })))
}

/// Relay a contact-form submission.
pub async fn send_contact(
    State(state): State<Arc<AppState>>,
    Json(message): Json<ContactMessage>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let errors = message.validate();
    if !errors.is_empty() {
        return Err(ApiError::ContactInvalid { errors });
    }

    state
        .mailer
        .send_contact(&message)
        .await
        .map_err(|e| ApiError::Mail {
            message: format!("Error sending email: {e}"),
        })?;

    state.observer.on_event(&Event::ContactSent {
        subject: message.subject.clone(),
    });

    Ok(Json(json!({
        "success": true,
        "message": "Message sent successfully!",
    })))
}
