//! Axum route handlers for the Profile API.

use axum::{
    extract::{multipart::MultipartError, rejection::JsonRejection, Multipart, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::pipeline::profile::Profile;
use crate::pipeline::{truncate_chars, MAX_CV_CHARS};
use crate::profile::validation::validate_manual_data;
use crate::state::AppState;

/// Multipart field the CV file must arrive under.
pub const CV_FILE_FIELD: &str = "cvFile";

const ALLOWED_MIME_TYPES: [&str; 3] = ["application/pdf", "text/plain", "application/msword"];

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadCvResponse {
    pub success: bool,
    pub cv_text: String,
    pub file_name: String,
    pub file_size: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractProfileResponse {
    pub success: bool,
    pub profile: Profile,
    pub extracted_at: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualDataResponse {
    pub success: bool,
    pub message: &'static str,
    pub data: Value,
    pub received_at: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/upload-cv
///
/// Accepts a multipart CV upload, pulls the plain text out of it, and
/// returns the text for the client to review before extraction.
pub async fn handle_upload_cv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadCvResponse>, AppError> {
    let mut upload: Option<(String, String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| multipart_error(err, state.config.max_file_size_kb))?
    {
        // Plain text fields may ride along with the form; only files count.
        let Some(file_name) = field.file_name().map(str::to_owned) else {
            continue;
        };

        if field.name() != Some(CV_FILE_FIELD) {
            return Err(AppError::UnexpectedFileField);
        }

        let content_type = field.content_type().unwrap_or_default().to_owned();
        if !ALLOWED_MIME_TYPES.contains(&content_type.as_str()) {
            return Err(AppError::InvalidFileType);
        }

        let data = field
            .bytes()
            .await
            .map_err(|err| multipart_error(err, state.config.max_file_size_kb))?;
        if data.len() > state.config.max_file_size_bytes() {
            return Err(AppError::FileTooLarge {
                max_kb: state.config.max_file_size_kb,
            });
        }

        upload = Some((file_name, content_type, data));
    }

    let (file_name, content_type, data) =
        upload.ok_or_else(|| AppError::BadRequest("CV file is required".to_string()))?;

    info!("CV uploaded: {file_name}, size: {} bytes", data.len());

    let text = extract_cv_text(&content_type, &data)?;
    let cv_text = truncate_chars(&text, MAX_CV_CHARS).to_string();

    info!(
        "CV text extracted, length: {} characters",
        cv_text.chars().count()
    );

    Ok(Json(UploadCvResponse {
        success: true,
        cv_text,
        file_name,
        file_size: data.len(),
    }))
}

/// POST /api/extract-profile
///
/// Runs LLM profile extraction over the supplied CV text.
pub async fn handle_extract_profile(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ExtractProfileResponse>, AppError> {
    let Json(body) =
        payload.map_err(|_| AppError::BadRequest("Invalid JSON format".to_string()))?;

    let cv_text = body
        .get("cvText")
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Valid CV text is required".to_string()))?;

    info!(
        "Starting profile extraction for text length: {}",
        cv_text.chars().count()
    );

    let profile = state
        .pipeline
        .extract_profile(cv_text)
        .await
        .map_err(|err| AppError::pipeline("Failed to extract profile data", err))?;

    Ok(Json(ExtractProfileResponse {
        success: true,
        profile,
        extracted_at: Utc::now().to_rfc3339(),
    }))
}

/// POST /api/submit-manual-data
///
/// Accepts a manually entered profile, validates bounds, and echoes the
/// validated data back. Nothing is persisted server-side.
pub async fn handle_submit_manual_data(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ManualDataResponse>, AppError> {
    let Json(body) =
        payload.map_err(|_| AppError::BadRequest("Invalid JSON format".to_string()))?;

    let data = validate_manual_data(&body).map_err(|message| AppError::Validation {
        error: "Invalid manual data",
        details: vec![message],
    })?;

    info!("Manual data received and validated");

    Ok(Json(ManualDataResponse {
        success: true,
        message: "Manual data received successfully",
        data,
        received_at: Utc::now().to_rfc3339(),
    }))
}

/// Multipart reads that fail because the request body hit the route's
/// size limit get the same "File too large" response as an oversized
/// file caught by the in-handler check; everything else is a malformed
/// form.
fn multipart_error(err: MultipartError, max_kb: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::FileTooLarge { max_kb }
    } else {
        AppError::BadRequest(format!("Invalid multipart form data: {err}"))
    }
}

fn extract_cv_text(content_type: &str, data: &[u8]) -> Result<String, AppError> {
    match content_type {
        "application/pdf" => pdf_extract::extract_text_from_mem(data)
            .map_err(|err| AppError::CvProcessing(format!("PDF parsing failed: {err}"))),
        // TXT and DOC uploads are read as UTF-8 with lossy replacement.
        _ => Ok(String::from_utf8_lossy(data).into_owned()),
    }
}
