#![allow(dead_code)]

use std::sync::OnceLock;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::pipeline::PipelineError;

/// Whether error responses may carry diagnostic detail. Set once at startup
/// from config; defaults to off so accidental ordering never leaks detail.
static DEV_MODE: OnceLock<bool> = OnceLock::new();

pub fn set_dev_mode(enabled: bool) {
    let _ = DEV_MODE.set(enabled);
}

fn dev_mode() -> bool {
    DEV_MODE.get().copied().unwrap_or(false)
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation failed: {error}")]
    Validation {
        error: &'static str,
        details: Vec<String>,
    },

    #[error("File too large")]
    FileTooLarge { max_kb: usize },

    #[error("Invalid file type. Only PDF, TXT, and DOC files are allowed.")]
    InvalidFileType,

    #[error("Unexpected file field")]
    UnexpectedFileField,

    #[error("Failed to process CV file: {0}")]
    CvProcessing(String),

    /// Oracle pipeline failure. `public` is the only text the caller sees;
    /// the typed source goes to the log, and to the body in development.
    #[error("{public}")]
    Pipeline {
        public: &'static str,
        source: PipelineError,
    },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn pipeline(public: &'static str, source: PipelineError) -> Self {
        AppError::Pipeline { public, source }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::Validation { error, details } => (
                StatusCode::BAD_REQUEST,
                json!({ "error": error, "details": details }),
            ),
            AppError::FileTooLarge { max_kb } => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "File too large", "maxSize": format!("{max_kb}KB") }),
            ),
            AppError::InvalidFileType => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Invalid file type. Only PDF, TXT, and DOC files are allowed." }),
            ),
            AppError::UnexpectedFileField => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Unexpected file field", "expected": "cvFile" }),
            ),
            AppError::CvProcessing(detail) => {
                tracing::error!("CV processing error: {detail}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Failed to process CV file" }),
                )
            }
            AppError::Pipeline { public, source } => {
                tracing::error!("{public}: {source:?}");
                let mut body = json!({ "error": public });
                if dev_mode() {
                    body["details"] = json!(source.to_string());
                }
                (StatusCode::INTERNAL_SERVER_ERROR, body)
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
