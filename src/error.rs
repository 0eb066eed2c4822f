use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::models::application::InputError;
use crate::services::scraper::ScrapeError;
use crate::services::storage::StorageError;

/// Application-level error type.
/// Implements `IntoResponse` so handlers can return `Result<T, AppError>`.
/// Every variant renders as `{"detail": "..."}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Failed to scrape job information: {0}")]
    Scrape(#[from] ScrapeError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Request body rejected while streaming; keeps the status axum chose.
    #[error("{detail}")]
    Rejected { status: StatusCode, detail: String },
}

impl AppError {
    pub fn application_not_found() -> Self {
        AppError::NotFound("Application not found".to_string())
    }
}

impl From<InputError> for AppError {
    fn from(err: InputError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::Rejected {
            status: err.status(),
            detail: err.body_text(),
        }
    }
}

impl From<garde::Report> for AppError {
    fn from(report: garde::Report) -> Self {
        AppError::Validation(report.to_string().trim().to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Storage(e) => {
                tracing::error!(error = %e, "storage failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Scrape(e) => {
                tracing::warn!(error = %e, "scrape failure");
                StatusCode::BAD_GATEWAY
            }
            AppError::Database(e) => {
                tracing::error!(error = %e, "database failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Rejected { status, detail } => {
                tracing::warn!(%status, detail = %detail, "request body rejected");
                *status
            }
        };

        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
