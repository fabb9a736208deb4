//! HTTP error response conversion
//!
//! Wraps `AppError` so handlers can return
//! `Result<impl IntoResponse, HttpAppError>` and have every error render
//! consistently (status, JSON body, logging) via its `ErrorMetadata`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use quillpress_core::{AppError, ErrorMetadata, LogLevel};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    /// Machine-readable error code for programmatic handling
    pub code: String,
}

/// Wrapper type for AppError to implement IntoResponse.
/// Necessary because of Rust's orphan rules: IntoResponse (external trait)
/// cannot be implemented for AppError (type from quillpress-core).
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let err = self.0;

        match err.log_level() {
            LogLevel::Debug => tracing::debug!(error = %err, "Request failed"),
            LogLevel::Warn => tracing::warn!(error = %err, "Request failed"),
            LogLevel::Error => tracing::error!(error = %err, "Request failed"),
        }

        let status = StatusCode::from_u16(err.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorResponse {
            error: err.client_message(),
            code: err.error_code().to_string(),
        };

        (status, Json(body)).into_response()
    }
}
