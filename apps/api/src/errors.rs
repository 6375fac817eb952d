#![allow(dead_code)]

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::resume::session::SessionError;
use crate::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Store(StoreError::NotFound(usn)) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("No student with USN {usn}"),
            ),
            AppError::Store(StoreError::DuplicateUsn(usn)) => (
                StatusCode::CONFLICT,
                "USN_EXISTS",
                format!("USN {usn} already exists"),
            ),
            AppError::Store(StoreError::Unavailable(msg)) => {
                tracing::error!("Store error: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "STORE_UNAVAILABLE",
                    "The student store is currently unavailable".to_string(),
                )
            }
            AppError::Session(SessionError::NoStudentSelected) => (
                StatusCode::BAD_REQUEST,
                "NO_STUDENT_SELECTED",
                "Select a student before generating a resume".to_string(),
            ),
            AppError::Session(SessionError::GenerationInFlight) => (
                StatusCode::CONFLICT,
                "GENERATION_IN_FLIGHT",
                "A resume generation is already in progress for this session".to_string(),
            ),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
