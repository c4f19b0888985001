use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::llm_client::{ErrorCode, LlmError};
use crate::questions::store::StoreError;

/// A single field-level validation problem reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Validation failed")]
    InvalidFields(Vec<FieldError>),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Generation error: {0}")]
    Generation(#[from] LlmError),

    #[error("Store error: {0}")]
    Store(StoreError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => {
                AppError::NotFound("Question not found or access denied".to_string())
            }
            other => AppError::Store(other),
        }
    }
}

impl AppError {
    /// Maps a rejected JSON body. A well-formed body with a missing or mistyped
    /// field reports that field; anything else is unreadable JSON.
    pub fn from_json_rejection(rejection: JsonRejection, field: &str, message: &str) -> Self {
        match rejection {
            JsonRejection::JsonDataError(_) => {
                AppError::InvalidFields(vec![FieldError::new(field, message)])
            }
            _ => AppError::Validation("Invalid JSON in request body".to_string()),
        }
    }

    fn generation_parts(e: &LlmError) -> (StatusCode, &'static str, &'static str) {
        match e.code() {
            ErrorCode::ApiKeyInvalid => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "SERVICE_UNAVAILABLE",
                "Service temporarily unavailable. Please try again later.",
            ),
            ErrorCode::RateLimit => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMIT",
                "Too many requests. Please try again shortly.",
            ),
            ErrorCode::Timeout => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "TIMEOUT",
                "The request timed out. Please try again shortly.",
            ),
            ErrorCode::InvalidResponse => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "INVALID_RESPONSE",
                "Unable to generate quality questions for this job posting. \
                 Please try with a different posting.",
            ),
            ErrorCode::ServerError | ErrorCode::UnknownError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "GENERATION_FAILED",
                "Failed to generate questions. Please try again.",
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut fields: Option<&[FieldError]> = None;

        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::InvalidFields(errors) => {
                fields = Some(errors);
                (
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    "Validation failed".to_string(),
                )
            }
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
            ),
            AppError::Generation(e) => {
                // Log the classified code and cause; the client only sees the framing.
                tracing::error!("Question generation failed [{}]: {e}", e.code());
                let (status, code, message) = Self::generation_parts(e);
                (status, code, message.to_string())
            }
            AppError::Store(e) => {
                tracing::error!("Store error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let Some(fields) = fields {
            error["fields"] = json!(fields);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}
