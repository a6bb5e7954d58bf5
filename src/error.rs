// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::generation::{GenerationError, ParseError};

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request (malformed or out-of-range input)
    BadRequest(String),

    // 400 Bad Request (a business rule blocks the action, e.g. profile incomplete)
    Precondition(String),

    // 401 Unauthorized
    AuthError(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 404, but an expected empty state: no active goal or no meal plan for today
    NoPlanYet(String),

    // 409 Conflict (e.g., duplicate email)
    Conflict(String),

    // 502 Bad Gateway: the generative model call failed
    Upstream(String),

    // 502 Bad Gateway: the model answered with JSON that violates the schema
    InvalidGeneration(String),

    // 504 Gateway Timeout
    Timeout(String),
}

impl AppError {
    /// Stable machine-readable code sent alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InternalServerError(_) => "internal",
            AppError::BadRequest(_) => "bad_request",
            AppError::Precondition(_) => "precondition_failed",
            AppError::AuthError(_) => "unauthorized",
            AppError::Forbidden(_) => "forbidden",
            AppError::NotFound(_) => "not_found",
            AppError::NoPlanYet(_) => "no_plan_yet",
            AppError::Conflict(_) => "conflict",
            AppError::Upstream(_) => "upstream_generation",
            AppError::InvalidGeneration(_) => "invalid_generation",
            AppError::Timeout(_) => "timeout",
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let (status, error_message) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Precondition(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::AuthError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::NoPlanYet(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Upstream(msg) => {
                tracing::error!("Generation failed: {}", msg);
                (StatusCode::BAD_GATEWAY, msg)
            }
            AppError::InvalidGeneration(msg) => {
                tracing::error!("Generated content rejected: {}", msg);
                (StatusCode::BAD_GATEWAY, msg)
            }
            AppError::Timeout(msg) => (StatusCode::GATEWAY_TIMEOUT, msg),
        };
        let body = Json(json!({
            "error": error_message,
            "code": code,
        }));

        (status, body).into_response()
    }
}

/// Converts `sqlx::Error` into `AppError::InternalServerError`.
/// Allows using `?` operator on database queries.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<GenerationError> for AppError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::Timeout(_) => AppError::Timeout(err.to_string()),
            other => AppError::Upstream(format!("Failed to generate content: {}", other)),
        }
    }
}

impl From<ParseError> for AppError {
    fn from(err: ParseError) -> Self {
        AppError::InvalidGeneration(err.to_string())
    }
}
