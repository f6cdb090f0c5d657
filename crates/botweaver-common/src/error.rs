//! Centralized error types for BotWeaver.
//!
//! Uses `thiserror` for ergonomic error definitions and provides HTTP-friendly
//! error variants that can be directly converted to API responses.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Core application error type used across all BotWeaver services.
#[derive(Debug, thiserror::Error)]
pub enum BotWeaverError {
    // === Request errors ===
    #[error("{message}")]
    BadRequest { message: String },

    #[error("Validation failed: {}", errors.join("; "))]
    Validation { errors: Vec<String> },

    // === Resource errors ===
    #[error("{resource} not found")]
    NotFound { resource: String },

    #[error("Bot is already running")]
    AlreadyRunning { id: String },

    // === Generation errors ===
    /// Details are logged, never echoed to the client.
    #[error("Failed to generate bot")]
    Generation { detail: String },

    // === Process lifecycle errors ===
    /// `stage` is the client-facing message; `detail` stays in the server log.
    #[error("{stage}")]
    Lifecycle { stage: String, detail: String },

    // === Infrastructure errors ===
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body sent to clients.
#[derive(Serialize)]
struct ErrorResponse {
    code: u16,
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<String>>,
}

impl BotWeaverError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest { message: message.into() }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound { resource: resource.into() }
    }

    /// Map error to HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } | Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::AlreadyRunning { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Generation { .. } | Self::Lifecycle { .. } | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Error code string for programmatic handling by clients.
    pub fn error_code(&self) -> &str {
        match self {
            Self::BadRequest { .. } => "BAD_REQUEST",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::AlreadyRunning { .. } => "ALREADY_RUNNING",
            Self::Generation { .. } => "GENERATION_ERROR",
            Self::Lifecycle { .. } => "LIFECYCLE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for BotWeaverError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Don't leak internal details to clients
        let message = match &self {
            BotWeaverError::Generation { detail } => {
                tracing::error!(%detail, "Generation error");
                self.to_string()
            }
            BotWeaverError::Lifecycle { stage, detail } => {
                tracing::error!(%detail, "{stage}");
                self.to_string()
            }
            BotWeaverError::Internal(e) => {
                tracing::error!("Internal error: {e:#}");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        let errors = if let BotWeaverError::Validation { errors } = &self {
            Some(errors.clone())
        } else {
            None
        };

        let body = ErrorResponse {
            code: status.as_u16(),
            error: self.error_code().to_string(),
            message,
            errors,
        };

        (status, axum::Json(body)).into_response()
    }
}

/// Malformed or oversized JSON bodies become a structured 400.
impl From<JsonRejection> for BotWeaverError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

/// Convenience type alias for Results using BotWeaverError.
pub type BotWeaverResult<T> = Result<T, BotWeaverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_message_is_the_stage() {
        let err = BotWeaverError::Lifecycle {
            stage: "Failed to install dependencies".into(),
            detail: "npm exited with status 1".into(),
        };
        assert_eq!(err.to_string(), "Failed to install dependencies");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn generation_hides_detail() {
        let err = BotWeaverError::Generation { detail: "secret path".into() };
        assert!(!err.to_string().contains("secret"));
    }

    #[test]
    fn already_running_is_a_bad_request() {
        let err = BotWeaverError::AlreadyRunning { id: "helper".into() };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "ALREADY_RUNNING");
    }
}
