//! Error types and error handling for the gateway
//!
//! This module defines custom error types that can be converted to HTTP responses.
//! All errors implement `IntoResponse` to provide consistent error formatting.
//! Callers only ever see a sanitized `{"error": ...}` body; detail stays in logs.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error types
///
/// All errors that can occur while handling a chat request are represented
/// by this enum. Each variant implements automatic conversion to HTTP
/// responses via `IntoResponse`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Request body is missing or has an invalid message
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Identity has used up its daily message allowance
    #[error("Daily message limit reached. Please try again tomorrow.")]
    QuotaExceeded,

    /// The quota check itself failed (store unreachable); fail closed
    #[error("Unable to verify your message allowance. Please try again shortly.")]
    QuotaCheckFailed(String),

    /// The completion provider refused or failed before streaming started
    #[error("The assistant is temporarily unavailable. Please try again.")]
    Upstream(String),

    /// Session with the given ID was not found
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Internal server error (catch-all for unexpected errors)
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::QuotaExceeded => StatusCode::TOO_MANY_REQUESTS,
            AppError::QuotaCheckFailed(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Log the internal detail, return only the user-facing message.
        match &self {
            AppError::QuotaCheckFailed(detail) => {
                tracing::error!(detail = %detail, "Quota check failed, denying request");
            }
            AppError::Upstream(detail) => {
                tracing::error!(detail = %detail, "Upstream completion provider failed");
            }
            AppError::Internal(e) => {
                tracing::error!(error = %e, "Internal server error");
            }
            _ => {}
        }

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_exceeded_maps_to_429() {
        let response = AppError::QuotaExceeded.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn quota_check_failure_is_distinct_from_exceeded() {
        let exceeded = AppError::QuotaExceeded.to_string();
        let failed = AppError::QuotaCheckFailed("db down".to_string()).to_string();
        assert_ne!(exceeded, failed);

        let response = AppError::QuotaCheckFailed("db down".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn upstream_detail_is_not_exposed() {
        let message = AppError::Upstream("secret internal detail".to_string()).to_string();
        assert!(!message.contains("secret internal detail"));
    }

    #[test]
    fn invalid_request_maps_to_400() {
        let response =
            AppError::InvalidRequest("Message cannot be empty".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
