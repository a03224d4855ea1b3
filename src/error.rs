use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sea_orm::DbErr;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::schemas::ErrorResponse;

/// Request-scoped error taxonomy. Every variant maps to one status code and
/// renders the carried reason verbatim as `{"error": "<message>"}`; nothing
/// here is fatal to the process.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Unauthenticated(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Conflict(String),
    /// Every unmet password rule, rendered as structured detail rather than
    /// a single `error` string.
    #[error("password does not meet the policy")]
    WeakPassword(Vec<&'static str>),
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::Forbidden(message) => (StatusCode::FORBIDDEN, message),
            ApiError::Unauthenticated(message) => (StatusCode::UNAUTHORIZED, message),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, message),
            ApiError::WeakPassword(rules) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "password": { "error": rules } })),
                )
                    .into_response();
            }
            ApiError::Database(db_error) => {
                error!("Database error while handling request: {}", db_error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            ApiError::Internal(inner) => {
                error!("Internal error while handling request: {}", inner);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::not_found("x"), StatusCode::NOT_FOUND),
            (ApiError::forbidden("x"), StatusCode::FORBIDDEN),
            (ApiError::unauthenticated("x"), StatusCode::UNAUTHORIZED),
            (ApiError::bad_request("x"), StatusCode::BAD_REQUEST),
            (ApiError::conflict("x"), StatusCode::CONFLICT),
        ];
        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_weak_password_is_bad_request() {
        let response =
            ApiError::WeakPassword(vec!["password must be at least 8 characters long"])
                .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
