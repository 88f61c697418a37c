//! Error responses for the OAuth endpoints and the protected API.
//!
//! Every failure is rendered as `{"error": ..., "error_description": ...}`
//! with one of a fixed set of codes.

use ally_oauth::AuthError;
use ally_store::StoreError;
use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// A required form field is missing or empty.
    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),

    /// No `Authorization: Bearer` header on a protected route.
    #[error("missing bearer token")]
    MissingBearer,

    /// The token subject asked for another user's data.
    #[error("token does not grant access to user {requested}")]
    Forbidden { requested: i64 },

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    error_description: String,
}

impl ApiError {
    /// HTTP status and stable error code.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::MissingParameter(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            ApiError::MissingBearer => (StatusCode::UNAUTHORIZED, "invalid_token"),
            ApiError::Forbidden { .. } => (StatusCode::FORBIDDEN, "insufficient_scope"),
            ApiError::Auth(AuthError::InvalidClient | AuthError::InvalidSecret) => {
                (StatusCode::UNAUTHORIZED, "invalid_client")
            }
            ApiError::Auth(AuthError::InvalidToken) => (StatusCode::UNAUTHORIZED, "invalid_token"),
            ApiError::Auth(AuthError::InsufficientScope { .. }) => {
                (StatusCode::FORBIDDEN, "insufficient_scope")
            }
            ApiError::Auth(AuthError::UnsupportedGrantType(_)) => {
                (StatusCode::BAD_REQUEST, "unsupported_grant_type")
            }
            ApiError::Store(StoreError::NotFound { .. }) => (StatusCode::NOT_FOUND, "not_found"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "server_error"),
        }
    }

    /// Text sent as `error_description`.
    ///
    /// Unknown clients and wrong secrets read the same, so the response does
    /// not tell which half of the pair was wrong.
    pub fn description(&self) -> String {
        match self {
            ApiError::Auth(AuthError::InvalidClient | AuthError::InvalidSecret) => {
                "client authentication failed".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let description = if status.is_server_error() {
            tracing::error!(error = %self, "API request failed");
            "internal server error".to_string()
        } else {
            tracing::debug!(error = %self, code, "API request rejected");
            self.description()
        };

        let mut response = (
            status,
            Json(ErrorBody {
                error: code,
                error_description: description,
            }),
        )
            .into_response();

        if matches!(code, "invalid_token" | "insufficient_scope") {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer error=\"{code}\"")) {
                response.headers_mut().insert(header::WWW_AUTHENTICATE, value);
            }
        }
        response
    }
}
