//! Error types for the dashboard crate.

use crate::templates::{empty_state, html_escape, layout};
use ally_codegen::CodegenError;
use ally_mcp::McpError;
use ally_oauth::AuthError;
use ally_store::StoreError;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Mcp(#[from] McpError),

    #[error(transparent)]
    Codegen(#[from] CodegenError),

    /// Malformed form input.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl DashboardError {
    pub fn status(&self) -> StatusCode {
        match self {
            DashboardError::Store(StoreError::Validation { .. }) => StatusCode::BAD_REQUEST,
            DashboardError::Store(StoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
            DashboardError::Store(StoreError::Conflict { .. }) => StatusCode::CONFLICT,
            DashboardError::Auth(AuthError::UnknownUser { .. }) => StatusCode::NOT_FOUND,
            DashboardError::Auth(AuthError::InvalidClient) => StatusCode::NOT_FOUND,
            DashboardError::Mcp(McpError::UpstreamTimeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            DashboardError::Mcp(_) => StatusCode::BAD_GATEWAY,
            DashboardError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Dashboard request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Dashboard request rejected");
        }

        let title = status.canonical_reason().unwrap_or("Error");
        let body = layout(
            title,
            &empty_state(
                "triangle-exclamation",
                title,
                &html_escape(&self.to_string()),
                Some(("Back to home", "/dashboard")),
            ),
        );
        (status, Html(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (DashboardError::Store(StoreError::Validation { field: "name" }), 400),
            (DashboardError::Store(StoreError::NotFound { entity: "tool", id: 1 }), 404),
            (
                DashboardError::Store(StoreError::Conflict {
                    entity: "user",
                    name: "a".into(),
                }),
                409,
            ),
            (
                DashboardError::Mcp(McpError::UpstreamTimeout {
                    url: "http://x/mcp".into(),
                    timeout_secs: 10,
                }),
                504,
            ),
            (DashboardError::Mcp(McpError::Protocol("bad".into())), 502),
            (
                DashboardError::Codegen(CodegenError::GenerationWrite {
                    path: "out.py".into(),
                    source: std::io::Error::other("disk full"),
                }),
                500,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.status().as_u16(), expected, "{err}");
        }
    }
}
