//! OAuth2 client-credentials endpoints.
//!
//! - `POST /oauth/token`: exchange a client id and secret for an access token
//! - `POST /oauth/introspect`: report whether a token is active

use crate::error::ApiError;
use ally_dashboard::AppState;
use ally_oauth::{Introspection, TokenGrant};
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::{Form, Json};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct TokenRequest {
    pub grant_type: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub scope: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct IntrospectRequest {
    pub token: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

/// Non-empty value of a form field.
fn required<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str, ApiError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ApiError::MissingParameter(name))
}

pub async fn token(
    State(state): State<AppState>,
    Form(request): Form<TokenRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let grant_type = required(&request.grant_type, "grant_type")?;
    let client_id = required(&request.client_id, "client_id")?;
    let client_secret = required(&request.client_secret, "client_secret")?;
    let scope = request.scope.as_deref().map(str::trim).filter(|s| !s.is_empty());

    let grant: TokenGrant = state
        .issuer()
        .grant(grant_type, client_id, client_secret, scope)
        .await
        .inspect_err(|e| {
            if e.is_rejection() {
                tracing::warn!(client_id, error = %e, "Token request rejected");
            }
        })?;

    Ok((
        [(header::CACHE_CONTROL, "no-store"), (header::PRAGMA, "no-cache")],
        Json(grant),
    ))
}

/// Only an authenticated client may introspect, but any token can be checked.
pub async fn introspect(
    State(state): State<AppState>,
    Form(request): Form<IntrospectRequest>,
) -> Result<Json<Introspection>, ApiError> {
    let client_id = required(&request.client_id, "client_id")?;
    let client_secret = required(&request.client_secret, "client_secret")?;
    state
        .issuer()
        .authenticate_client(client_id, client_secret)
        .await?;

    let result = match request.token.as_deref().map(str::trim) {
        Some(token) if !token.is_empty() => state.issuer().introspect(token).await,
        _ => Introspection::inactive(),
    };
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims_and_rejects_blank() {
        assert_eq!(required(&Some(" abc ".into()), "x").unwrap(), "abc");
        assert!(matches!(
            required(&Some("  ".into()), "client_id"),
            Err(ApiError::MissingParameter("client_id"))
        ));
        assert!(required(&None, "token").is_err());
    }
}
