//! Bearer token middleware for the protected API.

use crate::error::ApiError;
use ally_dashboard::AppState;
use ally_oauth::AuthError;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;

/// Scope every protected route requires.
pub const READ_TOOLS_SCOPE: &str = "read:tools";

/// Verify the bearer token and attach its [`ally_oauth::AccessClaims`] to the
/// request extensions.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers()).ok_or(ApiError::MissingBearer)?;
    let claims = state.issuer().verify_bearer(&token).await?;

    if !claims.has_scope(READ_TOOLS_SCOPE) {
        return Err(AuthError::InsufficientScope {
            required: READ_TOOLS_SCOPE.to_string(),
        }
        .into());
    }

    tracing::debug!(sub = claims.sub, client_id = %claims.client_id, "Bearer token accepted");
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token(&headers("Bearer abc.def")).as_deref(), Some("abc.def"));
        assert_eq!(bearer_token(&headers("bearer  xyz ")).as_deref(), Some("xyz"));
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
