//! Routes behind [`crate::middleware::require_bearer`].

use crate::error::ApiError;
use ally_dashboard::AppState;
use ally_oauth::{AccessClaims, ClientRecord};
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};

async fn external_tools_for(state: &AppState, user_id: i64) -> Result<Response, ApiError> {
    let set = state.store().enabled_set(user_id).await?;
    let document = state.generator().generate_set(&set);
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], document).into_response())
}

/// The generated document for the token subject.
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<AccessClaims>,
) -> Result<Response, ApiError> {
    external_tools_for(&state, claims.sub).await
}

/// Same as [`me`], addressed by id. Only the subject's own id is allowed.
pub async fn external_tools(
    State(state): State<AppState>,
    Extension(claims): Extension<AccessClaims>,
    Path(user_id): Path<i64>,
) -> Result<Response, ApiError> {
    if user_id != claims.sub {
        tracing::warn!(sub = claims.sub, requested = user_id, "Cross-user tools request denied");
        return Err(ApiError::Forbidden { requested: user_id });
    }
    external_tools_for(&state, user_id).await
}

/// The subject's OAuth client, as a list of zero or one entries.
pub async fn my_clients(
    State(state): State<AppState>,
    Extension(claims): Extension<AccessClaims>,
) -> Result<Json<Vec<ClientRecord>>, ApiError> {
    let client = state.issuer().client_for_user(claims.sub).await?;
    Ok(Json(client.into_iter().collect()))
}
