//! Route definitions for the dashboard.

use crate::handlers;
use crate::state::AppState;
use axum::Router;
use axum::routing::{get, post};

/// Create the dashboard router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/dashboard", get(handlers::home))
        // Tools
        .route("/tools", get(handlers::tools_list).post(handlers::tool_create))
        .route("/tools/new", get(handlers::tool_new))
        .route("/tools/{id}", post(handlers::tool_update))
        .route("/tools/{id}/edit", get(handlers::tool_edit))
        .route("/tools/{id}/delete", post(handlers::tool_delete))
        // Tool groups
        .route("/groups", get(handlers::groups_list).post(handlers::group_create))
        .route("/groups/new", get(handlers::group_new))
        .route("/groups/import", get(handlers::import_form).post(handlers::import_submit))
        .route("/groups/{id}", post(handlers::group_update))
        .route("/groups/{id}/edit", get(handlers::group_edit))
        .route("/groups/{id}/delete", post(handlers::group_delete))
        // Users
        .route("/users", get(handlers::users_list).post(handlers::user_create))
        .route("/users/{id}", get(handlers::user_detail))
        .route("/users/{id}/delete", post(handlers::user_delete))
        .route("/users/{id}/selections", post(handlers::user_save_selections))
        .route("/users/{id}/generate", post(handlers::user_generate))
        .route("/users/{id}/preview", get(handlers::user_preview))
        .route("/users/{id}/credentials", get(handlers::credentials))
        .route(
            "/users/{id}/credentials/regenerate",
            post(handlers::credentials_regenerate),
        )
        .route("/users/{id}/credentials/revoke", post(handlers::credentials_revoke))
        .with_state(state)
}
