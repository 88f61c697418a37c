//! # ally-server
//!
//! HTTP assembly for Ally: the OAuth2 client-credentials endpoints, the
//! bearer-protected tools API and the admin dashboard, served from one
//! listener.
//!
//! | Route | Auth |
//! |-------|------|
//! | `GET /` | none, JSON endpoint listing |
//! | `GET /healthz` | none |
//! | `POST /oauth/token`, `POST /oauth/introspect` | client credentials in the form |
//! | `GET /api/users/me` | bearer, `read:tools` |
//! | `GET /api/users/{id}/external-tools` | bearer, subject must be `{id}` |
//! | `GET /api/oauth/clients/me` | bearer |
//! | `/dashboard`, `/tools`, `/groups`, `/users` | none, see `ally-dashboard` |

pub mod api;
pub mod error;
pub mod middleware;
pub mod oauth;

pub use error::ApiError;
pub use middleware::READ_TOOLS_SCOPE;

use ally_dashboard::{AppState, create_router};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;

/// Build the complete application router.
pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/users/me", get(api::me))
        .route("/api/users/{id}/external-tools", get(api::external_tools))
        .route("/api/oauth/clients/me", get(api::my_clients))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_bearer,
        ));

    Router::new()
        .route("/", get(discovery))
        .route("/healthz", get(healthz))
        .route("/oauth/token", post(oauth::token))
        .route("/oauth/introspect", post(oauth::introspect))
        .merge(protected)
        .with_state(state.clone())
        .merge(create_router(state))
        .layer(TraceLayer::new_for_http())
}

/// Serve [`app`] on `addr` until Ctrl-C.
pub async fn serve(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "Ally listening");
    tracing::info!("Dashboard at http://{}/dashboard", listener.local_addr()?);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

async fn discovery() -> Json<Value> {
    Json(json!({
        "message": "Ally Agent OAuth 2.0 API",
        "version": env!("CARGO_PKG_VERSION"),
        "token_endpoint": "/oauth/token",
        "introspection_endpoint": "/oauth/introspect",
        "grant_types_supported": [ally_oauth::CLIENT_CREDENTIALS],
        "scopes_supported": [READ_TOOLS_SCOPE],
        "dashboard": "/dashboard",
        "endpoints": [
            "/api/users/me",
            "/api/users/{id}/external-tools",
            "/api/oauth/clients/me",
        ],
    }))
}

async fn healthz() -> Json<Value> {
    Json(json!({ "ok": true, "service": "ally" }))
}
