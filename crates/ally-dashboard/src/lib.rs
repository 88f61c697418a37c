//! # ally-dashboard
//!
//! Admin web dashboard for the tool manager.
//!
//! - Tools: create, edit and delete Python tool snippets
//! - Tool groups: bundle tools behind one specialist agent
//! - MCP import: discover a server's tools and store them as a group
//! - Users: per-user enabled tools and groups, "update external tools"
//! - Credentials: the user's OAuth client and one-time secret display
//!
//! Pages are server-rendered HTML built with `format!` templates.
//! [`AppState`] is shared with the OAuth and API routes of `ally-server`.

pub mod error;
pub mod handlers;
pub mod pages;
pub mod routes;
pub mod state;
pub mod templates;

pub use error::DashboardError;
pub use routes::create_router;
pub use state::AppState;
