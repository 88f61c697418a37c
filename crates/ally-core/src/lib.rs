//! # ally-core
//!
//! Shared domain types and configuration for the Ally Agent tool manager.
//!
//! - [`model`]: tools, tool groups, users and their enabled selections
//! - [`config`]: the TOML configuration consumed by every other crate

pub mod config;
pub mod model;

pub use config::{
    AllyConfig, ConfigError, DatabaseConfig, GeneratorConfig, McpConfig, OAuthConfig,
    ServerConfig,
};
pub use model::{EnabledSet, Selection, Tool, ToolGroup, ToolInput, ToolGroupInput, User};
