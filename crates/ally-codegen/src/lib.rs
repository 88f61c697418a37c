//! # ally-codegen
//!
//! Turns a user's enabled tools and tool groups into a Python module for the
//! `agents` runtime: one wrapper `Agent` per tool or group, plus a trailing
//! `external_tools` list the main agent imports.
//!
//! - [`sanitize`]: identifier and string-literal escaping
//! - [`kind`]: plain tools vs. reserved MCP-forwarded tools
//! - [`templates`]: per-callable and per-agent snippets
//! - [`generator`]: deterministic document assembly
//! - [`output`]: replacing the document on disk

pub mod error;
pub mod generator;
pub mod kind;
pub mod output;
pub mod sanitize;
pub mod templates;

pub use error::CodegenError;
pub use generator::{Generator, GeneratorOptions};
pub use kind::{McpParam, McpTool, ToolKind};
pub use output::write_document;
pub use templates::{Callable, discover_callable};
