//! # ally-mcp
//!
//! MCP (Model Context Protocol) client support for importing tools.
//!
//! [`McpDiscovery`] talks to a streamable-HTTP MCP server, lists its tools and
//! returns a [`DiscoveredServer`]; [`DiscoveredServer::tool_inputs`] turns the
//! result into rows the store can create as one tool group.

pub mod discovery;
pub mod error;
pub mod imported;
pub mod protocol;

pub use discovery::{DiscoveredServer, DiscoveredTool, McpDiscovery, SESSION_HEADER};
pub use error::McpError;
pub use protocol::{JsonRpcRequest, JsonRpcResponse, ToolDefinition};
