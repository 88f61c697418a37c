//! MCP endpoint configuration.
//!
//! The endpoint URL is baked into generated wrappers for reserved MCP tools.
//! The timeout bounds outbound discovery calls made from the dashboard.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpConfig {
    /// Streamable-HTTP endpoint of the MCP server.
    #[serde(default = "default_endpoint_url")]
    pub endpoint_url: String,

    /// Upper bound for a whole discovery exchange, in seconds.
    #[serde(default = "default_discovery_timeout_secs")]
    pub discovery_timeout_secs: u64,
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            endpoint_url: default_endpoint_url(),
            discovery_timeout_secs: default_discovery_timeout_secs(),
        }
    }
}

impl McpConfig {
    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_secs(self.discovery_timeout_secs)
    }
}

fn default_endpoint_url() -> String {
    "http://localhost:8000/mcp".to_string()
}

fn default_discovery_timeout_secs() -> u64 {
    10
}
