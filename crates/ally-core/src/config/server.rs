//! HTTP listener configuration.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Where the dashboard and API listen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address, e.g. `0.0.0.0:8080`.
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

impl ServerConfig {
    /// Parse the bind address.
    pub fn socket_addr(&self) -> Result<SocketAddr, super::ConfigError> {
        self.bind
            .parse()
            .map_err(|_| super::ConfigError::Config(format!("invalid bind address: {}", self.bind)))
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}
