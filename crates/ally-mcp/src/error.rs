//! Error types for MCP discovery.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum McpError {
    /// The server did not finish discovery within the configured bound.
    #[error("MCP server at {url} did not respond within {timeout_secs}s")]
    UpstreamTimeout { url: String, timeout_secs: u64 },

    /// Connection or HTTP status failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a JSON-RPC error.
    #[error("MCP error {code} from {method}: {message}")]
    Rpc {
        method: String,
        code: i32,
        message: String,
    },

    /// The response could not be understood.
    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
