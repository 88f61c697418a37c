//! Streamable-HTTP discovery client.
//!
//! Runs the minimal MCP session needed to list a server's tools:
//!
//! 1. `initialize` (the server may answer with an `mcp-session-id` header)
//! 2. `notifications/initialized`
//! 3. `tools/list`
//!
//! Every POST carries the session id once one is known. Responses may be plain
//! JSON or a `text/event-stream` body whose `data:` lines hold the JSON-RPC
//! response. The whole exchange is bounded by one timeout.

use crate::error::McpError;
use crate::protocol::{InitializeResult, JsonRpcRequest, JsonRpcResponse, ListToolsResponse};
use ally_core::McpConfig;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

pub const SESSION_HEADER: &str = "mcp-session-id";

/// A tool advertised by a remote MCP server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredTool {
    pub name: String,
    pub description: String,
    pub parameters: Vec<String>,
}

/// Result of a successful discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredServer {
    /// `serverInfo.name` from the `initialize` result.
    pub name: String,
    pub url: String,
    pub instructions: Option<String>,
    pub tools: Vec<DiscoveredTool>,
}

#[derive(Debug, Clone)]
pub struct McpDiscovery {
    client: reqwest::Client,
    timeout: Duration,
}

impl McpDiscovery {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }

    pub fn from_config(config: &McpConfig) -> Self {
        Self::new(config.discovery_timeout())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// List the tools of the MCP server at `url`.
    ///
    /// Fails with [`McpError::UpstreamTimeout`] when the exchange takes longer
    /// than the configured timeout. Nothing is retried.
    pub async fn discover(&self, url: &str) -> Result<DiscoveredServer, McpError> {
        match tokio::time::timeout(self.timeout, self.exchange(url)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(url, timeout_secs = self.timeout.as_secs(), "MCP discovery timed out");
                Err(McpError::UpstreamTimeout {
                    url: url.to_string(),
                    timeout_secs: self.timeout.as_secs(),
                })
            }
        }
    }

    async fn exchange(&self, url: &str) -> Result<DiscoveredServer, McpError> {
        let init_request = JsonRpcRequest::initialize(1);
        let response = self.post(url, None, &init_request).await?;
        let session = response
            .headers()
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let init: InitializeResult = read_result(response, &init_request).await?;

        tracing::debug!(
            url,
            server = %init.server_info.name,
            session = session.is_some(),
            "MCP session initialized"
        );

        self.post(
            url,
            session.as_deref(),
            &JsonRpcRequest::notification("notifications/initialized"),
        )
        .await?;

        let list_request = JsonRpcRequest::list_tools(2);
        let response = self.post(url, session.as_deref(), &list_request).await?;
        let listed: ListToolsResponse = read_result(response, &list_request).await?;

        let tools: Vec<DiscoveredTool> = listed
            .tools
            .into_iter()
            .map(|tool| DiscoveredTool {
                parameters: tool.parameter_names(),
                description: tool.description.unwrap_or_default(),
                name: tool.name,
            })
            .collect();

        tracing::info!(url, server = %init.server_info.name, tools = tools.len(), "Discovered MCP tools");

        Ok(DiscoveredServer {
            name: init.server_info.name,
            url: url.to_string(),
            instructions: init.instructions,
            tools,
        })
    }

    async fn post(
        &self,
        url: &str,
        session: Option<&str>,
        request: &JsonRpcRequest,
    ) -> Result<reqwest::Response, McpError> {
        let mut builder = self
            .client
            .post(url)
            .header(ACCEPT, "application/json, text/event-stream")
            .json(request);
        if let Some(session) = session {
            builder = builder.header(SESSION_HEADER, session);
        }
        Ok(builder.send().await?.error_for_status()?)
    }
}

async fn read_result<T: DeserializeOwned>(
    response: reqwest::Response,
    request: &JsonRpcRequest,
) -> Result<T, McpError> {
    let is_stream = is_event_stream(response.headers());
    let body = response.text().await?;

    let reply = if is_stream {
        parse_event_stream(&body, request)?
    } else {
        serde_json::from_str::<JsonRpcResponse>(&body)?
    };

    if let Some(error) = reply.error {
        return Err(McpError::Rpc {
            method: request.method.clone(),
            code: error.code,
            message: error.message,
        });
    }
    let result = reply
        .result
        .ok_or_else(|| McpError::Protocol(format!("{} returned no result", request.method)))?;
    Ok(serde_json::from_value(result)?)
}

fn is_event_stream(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/event-stream"))
}

/// Find the response to `request` among the events of an SSE body.
pub(crate) fn parse_event_stream(
    body: &str,
    request: &JsonRpcRequest,
) -> Result<JsonRpcResponse, McpError> {
    let normalized = body.replace("\r\n", "\n");
    for event in normalized.split("\n\n") {
        let data = event
            .lines()
            .filter_map(|line| line.strip_prefix("data:"))
            .map(|d| d.strip_prefix(' ').unwrap_or(d))
            .collect::<Vec<_>>()
            .join("\n");
        if data.is_empty() {
            continue;
        }

        // Servers may interleave notifications; skip anything that is not our reply.
        let Ok(reply) = serde_json::from_str::<JsonRpcResponse>(&data) else {
            continue;
        };
        if reply.id == request.id {
            return Ok(reply);
        }
    }
    Err(McpError::Protocol(format!(
        "event stream held no response to {}",
        request.method
    )))
}
