//! Discovery against local stub MCP servers.

use ally_mcp::protocol::{JsonRpcRequest, JsonRpcResponse};
use ally_mcp::{DiscoveredTool, McpDiscovery, McpError, SESSION_HEADER};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;
use std::time::Duration;

const SESSION: &str = "session-abc";

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/mcp")
}

fn has_session(headers: &HeaderMap) -> bool {
    headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok()) == Some(SESSION)
}

fn initialize_reply(request: &JsonRpcRequest) -> JsonRpcResponse {
    JsonRpcResponse::success(
        request.id.clone(),
        json!({
            "protocolVersion": "2025-03-26",
            "capabilities": {"tools": {}},
            "serverInfo": {"name": "Email Specialist Server", "version": "1.0.0"}
        }),
    )
}

/// Answers `initialize` with JSON and `tools/list` with an event stream,
/// like FastMCP's streamable-HTTP transport.
async fn email_server(headers: HeaderMap, Json(request): Json<JsonRpcRequest>) -> Response {
    match request.method.as_str() {
        "initialize" => (
            [(SESSION_HEADER, SESSION)],
            Json(initialize_reply(&request)),
        )
            .into_response(),
        "notifications/initialized" if has_session(&headers) => StatusCode::ACCEPTED.into_response(),
        "tools/list" if has_session(&headers) => {
            let reply = JsonRpcResponse::success(
                request.id.clone(),
                json!({
                    "tools": [
                        {
                            "name": "get_recent_emails_summary",
                            "description": "Summarize recent emails",
                            "inputSchema": {"type": "object", "properties": {}}
                        },
                        {
                            "name": "get_email_body",
                            "inputSchema": {
                                "type": "object",
                                "properties": {"subject": {"type": "string"}},
                                "required": ["subject"]
                            }
                        }
                    ]
                }),
            );
            let body = format!(
                "event: message\ndata: {}\n\n",
                serde_json::to_string(&reply).unwrap()
            );
            ([(header::CONTENT_TYPE, "text/event-stream")], body).into_response()
        }
        _ => StatusCode::BAD_REQUEST.into_response(),
    }
}

#[tokio::test]
async fn test_discover_lists_tools_with_session() {
    let url = spawn(Router::new().route("/mcp", post(email_server))).await;

    let server = McpDiscovery::new(Duration::from_secs(5))
        .discover(&url)
        .await
        .unwrap();

    assert_eq!(server.name, "Email Specialist Server");
    assert_eq!(server.url, url);
    assert_eq!(
        server.tools,
        vec![
            DiscoveredTool {
                name: "get_recent_emails_summary".into(),
                description: "Summarize recent emails".into(),
                parameters: vec![],
            },
            DiscoveredTool {
                name: "get_email_body".into(),
                description: String::new(),
                parameters: vec!["subject".into()],
            },
        ]
    );

    let inputs = server.tool_inputs();
    assert_eq!(inputs.len(), 2);
    assert!(inputs[1].code.contains("def get_email_body(subject: str) -> str:"));
}

#[tokio::test]
async fn test_slow_server_times_out() {
    async fn slow(Json(request): Json<JsonRpcRequest>) -> Json<JsonRpcResponse> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Json(initialize_reply(&request))
    }
    let url = spawn(Router::new().route("/mcp", post(slow))).await;

    let err = McpDiscovery::new(Duration::from_millis(200))
        .discover(&url)
        .await
        .unwrap_err();

    match err {
        McpError::UpstreamTimeout { url: timed_out, timeout_secs } => {
            assert_eq!(timed_out, url);
            assert_eq!(timeout_secs, 0);
        }
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn test_rpc_error_is_reported() {
    async fn failing(Json(request): Json<JsonRpcRequest>) -> Response {
        match request.method.as_str() {
            "initialize" => Json(initialize_reply(&request)).into_response(),
            "tools/list" => Json(JsonRpcResponse::error(request.id.clone(), -32601, "Method not found")).into_response(),
            _ => StatusCode::ACCEPTED.into_response(),
        }
    }
    let url = spawn(Router::new().route("/mcp", post(failing))).await;

    let err = McpDiscovery::new(Duration::from_secs(5))
        .discover(&url)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        McpError::Rpc { ref method, code: -32601, .. } if method == "tools/list"
    ));
}

#[tokio::test]
async fn test_http_error_status_is_transport_error() {
    let url = spawn(Router::new().route("/mcp", post(|| async { StatusCode::NOT_FOUND }))).await;

    let err = McpDiscovery::new(Duration::from_secs(5))
        .discover(&url)
        .await
        .unwrap_err();
    assert!(matches!(err, McpError::Transport(_)));
}
