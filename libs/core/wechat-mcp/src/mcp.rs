//! MCP (Model Context Protocol) handler.
//!
//! Implements a JSON-RPC style MCP server. Tool invocation failures come
//! back as `isError` tool results so callers can tell publishing failures
//! apart from protocol-level errors (which use JSON-RPC error responses).

use crate::error::Result;
use crate::publisher::DraftPublisher;
use crate::tools::{ListThemesTool, PublishArticleTool};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

pub(crate) mod sealed {
    pub trait Sealed {}
}

/// Trait for MCP tools - sealed to prevent external implementations
#[async_trait]
pub trait Tool: sealed::Sealed + Send + Sync {
    /// Tool name
    fn name(&self) -> &'static str;

    /// Tool description for the AI model
    fn description(&self) -> &'static str;

    /// JSON schema for input parameters
    fn input_schema(&self) -> Value;

    /// Execute the tool with given arguments, returning the result text
    async fn execute(&self, arguments: Value) -> Result<String>;
}

/// MCP request structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpRequest {
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// MCP response structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<McpError>,
}

/// MCP error structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl McpResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(McpError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }
}

#[derive(Clone, Serialize)]
struct ServerInfo {
    name: String,
    version: String,
}

/// Per-session MCP request handler
pub struct McpHandler {
    tools: HashMap<String, Box<dyn Tool>>,
    server_info: ServerInfo,
}

impl McpHandler {
    /// Create a handler exposing the two publishing tools
    pub fn new(publisher: Arc<DraftPublisher>) -> Self {
        let mut tools: HashMap<String, Box<dyn Tool>> = HashMap::new();

        let publish_tool = PublishArticleTool::new(publisher);
        tools.insert(publish_tool.name().to_string(), Box::new(publish_tool));

        let themes_tool = ListThemesTool;
        tools.insert(themes_tool.name().to_string(), Box::new(themes_tool));

        Self {
            tools,
            server_info: ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }

    /// Handle an MCP request; `None` for notifications, which carry no reply.
    pub async fn handle(&self, request: McpRequest) -> Option<McpResponse> {
        if request.method.starts_with("notifications/") {
            return None;
        }

        Some(match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id),
            "ping" => McpResponse::success(request.id, json!({})),
            "tools/list" => self.handle_list_tools(request.id),
            "tools/call" => self.handle_call_tool(request.id, request.params).await,
            _ => McpResponse::error(request.id, -32601, "Method not found"),
        })
    }

    fn handle_initialize(&self, id: Option<Value>) -> McpResponse {
        McpResponse::success(
            id,
            json!({
                "protocolVersion": "2024-11-05",
                "serverInfo": self.server_info,
                "capabilities": {
                    "tools": {}
                }
            }),
        )
    }

    fn handle_list_tools(&self, id: Option<Value>) -> McpResponse {
        let tools: Vec<Value> = self
            .tools
            .values()
            .map(|tool| {
                json!({
                    "name": tool.name(),
                    "description": tool.description(),
                    "inputSchema": tool.input_schema()
                })
            })
            .collect();

        McpResponse::success(id, json!({ "tools": tools }))
    }

    async fn handle_call_tool(&self, id: Option<Value>, params: Value) -> McpResponse {
        let tool_name = match params.get("name").and_then(|v| v.as_str()) {
            Some(name) => name,
            None => return McpResponse::error(id, -32602, "Missing tool name"),
        };

        let tool = match self.tools.get(tool_name) {
            Some(tool) => tool,
            None => return McpResponse::error(id, -32602, format!("Unknown tool: {}", tool_name)),
        };

        let arguments = params.get("arguments").cloned().unwrap_or(json!({}));

        match tool.execute(arguments).await {
            Ok(text) => McpResponse::success(
                id,
                json!({
                    "content": [{
                        "type": "text",
                        "text": text
                    }]
                }),
            ),
            Err(e) => {
                tracing::error!("tool '{tool_name}' invocation failed: {e}");
                McpResponse::success(
                    id,
                    json!({
                        "content": [{
                            "type": "text",
                            "text": e.to_string()
                        }],
                        "isError": true
                    }),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockWeChatApi;
    use core_config::wechat::WeChatConfig;

    fn handler() -> McpHandler {
        let publisher = Arc::new(DraftPublisher::new(
            Arc::new(MockWeChatApi::new()),
            WeChatConfig::default(),
        ));
        McpHandler::new(publisher)
    }

    fn request(method: &str, params: Value) -> McpRequest {
        McpRequest {
            jsonrpc: "2.0".to_string(),
            id: Some(json!(1)),
            method: method.to_string(),
            params,
        }
    }

    #[test]
    fn test_mcp_response_success() {
        let response = McpResponse::success(Some(json!(1)), json!({"ok": true}));
        assert!(response.error.is_none());
        assert!(response.result.is_some());
    }

    #[test]
    fn test_mcp_response_error() {
        let response = McpResponse::error(Some(json!(1)), -32600, "Invalid request");
        assert!(response.error.is_some());
        assert!(response.result.is_none());
    }

    #[tokio::test]
    async fn test_initialize_reports_tool_capability() {
        let response = handler()
            .handle(request("initialize", json!({})))
            .await
            .unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], "2024-11-05");
        assert!(result["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn test_tools_list_declares_both_tools() {
        let response = handler()
            .handle(request("tools/list", json!({})))
            .await
            .unwrap();
        let tools = response.result.unwrap()["tools"].as_array().unwrap().clone();
        let names: Vec<&str> = tools.iter().filter_map(|t| t["name"].as_str()).collect();
        assert_eq!(tools.len(), 2);
        assert!(names.contains(&"publish_article"));
        assert!(names.contains(&"list_themes"));
    }

    #[tokio::test]
    async fn test_unknown_method_is_rejected() {
        let response = handler()
            .handle(request("resources/list", json!({})))
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, -32601);
    }

    #[tokio::test]
    async fn test_notifications_produce_no_response() {
        let mut notification = request("notifications/initialized", json!({}));
        notification.id = None;
        assert!(handler().handle(notification).await.is_none());
    }

    #[tokio::test]
    async fn test_unknown_tool_is_a_protocol_error() {
        let response = handler()
            .handle(request("tools/call", json!({"name": "no_such_tool"})))
            .await
            .unwrap();
        let error = response.error.unwrap();
        assert_eq!(error.code, -32602);
        assert!(error.message.contains("no_such_tool"));
    }

    #[tokio::test]
    async fn test_tool_failure_surfaces_as_is_error_result() {
        let response = handler()
            .handle(request(
                "tools/call",
                json!({"name": "publish_article", "arguments": {}}),
            ))
            .await
            .unwrap();

        // Missing `content` is a tool-invocation failure, not a protocol error.
        assert!(response.error.is_none());
        let result = response.result.unwrap();
        assert_eq!(result["isError"], true);
        assert!(result["content"][0]["text"].as_str().unwrap().contains("content"));
    }

    #[tokio::test]
    async fn test_ping_returns_empty_result() {
        let response = handler().handle(request("ping", json!({}))).await.unwrap();
        assert_eq!(response.result.unwrap(), json!({}));
    }
}
