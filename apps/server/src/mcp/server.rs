//! MCP request dispatch, shared by the stdio and HTTP transports.
//!
//! Protocol errors (unknown method, bad params) become JSON-RPC errors.
//! Tool-level failures become flagged tool results so the calling agent
//! can read them.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::mcp::protocol::{
    self, CallToolParams, CallToolResult, InitializeResult, JsonRpcRequest, JsonRpcResponse,
    ListToolsResult, ServerCapabilities, ServerInfo, ToolDescriptor, ToolsCapability,
};
use crate::state::AppState;
use crate::twin;

pub const SERVER_NAME: &str = "cv-digital-twin";
pub const TOOL_NAME: &str = "chat_with_me";

/// Protocol front door: parses raw JSON-RPC messages and dispatches the MCP
/// methods. Both transports feed it one message at a time.
#[derive(Clone)]
pub struct McpServer {
    state: AppState,
}

impl McpServer {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Handles one raw message. `None` means nothing is sent back (the
    /// message was a notification).
    pub async fn handle_message(&self, raw: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(error) => {
                warn!("Unparseable JSON-RPC message: {error}");
                return Some(JsonRpcResponse::failure(
                    Value::Null,
                    protocol::PARSE_ERROR,
                    format!("Parse error: {error}"),
                ));
            }
        };

        let id = value.get("id").cloned().unwrap_or(Value::Null);
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(error) => {
                warn!("Malformed JSON-RPC request: {error}");
                return Some(JsonRpcResponse::failure(
                    id,
                    protocol::INVALID_REQUEST,
                    format!("Invalid request: {error}"),
                ));
            }
        };

        self.dispatch(request).await
    }

    async fn dispatch(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.id.is_none() {
            // Notifications get no response by definition. The only one a
            // client is expected to send is notifications/initialized.
            debug!("MCP notification: {}", request.method);
            return None;
        }
        let id = request.id.unwrap_or(Value::Null);

        if request.jsonrpc != protocol::JSONRPC_VERSION {
            return Some(JsonRpcResponse::failure(
                id,
                protocol::INVALID_REQUEST,
                format!("Unsupported JSON-RPC version '{}'", request.jsonrpc),
            ));
        }

        debug!("MCP request: method={}", request.method);

        match request.method.as_str() {
            "initialize" => Some(self.respond_with(id, initialize_result())),
            "ping" => Some(JsonRpcResponse::success(id, json!({}))),
            "tools/list" => Some(self.respond_with(
                id,
                ListToolsResult {
                    tools: vec![chat_tool_descriptor()],
                },
            )),
            "tools/call" => Some(self.handle_tool_call(id, request.params).await),
            method => Some(JsonRpcResponse::failure(
                id,
                protocol::METHOD_NOT_FOUND,
                format!("Method not found: {method}"),
            )),
        }
    }

    async fn handle_tool_call(&self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let params: CallToolParams = match params.map(serde_json::from_value).transpose() {
            Ok(Some(parsed)) => parsed,
            Ok(None) => {
                return JsonRpcResponse::failure(
                    id,
                    protocol::INVALID_PARAMS,
                    "Missing params for tools/call",
                )
            }
            Err(error) => {
                return JsonRpcResponse::failure(
                    id,
                    protocol::INVALID_PARAMS,
                    format!("Invalid params: {error}"),
                )
            }
        };

        if params.name != TOOL_NAME {
            return JsonRpcResponse::failure(
                id,
                protocol::INVALID_PARAMS,
                format!("Unknown tool: {}", params.name),
            );
        }

        let arguments = params.arguments.unwrap_or_else(|| json!({}));
        let message = match arguments.get("message").and_then(Value::as_str) {
            Some(message) if !message.trim().is_empty() => message.to_string(),
            _ => {
                return JsonRpcResponse::failure(
                    id,
                    protocol::INVALID_PARAMS,
                    "tools/call requires a non-empty string argument 'message'",
                )
            }
        };
        let cv_path = arguments
            .get("cv_path")
            .and_then(Value::as_str)
            .map(str::to_string);

        let result = match twin::chat_with_me(&self.state, &message, cv_path.as_deref()).await {
            Ok(reply) => CallToolResult::text(reply),
            Err(error) => {
                warn!("chat_with_me failed: {error}");
                CallToolResult::error(error.to_string())
            }
        };

        self.respond_with(id, result)
    }

    fn respond_with<T: Serialize>(&self, id: Value, result: T) -> JsonRpcResponse {
        match serde_json::to_value(result) {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(error) => JsonRpcResponse::failure(
                id,
                protocol::INTERNAL_ERROR,
                format!("Failed to serialize result: {error}"),
            ),
        }
    }
}

fn initialize_result() -> InitializeResult {
    InitializeResult {
        protocol_version: protocol::PROTOCOL_VERSION,
        capabilities: ServerCapabilities {
            tools: ToolsCapability {},
        },
        server_info: ServerInfo {
            name: SERVER_NAME,
            version: env!("CARGO_PKG_VERSION"),
        },
    }
}

/// Schema and description of the single exposed tool.
fn chat_tool_descriptor() -> ToolDescriptor {
    ToolDescriptor {
        name: TOOL_NAME,
        description: "Chat with the digital twin of the person described by the loaded CV. \
            Optionally pass cv_path on the first call to load a specific PDF.",
        input_schema: json!({
            "type": "object",
            "properties": {
                "message": {
                    "type": "string",
                    "description": "The message or question to ask",
                },
                "cv_path": {
                    "type": "string",
                    "description": "Path to a CV PDF. Only honored before a CV has been loaded.",
                },
            },
            "required": ["message"],
        }),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
