//! HTTP transport: the MCP surface behind `POST /mcp`, plus a health probe.

use axum::{
    extract::State,
    http::{header::HeaderName, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::mcp::server::{McpServer, SERVER_NAME};

pub const SESSION_ID_HEADER: &str = "mcp-session-id";

pub fn build_router(server: McpServer) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/mcp", post(mcp_handler))
        .with_state(server)
}

/// GET /health
/// Service identity plus whether a CV is loaded.
async fn health_handler(State(server): State<McpServer>) -> Json<Value> {
    let loaded = server.state().cv.loaded();
    Json(json!({
        "status": "ok",
        "service": SERVER_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "model": server.state().config.openai_model,
        "cv_loaded": loaded.is_some(),
        "cv_file": loaded.as_ref().map(|document| document.metadata.file_name.clone()),
        "cv_loaded_at": loaded.as_ref().map(|document| document.metadata.loaded_at.to_rfc3339()),
    }))
}

/// POST /mcp
/// One JSON-RPC message per request body. Notifications get 202 with no
/// body. A fresh session id is minted on `initialize`.
async fn mcp_handler(State(server): State<McpServer>, body: String) -> Response {
    let is_initialize = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|value| value.get("method").and_then(Value::as_str).map(str::to_string))
        .is_some_and(|method| method == "initialize");

    match server.handle_message(&body).await {
        Some(response) => {
            let mut headers = HeaderMap::new();
            if is_initialize {
                if let Ok(session) = Uuid::new_v4().to_string().parse() {
                    headers.insert(HeaderName::from_static(SESSION_ID_HEADER), session);
                }
            }
            (StatusCode::OK, headers, Json(response)).into_response()
        }
        None => StatusCode::ACCEPTED.into_response(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
