//! Stdio transport: one JSON-RPC message per line.
//!
//! Stdout is reserved for protocol traffic. All logging goes to stderr
//! (the fmt layer is pointed there in `main`).

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

use crate::mcp::server::McpServer;
use crate::state::AppState;

pub async fn serve_stdio(state: AppState) -> Result<()> {
    let server = McpServer::new(state);
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let mut lines = stdin.lines();

    info!("MCP server listening on stdio");

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        if let Some(response) = server.handle_message(&line).await {
            let payload = serde_json::to_string(&response)?;
            stdout.write_all(payload.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }
    }

    info!("stdin closed, shutting down");
    Ok(())
}
