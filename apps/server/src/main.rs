mod config;
mod cv;
mod errors;
mod llm_client;
mod mcp;
mod state;
mod twin;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, Transport};
use crate::cv::CvStore;
use crate::llm_client::OpenAiClient;
use crate::mcp::http::build_router;
use crate::mcp::server::McpServer;
use crate::mcp::stdio::serve_stdio;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on a missing API key)
    let config = Config::from_env()?;

    // Structured logging on stderr; stdout belongs to the stdio transport
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting CV digital twin server v{}", env!("CARGO_PKG_VERSION"));

    let llm = Arc::new(OpenAiClient::new(
        config.openai_api_key.clone(),
        config.openai_model.clone(),
    ));
    info!("LLM client initialized (model: {})", config.openai_model);

    let cv = Arc::new(CvStore::with_default_backends(config.cv_docs_dir.clone()));

    // Optional eager load; a CLI argument wins over CV_PATH. Failure is
    // logged, not fatal: the tool accepts a corrected path later.
    let startup_path = std::env::args().nth(1).or_else(|| config.cv_path.clone());
    if let Some(path) = startup_path {
        match cv.ensure_loaded(Some(&path)).await {
            Ok(document) => info!(
                "CV preloaded: {} ({} chars)",
                document.metadata.file_name, document.metadata.content_length
            ),
            Err(error) => warn!("CV preload failed: {error}"),
        }
    }

    let state = AppState {
        cv,
        llm,
        config: config.clone(),
    };

    match config.transport {
        Transport::Stdio => serve_stdio(state).await,
        Transport::Http => serve_http(state, config.port).await,
    }
}

async fn serve_http(state: AppState, port: u16) -> Result<()> {
    let app = build_router(McpServer::new(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{port}").parse()?;
    info!("MCP server listening on http://{addr}/mcp");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
