use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::llm_client;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_model: String,
    /// CV to load eagerly at startup. A positional CLI argument overrides it.
    pub cv_path: Option<String>,
    /// Directory scanned for a CV when a call arrives with no path and
    /// nothing is cached. Unset disables discovery.
    pub cv_docs_dir: Option<PathBuf>,
    pub transport: Transport,
    pub port: u16,
    pub rust_log: String,
}

/// How the MCP surface is served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// One JSON-RPC message per line on stdin/stdout. Logs go to stderr.
    Stdio,
    /// `POST /mcp` plus a `GET /health` probe.
    Http,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openai_api_key: require_env("OPENAI_API_KEY")?,
            openai_model: std::env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| llm_client::DEFAULT_MODEL.to_string()),
            cv_path: std::env::var("CV_PATH").ok(),
            cv_docs_dir: std::env::var("CV_DOCS_DIR").ok().map(PathBuf::from),
            transport: parse_transport(
                &std::env::var("MCP_TRANSPORT").unwrap_or_else(|_| "stdio".to_string()),
            )?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn parse_transport(value: &str) -> Result<Transport> {
    match value.to_ascii_lowercase().as_str() {
        "stdio" => Ok(Transport::Stdio),
        "http" => Ok(Transport::Http),
        other => bail!("MCP_TRANSPORT must be 'stdio' or 'http', got '{other}'"),
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
