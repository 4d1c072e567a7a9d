//! ToolRelay HTTP server
//!
//! `POST /api/chat` with `{"query": "...", "model_name": "..."}` streams the
//! answer back as server-sent events.

mod routes;
mod sse;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use toolrelay_core::{ConfigResolver, ConsoleLogger, EnvSecretStore, McpConnector, SharedLogger};

use routes::{router, AppState};

#[derive(Debug, Parser)]
#[command(name = "toolrelay-server", version, about = "Stream LLM answers backed by MCP tools over HTTP")]
struct Args {
    /// Config file (defaults to ~/.config/toolrelay/config.yaml)
    #[arg(short, long, env = "TOOLRELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Bind host, overriding configuration
    #[arg(long)]
    host: Option<String>,

    /// Bind port, overriding configuration
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    let logger: SharedLogger = Arc::new(ConsoleLogger::with_prefix("[toolrelay-server]").with_env_level());

    let mut config = ConfigResolver::standard(args.config).resolve().await?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    logger.debug(&format!("Configuration sources: {}", config.sources.join(", ")));

    let addr = config.server.addr();
    let state = AppState {
        config: Arc::new(config),
        secrets: Arc::new(EnvSecretStore::new()),
        connector: Arc::new(McpConnector::new(logger.clone())),
        logger: logger.clone(),
    };

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    logger.info(&format!("Listening on http://{}", addr));

    axum::serve(listener, router(state)).await?;

    Ok(())
}
