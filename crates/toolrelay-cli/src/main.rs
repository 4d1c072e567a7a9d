//! ToolRelay interactive chat
//!
//! Connects to one MCP server, loads its tools and answers questions typed
//! at the `You: ` prompt until `exit` or `quit`.

mod repl;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use toolrelay_core::{
    create_provider, ChatMessage, ConfigResolver, ConsoleLogger, ConsoleSink, EnvSecretStore,
    LogLevel, McpClient, Orchestrator, RunSettings, SharedLogger, ToolCatalog, ToolHost,
};

/// Level used when `TOOLRELAY_LOG_LEVEL` is unset; info shows each tool query
const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Info;

#[derive(Debug, Parser)]
#[command(name = "toolrelay", version, about = "Chat with an LLM that can call MCP tools")]
struct Args {
    /// Config file (defaults to ~/.config/toolrelay/config.yaml)
    #[arg(short, long, env = "TOOLRELAY_CONFIG")]
    config: Option<PathBuf>,

    /// MCP server to use, by name
    #[arg(short, long)]
    server: Option<String>,

    /// Model to use instead of the configured one
    #[arg(short, long)]
    model: Option<String>,

    /// Print each answer once it is complete instead of streaming it
    #[arg(long)]
    no_stream: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    let logger: SharedLogger = Arc::new(
        ConsoleLogger::with_prefix("[toolrelay]")
            .with_min_level(DEFAULT_LOG_LEVEL)
            .with_env_level(),
    );

    let config = ConfigResolver::standard(args.config).resolve().await?;
    let provider = create_provider(&config.llm, &EnvSecretStore::new(), logger.clone())?;
    let (server_name, server) = config.select_server(args.server.as_deref())?;
    let model = config.model(args.model.as_deref())?;

    let client = Arc::new(
        McpClient::connect(&server_name, &server, logger.clone())
            .await
            .with_context(|| format!("connecting to MCP server '{}'", server_name))?,
    );
    let catalog = Arc::new(ToolCatalog::new(client.clone(), logger.clone()));
    catalog.activate().await?;

    let settings = RunSettings::from_request(&config.request, model);
    let settings = if args.no_stream { settings.with_stream(false) } else { settings };
    let orchestrator = Orchestrator::new(provider, catalog, settings, logger.clone())
        .with_sink(Arc::new(ConsoleSink));

    let mut conversation = vec![ChatMessage::system(config.system_prompt.clone())];
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();

    let result = repl::run(&orchestrator, &mut conversation, stdin, &mut stdout, &logger).await;

    drop(orchestrator);
    client.close().await?;

    result.context("terminal I/O failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level_shows_tool_queries() {
        let logger = ConsoleLogger::with_prefix("[toolrelay]").with_min_level(DEFAULT_LOG_LEVEL);
        assert!(logger.enabled(LogLevel::Info));
        assert!(!logger.enabled(LogLevel::Debug));
    }

    #[test]
    fn test_args() {
        let args = Args::parse_from(["toolrelay", "--server", "unicorns", "--no-stream"]);
        assert_eq!(args.server.as_deref(), Some("unicorns"));
        assert!(args.no_stream);
        assert_eq!(args.model, None);
    }
}
