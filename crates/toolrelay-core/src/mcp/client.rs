//! MCP Client using the official rmcp SDK
//!
//! Connects to MCP servers over streamable HTTP, the legacy SSE transport,
//! or a child process's stdio.

use std::sync::Arc;

use async_trait::async_trait;
use rmcp::{
    ServiceExt,
    model::{
        CallToolRequestParams, CallToolResult, ClientCapabilities, ClientInfo, Implementation,
        RawContent, Tool,
    },
    service::RunningService,
    Peer, RoleClient,
};
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::Mutex;

use super::sse::SseClientTransport;
use super::traits::{ToolHost, ToolHostConnector};
use crate::config::McpServerConfig;
use crate::logging::{Logger, SharedLogger};
use crate::types::{ToolContent, ToolOutput, ToolSpec};

/// MCP client errors
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Tool call failed: {0}")]
    ToolCallFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

pub type McpResult<T> = Result<T, McpError>;

fn client_info() -> ClientInfo {
    ClientInfo {
        meta: None,
        protocol_version: Default::default(),
        capabilities: ClientCapabilities::default(),
        client_info: Implementation {
            name: "toolrelay".to_string(),
            title: Some("ToolRelay".to_string()),
            version: env!("CARGO_PKG_VERSION").to_string(),
            website_url: None,
            icons: None,
        },
    }
}

/// Session with one MCP tool host
pub struct McpClient {
    /// Configured server name, used in logs
    name: String,
    /// Handle for requests to the host
    peer: Peer<RoleClient>,
    /// The running rmcp service; taken on close
    service: Mutex<Option<RunningService<RoleClient, ClientInfo>>>,
    /// Logger
    logger: Arc<dyn Logger>,
}

impl McpClient {
    /// Connect using a server entry from configuration
    pub async fn connect(
        name: &str,
        config: &McpServerConfig,
        logger: Arc<dyn Logger>,
    ) -> McpResult<Self> {
        match config {
            McpServerConfig::Http { url } => Self::connect_http(name, url, logger).await,
            McpServerConfig::Sse { url } => Self::connect_sse(name, url, logger).await,
            McpServerConfig::Stdio { command, args, env } => {
                let mut cmd = tokio::process::Command::new(command);
                cmd.args(args).envs(env);
                Self::connect_stdio(name, cmd, logger).await
            }
        }
    }

    /// Connect to an MCP server over HTTP (Streamable HTTP transport)
    pub async fn connect_http(
        name: &str,
        url: &str,
        logger: Arc<dyn Logger>,
    ) -> McpResult<Self> {
        use rmcp::transport::StreamableHttpClientTransport;

        logger.info(&format!("[McpClient] Connecting to {} over HTTP: {}", name, url));

        let transport = StreamableHttpClientTransport::from_uri(url);
        let client = client_info()
            .serve(transport)
            .await
            .map_err(|e| McpError::InitializationFailed(e.to_string()))?;

        Ok(Self::started(name, client, logger))
    }

    /// Connect to an MCP server over the legacy SSE transport
    ///
    /// `url` is the host's event stream (`GET`); client messages go to the
    /// endpoint the host announces on it.
    pub async fn connect_sse(
        name: &str,
        url: &str,
        logger: Arc<dyn Logger>,
    ) -> McpResult<Self> {
        logger.info(&format!("[McpClient] Connecting to {} over SSE: {}", name, url));

        let transport = SseClientTransport::connect(url, logger.clone())
            .await
            .map_err(|e| McpError::ConnectionFailed(e.to_string()))?;
        let client = client_info()
            .serve(transport)
            .await
            .map_err(|e| McpError::InitializationFailed(e.to_string()))?;

        Ok(Self::started(name, client, logger))
    }

    /// Spawn an MCP server and talk to it over its stdin/stdout
    pub async fn connect_stdio(
        name: &str,
        command: tokio::process::Command,
        logger: Arc<dyn Logger>,
    ) -> McpResult<Self> {
        use rmcp::transport::TokioChildProcess;

        logger.info(&format!(
            "[McpClient] Spawning {}: {:?}",
            name,
            command.as_std().get_program()
        ));

        let transport = TokioChildProcess::new(command)
            .map_err(|e| McpError::ConnectionFailed(e.to_string()))?;
        let client = client_info()
            .serve(transport)
            .await
            .map_err(|e| McpError::InitializationFailed(e.to_string()))?;

        Ok(Self::started(name, client, logger))
    }

    fn started(
        name: &str,
        client: RunningService<RoleClient, ClientInfo>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        match client.peer_info() {
            Some(info) => logger.info(&format!(
                "[McpClient] Connected to {} ({} {})",
                name, info.server_info.name, info.server_info.version
            )),
            None => logger.info(&format!("[McpClient] Connected to {}", name)),
        }

        Self {
            name: name.to_string(),
            peer: client.peer().clone(),
            service: Mutex::new(Some(client)),
            logger,
        }
    }

    /// Configured server name
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl ToolHost for McpClient {
    async fn list_tools(&self) -> McpResult<Vec<ToolSpec>> {
        let result = self
            .peer
            .list_tools(Default::default())
            .await
            .map_err(|e| McpError::Protocol(e.to_string()))?;

        self.logger.info(&format!(
            "[McpClient] Listed {} tools from {}",
            result.tools.len(),
            self.name
        ));

        Ok(result.tools.iter().map(tool_spec).collect())
    }

    async fn call_tool(&self, name: &str, arguments: Map<String, Value>) -> McpResult<ToolOutput> {
        self.logger.debug(&format!("[McpClient] Calling tool: {}", name));

        let params = CallToolRequestParams {
            meta: None,
            name: name.to_owned().into(),
            arguments: Some(arguments),
            task: None,
        };

        let result = self
            .peer
            .call_tool(params)
            .await
            .map_err(|e| McpError::ToolCallFailed(e.to_string()))?;

        Ok(tool_output(&result))
    }

    async fn close(&self) -> McpResult<()> {
        let Some(service) = self.service.lock().await.take() else {
            return Ok(());
        };
        self.logger.info(&format!("[McpClient] Closing connection to {}", self.name));
        service
            .cancel()
            .await
            .map_err(|e| McpError::Protocol(e.to_string()))?;
        Ok(())
    }
}

/// Opens a fresh `McpClient` session per request
pub struct McpConnector {
    logger: SharedLogger,
}

impl McpConnector {
    pub fn new(logger: SharedLogger) -> Self {
        Self { logger }
    }
}

#[async_trait]
impl ToolHostConnector for McpConnector {
    async fn connect(&self, name: &str, config: &McpServerConfig) -> McpResult<Arc<dyn ToolHost>> {
        let client = McpClient::connect(name, config, self.logger.clone()).await?;
        Ok(Arc::new(client))
    }
}

fn tool_spec(tool: &Tool) -> ToolSpec {
    ToolSpec {
        name: tool.name.to_string(),
        description: tool.description.as_ref().map(|d| d.to_string()),
        input_schema: Value::Object(tool.input_schema.as_ref().clone()),
    }
}

fn tool_output(result: &CallToolResult) -> ToolOutput {
    let content = result
        .content
        .iter()
        .map(|c| match &c.raw {
            RawContent::Text(t) => ToolContent::text(t.text.clone()),
            RawContent::Image(_) => ToolContent::Other { kind: "image".to_string() },
            RawContent::Resource(_) => ToolContent::Other { kind: "resource".to_string() },
            _ => ToolContent::Other { kind: "other".to_string() },
        })
        .collect();

    ToolOutput {
        is_error: result.is_error.unwrap_or(false),
        content,
    }
}
