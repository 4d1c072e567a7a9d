//! ToolRelay Core
//!
//! Bridges a chat-completions LLM and the tools of an MCP server.
//!
//! ## Tool Orchestration
//!
//! ```rust,ignore
//! use toolrelay_core::{McpClient, ToolCatalog, Orchestrator, RunSettings, ChatMessage};
//!
//! let client = Arc::new(McpClient::connect("unicorns", &server, logger.clone()).await?);
//! let catalog = Arc::new(ToolCatalog::new(client.clone(), logger.clone()));
//! catalog.activate().await?;
//!
//! let orchestrator = Orchestrator::new(provider, catalog, RunSettings::new("gpt-4o-mini"), logger);
//! let mut conversation = vec![ChatMessage::system(prompt), ChatMessage::user(question)];
//! let outcome = orchestrator.run(&mut conversation).await?;
//! ```

pub mod types;
pub mod secrets;
pub mod logging;
pub mod config;
pub mod providers;
pub mod mcp;
pub mod tools;
pub mod orchestrator;

// Re-export commonly used types
pub use types::{
    ChatCompletion, ChatMessage, FinishReason, MessageRole, StreamChunk, ToolCallRequest,
    ToolChoice, ToolContent, ToolDescriptor, ToolOutput, ToolResult, ToolSpec,
};

pub use secrets::{SecretStore, SecretStoreError, SecretStoreResult, EnvSecretStore, MemorySecretStore};

pub use logging::{Logger, SharedLogger, LogLevel, NoOpLogger, ConsoleLogger};

pub use config::{
    ConfigProvider, ConfigError, ConfigResult, ConfigResolver, ResolvedConfig, McpServerConfig,
};

pub use providers::{create_provider, ChatOptions, Provider, ProviderError, ProviderResult};

pub use mcp::{McpClient, McpConnector, McpError, McpResult, ToolHost, ToolHostConnector};

pub use tools::{ToolCatalog, CatalogError, CatalogResult};

pub use orchestrator::{
    Orchestrator, OrchestratorError, OrchestratorResult, RunSettings, RunOutcome, FinalAnswer,
    FragmentSink, ConsoleSink, ChannelSink, NullSink, RelayEvent,
};
