//! MCP (Model Context Protocol) client module
//!
//! Uses the official rmcp SDK to connect to tool hosts over streamable HTTP,
//! the legacy SSE transport, or a spawned child process. rmcp no longer
//! ships an SSE client, so `SseClientTransport` implements its `Transport`
//! trait here.
//!
//! # Example
//!
//! ```rust,ignore
//! use toolrelay_core::mcp::{McpClient, ToolHost};
//! use toolrelay_core::config::McpServerConfig;
//!
//! let config = McpServerConfig::http("http://localhost:3001/mcp");
//! let client = McpClient::connect("unicorns", &config, logger).await?;
//!
//! let tools = client.list_tools().await?;
//! let output = client.call_tool("query", args).await?;
//! client.close().await?;
//! ```

mod traits;
mod client;
mod mock;
mod sse;

pub use traits::{ToolHost, ToolHostConnector};
pub use client::{McpClient, McpConnector, McpError, McpResult};
pub use sse::{SseClientTransport, SseTransportError};
pub use mock::MockToolHost;
