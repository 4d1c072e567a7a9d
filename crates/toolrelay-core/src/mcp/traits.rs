//! Tool host abstraction

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::client::McpResult;
use crate::config::McpServerConfig;
use crate::types::{ToolOutput, ToolSpec};

/// Something that advertises tools and runs them
///
/// `McpClient` is the real implementation; `MockToolHost` serves tests.
#[async_trait]
pub trait ToolHost: Send + Sync {
    /// Fetch the advertised tools
    async fn list_tools(&self) -> McpResult<Vec<ToolSpec>>;

    /// Run a tool with an argument object
    async fn call_tool(&self, name: &str, arguments: Map<String, Value>) -> McpResult<ToolOutput>;

    /// End the session; later calls are no-ops
    async fn close(&self) -> McpResult<()> {
        Ok(())
    }
}

/// Opens tool host sessions from configuration
///
/// The HTTP front end opens one session per request through this.
#[async_trait]
pub trait ToolHostConnector: Send + Sync {
    async fn connect(&self, name: &str, config: &McpServerConfig) -> McpResult<Arc<dyn ToolHost>>;
}
