//! In-process tool host for tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Map, Value};

use super::client::{McpError, McpResult};
use super::traits::ToolHost;
use crate::types::{ToolOutput, ToolSpec};

/// Scripted tool host
///
/// Unknown tools answer with a host-reported error, the way MCP servers do.
#[derive(Default)]
pub struct MockToolHost {
    tools: Vec<ToolSpec>,
    outputs: HashMap<String, ToolOutput>,
    fail_listing: Option<String>,
    fail_calls: Option<String>,
    list_count: AtomicUsize,
    closed: AtomicBool,
    calls: Mutex<Vec<(String, Map<String, Value>)>>,
}

impl MockToolHost {
    pub fn new(tools: Vec<ToolSpec>) -> Self {
        Self {
            tools,
            ..Default::default()
        }
    }

    /// Set what a tool returns
    pub fn with_output(mut self, tool: impl Into<String>, output: ToolOutput) -> Self {
        self.outputs.insert(tool.into(), output);
        self
    }

    /// Make `list_tools` fail
    pub fn failing_listing(mut self, message: impl Into<String>) -> Self {
        self.fail_listing = Some(message.into());
        self
    }

    /// Make every `call_tool` fail at the transport level
    pub fn failing_calls(mut self, message: impl Into<String>) -> Self {
        self.fail_calls = Some(message.into());
        self
    }

    /// How many times the tools were listed
    pub fn list_count(&self) -> usize {
        self.list_count.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Calls received, in order
    pub fn calls(&self) -> Vec<(String, Map<String, Value>)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ToolHost for MockToolHost {
    async fn list_tools(&self) -> McpResult<Vec<ToolSpec>> {
        self.list_count.fetch_add(1, Ordering::SeqCst);
        match &self.fail_listing {
            Some(message) => Err(McpError::Protocol(message.clone())),
            None => Ok(self.tools.clone()),
        }
    }

    async fn call_tool(&self, name: &str, arguments: Map<String, Value>) -> McpResult<ToolOutput> {
        self.calls.lock().push((name.to_string(), arguments));
        if let Some(message) = &self.fail_calls {
            return Err(McpError::ToolCallFailed(message.clone()));
        }
        Ok(self
            .outputs
            .get(name)
            .cloned()
            .unwrap_or_else(|| ToolOutput::error(format!("Unknown tool: {}", name))))
    }

    async fn close(&self) -> McpResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
