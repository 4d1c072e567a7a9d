//! Configuration sections shared by every config source

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// LLM backend connection settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmSection {
    /// Provider id (`openai`, `groq`, `ollama`, `mock`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Custom API base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Explicit API key; normally left to the secret store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// Per-request model parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Stream the final answer fragment by fragment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    /// Upper bound on tool rounds per cycle; unbounded when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rounds: Option<usize>,
}

/// HTTP front end bind settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

/// How to reach one MCP tool host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "transport", rename_all = "lowercase")]
pub enum McpServerConfig {
    /// Spawn the host as a child process and talk over stdio
    Stdio {
        command: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default)]
        env: BTreeMap<String, String>,
    },
    /// Connect to a running host over streamable HTTP
    Http { url: String },
    /// Connect over the legacy SSE transport; `url` is the event stream
    Sse { url: String },
}

impl McpServerConfig {
    /// Create an HTTP server entry
    pub fn http(url: impl Into<String>) -> Self {
        McpServerConfig::Http { url: url.into() }
    }

    pub fn sse(url: impl Into<String>) -> Self {
        McpServerConfig::Sse { url: url.into() }
    }

    /// Create a stdio server entry
    pub fn stdio(command: impl Into<String>, args: Vec<String>) -> Self {
        McpServerConfig::Stdio {
            command: command.into(),
            args,
            env: BTreeMap::new(),
        }
    }

    pub fn transport(&self) -> &'static str {
        match self {
            McpServerConfig::Stdio { .. } => "stdio",
            McpServerConfig::Http { .. } => "http",
            McpServerConfig::Sse { .. } => "sse",
        }
    }
}
