//! Environment-variable configuration layer
//!
//! Reads the process environment, after loading a `.env` file from the
//! working directory when one exists.

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;

use async_trait::async_trait;

use super::file::ConfigFile;
use super::sections::McpServerConfig;
use super::traits::{ConfigError, ConfigProvider, ConfigResult};

pub const OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
pub const PROVIDER: &str = "TOOLRELAY_PROVIDER";
pub const MODEL_NAME: &str = "MODEL_NAME";
pub const STREAM: &str = "TOOLRELAY_STREAM";
pub const MAX_ROUNDS: &str = "TOOLRELAY_MAX_ROUNDS";
pub const MCP_SERVER_NAME: &str = "MCP_SERVER_NAME";
pub const MCP_SERVER_URL: &str = "MCP_SERVER_URL";
pub const MCP_TRANSPORT: &str = "MCP_TRANSPORT";
pub const SYSTEM_PROMPT_FILE: &str = "SYSTEM_PROMPT_FILE";
pub const HOST: &str = "TOOLRELAY_HOST";
pub const PORT: &str = "TOOLRELAY_PORT";

/// Server name used when only `MCP_SERVER_URL` is set
pub const DEFAULT_SERVER_NAME: &str = "default";

type Lookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Configuration layer built from environment variables
pub struct EnvConfigProvider {
    lookup: Lookup,
    load_dotenv: bool,
}

impl EnvConfigProvider {
    /// Read the real process environment (and `.env`)
    pub fn new() -> Self {
        Self {
            lookup: Box::new(|key| std::env::var(key).ok()),
            load_dotenv: true,
        }
    }

    /// Read from a fixed map instead of the process environment
    pub fn from_map(vars: HashMap<String, String>) -> Self {
        Self {
            lookup: Box::new(move |key| vars.get(key).cloned()),
            load_dotenv: false,
        }
    }

    fn var(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parsed<T>(&self, key: &str) -> ConfigResult<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.var(key)
            .map(|raw| {
                raw.parse::<T>()
                    .map_err(|e| ConfigError::invalid(key, format!("{:?}: {}", raw, e)))
            })
            .transpose()
    }

    fn flag(&self, key: &str) -> ConfigResult<Option<bool>> {
        self.var(key)
            .map(|raw| match raw.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => Err(ConfigError::invalid(key, format!("{:?} is not a boolean", raw))),
            })
            .transpose()
    }

    /// Build the layer from the current lookup
    pub fn layer(&self) -> ConfigResult<ConfigFile> {
        let mut config = ConfigFile::default();

        config.llm.provider = self.var(PROVIDER);
        config.llm.api_base = self.var(OPENAI_BASE_URL);

        config.request.model = self.var(MODEL_NAME);
        config.request.stream = self.flag(STREAM)?;
        config.request.max_rounds = self.parsed(MAX_ROUNDS)?;

        if let Some(url) = self.var(MCP_SERVER_URL) {
            let name = self
                .var(MCP_SERVER_NAME)
                .unwrap_or_else(|| DEFAULT_SERVER_NAME.to_string());
            let server = match self.var(MCP_TRANSPORT).map(|t| t.to_lowercase()).as_deref() {
                None | Some("http") => McpServerConfig::http(url),
                Some("sse") => McpServerConfig::sse(url),
                Some(other) => {
                    return Err(ConfigError::invalid(
                        MCP_TRANSPORT,
                        format!("{:?} is not http or sse", other),
                    ))
                }
            };
            config.mcp_servers.insert(name.clone(), server);
            config.default_server = Some(name);
        } else {
            // A bare name selects a server defined in the config file
            config.default_server = self.var(MCP_SERVER_NAME);
        }

        config.system_prompt_file = self.var(SYSTEM_PROMPT_FILE).map(PathBuf::from);

        config.server.host = self.var(HOST);
        config.server.port = self.parsed(PORT)?;

        Ok(config)
    }
}

impl Default for EnvConfigProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EnvConfigProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvConfigProvider")
            .field("load_dotenv", &self.load_dotenv)
            .finish()
    }
}

#[async_trait]
impl ConfigProvider for EnvConfigProvider {
    fn name(&self) -> &str {
        "env"
    }

    async fn load(&self) -> ConfigResult<ConfigFile> {
        if self.load_dotenv {
            // Missing .env is fine; variables already set are kept
            let _ = dotenvy::dotenv();
        }
        self.layer()
    }
}
