//! Configuration sources and resolution
//!
//! Supports multiple configuration sources:
//! - `FileConfigProvider`: YAML file (user level or explicit path)
//! - `EnvConfigProvider`: environment variables and `.env`
//! - `MemoryConfigProvider`: in-memory for testing
//!
//! `ConfigResolver` layers them into a `ResolvedConfig`.

mod traits;
mod sections;
mod file;
mod env;
mod memory;
mod resolver;

pub use traits::{ConfigProvider, ConfigError, ConfigResult};
pub use sections::{LlmSection, RequestSection, ServerSection, McpServerConfig};
pub use file::{ConfigFile, FileConfigProvider, CONFIG_PATH_ENV};
pub use env::EnvConfigProvider;
pub use memory::MemoryConfigProvider;
pub use resolver::{
    ConfigResolver, ResolvedConfig, LlmSettings, RequestSettings, ServerSettings,
    DEFAULT_SYSTEM_PROMPT,
};

/// Environment variable names read by `EnvConfigProvider`
pub mod vars {
    pub use super::env::{
        OPENAI_BASE_URL, PROVIDER, MODEL_NAME, STREAM, MAX_ROUNDS, MCP_SERVER_NAME,
        MCP_SERVER_URL, SYSTEM_PROMPT_FILE, HOST, PORT, DEFAULT_SERVER_NAME,
    };
}
