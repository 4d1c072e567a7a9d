//! Configuration provider trait

use async_trait::async_trait;

use super::file::ConfigFile;

/// A source of configuration
///
/// Each source yields a partial `ConfigFile`; `ConfigResolver` layers them
/// in order, later sources overriding earlier ones.
///
/// Implementations:
/// - `FileConfigProvider`: YAML file (~/.config/toolrelay/config.yaml)
/// - `EnvConfigProvider`: process environment and `.env`
/// - `MemoryConfigProvider`: in-memory, for tests
#[async_trait]
pub trait ConfigProvider: Send + Sync {
    /// Human-readable name of the source
    fn name(&self) -> &str;

    /// Load this source's layer
    async fn load(&self) -> ConfigResult<ConfigFile>;
}

/// Errors that can occur during configuration operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration: {field} (set {hint})")]
    Missing { field: &'static str, hint: &'static str },

    #[error("Unknown MCP server: {0}")]
    UnknownServer(String),

    #[error("Invalid value for {key}: {message}")]
    Invalid { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ConfigError {
    pub fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.into(),
            message: message.into(),
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
