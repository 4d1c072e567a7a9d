//! Layered configuration resolution
//!
//! Sources are applied in order, later ones overriding earlier ones. The
//! standard chain is the YAML file followed by the environment.

use std::collections::BTreeMap;
use std::path::PathBuf;

use super::env::EnvConfigProvider;
use super::file::{ConfigFile, FileConfigProvider};
use super::sections::McpServerConfig;
use super::traits::{ConfigError, ConfigProvider, ConfigResult};

/// Prompt used when none is configured
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant. Use the available tools \
to look up information before answering, and answer from the tool results.";

/// Resolved LLM connection settings
#[derive(Debug, Clone, PartialEq)]
pub struct LlmSettings {
    pub provider: String,
    pub api_base: Option<String>,
    pub api_key: Option<String>,
}

/// Resolved request parameters
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSettings {
    pub model: Option<String>,
    pub stream: bool,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f32>,
    pub max_rounds: Option<usize>,
}

/// HTTP front end bind address
#[derive(Debug, Clone, PartialEq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Fully resolved configuration
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub llm: LlmSettings,
    pub request: RequestSettings,
    pub mcp_servers: BTreeMap<String, McpServerConfig>,
    pub default_server: Option<String>,
    pub system_prompt: String,
    pub server: ServerSettings,
    /// Names of the sources that were applied, in order
    pub sources: Vec<String>,
}

impl ResolvedConfig {
    /// Pick the tool host to connect to
    ///
    /// An explicit name wins, then `default_server`, then the only
    /// configured server.
    pub fn select_server(&self, name: Option<&str>) -> ConfigResult<(String, McpServerConfig)> {
        let wanted = name.map(str::to_string).or_else(|| self.default_server.clone());

        if let Some(wanted) = wanted {
            return self
                .mcp_servers
                .get(&wanted)
                .map(|config| (wanted.clone(), config.clone()))
                .ok_or(ConfigError::UnknownServer(wanted));
        }

        let mut servers = self.mcp_servers.iter();
        match (servers.next(), servers.next()) {
            (Some((name, config)), None) => Ok((name.clone(), config.clone())),
            _ => Err(ConfigError::Missing {
                field: "mcp_servers",
                hint: "MCP_SERVER_NAME/MCP_SERVER_URL",
            }),
        }
    }

    /// Model to use, with an optional per-request override
    pub fn model(&self, requested: Option<&str>) -> ConfigResult<String> {
        requested
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .or_else(|| self.request.model.clone())
            .ok_or(ConfigError::Missing {
                field: "model",
                hint: "MODEL_NAME",
            })
    }
}

/// Applies configuration sources in order
pub struct ConfigResolver {
    sources: Vec<Box<dyn ConfigProvider>>,
}

impl ConfigResolver {
    /// Empty resolver; resolves to defaults only
    pub fn new() -> Self {
        Self { sources: Vec::new() }
    }

    /// Append a source, overriding everything added before it
    pub fn with_source(mut self, source: impl ConfigProvider + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// YAML file (explicit path, `TOOLRELAY_CONFIG`, or user config) then environment
    pub fn standard(path: Option<PathBuf>) -> Self {
        let file = match path {
            Some(path) => FileConfigProvider::new(path),
            None => FileConfigProvider::user(),
        };
        Self::new()
            .with_source(file)
            .with_source(EnvConfigProvider::new())
    }

    /// Merge every source and fill in defaults
    pub async fn resolve(&self) -> ConfigResult<ResolvedConfig> {
        let mut merged = ConfigFile::default();
        let mut applied = Vec::with_capacity(self.sources.len());

        for source in &self.sources {
            merged.merge(source.load().await?);
            applied.push(source.name().to_string());
        }

        let system_prompt = match (merged.system_prompt, merged.system_prompt_file) {
            (Some(prompt), _) => prompt,
            (None, Some(path)) => std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::invalid("system_prompt_file", format!("{}: {}", path.display(), e)))?
                .trim_end()
                .to_string(),
            (None, None) => DEFAULT_SYSTEM_PROMPT.to_string(),
        };

        Ok(ResolvedConfig {
            llm: LlmSettings {
                provider: merged.llm.provider.unwrap_or_else(|| "openai".to_string()),
                api_base: merged.llm.api_base,
                api_key: merged.llm.api_key,
            },
            request: RequestSettings {
                model: merged.request.model,
                stream: merged.request.stream.unwrap_or(true),
                temperature: merged.request.temperature,
                max_tokens: merged.request.max_tokens,
                top_p: merged.request.top_p,
                max_rounds: merged.request.max_rounds,
            },
            mcp_servers: merged.mcp_servers,
            default_server: merged.default_server,
            system_prompt,
            server: ServerSettings {
                host: merged.server.host.unwrap_or_else(|| "0.0.0.0".to_string()),
                port: merged.server.port.unwrap_or(8000),
            },
            sources: applied,
        })
    }
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryConfigProvider;
    use std::fs;
    use tempfile::tempdir;

    fn layer(f: impl FnOnce(&mut ConfigFile)) -> MemoryConfigProvider {
        let mut config = ConfigFile::default();
        f(&mut config);
        MemoryConfigProvider::new(config)
    }

    #[tokio::test]
    async fn test_defaults() {
        let resolved = ConfigResolver::new().resolve().await.unwrap();

        assert_eq!(resolved.llm.provider, "openai");
        assert!(resolved.request.stream);
        assert_eq!(resolved.request.max_rounds, None);
        assert_eq!(resolved.system_prompt, DEFAULT_SYSTEM_PROMPT);
        assert_eq!(resolved.server.addr(), "0.0.0.0:8000");
        assert!(resolved.sources.is_empty());
    }

    #[tokio::test]
    async fn test_later_sources_win() {
        let resolved = ConfigResolver::new()
            .with_source(layer(|c| {
                c.request.model = Some("gpt-4o".to_string());
                c.request.stream = Some(false);
            }))
            .with_source(layer(|c| c.request.model = Some("gpt-4o-mini".to_string())))
            .resolve()
            .await
            .unwrap();

        assert_eq!(resolved.request.model.as_deref(), Some("gpt-4o-mini"));
        assert!(!resolved.request.stream);
        assert_eq!(resolved.sources, vec!["memory", "memory"]);
    }

    #[tokio::test]
    async fn test_prompt_file_is_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prompt.txt");
        fs::write(&path, "Only talk about unicorns.\n").unwrap();

        let resolved = ConfigResolver::new()
            .with_source(layer(|c| c.system_prompt_file = Some(path.clone())))
            .resolve()
            .await
            .unwrap();
        assert_eq!(resolved.system_prompt, "Only talk about unicorns.");
    }

    #[tokio::test]
    async fn test_missing_prompt_file() {
        let err = ConfigResolver::new()
            .with_source(layer(|c| c.system_prompt_file = Some(PathBuf::from("/nonexistent/prompt.txt"))))
            .resolve()
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[tokio::test]
    async fn test_select_server() {
        let resolved = ConfigResolver::new()
            .with_source(layer(|c| {
                c.mcp_servers.insert("a".to_string(), McpServerConfig::http("http://a/mcp"));
            }))
            .resolve()
            .await
            .unwrap();

        // Single server is picked implicitly
        assert_eq!(resolved.select_server(None).unwrap().0, "a");
        assert!(matches!(
            resolved.select_server(Some("b")),
            Err(ConfigError::UnknownServer(name)) if name == "b"
        ));

        let resolved = ConfigResolver::new()
            .with_source(layer(|c| {
                c.mcp_servers.insert("a".to_string(), McpServerConfig::http("http://a/mcp"));
                c.mcp_servers.insert("b".to_string(), McpServerConfig::http("http://b/mcp"));
            }))
            .resolve()
            .await
            .unwrap();
        assert!(matches!(resolved.select_server(None), Err(ConfigError::Missing { .. })));
        assert_eq!(resolved.select_server(Some("b")).unwrap().1, McpServerConfig::http("http://b/mcp"));

        let empty = ConfigResolver::new().resolve().await.unwrap();
        assert!(matches!(empty.select_server(None), Err(ConfigError::Missing { field: "mcp_servers", .. })));
    }

    #[tokio::test]
    async fn test_model_override() {
        let resolved = ConfigResolver::new()
            .with_source(layer(|c| c.request.model = Some("gpt-4o".to_string())))
            .resolve()
            .await
            .unwrap();
        assert_eq!(resolved.model(None).unwrap(), "gpt-4o");
        assert_eq!(resolved.model(Some("gpt-4o-mini")).unwrap(), "gpt-4o-mini");
        assert_eq!(resolved.model(Some("  ")).unwrap(), "gpt-4o");

        let bare = ConfigResolver::new().resolve().await.unwrap();
        assert!(matches!(bare.model(None), Err(ConfigError::Missing { hint: "MODEL_NAME", .. })));
    }
}
