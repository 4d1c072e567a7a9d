//! File-based configuration provider (YAML)
//!
//! Default location is the user config dir (~/.config/toolrelay/config.yaml).

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::sections::{LlmSection, McpServerConfig, RequestSection, ServerSection};
use super::traits::{ConfigProvider, ConfigResult};

/// Environment variable that overrides the config file location
pub const CONFIG_PATH_ENV: &str = "TOOLRELAY_CONFIG";

/// Configuration file structure; also the partial layer every source yields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub llm: LlmSection,

    #[serde(default)]
    pub request: RequestSection,

    /// Tool hosts by name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub mcp_servers: BTreeMap<String, McpServerConfig>,

    /// Which entry of `mcp_servers` to use
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_server: Option<String>,

    /// Inline system prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// File holding the system prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt_file: Option<PathBuf>,

    #[serde(default)]
    pub server: ServerSection,
}

fn take<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

impl ConfigFile {
    /// Layer `other` on top of `self`
    ///
    /// Set values in `other` win. Servers are merged by name. A layer that
    /// sets either prompt field replaces both, so a prompt file from the
    /// environment beats an inline prompt from the YAML file.
    pub fn merge(&mut self, other: ConfigFile) {
        take(&mut self.llm.provider, other.llm.provider);
        take(&mut self.llm.api_base, other.llm.api_base);
        take(&mut self.llm.api_key, other.llm.api_key);

        take(&mut self.request.model, other.request.model);
        take(&mut self.request.stream, other.request.stream);
        take(&mut self.request.temperature, other.request.temperature);
        take(&mut self.request.max_tokens, other.request.max_tokens);
        take(&mut self.request.top_p, other.request.top_p);
        take(&mut self.request.max_rounds, other.request.max_rounds);

        self.mcp_servers.extend(other.mcp_servers);
        take(&mut self.default_server, other.default_server);

        if other.system_prompt.is_some() || other.system_prompt_file.is_some() {
            self.system_prompt = other.system_prompt;
            self.system_prompt_file = other.system_prompt_file;
        }

        take(&mut self.server.host, other.server.host);
        take(&mut self.server.port, other.server.port);
    }
}

/// File-based configuration provider
///
/// A missing file is an empty layer, not an error.
///
/// # Example
///
/// ```no_run
/// use toolrelay_core::config::FileConfigProvider;
///
/// let user_config = FileConfigProvider::user();
/// let explicit = FileConfigProvider::new("./toolrelay.yaml");
/// ```
pub struct FileConfigProvider {
    path: PathBuf,
}

impl FileConfigProvider {
    /// Create a new file config provider for a specific path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The user-level config file, honouring `TOOLRELAY_CONFIG`
    pub fn user() -> Self {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            if !path.is_empty() {
                return Self::new(path);
            }
        }
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config"));
        Self::new(config_dir.join("toolrelay").join("config.yaml"))
    }

    /// Check if the config file exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn read(&self) -> ConfigResult<ConfigFile> {
        if !self.exists() {
            return Ok(ConfigFile::default());
        }

        let content = fs::read_to_string(&self.path)?;
        let mut config: ConfigFile = if content.trim().is_empty() {
            ConfigFile::default()
        } else {
            serde_yaml::from_str(&content)?
        };

        // Prompt files are relative to the config file
        if let Some(prompt_path) = config.system_prompt_file.take() {
            let resolved = match self.path.parent() {
                Some(dir) if prompt_path.is_relative() => dir.join(prompt_path),
                _ => prompt_path,
            };
            config.system_prompt_file = Some(resolved);
        }

        Ok(config)
    }
}

impl std::fmt::Debug for FileConfigProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileConfigProvider")
            .field("path", &self.path)
            .field("exists", &self.exists())
            .finish()
    }
}

#[async_trait]
impl ConfigProvider for FileConfigProvider {
    fn name(&self) -> &str {
        "file"
    }

    async fn load(&self) -> ConfigResult<ConfigFile> {
        self.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_file_is_empty_layer() {
        let dir = tempdir().unwrap();
        let provider = FileConfigProvider::new(dir.path().join("config.yaml"));

        assert!(!provider.exists());
        assert_eq!(provider.load().await.unwrap(), ConfigFile::default());
    }

    #[tokio::test]
    async fn test_yaml_format() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            r#"
llm:
  provider: openai
request:
  model: gpt-4o-mini
  stream: true
  temperature: 0.2
mcp_servers:
  unicorns:
    transport: http
    url: http://localhost:3001/mcp
  local:
    transport: stdio
    command: node
    args: ["dist/index.js"]
default_server: unicorns
system_prompt_file: prompts/unicorns.txt
server:
  port: 8080
"#,
        )
        .unwrap();

        let provider = FileConfigProvider::new(&path);
        let config = provider.load().await.unwrap();

        assert_eq!(config.llm.provider.as_deref(), Some("openai"));
        assert_eq!(config.request.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(config.request.stream, Some(true));
        assert_eq!(config.mcp_servers.len(), 2);
        assert_eq!(
            config.mcp_servers.get("unicorns"),
            Some(&McpServerConfig::http("http://localhost:3001/mcp"))
        );
        assert_eq!(config.default_server.as_deref(), Some("unicorns"));
        assert_eq!(
            config.system_prompt_file,
            Some(dir.path().join("prompts/unicorns.txt"))
        );
        assert_eq!(config.server.port, Some(8080));
    }

    #[tokio::test]
    async fn test_load_reads_current_contents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let provider = FileConfigProvider::new(&path);

        fs::write(&path, "request:\n  model: gpt-4o\n").unwrap();
        assert_eq!(provider.load().await.unwrap().request.model.as_deref(), Some("gpt-4o"));

        fs::write(&path, "").unwrap();
        assert_eq!(provider.load().await.unwrap(), ConfigFile::default());

        fs::write(&path, "request: [unclosed").unwrap();
        assert!(matches!(provider.load().await, Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_merge_prefers_later_layer() {
        let mut base = ConfigFile::default();
        base.llm.provider = Some("openai".to_string());
        base.request.model = Some("gpt-4o".to_string());
        base.system_prompt = Some("inline".to_string());
        base.mcp_servers
            .insert("a".to_string(), McpServerConfig::http("http://a"));

        let mut overlay = ConfigFile::default();
        overlay.request.model = Some("gpt-4o-mini".to_string());
        overlay.system_prompt_file = Some(PathBuf::from("/tmp/prompt.txt"));
        overlay
            .mcp_servers
            .insert("b".to_string(), McpServerConfig::http("http://b"));

        base.merge(overlay);

        assert_eq!(base.llm.provider.as_deref(), Some("openai"));
        assert_eq!(base.request.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(base.system_prompt, None);
        assert_eq!(base.system_prompt_file, Some(PathBuf::from("/tmp/prompt.txt")));
        assert_eq!(base.mcp_servers.len(), 2);
    }
}
