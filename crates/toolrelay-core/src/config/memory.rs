//! In-memory configuration provider

use async_trait::async_trait;
use parking_lot::RwLock;

use super::file::ConfigFile;
use super::traits::{ConfigProvider, ConfigResult};

/// In-memory configuration layer for tests and embedders
#[derive(Debug, Default)]
pub struct MemoryConfigProvider {
    config: RwLock<ConfigFile>,
}

impl MemoryConfigProvider {
    pub fn new(config: ConfigFile) -> Self {
        Self {
            config: RwLock::new(config),
        }
    }

    /// Replace the held layer
    pub fn set(&self, config: ConfigFile) {
        *self.config.write() = config;
    }
}

#[async_trait]
impl ConfigProvider for MemoryConfigProvider {
    fn name(&self) -> &str {
        "memory"
    }

    async fn load(&self) -> ConfigResult<ConfigFile> {
        Ok(self.config.read().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_config_provider() {
        let provider = MemoryConfigProvider::default();
        assert_eq!(provider.load().await.unwrap(), ConfigFile::default());

        let mut config = ConfigFile::default();
        config.request.model = Some("gpt-4o".to_string());
        provider.set(config.clone());

        assert_eq!(provider.load().await.unwrap(), config);
    }
}
