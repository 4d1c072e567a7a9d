//! Tool catalog backed by a tool host session

use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::logging::Logger;
use crate::mcp::ToolHost;
use crate::types::{ToolDescriptor, ToolSpec};

/// Tool catalog errors
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Tool catalog used before activation")]
    NotActivated,

    #[error("Tool catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("Tool '{tool}' failed: {message}")]
    ToolExecution { tool: String, message: String },
}

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug)]
struct Loaded {
    specs: Vec<ToolSpec>,
    descriptors: Vec<ToolDescriptor>,
}

/// Tools advertised by one host, loaded once per session
///
/// The tool list is read-only after activation and can be shared across
/// tasks behind an `Arc`.
pub struct ToolCatalog {
    host: Arc<dyn ToolHost>,
    loaded: OnceCell<Loaded>,
    logger: Arc<dyn Logger>,
}

impl ToolCatalog {
    pub fn new(host: Arc<dyn ToolHost>, logger: Arc<dyn Logger>) -> Self {
        Self {
            host,
            loaded: OnceCell::new(),
            logger,
        }
    }

    /// Fetch and cache the tool list
    ///
    /// Concurrent callers share a single fetch. After a failure the cell
    /// stays empty, so activation can be retried.
    pub async fn activate(&self) -> CatalogResult<()> {
        self.loaded
            .get_or_try_init(|| async {
                let specs = self.host.list_tools().await.map_err(|e| {
                    self.logger.error(&format!("[ToolCatalog] Failed to fetch tools: {}", e));
                    CatalogError::CatalogUnavailable(e.to_string())
                })?;
                let descriptors = specs.iter().map(ToolSpec::descriptor).collect();

                self.logger.info(&format!(
                    "[ToolCatalog] Activated with {} tools: {}",
                    specs.len(),
                    specs.iter().map(|s| s.name.as_str()).collect::<Vec<_>>().join(", ")
                ));
                Ok::<_, CatalogError>(Loaded { specs, descriptors })
            })
            .await?;
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.loaded.initialized()
    }

    fn loaded(&self) -> CatalogResult<&Loaded> {
        self.loaded.get().ok_or(CatalogError::NotActivated)
    }

    /// Function descriptors to advertise to the LLM
    pub fn descriptors(&self) -> CatalogResult<&[ToolDescriptor]> {
        Ok(&self.loaded()?.descriptors)
    }

    /// Tools as the host advertised them
    pub fn specs(&self) -> CatalogResult<&[ToolSpec]> {
        Ok(&self.loaded()?.specs)
    }

    /// Run a tool and return its textual output items in order
    pub async fn invoke(&self, name: &str, arguments: Map<String, Value>) -> CatalogResult<Vec<String>> {
        self.loaded()?;

        let output = self
            .host
            .call_tool(name, arguments)
            .await
            .map_err(|e| CatalogError::ToolExecution {
                tool: name.to_string(),
                message: e.to_string(),
            })?;

        if output.is_error {
            let message = output.texts().join("\n");
            return Err(CatalogError::ToolExecution {
                tool: name.to_string(),
                message: if message.is_empty() {
                    "tool reported an error".to_string()
                } else {
                    message
                },
            });
        }

        let texts = output.texts();
        self.logger.debug(&format!(
            "[ToolCatalog] {} returned {} text items",
            name,
            texts.len()
        ));
        Ok(texts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use crate::mcp::MockToolHost;
    use crate::types::{ToolContent, ToolOutput};
    use serde_json::json;

    fn query_tool() -> ToolSpec {
        ToolSpec::new(
            "query",
            json!({"type": "object", "properties": {"query": {"type": "string"}}}),
        )
        .with_description("Run a read-only SQL query")
    }

    fn catalog(host: MockToolHost) -> (Arc<MockToolHost>, ToolCatalog) {
        let host = Arc::new(host);
        let catalog = ToolCatalog::new(host.clone(), NoOpLogger::shared());
        (host, catalog)
    }

    fn args(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[tokio::test]
    async fn test_not_activated() {
        let (host, catalog) = catalog(MockToolHost::new(vec![query_tool()]));

        assert!(!catalog.is_active());
        assert!(matches!(catalog.descriptors(), Err(CatalogError::NotActivated)));
        assert!(matches!(
            catalog.invoke("query", Map::new()).await,
            Err(CatalogError::NotActivated)
        ));
        assert!(host.calls().is_empty());
    }

    #[tokio::test]
    async fn test_descriptors_are_cached() {
        let (host, catalog) = catalog(MockToolHost::new(vec![query_tool(), ToolSpec::new("ping", json!({}))]));

        catalog.activate().await.unwrap();
        catalog.activate().await.unwrap();
        let first = catalog.descriptors().unwrap().to_vec();
        let second = catalog.descriptors().unwrap().to_vec();

        assert_eq!(first, second);
        assert_eq!(host.list_count(), 1);
        assert_eq!(first[0].description, "Run a read-only SQL query");
        assert_eq!(first[1].description, "");
        assert_eq!(first[1].parameters, json!({}));
        assert_eq!(catalog.specs().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_activation_fetches_once() {
        let (host, catalog) = catalog(MockToolHost::new(vec![query_tool()]));
        let catalog = Arc::new(catalog);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let catalog = catalog.clone();
                tokio::spawn(async move { catalog.activate().await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(host.list_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_activation() {
        let (host, catalog) = catalog(MockToolHost::new(vec![]).failing_listing("connection refused"));

        let err = catalog.activate().await.unwrap_err();
        assert!(matches!(err, CatalogError::CatalogUnavailable(ref m) if m.contains("connection refused")));
        assert!(!catalog.is_active());

        // Retry contacts the host again
        assert!(catalog.activate().await.is_err());
        assert_eq!(host.list_count(), 2);
    }

    #[tokio::test]
    async fn test_invoke_keeps_text_items() {
        let output = ToolOutput::success(vec![
            ToolContent::text("3"),
            ToolContent::Other { kind: "image".to_string() },
        ]);
        let (host, catalog) = catalog(MockToolHost::new(vec![query_tool()]).with_output("query", output));
        catalog.activate().await.unwrap();

        let texts = catalog
            .invoke("query", args(json!({"query": "SELECT COUNT(*) FROM unicorns"})))
            .await
            .unwrap();

        assert_eq!(texts, vec!["3"]);
        assert_eq!(host.calls()[0].0, "query");
        assert_eq!(host.calls()[0].1.get("query"), Some(&json!("SELECT COUNT(*) FROM unicorns")));
    }

    #[tokio::test]
    async fn test_invoke_host_error() {
        let (_, catalog) = catalog(
            MockToolHost::new(vec![query_tool()])
                .with_output("query", ToolOutput::error("syntax error at or near \"SELEC\"")),
        );
        catalog.activate().await.unwrap();

        match catalog.invoke("query", Map::new()).await {
            Err(CatalogError::ToolExecution { tool, message }) => {
                assert_eq!(tool, "query");
                assert!(message.contains("syntax error"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invoke_transport_failure() {
        let (_, catalog) = catalog(MockToolHost::new(vec![query_tool()]).failing_calls("broken pipe"));
        catalog.activate().await.unwrap();

        let err = catalog.invoke("query", Map::new()).await.unwrap_err();
        assert!(matches!(err, CatalogError::ToolExecution { ref message, .. } if message.contains("broken pipe")));
    }

    #[tokio::test]
    async fn test_empty_output() {
        let (_, catalog) = catalog(
            MockToolHost::new(vec![query_tool()]).with_output("query", ToolOutput::success(vec![])),
        );
        catalog.activate().await.unwrap();
        assert!(catalog.invoke("query", Map::new()).await.unwrap().is_empty());
    }
}
