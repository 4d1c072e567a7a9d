//! LLM Provider implementations
//!
//! - `OpenAiProvider`: any endpoint speaking the OpenAI chat completions protocol
//! - `MockProvider`: deterministic replies for tests and offline runs

mod traits;
mod error;
mod openai;
mod mock;

// Core traits and types
pub use traits::{Provider, ChatOptions, StreamResponse};
pub use error::{ProviderError, ProviderResult};

pub use openai::{OpenAiProvider, default_api_base};

// Mock provider for testing
pub use mock::{MockProvider, MockReply, RecordedRequest};

use crate::config::LlmSettings;
use crate::logging::SharedLogger;
use crate::secrets::SecretStore;
use std::sync::Arc;

/// Providers that run without an API key
const KEYLESS_PROVIDERS: &[&str] = &["ollama", "mock"];

/// Create a provider from resolved settings
///
/// The API key is the explicit one from config, else whatever the secret
/// store holds for the provider.
pub fn create_provider(
    llm: &LlmSettings,
    secrets: &dyn SecretStore,
    logger: SharedLogger,
) -> ProviderResult<Arc<dyn Provider>> {
    let provider_id = llm.provider.to_lowercase();

    if provider_id == "mock" {
        return Ok(Arc::new(MockProvider::echo(logger)));
    }

    let api_key = llm.api_key.clone().or_else(|| {
        let key = secrets.get(&provider_id);
        if key.is_some() {
            logger.debug(&format!("API key for {} from {} secrets", provider_id, secrets.name()));
        }
        key
    });
    if api_key.is_none() && !KEYLESS_PROVIDERS.contains(&provider_id.as_str()) {
        return Err(ProviderError::missing_api_key(&provider_id));
    }

    let api_base = match &llm.api_base {
        Some(base) => base.clone(),
        None => default_api_base(&provider_id)
            .ok_or_else(|| ProviderError::no_api_base(&provider_id))?
            .to_string(),
    };

    logger.debug(&format!("Using provider {} at {}", provider_id, api_base));
    Ok(Arc::new(OpenAiProvider::new(provider_id, api_base, api_key, logger)))
}
