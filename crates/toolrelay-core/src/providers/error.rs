//! Errors raised while talking to an LLM backend

use thiserror::Error;

/// Failure of one chat completion request or stream
#[derive(Error, Debug)]
pub enum ProviderError {
    /// No key in config or in the secret store
    #[error("No API key for provider '{provider}'")]
    MissingApiKey { provider: String },

    /// Provider id has no default endpoint and none was configured
    #[error("No API base known for provider '{provider}'; set llm.api_base or OPENAI_BASE_URL")]
    NoApiBase { provider: String },

    /// Backend answered with a non-success status
    #[error("{provider} returned HTTP {status}: {message}")]
    Status {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("{provider} rate limited: {message}")]
    RateLimited { provider: String, message: String },

    /// Request could not be sent or its body not read
    #[error("Request to LLM failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Undecodable LLM reply: {0}")]
    Json(#[from] serde_json::Error),

    /// Reply decoded but does not follow the chat completions shape
    #[error("Malformed reply from {provider}: {message}")]
    MalformedReply { provider: String, message: String },

    /// Stream broke off after it started
    #[error("{provider} stream failed: {message}")]
    Stream { provider: String, message: String },

    /// Scripted mock has no reply left
    #[error("Mock script exhausted after {served} replies")]
    ScriptExhausted { served: usize },
}

impl ProviderError {
    pub fn missing_api_key(provider: impl Into<String>) -> Self {
        Self::MissingApiKey {
            provider: provider.into(),
        }
    }

    pub fn no_api_base(provider: impl Into<String>) -> Self {
        Self::NoApiBase {
            provider: provider.into(),
        }
    }

    /// Non-success HTTP status with the backend's error text
    pub fn status(provider: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            provider: provider.into(),
            status,
            message: message.into(),
        }
    }

    pub fn rate_limited(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RateLimited {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn malformed(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedReply {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn stream(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Stream {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;
