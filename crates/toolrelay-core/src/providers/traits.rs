//! Provider trait definition

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

use crate::types::{ChatCompletion, ChatMessage, StreamChunk, ToolChoice, ToolDescriptor};
use super::error::ProviderResult;

/// Per-request options for chat completions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatOptions {
    /// Model identifier as used by the provider's API
    pub model: String,
    /// Temperature for response generation (0.0 - 2.0)
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Nucleus sampling
    pub top_p: Option<f32>,
    /// Functions the model may call; nothing is offered when empty
    pub tools: Vec<ToolDescriptor>,
    /// Tool choice behavior
    pub tool_choice: ToolChoice,
}

impl ChatOptions {
    /// Create new options for a model
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Set tools
    pub fn with_tools(mut self, tools: Vec<ToolDescriptor>) -> Self {
        self.tools = tools;
        self
    }

    /// Set tool choice
    pub fn with_tool_choice(mut self, choice: ToolChoice) -> Self {
        self.tool_choice = choice;
        self
    }
}

/// Type alias for the streaming response
pub type StreamResponse = Pin<Box<dyn Stream<Item = ProviderResult<StreamChunk>> + Send>>;

/// Provider trait for LLM implementations
///
/// A provider is stateless with respect to the conversation: every call
/// receives the full message list.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Get the provider name (e.g., "openai", "groq")
    fn name(&self) -> &str;

    /// Request one complete, non-streamed reply
    async fn chat(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> ProviderResult<ChatCompletion>;

    /// Stream a chat completion
    async fn stream_chat(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> ProviderResult<StreamResponse>;
}
