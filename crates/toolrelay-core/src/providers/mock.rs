//! Mock provider for testing
//!
//! Provides deterministic responses without network dependencies.
//! Echo mode backs the `mock` provider id for offline runs. Scripted mode
//! replays a queue of replies and records every request, which is what the
//! orchestrator and server tests drive.

use async_trait::async_trait;
use futures::stream;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

use super::error::{ProviderError, ProviderResult};
use super::traits::{ChatOptions, Provider, StreamResponse};
use crate::logging::Logger;
use crate::types::{ChatCompletion, ChatMessage, FinishReason, MessageRole, StreamChunk};

/// Characters per fragment when streaming an echo
const ECHO_CHUNK_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Echo back the last user message
    Echo,
    /// Replay queued `MockReply` values in order
    Scripted,
}

/// One scripted reply
#[derive(Debug, Clone)]
pub enum MockReply {
    /// A complete reply; streamed as a single fragment when streaming
    Completion(ChatCompletion),
    /// Streamed fragments followed by a finish reason
    Stream { fragments: Vec<String>, finish: String },
    /// Some fragments, then a mid-stream failure
    StreamError { fragments: Vec<String>, message: String },
    /// The request itself fails with the given HTTP status
    Error { status: u16, message: String },
}

impl MockReply {
    /// Fragments ending with `stop`
    pub fn stream<S: Into<String>>(fragments: impl IntoIterator<Item = S>) -> Self {
        MockReply::Stream {
            fragments: fragments.into_iter().map(Into::into).collect(),
            finish: "stop".to_string(),
        }
    }
}

/// A request the mock received
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Snapshot of the conversation as sent
    pub messages: Vec<ChatMessage>,
    pub options: ChatOptions,
    pub streamed: bool,
}

/// Mock LLM provider for testing
pub struct MockProvider {
    mode: Mode,
    script: Mutex<VecDeque<MockReply>>,
    requests: Mutex<Vec<RecordedRequest>>,
    logger: Arc<dyn Logger>,
}

impl MockProvider {
    fn with_mode(mode: Mode, logger: Arc<dyn Logger>) -> Self {
        Self {
            mode,
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            logger,
        }
    }

    /// Create an echo provider (echoes back user message)
    pub fn echo(logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(Mode::Echo, logger)
    }

    /// Create a provider that replays `replies` in order
    pub fn scripted(replies: Vec<MockReply>, logger: Arc<dyn Logger>) -> Self {
        let provider = Self::with_mode(Mode::Scripted, logger);
        provider.script.lock().extend(replies);
        provider
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    fn record(&self, messages: &[ChatMessage], options: &ChatOptions, streamed: bool) {
        self.requests.lock().push(RecordedRequest {
            messages: messages.to_vec(),
            options: options.clone(),
            streamed,
        });
    }

    fn last_user_message(messages: &[ChatMessage]) -> String {
        messages
            .iter()
            .rev()
            .filter(|m| m.role == MessageRole::User)
            .find_map(|m| m.text().filter(|t| !t.is_empty()))
            .unwrap_or("Hello from MockProvider!")
            .to_string()
    }

    fn split_into_chunks(text: &str) -> Vec<String> {
        if text.is_empty() {
            return vec![String::new()];
        }
        text.chars()
            .collect::<Vec<_>>()
            .chunks(ECHO_CHUNK_SIZE)
            .map(|c| c.iter().collect())
            .collect()
    }

    fn next_reply(&self, messages: &[ChatMessage]) -> ProviderResult<MockReply> {
        match self.mode {
            Mode::Echo => {
                let user_msg = Self::last_user_message(messages);
                self.logger.debug(&format!("MockProvider: Echo mode, echoing: {}", user_msg));
                Ok(MockReply::Completion(ChatCompletion::stop(format!("Echo: {}", user_msg))))
            }
            Mode::Scripted => {
                let next = self.script.lock().pop_front();
                next.ok_or_else(|| ProviderError::ScriptExhausted {
                    served: self.requests.lock().len().saturating_sub(1),
                })
            }
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> ProviderResult<ChatCompletion> {
        self.logger.debug("MockProvider: chat called");
        self.record(messages, options, false);

        match self.next_reply(messages)? {
            MockReply::Completion(completion) => Ok(completion),
            MockReply::Stream { fragments, finish } => {
                Ok(ChatCompletion::finished(finish, Some(fragments.concat())))
            }
            MockReply::StreamError { message, .. } => Err(ProviderError::stream("mock", message)),
            MockReply::Error { status, message } => Err(ProviderError::status("mock", status, message)),
        }
    }

    async fn stream_chat(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> ProviderResult<StreamResponse> {
        self.logger.debug("MockProvider: stream_chat called");
        self.record(messages, options, true);

        let mut items: Vec<ProviderResult<StreamChunk>> = Vec::new();
        match self.next_reply(messages)? {
            MockReply::Completion(completion) => {
                let text = completion.content.unwrap_or_default();
                let chunks = match self.mode {
                    Mode::Scripted => vec![text],
                    Mode::Echo => Self::split_into_chunks(&text),
                };
                items.extend(chunks.into_iter().map(|c| Ok(StreamChunk::text(c))));
                let reason = completion.finish_reason.unwrap_or(FinishReason::Stop);
                items.push(Ok(StreamChunk::finish(reason.to_string())));
            }
            MockReply::Stream { fragments, finish } => {
                items.extend(fragments.into_iter().map(|f| Ok(StreamChunk::text(f))));
                items.push(Ok(StreamChunk::finish(finish)));
            }
            MockReply::StreamError { fragments, message } => {
                items.extend(fragments.into_iter().map(|f| Ok(StreamChunk::text(f))));
                items.push(Err(ProviderError::stream("mock", message)));
            }
            MockReply::Error { status, message } => {
                return Err(ProviderError::status("mock", status, message));
            }
        }

        Ok(Box::pin(stream::iter(items)))
    }
}
