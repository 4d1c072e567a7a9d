//! The tool-call loop

use std::sync::Arc;

use futures::StreamExt;
use serde_json::Value;

use super::decision::CompletionDecision;
use super::error::{OrchestratorError, OrchestratorResult};
use super::sink::{FragmentSink, NullSink};
use crate::config::RequestSettings;
use crate::logging::Logger;
use crate::providers::{ChatOptions, Provider};
use crate::tools::ToolCatalog;
use crate::types::{ChatMessage, StreamChunk, ToolCallRequest, ToolChoice, ToolResult};

/// How one cycle talks to the LLM
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    /// Model and sampling parameters; tools are filled in from the catalog
    pub options: ChatOptions,
    /// Stream the final answer to the sink
    pub stream: bool,
    /// Abort after this many tool rounds
    pub max_rounds: Option<usize>,
}

impl RunSettings {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            options: ChatOptions::new(model),
            stream: false,
            max_rounds: None,
        }
    }

    /// Settings from resolved configuration and the model to use
    pub fn from_request(request: &RequestSettings, model: impl Into<String>) -> Self {
        Self {
            options: ChatOptions {
                model: model.into(),
                temperature: request.temperature,
                max_tokens: request.max_tokens,
                top_p: request.top_p,
                ..Default::default()
            },
            stream: request.stream,
            max_rounds: request.max_rounds,
        }
    }

    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn with_max_rounds(mut self, limit: usize) -> Self {
        self.max_rounds = Some(limit);
        self
    }
}

/// How the final answer was delivered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalAnswer {
    /// Appended to the conversation as an assistant message
    Text(Option<String>),
    /// Sent to the sink; the conversation is left as is
    Streamed { fragments: usize },
}

/// Summary of a completed cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub tool_rounds: usize,
    pub tool_calls: usize,
    pub final_answer: FinalAnswer,
}

/// Drives a conversation through LLM turns and tool calls
pub struct Orchestrator {
    provider: Arc<dyn Provider>,
    catalog: Arc<ToolCatalog>,
    settings: RunSettings,
    sink: Arc<dyn FragmentSink>,
    logger: Arc<dyn Logger>,
}

impl Orchestrator {
    pub fn new(
        provider: Arc<dyn Provider>,
        catalog: Arc<ToolCatalog>,
        settings: RunSettings,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            provider,
            catalog,
            settings,
            sink: Arc::new(NullSink),
            logger,
        }
    }

    /// Send streamed fragments to `sink`
    pub fn with_sink(mut self, sink: Arc<dyn FragmentSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// Run one cycle over `conversation`
    ///
    /// Assistant tool-call turns and tool results are appended as they
    /// happen. On error the conversation holds everything appended up to
    /// the failure.
    pub async fn run(&self, conversation: &mut Vec<ChatMessage>) -> OrchestratorResult<RunOutcome> {
        let options = self
            .settings
            .options
            .clone()
            .with_tools(self.catalog.descriptors()?.to_vec())
            .with_tool_choice(ToolChoice::Auto);

        let mut tool_rounds = 0;
        let mut tool_calls = 0;

        loop {
            self.logger.debug(&format!(
                "[Orchestrator] Requesting completion ({} messages, {} tools)",
                conversation.len(),
                options.tools.len()
            ));
            let completion = self.provider.chat(conversation, &options).await?;

            match CompletionDecision::decide(completion)? {
                CompletionDecision::InvokeTools(requests) => {
                    if let Some(limit) = self.settings.max_rounds {
                        if tool_rounds >= limit {
                            self.logger.warn(&format!(
                                "[Orchestrator] Round limit of {} reached",
                                limit
                            ));
                            return Err(OrchestratorError::RoundLimitExceeded { limit });
                        }
                    }
                    tool_rounds += 1;
                    tool_calls += requests.len();
                    self.execute(conversation, requests).await?;
                }
                CompletionDecision::FinalAnswer(text) => {
                    let final_answer = if self.settings.stream {
                        let fragments = self.stream_answer(conversation, &options).await?;
                        FinalAnswer::Streamed { fragments }
                    } else {
                        conversation.push(ChatMessage::assistant_reply(text.clone()));
                        FinalAnswer::Text(text)
                    };

                    self.logger.debug(&format!(
                        "[Orchestrator] Finished after {} tool rounds ({} calls)",
                        tool_rounds, tool_calls
                    ));
                    return Ok(RunOutcome {
                        tool_rounds,
                        tool_calls,
                        final_answer,
                    });
                }
            }
        }
    }

    async fn execute(
        &self,
        conversation: &mut Vec<ChatMessage>,
        requests: Vec<ToolCallRequest>,
    ) -> OrchestratorResult<()> {
        conversation.push(ChatMessage::assistant_tool_calls(requests.clone()));

        for call in requests {
            let arguments = call
                .parse_arguments()
                .map_err(|reason| OrchestratorError::MalformedArguments {
                    id: call.id.clone(),
                    reason,
                })?;

            if let Some(query) = arguments.get("query") {
                let query = match query {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                self.logger.info(&format!("[Orchestrator] {} query: {}", call.name, query));
            } else {
                self.logger.debug(&format!("[Orchestrator] Calling {} ({})", call.name, call.id));
            }

            let texts = self.catalog.invoke(&call.name, arguments.clone()).await?;
            conversation.push(ToolResult::new(&call, arguments, texts).into_message());
        }
        Ok(())
    }

    /// Re-issue the last request with streaming and relay the text
    async fn stream_answer(
        &self,
        conversation: &[ChatMessage],
        options: &ChatOptions,
    ) -> OrchestratorResult<usize> {
        let mut stream = self.provider.stream_chat(conversation, options).await?;
        let mut fragments = 0;

        while let Some(chunk) = stream.next().await {
            match chunk? {
                StreamChunk::Text { text } => {
                    if text.is_empty() {
                        continue;
                    }
                    if self.sink.fragment(&text).await.is_err() {
                        self.logger.warn("[Orchestrator] Consumer went away, dropping the rest of the answer");
                        return Ok(fragments);
                    }
                    fragments += 1;
                }
                StreamChunk::ToolCallDelta { .. } => {}
                StreamChunk::Finish { reason } => {
                    if reason != "stop" {
                        self.logger.warn(&format!(
                            "[Orchestrator] Streamed answer ended with finish reason {}",
                            reason
                        ));
                    }
                }
            }
        }

        self.sink.finish().await;
        Ok(fragments)
    }
}
