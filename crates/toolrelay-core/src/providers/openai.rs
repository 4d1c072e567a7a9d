//! OpenAI-compatible chat completions client
//!
//! Talks to `{api_base}/chat/completions`, which OpenAI, Groq, OpenRouter,
//! DeepSeek, Together, Mistral, Azure proxies and Ollama all expose. Streams
//! are server-sent events: one `data: {json}` line per delta, ending with
//! `data: [DONE]`.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};

use super::error::{ProviderError, ProviderResult};
use super::traits::{ChatOptions, Provider, StreamResponse};
use crate::logging::SharedLogger;
use crate::types::{
    ChatCompletion, ChatMessage, FinishReason, MessageRole, StreamChunk, ToolCallRequest,
};

/// Default API base for providers with a well-known endpoint
pub fn default_api_base(provider_id: &str) -> Option<&'static str> {
    match provider_id {
        "openai" => Some("https://api.openai.com/v1"),
        "groq" => Some("https://api.groq.com/openai/v1"),
        "openrouter" => Some("https://openrouter.ai/api/v1"),
        "deepseek" => Some("https://api.deepseek.com/v1"),
        "together" => Some("https://api.together.xyz/v1"),
        "mistral" => Some("https://api.mistral.ai/v1"),
        "ollama" => Some("http://localhost:11434/v1"),
        _ => None,
    }
}

/// Chat completions client for any OpenAI-compatible endpoint
pub struct OpenAiProvider {
    provider_id: String,
    api_base: String,
    api_key: Option<String>,
    http: reqwest::Client,
    logger: SharedLogger,
}

impl OpenAiProvider {
    pub fn new(
        provider_id: impl Into<String>,
        api_base: impl Into<String>,
        api_key: Option<String>,
        logger: SharedLogger,
    ) -> Self {
        Self {
            provider_id: provider_id.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key,
            http: reqwest::Client::new(),
            logger,
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }

    async fn send(&self, body: &Value) -> ProviderResult<reqwest::Response> {
        let mut request = self.http.post(self.completions_url()).json(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        let message = error_message(&error_body);
        self.logger.error(&format!(
            "{} returned {}: {}",
            self.provider_id, status, message
        ));

        if status == StatusCode::TOO_MANY_REQUESTS {
            Err(ProviderError::rate_limited(&self.provider_id, message))
        } else {
            Err(ProviderError::status(&self.provider_id, status.as_u16(), message))
        }
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        &self.provider_id
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> ProviderResult<ChatCompletion> {
        self.logger.debug(&format!(
            "{}: chat model={} messages={} tools={}",
            self.provider_id,
            options.model,
            messages.len(),
            options.tools.len()
        ));

        let body = request_body(messages, options, false);
        let response = self.send(&body).await?;
        let text = response.text().await?;
        decode_completion(&self.provider_id, &text)
    }

    async fn stream_chat(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> ProviderResult<StreamResponse> {
        self.logger.debug(&format!(
            "{}: stream_chat model={} messages={}",
            self.provider_id,
            options.model,
            messages.len()
        ));

        let body = request_body(messages, options, true);
        let response = self.send(&body).await?;
        let provider = self.provider_id.clone();
        let mut bytes = Box::pin(response.bytes_stream());

        let stream = async_stream::stream! {
            let mut decoder = SseDecoder::default();
            'events: while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        yield Err(ProviderError::stream(&provider, e.to_string()));
                        break;
                    }
                };
                for event in decoder.push(&chunk) {
                    match event {
                        SseData::Done => break 'events,
                        SseData::Json(data) => match decode_stream_event(&provider, &data) {
                            Ok(items) => {
                                for item in items {
                                    yield Ok(item);
                                }
                            }
                            Err(e) => {
                                yield Err(e);
                                break 'events;
                            }
                        },
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

/// Build the JSON request body
pub(crate) fn request_body(messages: &[ChatMessage], options: &ChatOptions, stream: bool) -> Value {
    let mut body = json!({
        "model": options.model,
        "messages": messages.iter().map(wire_message).collect::<Vec<_>>(),
        "stream": stream,
    });

    if !options.tools.is_empty() {
        body["tools"] = options
            .tools
            .iter()
            .map(|t| {
                json!({
                    "type": "function",
                    "function": {
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.parameters,
                    }
                })
            })
            .collect();
        body["tool_choice"] = json!(options.tool_choice.as_str());
    }
    if let Some(temperature) = options.temperature {
        body["temperature"] = json!(temperature);
    }
    if let Some(max_tokens) = options.max_tokens {
        body["max_tokens"] = json!(max_tokens);
    }
    if let Some(top_p) = options.top_p {
        body["top_p"] = json!(top_p);
    }

    body
}

fn wire_message(message: &ChatMessage) -> Value {
    match message.role {
        MessageRole::Assistant if message.has_tool_calls() => json!({
            "role": "assistant",
            "content": message.content,
            "tool_calls": message.tool_calls.iter().map(|call| json!({
                "id": call.id,
                "type": "function",
                "function": { "name": call.name, "arguments": call.arguments },
            })).collect::<Vec<_>>(),
        }),
        MessageRole::Tool => json!({
            "role": "tool",
            "content": message.content,
            "tool_call_id": message.tool_call_id,
        }),
        role => json!({
            "role": role.to_string(),
            "content": message.content,
        }),
    }
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[derive(Debug, Deserialize)]
struct CompletionBody {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type", default = "function_kind")]
    kind: String,
    function: WireFunction,
}

#[derive(Debug, Deserialize)]
struct WireFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

fn function_kind() -> String {
    "function".to_string()
}

pub(crate) fn decode_completion(provider: &str, body: &str) -> ProviderResult<ChatCompletion> {
    let parsed: CompletionBody = serde_json::from_str(body)?;
    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::malformed(provider, "no choices in response"))?;

    let tool_calls = choice
        .message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|call| {
            if call.kind != "function" {
                return Err(ProviderError::malformed(
                    provider,
                    format!("unsupported tool call type '{}'", call.kind),
                ));
            }
            Ok(ToolCallRequest::new(call.id, call.function.name, call.function.arguments))
        })
        .collect::<ProviderResult<Vec<_>>>()?;

    Ok(ChatCompletion {
        finish_reason: choice.finish_reason.map(FinishReason::from),
        content: choice.message.content,
        tool_calls,
    })
}

#[derive(Debug, Deserialize)]
struct StreamEvent {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Delta,
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Delta {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<DeltaToolCall>,
}

#[derive(Debug, Deserialize)]
struct DeltaToolCall {
    #[serde(default)]
    index: u32,
    id: Option<String>,
    function: Option<DeltaFunction>,
}

#[derive(Debug, Deserialize)]
struct DeltaFunction {
    name: Option<String>,
    arguments: Option<String>,
}

pub(crate) fn decode_stream_event(provider: &str, data: &str) -> ProviderResult<Vec<StreamChunk>> {
    let event: StreamEvent = serde_json::from_str(data).map_err(|e| {
        ProviderError::malformed(provider, format!("bad stream event: {}", e))
    })?;

    let mut chunks = Vec::new();
    for choice in event.choices.into_iter().take(1) {
        if let Some(text) = choice.delta.content {
            if !text.is_empty() {
                chunks.push(StreamChunk::text(text));
            }
        }
        for call in choice.delta.tool_calls {
            let (name, arguments_delta) = match call.function {
                Some(f) => (f.name, f.arguments),
                None => (None, None),
            };
            chunks.push(StreamChunk::ToolCallDelta {
                index: call.index,
                id: call.id,
                name,
                arguments_delta,
            });
        }
        if let Some(reason) = choice.finish_reason {
            chunks.push(StreamChunk::finish(reason));
        }
    }
    Ok(chunks)
}

/// Payload of one `data:` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SseData {
    Json(String),
    Done,
}

/// Splits a byte stream into `data:` payloads
///
/// Network chunks do not respect line boundaries, so partial lines are
/// buffered until their newline arrives.
#[derive(Debug, Default)]
pub(crate) struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub(crate) fn push(&mut self, bytes: &[u8]) -> Vec<SseData> {
        self.buffer.extend_from_slice(bytes);

        let mut out = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\n', '\r']);

            if let Some(data) = line.strip_prefix("data:") {
                let data = data.trim_start();
                if data == "[DONE]" {
                    out.push(SseData::Done);
                } else if !data.is_empty() {
                    out.push(SseData::Json(data.to_string()));
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ToolChoice, ToolDescriptor};

    #[test]
    fn test_request_body_with_tools() {
        let messages = vec![
            ChatMessage::system("Be brief"),
            ChatMessage::user("How many unicorns?"),
            ChatMessage::assistant_tool_calls(vec![ToolCallRequest::new(
                "call_1",
                "query",
                r#"{"query":"SELECT COUNT(*) FROM unicorns"}"#,
            )]),
            ChatMessage::tool("call_1", "query", r#"{"query":["3"]}"#),
        ];
        let options = ChatOptions {
            temperature: Some(0.1),
            ..ChatOptions::new("gpt-4o-mini")
        }
        .with_tools(vec![ToolDescriptor {
            name: "query".to_string(),
            description: String::new(),
            parameters: json!({"type": "object"}),
        }]);

        let body = request_body(&messages, &options, false);

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["stream"], false);
        assert_eq!(body["tool_choice"], "auto");
        assert_eq!(body["tools"][0]["type"], "function");
        assert_eq!(body["tools"][0]["function"]["name"], "query");
        assert_eq!(body["tools"][0]["function"]["description"], "");
        assert!(body.get("max_tokens").is_none());

        let wire = body["messages"].as_array().unwrap();
        assert_eq!(wire[0], json!({"role": "system", "content": "Be brief"}));
        assert_eq!(wire[2]["content"], Value::Null);
        assert_eq!(wire[2]["tool_calls"][0]["id"], "call_1");
        assert_eq!(wire[2]["tool_calls"][0]["function"]["arguments"],
            r#"{"query":"SELECT COUNT(*) FROM unicorns"}"#);
        assert_eq!(
            wire[3],
            json!({"role": "tool", "content": r#"{"query":["3"]}"#, "tool_call_id": "call_1"})
        );
    }

    #[test]
    fn test_request_body_without_tools() {
        let options = ChatOptions::new("m").with_tool_choice(ToolChoice::Required);
        let body = request_body(&[ChatMessage::user("hi")], &options, true);
        assert_eq!(body["stream"], true);
        assert!(body.get("tools").is_none());
        assert!(body.get("tool_choice").is_none());
    }

    #[test]
    fn test_decode_tool_call_completion() {
        let body = r#"{
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_abc",
                        "type": "function",
                        "function": {"name": "query", "arguments": "{\"query\":\"SELECT 1\"}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        }"#;

        let completion = decode_completion("openai", body).unwrap();
        assert_eq!(completion.finish_reason, Some(FinishReason::ToolCalls));
        assert_eq!(completion.content, None);
        assert_eq!(
            completion.tool_calls,
            vec![ToolCallRequest::new("call_abc", "query", r#"{"query":"SELECT 1"}"#)]
        );
    }

    #[test]
    fn test_decode_text_completion() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"Three."},"finish_reason":"stop"}]}"#;
        let completion = decode_completion("openai", body).unwrap();
        assert_eq!(completion, ChatCompletion::stop("Three."));
    }

    #[test]
    fn test_decode_rejects_unknown_tool_type() {
        let body = r#"{"choices":[{"message":{"content":null,"tool_calls":[
            {"id":"1","type":"retrieval","function":{"name":"x","arguments":"{}"}}
        ]},"finish_reason":"tool_calls"}]}"#;
        let err = decode_completion("openai", body).unwrap_err();
        assert!(matches!(err, ProviderError::MalformedReply { .. }));
    }

    #[test]
    fn test_decode_no_choices() {
        let err = decode_completion("openai", r#"{"choices":[]}"#).unwrap_err();
        assert!(matches!(err, ProviderError::MalformedReply { .. }));
    }

    #[test]
    fn test_sse_decoder_handles_split_lines() {
        let mut decoder = SseDecoder::default();

        let first = decoder.push(b"data: {\"choices\":[{\"delta\":{\"content\":\"Hel");
        assert!(first.is_empty());

        let rest = decoder.push(b"lo\"}}]}\n\n: keep-alive\n\ndata: [DONE]\n\n");
        assert_eq!(
            rest,
            vec![
                SseData::Json(r#"{"choices":[{"delta":{"content":"Hello"}}]}"#.to_string()),
                SseData::Done,
            ]
        );
    }

    #[test]
    fn test_decode_stream_events() {
        let text = decode_stream_event(
            "openai",
            r#"{"choices":[{"delta":{"content":"Hi"},"finish_reason":null}]}"#,
        )
        .unwrap();
        assert_eq!(text, vec![StreamChunk::text("Hi")]);

        let finish = decode_stream_event(
            "openai",
            r#"{"choices":[{"delta":{},"finish_reason":"stop"}]}"#,
        )
        .unwrap();
        assert_eq!(finish, vec![StreamChunk::finish("stop")]);

        let delta = decode_stream_event(
            "openai",
            r#"{"choices":[{"delta":{"tool_calls":[{"index":0,"id":"c1","function":{"name":"query","arguments":""}}]}}]}"#,
        )
        .unwrap();
        assert_eq!(
            delta,
            vec![StreamChunk::ToolCallDelta {
                index: 0,
                id: Some("c1".to_string()),
                name: Some("query".to_string()),
                arguments_delta: Some(String::new()),
            }]
        );

        // Empty content deltas and usage-only events produce nothing
        assert!(decode_stream_event("openai", r#"{"choices":[{"delta":{"content":""}}]}"#)
            .unwrap()
            .is_empty());
        assert!(decode_stream_event("openai", r#"{"choices":[],"usage":{}}"#)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"error":{"message":"Invalid model","type":"invalid_request_error"}}"#),
            "Invalid model"
        );
        assert_eq!(error_message("Bad Gateway\n"), "Bad Gateway");
    }

    #[test]
    fn test_default_api_bases() {
        assert_eq!(default_api_base("openai"), Some("https://api.openai.com/v1"));
        assert_eq!(default_api_base("azure"), None);
    }
}
