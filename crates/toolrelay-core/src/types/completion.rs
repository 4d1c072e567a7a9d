//! Non-streaming completion results

use serde::{Deserialize, Serialize};

use super::tool::ToolCallRequest;

/// Why the model stopped generating
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FinishReason {
    /// The model wants tools to be called
    ToolCalls,
    /// Normal completion
    Stop,
    /// Anything else the provider reported (`length`, `content_filter`, ...)
    Other(String),
}

impl From<String> for FinishReason {
    fn from(reason: String) -> Self {
        match reason.as_str() {
            "tool_calls" => FinishReason::ToolCalls,
            "stop" => FinishReason::Stop,
            _ => FinishReason::Other(reason),
        }
    }
}

impl From<&str> for FinishReason {
    fn from(reason: &str) -> Self {
        FinishReason::from(reason.to_string())
    }
}

impl From<FinishReason> for String {
    fn from(reason: FinishReason) -> Self {
        reason.to_string()
    }
}

impl std::fmt::Display for FinishReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FinishReason::ToolCalls => write!(f, "tool_calls"),
            FinishReason::Stop => write!(f, "stop"),
            FinishReason::Other(reason) => write!(f, "{}", reason),
        }
    }
}

/// One non-streamed chat completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletion {
    /// Termination reason; `None` if the provider omitted it
    pub finish_reason: Option<FinishReason>,
    /// Literal text of the reply
    pub content: Option<String>,
    /// Tool calls requested by the reply
    #[serde(default)]
    pub tool_calls: Vec<ToolCallRequest>,
}

impl ChatCompletion {
    /// A final answer
    pub fn stop(content: impl Into<String>) -> Self {
        Self {
            finish_reason: Some(FinishReason::Stop),
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    /// A request to run tools
    pub fn tool_calls(tool_calls: Vec<ToolCallRequest>) -> Self {
        Self {
            finish_reason: Some(FinishReason::ToolCalls),
            content: None,
            tool_calls,
        }
    }

    /// A reply with an arbitrary finish reason
    pub fn finished(reason: impl Into<FinishReason>, content: Option<String>) -> Self {
        Self {
            finish_reason: Some(reason.into()),
            content,
            tool_calls: Vec::new(),
        }
    }
}
