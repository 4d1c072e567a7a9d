//! Interpreting a completion

use super::error::{OrchestratorError, OrchestratorResult};
use crate::types::{ChatCompletion, FinishReason, ToolCallRequest};

/// What the LLM asked for
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionDecision {
    /// Run these tools, then ask again
    InvokeTools(Vec<ToolCallRequest>),
    /// Done; the literal reply content, which may be null
    FinalAnswer(Option<String>),
}

impl CompletionDecision {
    /// Classify a completion by its finish reason
    pub fn decide(completion: ChatCompletion) -> OrchestratorResult<Self> {
        match completion.finish_reason {
            Some(FinishReason::ToolCalls) if completion.tool_calls.is_empty() => Err(
                OrchestratorError::protocol_violation("tool_calls without any tool call"),
            ),
            Some(FinishReason::ToolCalls) => Ok(Self::InvokeTools(completion.tool_calls)),
            Some(FinishReason::Stop) => Ok(Self::FinalAnswer(completion.content)),
            Some(FinishReason::Other(reason)) => Err(OrchestratorError::protocol_violation(reason)),
            None => Err(OrchestratorError::protocol_violation("none")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decide() {
        let call = ToolCallRequest::new("1", "query", "{}");
        assert_eq!(
            CompletionDecision::decide(ChatCompletion::tool_calls(vec![call.clone()])).unwrap(),
            CompletionDecision::InvokeTools(vec![call])
        );
        assert_eq!(
            CompletionDecision::decide(ChatCompletion::stop("done")).unwrap(),
            CompletionDecision::FinalAnswer(Some("done".to_string()))
        );
        assert_eq!(
            CompletionDecision::decide(ChatCompletion::finished("stop", None)).unwrap(),
            CompletionDecision::FinalAnswer(None)
        );
    }

    #[test]
    fn test_protocol_violations() {
        let length = CompletionDecision::decide(ChatCompletion::finished("length", Some("trunc".into())));
        assert!(matches!(length, Err(OrchestratorError::ProtocolViolation { reason }) if reason == "length"));

        let missing = CompletionDecision::decide(ChatCompletion {
            finish_reason: None,
            content: Some("hi".to_string()),
            tool_calls: vec![],
        });
        assert!(matches!(missing, Err(OrchestratorError::ProtocolViolation { reason }) if reason == "none"));

        let empty = CompletionDecision::decide(ChatCompletion::tool_calls(vec![]));
        assert!(matches!(empty, Err(OrchestratorError::ProtocolViolation { .. })));
    }
}
