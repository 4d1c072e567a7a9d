//! Orchestrator error types

use thiserror::Error;

use crate::providers::ProviderError;
use crate::tools::CatalogError;

/// Errors that abort an orchestration cycle
///
/// Nothing is retried; the conversation keeps whatever was appended before
/// the failure.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// Catalog not activated, unavailable, or a tool failed
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Malformed arguments for tool call {id}: {reason}")]
    MalformedArguments { id: String, reason: String },

    /// The LLM finished for a reason the loop cannot act on
    #[error("Unexpected completion from LLM (finish reason: {reason})")]
    ProtocolViolation { reason: String },

    #[error("LLM request failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Gave up after {limit} tool rounds")]
    RoundLimitExceeded { limit: usize },
}

impl OrchestratorError {
    pub fn protocol_violation(reason: impl Into<String>) -> Self {
        Self::ProtocolViolation {
            reason: reason.into(),
        }
    }
}

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;
