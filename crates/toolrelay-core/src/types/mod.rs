//! Core types for LLM and tool-host interactions
//!
//! This module contains all the shared types used across providers,
//! the tool catalog and the orchestrator.

mod message;
mod tool;
mod stream;
mod completion;

pub use message::{ChatMessage, MessageRole};
pub use tool::{
    ToolCallRequest, ToolChoice, ToolContent, ToolDescriptor, ToolOutput, ToolResult, ToolSpec,
};
pub use stream::StreamChunk;
pub use completion::{ChatCompletion, FinishReason};
