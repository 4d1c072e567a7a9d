//! Tool-call orchestration
//!
//! `Orchestrator::run` asks the LLM for a completion, runs any requested
//! tools through the `ToolCatalog`, appends the results and asks again,
//! until the model produces a final answer. The answer is either appended
//! to the conversation or streamed to a `FragmentSink`.

mod error;
mod decision;
mod sink;
mod engine;

pub use error::{OrchestratorError, OrchestratorResult};
pub use decision::CompletionDecision;
pub use sink::{FragmentSink, ConsoleSink, ChannelSink, NullSink, RelayEvent, SinkClosed};
pub use engine::{Orchestrator, RunSettings, RunOutcome, FinalAnswer};
