//! Where streamed answer fragments go

use std::io::Write;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

/// Item carried from the orchestrator to a stream consumer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    Fragment(String),
    Done,
}

/// The consumer went away
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("fragment sink closed")]
pub struct SinkClosed;

/// Receives the final answer fragment by fragment
#[async_trait]
pub trait FragmentSink: Send + Sync {
    /// Deliver one non-empty fragment
    async fn fragment(&self, text: &str) -> Result<(), SinkClosed>;

    /// End of the answer
    async fn finish(&self);
}

/// Prints fragments to stdout as they arrive
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

#[async_trait]
impl FragmentSink for ConsoleSink {
    async fn fragment(&self, text: &str) -> Result<(), SinkClosed> {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(text.as_bytes())
            .and_then(|_| stdout.flush())
            .map_err(|_| SinkClosed)
    }

    async fn finish(&self) {
        let _ = std::io::stdout().flush();
    }
}

/// Forwards fragments into a bounded channel
///
/// The channel bound is the backpressure: a slow reader suspends the
/// orchestrator.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<RelayEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<RelayEvent>) -> Self {
        Self { tx }
    }

    /// A sink and the receiving end of its channel
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<RelayEvent>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self::new(tx), rx)
    }
}

#[async_trait]
impl FragmentSink for ChannelSink {
    async fn fragment(&self, text: &str) -> Result<(), SinkClosed> {
        self.tx
            .send(RelayEvent::Fragment(text.to_string()))
            .await
            .map_err(|_| SinkClosed)
    }

    async fn finish(&self) {
        let _ = self.tx.send(RelayEvent::Done).await;
    }
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

#[async_trait]
impl FragmentSink for NullSink {
    async fn fragment(&self, _text: &str) -> Result<(), SinkClosed> {
        Ok(())
    }

    async fn finish(&self) {}
}
