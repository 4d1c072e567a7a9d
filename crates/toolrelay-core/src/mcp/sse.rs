//! Legacy MCP SSE transport
//!
//! The host streams events from `GET <url>`. Its first `endpoint` event
//! names the URL that accepts client messages as JSON `POST`s; every later
//! `message` event carries one server message.

use std::collections::VecDeque;
use std::future::Future;

use futures::StreamExt;
use reqwest::Url;
use rmcp::service::{RxJsonRpcMessage, TxJsonRpcMessage};
use rmcp::transport::Transport;
use rmcp::RoleClient;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::logging::SharedLogger;

/// Server messages buffered between the event reader and the client service
const INBOUND_BUFFER: usize = 64;

#[derive(Error, Debug)]
pub enum SseTransportError {
    #[error("SSE request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid SSE URL: {0}")]
    Url(String),

    #[error("Event stream closed before the host announced its message endpoint")]
    NoEndpoint,
}

/// One dispatched server-sent event
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SseEvent {
    pub event: String,
    pub data: String,
}

/// Incremental `text/event-stream` parser
///
/// Lines may be split across network chunks; an event is dispatched on the
/// blank line that ends it. Events without an `event:` field are `message`.
#[derive(Debug, Default)]
pub(crate) struct EventDecoder {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
}

impl EventDecoder {
    pub fn push(&mut self, bytes: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(bytes);
        let mut events = Vec::new();

        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            let text = String::from_utf8_lossy(&raw);
            let line = text.trim_end_matches(|c| c == '\n' || c == '\r');

            if line.is_empty() {
                if self.event.is_some() || !self.data.is_empty() {
                    events.push(SseEvent {
                        event: self.event.take().unwrap_or_else(|| "message".to_string()),
                        data: self.data.join("\n"),
                    });
                    self.data.clear();
                }
                continue;
            }
            if line.starts_with(':') {
                continue;
            }

            let (field, value) = match line.split_once(':') {
                Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
                None => (line, ""),
            };
            match field {
                "event" => self.event = Some(value.to_string()),
                "data" => self.data.push(value.to_string()),
                _ => {}
            }
        }

        events
    }
}

/// Client side of the legacy SSE transport
pub struct SseClientTransport {
    http: reqwest::Client,
    endpoint: Url,
    inbound: mpsc::Receiver<RxJsonRpcMessage<RoleClient>>,
    reader: JoinHandle<()>,
}

impl SseClientTransport {
    /// Open the event stream and wait for the message endpoint
    pub async fn connect(url: &str, logger: SharedLogger) -> Result<Self, SseTransportError> {
        let base = Url::parse(url).map_err(|e| SseTransportError::Url(format!("{}: {}", url, e)))?;
        let http = reqwest::Client::new();
        let response = http
            .get(base.clone())
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await?
            .error_for_status()?;

        let mut bytes = Box::pin(response.bytes_stream());
        let mut decoder = EventDecoder::default();
        let mut pending = VecDeque::new();

        let endpoint = 'announce: loop {
            let chunk = match bytes.next().await {
                Some(chunk) => chunk?,
                None => return Err(SseTransportError::NoEndpoint),
            };
            let mut events = decoder.push(&chunk).into_iter();
            while let Some(event) = events.next() {
                if event.event == "endpoint" {
                    pending.extend(events);
                    break 'announce base
                        .join(&event.data)
                        .map_err(|e| SseTransportError::Url(format!("{}: {}", event.data, e)))?;
                }
            }
        };
        logger.debug(&format!("[McpClient] SSE message endpoint: {}", endpoint));

        let (tx, inbound) = mpsc::channel(INBOUND_BUFFER);
        let reader = tokio::spawn(async move {
            for event in pending {
                if !forward(&tx, &logger, event).await {
                    return;
                }
            }
            while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        logger.warn(&format!("[McpClient] SSE stream broke off: {}", e));
                        return;
                    }
                };
                for event in decoder.push(&chunk) {
                    if !forward(&tx, &logger, event).await {
                        return;
                    }
                }
            }
            logger.debug("[McpClient] SSE stream ended");
        });

        Ok(Self {
            http,
            endpoint,
            inbound,
            reader,
        })
    }
}

/// Hand a `message` event to the client service; false once nobody listens
async fn forward(
    tx: &mpsc::Sender<RxJsonRpcMessage<RoleClient>>,
    logger: &SharedLogger,
    event: SseEvent,
) -> bool {
    if event.event != "message" {
        return true;
    }
    match serde_json::from_str(&event.data) {
        Ok(message) => tx.send(message).await.is_ok(),
        Err(e) => {
            logger.warn(&format!("[McpClient] Skipping undecodable SSE message: {}", e));
            true
        }
    }
}

impl Transport<RoleClient> for SseClientTransport {
    type Error = SseTransportError;

    fn send(
        &mut self,
        item: TxJsonRpcMessage<RoleClient>,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'static {
        let request = self.http.post(self.endpoint.clone()).json(&item);
        async move {
            request.send().await?.error_for_status()?;
            Ok(())
        }
    }

    fn receive(&mut self) -> impl Future<Output = Option<RxJsonRpcMessage<RoleClient>>> + Send {
        self.inbound.recv()
    }

    async fn close(&mut self) -> Result<(), Self::Error> {
        self.reader.abort();
        Ok(())
    }
}

impl Drop for SseClientTransport {
    fn drop(&mut self) {
        self.reader.abort();
    }
}
