//! Server-sent event framing for the answer relay

use std::convert::Infallible;

use axum::{
    body::Body,
    http::header,
    response::{IntoResponse, Response},
};
use futures::Stream;
use tokio::sync::mpsc;
use toolrelay_core::RelayEvent;

/// Record sent once the answer is complete, or the cycle failed
pub const CLOSE_FRAME: &str = "event: close\ndata: [DONE]\n\n";

/// Frame one answer fragment
pub fn frame_fragment(text: &str) -> String {
    format!("data: {}\n\n", text)
}

/// Turn relay events into SSE frames
///
/// The close record is emitted on `Done` and also when every sender is
/// dropped, so a failed cycle still terminates the stream.
pub fn relay(mut rx: mpsc::Receiver<RelayEvent>) -> impl Stream<Item = Result<String, Infallible>> {
    async_stream::stream! {
        while let Some(event) = rx.recv().await {
            match event {
                RelayEvent::Fragment(text) => yield Ok(frame_fragment(&text)),
                RelayEvent::Done => break,
            }
        }
        yield Ok(CLOSE_FRAME.to_string());
    }
}

/// A `text/event-stream` response fed by `rx`
pub fn sse_response(rx: mpsc::Receiver<RelayEvent>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(relay(rx)),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    async fn frames(rx: mpsc::Receiver<RelayEvent>) -> String {
        relay(rx)
            .map(|frame| match frame {
                Ok(frame) => frame,
                Err(never) => match never {},
            })
            .collect::<Vec<_>>()
            .await
            .concat()
    }

    #[tokio::test]
    async fn test_fragments_then_close() {
        let (tx, rx) = mpsc::channel(8);
        tx.send(RelayEvent::Fragment("Hel".to_string())).await.unwrap();
        tx.send(RelayEvent::Fragment("lo".to_string())).await.unwrap();
        tx.send(RelayEvent::Done).await.unwrap();

        assert_eq!(
            frames(rx).await,
            "data: Hel\n\ndata: lo\n\nevent: close\ndata: [DONE]\n\n"
        );
    }

    #[tokio::test]
    async fn test_close_when_sender_dropped() {
        let (tx, rx) = mpsc::channel(8);
        tx.send(RelayEvent::Fragment("partial".to_string())).await.unwrap();
        drop(tx);

        assert_eq!(frames(rx).await, "data: partial\n\nevent: close\ndata: [DONE]\n\n");
    }

    #[tokio::test]
    async fn test_nothing_after_done() {
        let (tx, rx) = mpsc::channel(8);
        tx.send(RelayEvent::Done).await.unwrap();
        tx.send(RelayEvent::Fragment("late".to_string())).await.unwrap();

        assert_eq!(frames(rx).await, CLOSE_FRAME);
    }
}
