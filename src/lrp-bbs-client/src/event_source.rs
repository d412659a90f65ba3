//! The instance-event subscription: a background task reads the
//! chunked response body and forwards parsed frames over a channel,
//! reconnecting with backoff on transport failure. See the module
//! documentation on [`EventSource`] for the consumer-facing contract.

use std::time::Duration;

use bytes::BytesMut;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use lrp_ore::retry::Retry;
use lrp_types::BbsEvent;

use crate::wire::parse_frame;

/// Failure modes surfaced by [`EventSource::next`].
#[derive(Debug, thiserror::Error)]
pub enum EventSourceError {
    /// The subscription was closed, either by [`EventSource::close`] or
    /// because BBS hung up and reconnection gave up.
    #[error("event source closed")]
    SourceClosed,
    /// A frame was observed but couldn't be classified; the stream
    /// continues, the caller should simply call `next` again.
    #[error("unrecognized or malformed event frame")]
    UnrecognizedEventType,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// A live subscription to BBS's instance-event stream.
///
/// Internally a single background task owns the HTTP connection and
/// reconnects with exponential backoff on transport failure; `next` only
/// ever talks to that task over a channel, so reconnects are invisible to
/// the caller except as the absence of new events while one is underway.
pub struct EventSource {
    events: mpsc::Receiver<Result<BbsEvent, EventSourceError>>,
    cancel: CancellationToken,
}

impl EventSource {
    pub(crate) fn spawn(client: reqwest::Client, url: String) -> EventSource {
        let (tx, rx) = mpsc::channel(1);
        let cancel = CancellationToken::new();
        let task = ReadTask { client, url, tx, cancel: cancel.clone() };
        lrp_ore::task::spawn(|| "bbs-event-source", task.run());
        EventSource { events: rx, cancel }
    }

    /// Waits for the next event. Returns `Err(SourceClosed)` once the
    /// subscription has been closed and no further events will arrive.
    pub async fn next(&mut self) -> Result<BbsEvent, EventSourceError> {
        match self.events.recv().await {
            Some(result) => result,
            None => Err(EventSourceError::SourceClosed),
        }
    }

    /// Tears down the background connection. Idempotent; a pending
    /// `next` call resolves to `Err(SourceClosed)` once the task notices.
    pub fn close(&self) {
        self.cancel.cancel();
    }
}

struct ReadTask {
    client: reqwest::Client,
    url: String,
    tx: mpsc::Sender<Result<BbsEvent, EventSourceError>>,
    cancel: CancellationToken,
}

enum TaskState {
    Connecting,
    Streaming(reqwest::Response),
    Done,
}

impl ReadTask {
    async fn run(mut self) {
        let mut state = TaskState::Connecting;
        loop {
            state = match state {
                TaskState::Connecting => self.step_connect().await,
                TaskState::Streaming(response) => self.step_stream(response).await,
                TaskState::Done => break,
            };
        }
    }

    async fn step_connect(&mut self) -> TaskState {
        let retry = Retry::default().clamp_backoff(Duration::from_secs(32)).into_retry_stream();
        tokio::pin!(retry);
        loop {
            if self.cancel.is_cancelled() {
                return TaskState::Done;
            }
            match self
                .client
                .get(&self.url)
                .header("Accept", "application/json")
                .send()
                .await
                .and_then(reqwest::Response::error_for_status)
            {
                Ok(response) => return TaskState::Streaming(response),
                Err(error) => {
                    warn!(%error, "error connecting to instance event stream, retrying");
                    retry.next().await;
                }
            }
        }
    }

    /// Streams one connection to exhaustion. A server hangup or a read
    /// error both end this connection for good — the task does not
    /// reconnect on its own, because resubscription is the watcher's
    /// decision (§4.E's `Resubscribing` state), made by calling
    /// `subscribe_instance_events` again for a fresh [`EventSource`].
    /// Blurring that line here would make the watcher's state machine
    /// unreachable in practice: a silently-reconnecting task never
    /// surfaces `SourceClosed`, so `Resubscribing` would only ever be
    /// entered on deliberate shutdown.
    async fn step_stream(&mut self, response: reqwest::Response) -> TaskState {
        let mut stream = response.bytes_stream();
        let mut buf = BytesMut::new();
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => return TaskState::Done,
                chunk = stream.next() => match chunk {
                    None => {
                        self.emit(Err(EventSourceError::SourceClosed)).await;
                        return TaskState::Done;
                    }
                    Some(Err(error)) => {
                        self.emit(Err(EventSourceError::Other(error.into()))).await;
                        return TaskState::Done;
                    }
                    Some(Ok(bytes)) => {
                        buf.extend_from_slice(&bytes);
                        if !self.drain_frames(&mut buf).await {
                            return TaskState::Done;
                        }
                    }
                },
            }
        }
    }

    /// Splits complete newline-terminated frames out of `buf` and emits
    /// them. Returns `false` if the receiver has hung up.
    async fn drain_frames(&mut self, buf: &mut BytesMut) -> bool {
        while let Some(pos) = buf.iter().position(|&b| b == b'\n') {
            let frame = buf.split_to(pos + 1);
            let frame = &frame[..frame.len() - 1];
            if frame.is_empty() {
                continue;
            }
            let parsed = parse_frame(frame);
            if !self.emit(parsed).await {
                return false;
            }
        }
        true
    }

    /// Sends a result to the caller. Returns `false` if the receiver has
    /// hung up, meaning this task should stop.
    async fn emit(&mut self, result: Result<BbsEvent, EventSourceError>) -> bool {
        self.tx.send(result).await.is_ok()
    }
}
